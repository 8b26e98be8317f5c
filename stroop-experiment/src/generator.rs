use crate::error::{ExperimentError, Result};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use stroop_core::{ColorSpec, Congruence, Trial};

/// Builds `count` shuffled trials split evenly between congruent and
/// incongruent pairings.
///
/// With `count == 2 * colors.len()` every color appears once per condition.
/// Other counts tile: words for each condition come from back-to-back
/// shuffled copies of the palette, so colors stay as balanced as the count
/// allows. An odd count gives the spare trial to a condition by coin flip.
pub fn generate_trials<R: Rng + ?Sized>(
    count: usize,
    colors: &[ColorSpec],
    rng: &mut R,
) -> Result<Vec<Trial>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if colors.len() < 2 {
        return Err(ExperimentError::Config(format!(
            "cannot build incongruent trials from {} color(s)",
            colors.len()
        )));
    }

    let spare = usize::from(count % 2 == 1 && rng.random_bool(0.5));
    let congruent = count / 2 + spare;
    let incongruent = count - congruent;

    let mut trials = Vec::with_capacity(count);

    for color in tiled_palette(congruent, colors, rng) {
        trials.push(Trial {
            word: color.name.clone(),
            ink: color.ink.clone(),
            congruence: Congruence::Congruent,
        });
    }

    for color in tiled_palette(incongruent, colors, rng) {
        let others: Vec<&ColorSpec> = colors.iter().filter(|c| c.name != color.name).collect();
        let ink = others.choose(rng).ok_or_else(|| {
            ExperimentError::Config(format!("no other ink available for {}", color.name))
        })?;
        trials.push(Trial {
            word: color.name.clone(),
            ink: ink.ink.clone(),
            congruence: Congruence::Incongruent,
        });
    }

    trials.shuffle(rng);
    Ok(trials)
}

fn tiled_palette<'a, R: Rng + ?Sized>(
    n: usize,
    colors: &'a [ColorSpec],
    rng: &mut R,
) -> Vec<&'a ColorSpec> {
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let mut round: Vec<&ColorSpec> = colors.iter().collect();
        round.shuffle(rng);
        let take = n - out.len();
        out.extend(round.into_iter().take(take));
    }
    out
}
