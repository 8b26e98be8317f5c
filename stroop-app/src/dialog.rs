use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};
use stroop_core::Participant;
use stroop_experiment::{ExperimentError, ParticipantSource, Result};

/// Participant dialog on the terminal, shown before the window opens.
///
/// An empty ID or end of input cancels.
pub struct TerminalDialog<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl TerminalDialog<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalDialog<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask(&mut self) -> io::Result<Option<Participant>> {
        writeln!(self.output, "=== STROOP TEST ===")?;
        let id = match self.prompt("Participant ID (leave empty to cancel): ")? {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(None),
        };
        loop {
            let Some(age) = self.prompt("Age: ")? else {
                return Ok(None);
            };
            match age.parse::<u32>() {
                Ok(age) => return Ok(Some(Participant { id, age })),
                Err(_) => writeln!(self.output, "Please enter the age as a whole number.")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> ParticipantSource for TerminalDialog<R, W> {
    fn request_participant(&mut self) -> Result<Option<Participant>> {
        self.ask().map_err(|e| ExperimentError::io("<terminal>", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(input: &str) -> (Option<Participant>, String) {
        let mut out = Vec::new();
        let participant = TerminalDialog::new(Cursor::new(input.as_bytes()), &mut out)
            .request_participant()
            .unwrap();
        (participant, String::from_utf8(out).unwrap())
    }

    #[test]
    fn reads_id_and_age() {
        let (participant, _) = run("P01\n23\n");
        assert_eq!(
            participant,
            Some(Participant {
                id: "P01".to_string(),
                age: 23
            })
        );
    }

    #[test]
    fn empty_id_cancels() {
        assert_eq!(run("\n23\n").0, None);
    }

    #[test]
    fn end_of_input_cancels() {
        assert_eq!(run("").0, None);
        assert_eq!(run("P01\n").0, None);
    }

    #[test]
    fn non_numeric_age_asks_again() {
        let (participant, output) = run("P01\ntwenty\n20\n");
        assert_eq!(participant.map(|p| p.age), Some(20));
        assert!(output.contains("whole number"));
    }
}
