use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA.
pub type Rgba = [u8; 4];

/// One entry of the experiment palette.
///
/// `name` is the word shown on screen and the answer a participant gives,
/// `ink` is the identifier written to the results file for the rendered
/// color, and `rgba` is what the renderer actually paints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSpec {
    pub name: String,
    pub ink: String,
    pub rgba: Rgba,
}

impl ColorSpec {
    pub fn new(name: &str, ink: &str, rgba: Rgba) -> Self {
        Self {
            name: name.to_string(),
            ink: ink.to_string(),
            rgba,
        }
    }
}

/// A response key and the color name it claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: char,
    pub color: String,
}

impl KeyBinding {
    pub fn new(key: char, color: &str) -> Self {
        Self {
            key,
            color: color.to_string(),
        }
    }
}
