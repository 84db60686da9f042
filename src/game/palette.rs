//! Fixed color palette for pads and target announcements

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Draw attempts before falling back to the next palette entry
const MAX_REJECTION_DRAWS: usize = 64;

/// A named pad color. Identity is by name.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Color {
    pub name: String,
    pub rgb: [u8; 3],
}

impl Color {
    pub fn new(name: impl Into<String>, rgb: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            rgb,
        }
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Palette parsing errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PaletteError {
    #[error("palette must contain at least one color")]
    Empty,

    #[error("invalid palette entry `{0}`, expected Name=RRGGBB")]
    InvalidEntry(String),

    #[error("duplicate palette color `{0}`")]
    Duplicate(String),
}

/// Ordered, immutable set of colors
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::Empty);
        }
        for (i, color) in colors.iter().enumerate() {
            if colors[..i].contains(color) {
                return Err(PaletteError::Duplicate(color.name.clone()));
            }
        }
        Ok(Self { colors })
    }

    /// Parse a `Name=RRGGBB,Name=RRGGBB` list
    pub fn parse(raw: &str) -> Result<Self, PaletteError> {
        let colors = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_entry)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn get(&self, name: &str) -> Option<&Color> {
        self.colors.iter().find(|c| c.name == name)
    }

    /// Uniform draw, rejecting `excluded` by name.
    ///
    /// Rejection is capped; once the cap is hit the entry after the last draw
    /// is taken, which only matches `excluded` for a single-color palette.
    pub fn random_except<R: Rng + ?Sized>(&self, rng: &mut R, excluded: Option<&str>) -> &Color {
        let mut index = rng.gen_range(0..self.colors.len());
        for _ in 0..MAX_REJECTION_DRAWS {
            if Some(self.colors[index].name.as_str()) != excluded {
                return &self.colors[index];
            }
            index = rng.gen_range(0..self.colors.len());
        }
        &self.colors[(index + 1) % self.colors.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![
                Color::new("Red", [255, 0, 0]),
                Color::new("Yellow", [255, 255, 0]),
                Color::new("Green", [0, 255, 0]),
                Color::new("Blue", [0, 0, 255]),
                Color::new("Purple", [128, 0, 128]),
            ],
        }
    }
}

fn parse_entry(entry: &str) -> Result<Color, PaletteError> {
    let invalid = || PaletteError::InvalidEntry(entry.to_string());
    let (name, hex) = entry.split_once('=').ok_or_else(invalid)?;
    let name = name.trim();
    let hex = hex.trim().trim_start_matches('#');
    if name.is_empty() || hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => Ok(Color::new(name, [r, g, b])),
        _ => Err(invalid()),
    }
}
