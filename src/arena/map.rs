//! Map template and per-round map instances

use crate::game::palette::Color;
use crate::game::ports::{Pad, PadId, Position};

use super::geometry::PadGeometry;

/// Layout every round map is cloned from
#[derive(Debug, Clone, PartialEq)]
pub struct MapTemplate {
    pub rows: u32,
    pub cols: u32,
    pub pad_size: f32,
    pub pad_gap: f32,
    /// Display surfaces showing the target color
    pub screens: u32,
}

impl Default for MapTemplate {
    fn default() -> Self {
        Self {
            rows: 6,
            cols: 6,
            pad_size: 8.0,
            pad_gap: 2.0,
            screens: 4,
        }
    }
}

impl MapTemplate {
    pub fn instantiate(&self) -> RoundMapState {
        let pads = PadGeometry::grid(self.rows, self.cols, self.pad_size, self.pad_gap)
            .into_iter()
            .enumerate()
            .map(|(i, position)| PadState {
                id: PadId(i as u32),
                position,
                color: None,
            })
            .collect();

        RoundMapState {
            pad_size: self.pad_size,
            pads,
            screens: vec![ScreenDisplay::default(); self.screens as usize],
        }
    }
}

#[derive(Debug, Clone)]
pub struct PadState {
    pub id: PadId,
    pub position: Position,
    pub color: Option<Color>,
}

/// What one display surface currently shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenDisplay {
    pub label: String,
    pub rgb: [u8; 3],
}

/// A live round map
#[derive(Debug, Clone)]
pub struct RoundMapState {
    pub pad_size: f32,
    pub pads: Vec<PadState>,
    pub screens: Vec<ScreenDisplay>,
}

impl RoundMapState {
    pub fn pads(&self) -> Vec<Pad> {
        self.pads
            .iter()
            .map(|p| Pad {
                id: p.id,
                position: p.position,
            })
            .collect()
    }

    pub fn set_color(&mut self, pad: PadId, color: &Color) {
        if let Some(state) = self.pads.iter_mut().find(|p| p.id == pad) {
            state.color = Some(color.clone());
        }
    }

    /// Pad under `body`, if any
    pub fn pad_under(&self, body: &Position) -> Option<&PadState> {
        self.pads
            .iter()
            .find(|p| PadGeometry::is_standing_on(&p.position, self.pad_size, body))
    }

    pub fn show(&mut self, color: &Color) {
        for screen in &mut self.screens {
            screen.label = color.name.clone();
            screen.rgb = color.rgb;
        }
    }
}
