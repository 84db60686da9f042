//! Pad layout and standing tests

use crate::game::ports::Position;

/// How far above a pad surface a body still counts as standing on it
pub const PROBE_DEPTH: f32 = 6.0;
/// How far a body may sink below the surface (feet clipping into the pad)
pub const BELOW_TOLERANCE: f32 = 1.0;

/// Geometry helpers for square floor pads
pub struct PadGeometry;

impl PadGeometry {
    /// Pad centers for a `rows` x `cols` grid centered on the origin at y = 0.
    ///
    /// Row-major order, so pad `r * cols + c` sits at row `r`, column `c`.
    pub fn grid(rows: u32, cols: u32, pad_size: f32, gap: f32) -> Vec<Position> {
        let pitch = pad_size + gap;
        let offset_x = (cols.saturating_sub(1)) as f32 * pitch / 2.0;
        let offset_z = (rows.saturating_sub(1)) as f32 * pitch / 2.0;

        let mut centers = Vec::with_capacity((rows * cols) as usize);
        for row in 0..rows {
            for col in 0..cols {
                centers.push(Position::new(
                    col as f32 * pitch - offset_x,
                    0.0,
                    row as f32 * pitch - offset_z,
                ));
            }
        }
        centers
    }

    /// Vertical probe: is `body` over the pad footprint and close to its surface
    pub fn is_standing_on(pad: &Position, pad_size: f32, body: &Position) -> bool {
        let half = pad_size / 2.0;
        let height = body.y - pad.y;
        (body.x - pad.x).abs() <= half
            && (body.z - pad.z).abs() <= half
            && height >= -BELOW_TOLERANCE
            && height <= PROBE_DEPTH
    }
}
