use crate::bits::BitField;
use crate::error::Result;
use crate::fixed::{self, SQ2_9, UQ6_9};

/// Facing/viewplane components live in SQ2.9; values outside its range are
/// clamped rather than wrapped, since a wrapped direction vector points
/// somewhere wild instead of "as far that way as representable".
pub const SCALER_MIN: f64 = -2.0;
pub const SCALER_MAX: f64 = 2.0 - 1.0 / 512.0;

/// Default facing-vector magnitude.
pub const FACING_SCALE: f64 = 1.0;
/// Default viewplane magnitude; half the facing length gives the usual
/// 2:1 frustum.
pub const VPLANE_SCALE: f64 = 0.5;

/// Payload width before byte padding: two UQ6.9 fields plus four SQ2.9.
pub const PAYLOAD_BITS: u32 = 2 * 15 + 4 * 11;

/// One complete view state: player position plus the facing and viewplane
/// vectors, in the on-wire field order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewVectors {
    pub player_x: f64,
    pub player_y: f64,
    pub facing_x: f64,
    pub facing_y: f64,
    pub vplane_x: f64,
    pub vplane_y: f64,
}

impl ViewVectors {
    /// Derive facing and viewplane from a heading angle (radians) with the
    /// default magnitudes.
    pub fn from_heading(player_x: f64, player_y: f64, angle: f64) -> Self {
        Self::from_heading_scaled(player_x, player_y, angle, FACING_SCALE, VPLANE_SCALE)
    }

    /// As `from_heading`, with explicit facing/viewplane magnitudes. Angle
    /// zero faces +y; the viewplane is perpendicular, to the facing's left.
    pub fn from_heading_scaled(
        player_x: f64,
        player_y: f64,
        angle: f64,
        facing_mag: f64,
        vplane_mag: f64,
    ) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            player_x,
            player_y,
            facing_x: (sin * facing_mag).clamp(SCALER_MIN, SCALER_MAX),
            facing_y: (cos * facing_mag).clamp(SCALER_MIN, SCALER_MAX),
            vplane_x: (-cos * vplane_mag).clamp(SCALER_MIN, SCALER_MAX),
            vplane_y: (sin * vplane_mag).clamp(SCALER_MIN, SCALER_MAX),
        }
    }

    /// Quantize into the six on-wire fields: position as UQ6.9, vectors as
    /// SQ2.9, in declaration order.
    pub fn to_fields(&self) -> Result<[BitField; 6]> {
        Ok([
            BitField::unsigned(fixed::quantize(self.player_x, &UQ6_9), UQ6_9.total_bits)?,
            BitField::unsigned(fixed::quantize(self.player_y, &UQ6_9), UQ6_9.total_bits)?,
            BitField::unsigned(fixed::quantize(self.facing_x, &SQ2_9), SQ2_9.total_bits)?,
            BitField::unsigned(fixed::quantize(self.facing_y, &SQ2_9), SQ2_9.total_bits)?,
            BitField::unsigned(fixed::quantize(self.vplane_x, &SQ2_9), SQ2_9.total_bits)?,
            BitField::unsigned(fixed::quantize(self.vplane_y, &SQ2_9), SQ2_9.total_bits)?,
        ])
    }
}
