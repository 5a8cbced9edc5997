use crate::bits::mask;
use crate::error::{Error, Result};

/// One of the registered fixed-point notations: Q-format name, total width,
/// fractional bits, signedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFormat {
    pub name: &'static str,
    pub total_bits: u32,
    pub fractional_bits: u32,
    pub signed: bool,
}

/// 24-bit signed Q12.12: texture address addends.
pub const Q12_12: FixedFormat = FixedFormat {
    name: "Q12.12",
    total_bits: 24,
    fractional_bits: 12,
    signed: true,
};

/// 15-bit unsigned UQ6.9: map-absolute player coordinates.
pub const UQ6_9: FixedFormat = FixedFormat {
    name: "UQ6.9",
    total_bits: 15,
    fractional_bits: 9,
    signed: false,
};

/// 11-bit signed SQ2.9: direction vector components.
pub const SQ2_9: FixedFormat = FixedFormat {
    name: "SQ2.9",
    total_bits: 11,
    fractional_bits: 9,
    signed: true,
};

const FORMATS: [&FixedFormat; 3] = [&Q12_12, &UQ6_9, &SQ2_9];

/// Look up a registered format by its Q-notation name.
pub fn by_name(name: &str) -> Result<&'static FixedFormat> {
    FORMATS
        .iter()
        .copied()
        .find(|f| f.name == name)
        .ok_or_else(|| Error::UnsupportedFormat(name.to_string()))
}

/// Scale by 2^fractional_bits, truncate toward zero, mask to the total
/// width. The hardware expects truncation, not rounding.
pub fn quantize(value: f64, format: &FixedFormat) -> u64 {
    let scaled = value * f64::from(1u32 << format.fractional_bits);
    (scaled as i64 as u64) & mask(format.total_bits)
}

/// Undo `quantize` for a masked raw value.
pub fn dequantize(raw: u64, format: &FixedFormat) -> f64 {
    let raw = raw & mask(format.total_bits);
    let value = if format.signed && raw >> (format.total_bits - 1) & 1 == 1 {
        raw as i64 - (1i64 << format.total_bits)
    } else {
        raw as i64
    };
    value as f64 / f64::from(1u32 << format.fractional_bits)
}
