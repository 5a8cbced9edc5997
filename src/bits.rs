use crate::error::{Error, Result};

/// Widest single field the codec accepts. On-wire fields top out at 24 bits
/// (texture addends); 64 leaves headroom without changing the carrier type.
pub const MAX_WIDTH: u32 = 64;

/// A value squeezed to an exact bit width, most-significant bit first on the
/// wire. Construction masks the value, so a `BitField` can never bleed into
/// a neighboring field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    value: u64,
    width: u32,
}

impl BitField {
    /// Unsigned field; `value` is truncated to the low `width` bits.
    pub fn unsigned(value: u64, width: u32) -> Result<Self> {
        Self::new(value, width)
    }

    /// Signed field; negative values wrap two's-complement into `width` bits.
    pub fn signed(value: i64, width: u32) -> Result<Self> {
        Self::new(value as u64, width)
    }

    fn new(value: u64, width: u32) -> Result<Self> {
        if width == 0 || width > MAX_WIDTH {
            return Err(Error::InvalidField { width });
        }
        Ok(Self {
            value: value & mask(width),
            width,
        })
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    fn push_bits(&self, out: &mut Vec<bool>) {
        for i in (0..self.width).rev() {
            out.push(self.value >> i & 1 == 1);
        }
    }
}

pub(crate) fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Concatenate fields in on-wire order (callers put the opcode first).
pub fn concat(fields: &[BitField]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(fields.iter().map(|f| f.width as usize).sum());
    for field in fields {
        field.push_bits(&mut bits);
    }
    bits
}

/// How a packed bit sequence is squared up to whole bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentPolicy {
    /// Zero bits appended after the last field. For receivers that clock a
    /// fixed bit count and discard the tail.
    LeftAlign,
    /// The first `n` bits stay byte-leading and the zero padding goes
    /// between them and the rest, so the final operand bit lands on the last
    /// bit of the last byte. For receivers that consume an opcode up front
    /// and then shift operand bits through a fixed-width register.
    RightAlignWithPreamble(u32),
}

/// Pad `bits` to a whole number of bytes under `policy` and pack MSB-first.
/// An empty input packs to an empty byte sequence.
pub fn pad_to_bytes(bits: &[bool], policy: AlignmentPolicy) -> Vec<u8> {
    let padding = (8 - bits.len() % 8) % 8;
    let mut padded: Vec<bool> = Vec::with_capacity(bits.len() + padding);
    match policy {
        AlignmentPolicy::LeftAlign => {
            padded.extend_from_slice(bits);
            padded.extend(std::iter::repeat_n(false, padding));
        }
        AlignmentPolicy::RightAlignWithPreamble(n) => {
            let split = (n as usize).min(bits.len());
            padded.extend_from_slice(&bits[..split]);
            padded.extend(std::iter::repeat_n(false, padding));
            padded.extend_from_slice(&bits[split..]);
        }
    }
    padded
        .chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| acc << 1 | b as u8))
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::error::Error;

    fn fields(defs: &[(u64, u32)]) -> Vec<BitField> {
        defs.iter()
            .map(|&(v, w)| BitField::unsigned(v, w).unwrap())
            .collect()
    }

    #[test]
    fn width_zero_rejected() {
        assert!(matches!(
            BitField::unsigned(1, 0),
            Err(Error::InvalidField { width: 0 })
        ));
        assert!(matches!(
            BitField::signed(-1, 65),
            Err(Error::InvalidField { width: 65 })
        ));
    }

    #[test]
    fn unsigned_truncates_to_width() {
        let f = BitField::unsigned(0x1FF, 8).unwrap();
        assert_eq!(f.value(), 0xFF);
        assert_eq!(f.width(), 8);
    }

    #[test]
    fn signed_wraps_twos_complement() {
        assert_eq!(BitField::signed(-1, 4).unwrap().value(), 0b1111);
        assert_eq!(BitField::signed(-352, 11).unwrap().value(), 1696);
        assert_eq!(BitField::signed(5, 11).unwrap().value(), 5);
    }

    #[test]
    fn concat_preserves_order() {
        let bits = concat(&fields(&[(0b10, 2), (0b001, 3)]));
        assert_eq!(bits, vec![true, false, false, false, true]);
    }

    #[test]
    fn empty_field_list_packs_to_nothing() {
        let bits = concat(&[]);
        assert!(pad_to_bytes(&bits, AlignmentPolicy::LeftAlign).is_empty());
        assert!(pad_to_bytes(&bits, AlignmentPolicy::RightAlignWithPreamble(4)).is_empty());
    }

    #[test]
    fn left_align_pads_after_last_field() {
        // FLOOR: opcode 1, color 13.
        let bits = concat(&fields(&[(1, 4), (13, 6)]));
        assert_eq!(
            pad_to_bytes(&bits, AlignmentPolicy::LeftAlign),
            vec![0x13, 0x40]
        );
    }

    #[test]
    fn right_align_moves_padding_between_preamble_and_body() {
        // FLOOR again: operand ends on the final bit of the last byte.
        let bits = concat(&fields(&[(1, 4), (13, 6)]));
        assert_eq!(
            pad_to_bytes(&bits, AlignmentPolicy::RightAlignWithPreamble(4)),
            vec![0x10, 0x0D]
        );
    }

    #[test]
    fn leak_byte_images_under_both_policies() {
        let bits = concat(&fields(&[(2, 4), (1, 6)]));
        assert_eq!(
            pad_to_bytes(&bits, AlignmentPolicy::RightAlignWithPreamble(4)),
            vec![0x20, 0x01]
        );
        assert_eq!(
            pad_to_bytes(&bits, AlignmentPolicy::LeftAlign),
            vec![0x20, 0x40]
        );
    }

    #[test]
    fn all_zero_fields_pack_to_zero_bytes() {
        let bits = concat(&fields(&[(0, 4), (0, 6)]));
        assert_eq!(
            pad_to_bytes(&bits, AlignmentPolicy::LeftAlign),
            vec![0x00, 0x00]
        );
        assert_eq!(
            pad_to_bytes(&bits, AlignmentPolicy::RightAlignWithPreamble(4)),
            vec![0x00, 0x00]
        );
    }

    #[test]
    fn wide_operand_right_align() {
        // TEXADD0 with a 24-bit addend: 28 bits, 4 bits of padding.
        let bits = concat(&fields(&[(7, 4), (0x123456, 24)]));
        assert_eq!(
            pad_to_bytes(&bits, AlignmentPolicy::RightAlignWithPreamble(4)),
            vec![0x70, 0x12, 0x34, 0x56]
        );
        assert_eq!(
            pad_to_bytes(&bits, AlignmentPolicy::LeftAlign),
            vec![0x71, 0x23, 0x45, 0x60]
        );
    }

    #[test]
    fn byte_aligned_input_needs_no_padding() {
        // OTHER: 4 + 6 + 6 = 16 bits; both policies agree.
        let bits = concat(&fields(&[(3, 4), (3, 6), (9, 6)]));
        assert_eq!(
            pad_to_bytes(&bits, AlignmentPolicy::LeftAlign),
            vec![0x30, 0xC9]
        );
        assert_eq!(
            pad_to_bytes(&bits, AlignmentPolicy::RightAlignWithPreamble(4)),
            vec![0x30, 0xC9]
        );
    }

    #[test]
    fn preamble_longer_than_input_degrades_to_left_align() {
        let bits = concat(&fields(&[(0b1010, 4)]));
        assert_eq!(
            pad_to_bytes(&bits, AlignmentPolicy::RightAlignWithPreamble(16)),
            vec![0xA0]
        );
    }

    proptest! {
        #[test]
        fn encode_emits_declared_width(value in any::<i64>(), width in 1u32..=64) {
            let field = BitField::signed(value, width).unwrap();
            let bits = concat(&[field]);
            prop_assert_eq!(bits.len() as u32, width);

            let rebuilt = bits.iter().fold(0u64, |acc, &b| acc << 1 | b as u64);
            prop_assert_eq!(rebuilt, (value as u64) & mask(width));
        }

        #[test]
        fn padded_length_is_smallest_byte_multiple(
            widths in proptest::collection::vec(1u32..=24, 0..8),
            right in any::<bool>(),
        ) {
            let fields: Vec<BitField> = widths
                .iter()
                .map(|&w| BitField::unsigned(0x5A5A5A, w).unwrap())
                .collect();
            let bits = concat(&fields);
            let policy = if right {
                AlignmentPolicy::RightAlignWithPreamble(4)
            } else {
                AlignmentPolicy::LeftAlign
            };
            let bytes = pad_to_bytes(&bits, policy);
            prop_assert_eq!(bytes.len(), bits.len().div_ceil(8));
        }
    }
}
