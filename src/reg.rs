use crate::bits::BitField;
use crate::error::{Error, Result};

/// Width of the instruction opcode leading every register payload.
pub const OPCODE_BITS: u32 = 4;

/// Instructions understood by the chip's register file. Discriminants are
/// the wire opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegCommand {
    /// Sky color, RGB222.
    Sky = 0,
    /// Floor color, RGB222.
    Floor = 1,
    /// Floor "leak" row count.
    Leak = 2,
    /// Position of the OTHER map sprite, x then y.
    Other = 3,
    /// Vertical view shift in texture rows.
    VShift = 4,
    /// Infinite-height wall mode flag.
    VInf = 5,
    /// Map divider: x, y, then per-axis wall texture ids.
    Mapd = 6,
    /// SPI flash base address for texture slot 0.
    TexAdd0 = 7,
    /// SPI flash base address for texture slot 1.
    TexAdd1 = 8,
    /// SPI flash base address for texture slot 2.
    TexAdd2 = 9,
    /// SPI flash base address for texture slot 3.
    TexAdd3 = 10,
}

use RegCommand::*;

impl RegCommand {
    pub const ALL: [RegCommand; 11] = [
        Sky, Floor, Leak, Other, VShift, VInf, Mapd, TexAdd0, TexAdd1, TexAdd2, TexAdd3,
    ];

    pub const fn opcode(self) -> u64 {
        self as u64
    }

    /// Total operand width following the opcode, in bits.
    pub const fn operand_bits(self) -> u32 {
        match self {
            Sky | Floor | Leak | VShift => 6,
            VInf => 1,
            Other => 12,  // x:6 y:6
            Mapd => 16,   // x:6 y:6 xwall:2 ywall:2
            TexAdd0 | TexAdd1 | TexAdd2 | TexAdd3 => 24,
        }
    }

    /// How many values the command takes when given as separate arguments.
    pub const fn arity(self) -> usize {
        match self {
            Other => 2,
            Mapd => 4,
            _ => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Sky => "sky",
            Floor => "floor",
            Leak => "leak",
            Other => "other",
            VShift => "vshift",
            VInf => "vinf",
            Mapd => "mapd",
            TexAdd0 => "texadd0",
            TexAdd1 => "texadd1",
            TexAdd2 => "texadd2",
            TexAdd3 => "texadd3",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.name() == lower)
            .ok_or_else(|| Error::UnknownCommand(name.to_string()))
    }

    pub fn from_opcode(opcode: u64) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.opcode() == opcode)
            .ok_or_else(|| Error::UnknownCommand(format!("opcode {opcode}")))
    }

    /// Texture-address command for `slot`, of which the chip has four.
    pub const fn texadd(slot: u8) -> Option<Self> {
        match slot {
            0 => Some(TexAdd0),
            1 => Some(TexAdd1),
            2 => Some(TexAdd2),
            3 => Some(TexAdd3),
            _ => None,
        }
    }
}

/* ---------- field builders ---------- */

/// Opcode plus one packed operand. For `Other` and `Mapd` the operand is
/// the concatenated image of their sub-fields; the helpers below build it
/// from parts.
pub fn command_fields(cmd: RegCommand, operand: u64) -> Result<[BitField; 2]> {
    Ok([
        BitField::unsigned(cmd.opcode(), OPCODE_BITS)?,
        BitField::unsigned(operand, cmd.operand_bits())?,
    ])
}

pub fn other_fields(x: u64, y: u64) -> Result<[BitField; 3]> {
    Ok([
        BitField::unsigned(Other.opcode(), OPCODE_BITS)?,
        BitField::unsigned(x, 6)?,
        BitField::unsigned(y, 6)?,
    ])
}

pub fn mapd_fields(x: u64, y: u64, xwall: u64, ywall: u64) -> Result<[BitField; 5]> {
    Ok([
        BitField::unsigned(Mapd.opcode(), OPCODE_BITS)?,
        BitField::unsigned(x, 6)?,
        BitField::unsigned(y, 6)?,
        BitField::unsigned(xwall, 2)?,
        BitField::unsigned(ywall, 2)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{self, AlignmentPolicy};

    fn encode(fields: &[BitField], policy: AlignmentPolicy) -> Vec<u8> {
        bits::pad_to_bytes(&bits::concat(fields), policy)
    }

    #[test]
    fn opcode_table_is_dense_and_unique() {
        assert_eq!(RegCommand::ALL.len(), 11);
        for (i, cmd) in RegCommand::ALL.into_iter().enumerate() {
            assert_eq!(cmd.opcode(), i as u64);
            assert!(cmd.opcode() < 1 << OPCODE_BITS);
            assert_eq!(RegCommand::from_opcode(cmd.opcode()).unwrap(), cmd);
        }
    }

    #[test]
    fn names_round_trip() {
        for cmd in RegCommand::ALL {
            assert_eq!(RegCommand::from_name(cmd.name()).unwrap(), cmd);
        }
        assert_eq!(RegCommand::from_name("MAPD").unwrap(), Mapd);
        assert!(matches!(
            RegCommand::from_name("warp"),
            Err(Error::UnknownCommand(_))
        ));
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        for opcode in 11..16 {
            assert!(RegCommand::from_opcode(opcode).is_err());
        }
    }

    #[test]
    fn texadd_slots() {
        assert_eq!(RegCommand::texadd(0), Some(TexAdd0));
        assert_eq!(RegCommand::texadd(3), Some(TexAdd3));
        assert_eq!(RegCommand::texadd(4), None);
    }

    #[test]
    fn operand_widths_and_arity() {
        assert_eq!(Sky.operand_bits(), 6);
        assert_eq!(VInf.operand_bits(), 1);
        assert_eq!(Other.operand_bits(), 12);
        assert_eq!(Mapd.operand_bits(), 16);
        assert_eq!(TexAdd2.operand_bits(), 24);
        assert_eq!(Other.arity(), 2);
        assert_eq!(Mapd.arity(), 4);
        assert_eq!(Leak.arity(), 1);
    }

    #[test]
    fn vinf_byte_images() {
        let fields = command_fields(VInf, 1).unwrap();
        assert_eq!(encode(&fields, AlignmentPolicy::LeftAlign), [0x58]);
        assert_eq!(
            encode(&fields, AlignmentPolicy::RightAlignWithPreamble(4)),
            [0x51]
        );
    }

    #[test]
    fn mapd_byte_images() {
        let fields = mapd_fields(1, 0, 0, 0).unwrap();
        assert_eq!(
            encode(&fields, AlignmentPolicy::RightAlignWithPreamble(4)),
            [0x60, 0x04, 0x00]
        );
        assert_eq!(
            encode(&fields, AlignmentPolicy::LeftAlign),
            [0x60, 0x40, 0x00]
        );

        let fields = mapd_fields(11, 10, 1, 2).unwrap();
        assert_eq!(
            encode(&fields, AlignmentPolicy::RightAlignWithPreamble(4)),
            [0x60, 0x2C, 0xA6]
        );
        assert_eq!(
            encode(&fields, AlignmentPolicy::LeftAlign),
            [0x62, 0xCA, 0x60]
        );
    }

    #[test]
    fn split_helpers_match_packed_operand() {
        let split = other_fields(3, 9).unwrap();
        let packed = command_fields(Other, (3 << 6) | 9).unwrap();
        for policy in [
            AlignmentPolicy::LeftAlign,
            AlignmentPolicy::RightAlignWithPreamble(4),
        ] {
            assert_eq!(encode(&split, policy), encode(&packed, policy));
        }

        let split = mapd_fields(11, 10, 1, 2).unwrap();
        let packed = command_fields(Mapd, (11 << 10) | (10 << 4) | (1 << 2) | 2).unwrap();
        assert_eq!(
            encode(&split, AlignmentPolicy::LeftAlign),
            encode(&packed, AlignmentPolicy::LeftAlign)
        );
    }
}
