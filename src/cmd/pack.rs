use anyhow::{Result, bail};

use crate::bits::{self, AlignmentPolicy, BitField};
use crate::board::Board;
use crate::cli::{PackOpts, PackWhat, PoseArgs};
use crate::fixed::{self, SQ2_9, UQ6_9};
use crate::reg::{self, RegCommand};

/// Offline encoder: prints what the drive commands would put on the wire,
/// without opening a port. Handy against a logic analyzer or a testbench.
pub fn run(opts: PackOpts) -> Result<()> {
    match opts.what {
        PackWhat::Reg { board, name, values } => pack_reg(board, &name, &values),
        PackWhat::Pov { pose } => pack_pov(&pose),
        PackWhat::Quant { format, value } => pack_quant(&format, value),
    }
}

fn pack_reg(board: Board, name: &str, values: &[u64]) -> Result<()> {
    let cmd = RegCommand::from_name(name)?;
    if values.len() != cmd.arity() {
        bail!(
            "{} takes {} value(s), got {}",
            cmd.name(),
            cmd.arity(),
            values.len()
        );
    }
    let fields: Vec<BitField> = match cmd {
        RegCommand::Other => reg::other_fields(values[0], values[1])?.to_vec(),
        RegCommand::Mapd => reg::mapd_fields(values[0], values[1], values[2], values[3])?.to_vec(),
        _ => reg::command_fields(cmd, values[0])?.to_vec(),
    };
    let policy = board.profile().reg_policy;
    let payload = bits::pad_to_bytes(&bits::concat(&fields), policy);
    println!("command: {} (opcode {})", cmd.name(), cmd.opcode());
    println!("fields : {}", bit_string(&fields));
    println!("payload: {}  ({})", hex_string(&payload), policy_label(policy));
    Ok(())
}

fn pack_pov(pose: &PoseArgs) -> Result<()> {
    let view = pose.view();
    let fields = view.to_fields()?;
    let payload = bits::pad_to_bytes(&bits::concat(&fields), AlignmentPolicy::LeftAlign);
    println!("fields : {}", bit_string(&fields));
    println!("payload: {}  (left-aligned)", hex_string(&payload));
    // Dequantized echo, to eyeball the quantization loss.
    println!(
        "readback: player=({:.6}, {:.6}) facing=({:.6}, {:.6}) vplane=({:.6}, {:.6})",
        fixed::dequantize(fields[0].value(), &UQ6_9),
        fixed::dequantize(fields[1].value(), &UQ6_9),
        fixed::dequantize(fields[2].value(), &SQ2_9),
        fixed::dequantize(fields[3].value(), &SQ2_9),
        fixed::dequantize(fields[4].value(), &SQ2_9),
        fixed::dequantize(fields[5].value(), &SQ2_9),
    );
    Ok(())
}

fn pack_quant(format: &str, value: f64) -> Result<()> {
    let fmt = fixed::by_name(format)?;
    let raw = fixed::quantize(value, fmt);
    println!(
        "{}: {} -> 0b{:0w$b} (0x{:0n$X}) -> {}",
        fmt.name,
        value,
        raw,
        raw,
        fixed::dequantize(raw, fmt),
        w = fmt.total_bits as usize,
        n = fmt.total_bits.div_ceil(4) as usize,
    );
    Ok(())
}

fn bit_string(fields: &[BitField]) -> String {
    fields
        .iter()
        .map(|f| format!("{:0w$b}", f.value(), w = f.width() as usize))
        .collect::<Vec<_>>()
        .join(" ")
}

fn hex_string(payload: &[u8]) -> String {
    payload
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn policy_label(policy: AlignmentPolicy) -> String {
    match policy {
        AlignmentPolicy::LeftAlign => "left-aligned".to_string(),
        AlignmentPolicy::RightAlignWithPreamble(n) => {
            format!("right-aligned, {n}-bit preamble")
        }
    }
}
