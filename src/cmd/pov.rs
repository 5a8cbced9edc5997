use anyhow::{Result, anyhow, bail};

use crate::cli::PovOpts;
use crate::cmd::bring_up_target;

pub fn run(opts: PovOpts) -> Result<()> {
    let mut controller = bring_up_target(&opts.target)?;
    match &opts.raw {
        Some(hex) => {
            let payload = parse_hex(hex)?;
            controller.set_pov_raw(&payload)?;
            eprintln!("[pov] {} raw bytes written", payload.len());
        }
        None => {
            let view = opts.pose.view();
            controller.set_pov(&view)?;
            eprintln!(
                "[pov] at ({:.3}, {:.3}) heading {:.3} rad",
                view.player_x, view.player_y, opts.pose.angle
            );
        }
    }
    Ok(())
}

/// Hex string to bytes; whitespace between pairs is allowed.
pub fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if !compact.is_ascii() {
        bail!("hex payload must be ASCII hex digits");
    }
    if compact.len() % 2 != 0 {
        bail!("hex payload must have an even number of digits");
    }
    (0..compact.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&compact[i..i + 2], 16)
                .map_err(|_| anyhow!("bad hex pair {:?}", &compact[i..i + 2]))
        })
        .collect()
}
