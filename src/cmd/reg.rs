use anyhow::{Result, bail};

use crate::cli::RegOpts;
use crate::cmd::bring_up_target;
use crate::reg::RegCommand;

pub fn run(opts: RegOpts) -> Result<()> {
    let cmd = RegCommand::from_name(&opts.name)?;
    if opts.values.len() != cmd.arity() {
        bail!(
            "{} takes {} value(s), got {}",
            cmd.name(),
            cmd.arity(),
            opts.values.len()
        );
    }

    let mut controller = bring_up_target(&opts.target)?;
    let v = &opts.values;
    match cmd {
        RegCommand::Sky => controller.set_sky(v[0])?,
        RegCommand::Floor => controller.set_floor(v[0])?,
        RegCommand::Leak => controller.set_leak(v[0])?,
        RegCommand::VShift => controller.set_vshift(v[0])?,
        RegCommand::VInf => controller.set_vinf(v[0] != 0)?,
        RegCommand::Other => controller.set_other(v[0], v[1])?,
        RegCommand::Mapd => controller.set_mapd(v[0], v[1], v[2], v[3])?,
        _ => controller.write_reg(cmd, v[0])?, // texadd0..3
    }
    eprintln!("[reg] {} written", cmd.name());
    Ok(())
}
