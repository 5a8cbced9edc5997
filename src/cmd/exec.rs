use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result, bail};

use crate::cli::ExecOpts;
use crate::cmd::open_session;

pub fn run(opts: ExecOpts) -> Result<()> {
    let stmt = match (&opts.stmt, &opts.file) {
        (Some(_), Some(_)) => bail!("give a statement or --file, not both"),
        (None, None) => bail!("nothing to run; give a statement or --file"),
        (Some(s), None) => s.clone(),
        (None, Some(p)) => {
            fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?
        }
    };

    let mut session = open_session(&opts.ser)?;
    session.interrupt()?;
    session.enter_raw_mode()?;
    let out = session.execute(stmt.as_bytes())?;
    // Result bytes verbatim; the remote's own newlines come with them.
    io::stdout().write_all(&out)?;
    Ok(())
}
