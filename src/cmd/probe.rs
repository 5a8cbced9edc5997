use anyhow::Result;

use crate::cli::ProbeOpts;
use crate::cmd::open_session;

pub fn run(opts: ProbeOpts) -> Result<()> {
    let mut session = open_session(&opts.ser)?;
    eprintln!("[probe] interrupting whatever runs on {}", opts.ser.dev);
    session.interrupt()?;
    session.enter_raw_mode()?;
    eprintln!("[probe] raw mode up, running test statement");
    let reply = session.probe()?;
    println!("{reply}");
    // Hand the friendly prompt back for a human on the other end.
    session.exit_raw_mode()?;
    Ok(())
}
