pub mod demo;
pub mod exec;
pub mod pack;
pub mod pov;
pub mod probe;
pub mod reg;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serialport::SerialPort;

use crate::cli::{SerialOpts, TargetOpts};
use crate::controller::Controller;
use crate::port;
use crate::repl::ReplSession;

/// Open the port and wrap it in a session carrying the CLI's timeouts.
pub fn open_session(opts: &SerialOpts) -> Result<ReplSession<Box<dyn SerialPort>>> {
    let port = port::open_port(opts)?;
    let mut session = ReplSession::connect(port).with_timeouts(opts.timeouts());
    session.set_debug(opts.debug);
    Ok(session)
}

/// Read the remote peripheral source named by --setup, if any.
pub fn load_setup(path: &Option<PathBuf>) -> Result<Option<String>> {
    match path {
        None => Ok(None),
        Some(p) => {
            let code = fs::read_to_string(p)
                .with_context(|| format!("reading setup file {}", p.display()))?;
            Ok(Some(code))
        }
    }
}

/// Session plus bring-up for the commands that drive a board.
pub fn bring_up_target(target: &TargetOpts) -> Result<Controller<Box<dyn SerialPort>>> {
    let session = open_session(&target.ser)?;
    let mut controller = Controller::new(session, target.board);
    let peripheral = load_setup(&target.setup)?;
    controller.bring_up(peripheral.as_deref())?;
    Ok(controller)
}
