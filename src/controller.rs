use std::thread;

use crate::board::{Board, BoardProfile, SetupStep};
use crate::error::{Error, Result};
use crate::link::Link;
use crate::pov::ViewVectors;
use crate::reg::{self, RegCommand};
use crate::repl::ReplSession;
use crate::spi::RemoteSpi;

/// Drives one raybox-zero chip through a REPL session: owns the session
/// and the POV/REG channels, and turns named operations into encoded
/// payload transactions.
pub struct Controller<L: Link> {
    session: ReplSession<L>,
    profile: &'static BoardProfile,
    pov: RemoteSpi,
    reg: RemoteSpi,
}

impl<L: Link> Controller<L> {
    pub fn new(session: ReplSession<L>, board: Board) -> Self {
        let profile = board.profile();
        Self {
            session,
            profile,
            pov: RemoteSpi::new(profile.pov_object, profile.pov_policy),
            reg: RemoteSpi::new(profile.reg_object, profile.reg_policy),
        }
    }

    pub fn session_mut(&mut self) -> &mut ReplSession<L> {
        &mut self.session
    }

    pub fn profile(&self) -> &'static BoardProfile {
        self.profile
    }

    /// Take the board from whatever state it was left in to a driveable
    /// one: stop any running program, handshake into raw mode, run the
    /// board's bring-up script, then load `peripheral` (the remote-side
    /// channel objects) if given.
    pub fn bring_up(&mut self, peripheral: Option<&str>) -> Result<()> {
        self.session.interrupt()?;
        self.session.enter_raw_mode()?;
        for step in self.profile.setup {
            match step {
                SetupStep::Stmt(stmt) => {
                    self.session.execute(stmt.as_bytes())?;
                }
                SetupStep::Settle(pause) => thread::sleep(*pause),
            }
        }
        if let Some(code) = peripheral {
            self.session.execute(code.as_bytes())?;
        }
        Ok(())
    }

    /// Re-run the handshake and forget any half-open transaction state.
    /// The one recovery path after a failed operation; anything short of
    /// this leaves the remote side's framing unknown.
    pub fn resync(&mut self) -> Result<()> {
        self.session.enter_raw_mode()?;
        self.pov.reset();
        self.reg.reset();
        Ok(())
    }

    /* ---------- POV channel ---------- */

    pub fn set_pov(&mut self, view: &ViewVectors) -> Result<()> {
        let fields = view.to_fields()?;
        self.pov.send_fields(&mut self.session, &fields)
    }

    /// Send pre-encoded POV payload bytes as-is.
    pub fn set_pov_raw(&mut self, payload: &[u8]) -> Result<()> {
        self.pov.send_raw(&mut self.session, payload)
    }

    /* ---------- REG channel ---------- */

    /// Opcode plus packed operand; the named setters below are sugar over
    /// this.
    pub fn write_reg(&mut self, cmd: RegCommand, operand: u64) -> Result<()> {
        let fields = reg::command_fields(cmd, operand)?;
        self.reg.send_fields(&mut self.session, &fields)
    }

    pub fn set_sky(&mut self, color: u64) -> Result<()> {
        self.write_reg(RegCommand::Sky, color)
    }

    pub fn set_floor(&mut self, color: u64) -> Result<()> {
        self.write_reg(RegCommand::Floor, color)
    }

    pub fn set_leak(&mut self, texels: u64) -> Result<()> {
        self.write_reg(RegCommand::Leak, texels)
    }

    pub fn set_vshift(&mut self, texels: u64) -> Result<()> {
        self.write_reg(RegCommand::VShift, texels)
    }

    pub fn set_vinf(&mut self, on: bool) -> Result<()> {
        self.write_reg(RegCommand::VInf, u64::from(on))
    }

    pub fn set_other(&mut self, x: u64, y: u64) -> Result<()> {
        let fields = reg::other_fields(x, y)?;
        self.reg.send_fields(&mut self.session, &fields)
    }

    pub fn set_mapd(&mut self, x: u64, y: u64, xwall: u64, ywall: u64) -> Result<()> {
        let fields = reg::mapd_fields(x, y, xwall, ywall)?;
        self.reg.send_fields(&mut self.session, &fields)
    }

    pub fn set_texadd(&mut self, slot: u8, addend: u64) -> Result<()> {
        let cmd = RegCommand::texadd(slot)
            .ok_or_else(|| Error::UnknownCommand(format!("texadd{slot}")))?;
        self.write_reg(cmd, addend)
    }
}
