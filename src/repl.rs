use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::link::Link;

/* ---------- wire constants ---------- */

/// CTRL-A: switch the friendly prompt into raw mode.
pub const ENTER_RAW: u8 = 0x01;
/// CTRL-B: drop the remote interpreter back to its friendly prompt.
pub const EXIT_RAW: u8 = 0x02;
/// CTRL-C: interrupt; sent twice to stop a running program.
pub const INTERRUPT: u8 = 0x03;
/// End-of-transmission. Terminates a sent statement, marks the start of its
/// output, and pairs with `RAW_PROMPT` as the end-of-result marker.
pub const EOT: u8 = 0x04;
/// Printed by raw mode when it is ready for the next statement.
pub const RAW_PROMPT: u8 = b'>';
/// Two-byte acknowledgement sent by raw mode after accepting a statement.
pub const ACK: &[u8] = b"OK";

/// Friendly prompt, canonical and CRLF flavors.
pub const FRIENDLY_PROMPTS: [&[u8]; 2] = [b">>> ", b"\r\n>>> "];
/// Raw-mode banner, LF and CRLF flavors.
pub const RAW_BANNERS: [&[u8]; 2] = [
    b"\nraw REPL; CTRL-B to exit\n>",
    b"\r\nraw REPL; CTRL-B to exit\r\n>",
];

/* ---------- session ---------- */

/// Aggregate marker-wait deadlines, each measured from the start of its
/// wait, not from the last byte received.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub handshake: Duration,
    pub ack: Duration,
    pub exec: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            handshake: Duration::from_secs(5),
            ack: Duration::from_secs(5),
            exec: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Friendly,
    Raw,
}

/// Session over a remote MicroPython-style interpreter.
///
/// Owns the link; every byte to or from the remote goes through here. The
/// mode starts as `Friendly`, and `enter_raw_mode` must succeed before
/// `execute` is usable. One statement at a time: each call runs its whole
/// ack/output/prompt exchange before returning.
pub struct ReplSession<L: Link> {
    pub(crate) link: L,
    mode: Mode,
    alive: bool,
    timeouts: Timeouts,
    debug: bool,
}

enum Wait {
    Matched { preceding: Vec<u8> },
    TimedOut { received: Vec<u8> },
}

impl<L: Link> ReplSession<L> {
    pub fn connect(link: L) -> Self {
        Self {
            link,
            mode: Mode::Friendly,
            alive: false,
            timeouts: Timeouts::default(),
            debug: false,
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn set_debug(&mut self, on: bool) {
        self.debug = on;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the last handshake/statement exchange completed in protocol.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Send CTRL-C twice to stop whatever the remote is currently running.
    pub fn interrupt(&mut self) -> Result<()> {
        self.send(&[INTERRUPT, INTERRUPT])
    }

    /// Drop the remote to its friendly prompt. Safe to call in any mode.
    pub fn exit_raw_mode(&mut self) -> Result<()> {
        self.send(&[EXIT_RAW])?;
        match self.await_marker(&FRIENDLY_PROMPTS, self.timeouts.handshake)? {
            Wait::Matched { .. } => {
                self.mode = Mode::Friendly;
                Ok(())
            }
            Wait::TimedOut { received } => {
                self.alive = false;
                Err(Error::ProtocolTimeout {
                    wanted: "friendly prompt",
                    received,
                })
            }
        }
    }

    /// Handshake into raw mode: reach the friendly prompt first for a known
    /// baseline, then request raw mode and wait for its banner.
    pub fn enter_raw_mode(&mut self) -> Result<()> {
        self.exit_raw_mode()?;
        self.send(&[ENTER_RAW])?;
        match self.await_marker(&RAW_BANNERS, self.timeouts.handshake)? {
            Wait::Matched { .. } => {
                self.mode = Mode::Raw;
                self.alive = true;
                Ok(())
            }
            Wait::TimedOut { received } => {
                self.alive = false;
                Err(Error::ProtocolTimeout {
                    wanted: "raw REPL banner",
                    received,
                })
            }
        }
    }

    /// Run one statement in raw mode and return its result: the bytes
    /// framed between the two end-of-transmission markers.
    ///
    /// Anything the remote emits before the first end-of-transmission is
    /// free-running chatter from the statement itself; this protocol
    /// revision assigns it no meaning and drops it. Anything between the
    /// final end-of-transmission and the prompt is the remote reporting a
    /// failure and comes back verbatim in `RemoteExecution`.
    pub fn execute(&mut self, statement: &[u8]) -> Result<Vec<u8>> {
        debug_assert!(self.mode == Mode::Raw, "execute requires raw mode");
        self.send(statement)?;
        self.send(&[EOT])?;

        match self.await_marker(&[ACK], self.timeouts.ack)? {
            Wait::Matched { .. } => {}
            Wait::TimedOut { received } => {
                self.alive = false;
                return Err(Error::ProtocolTimeout {
                    wanted: "statement ack",
                    received,
                });
            }
        }

        match self.await_marker(&[&[EOT]], self.timeouts.exec)? {
            Wait::Matched { .. } => {}
            Wait::TimedOut { received } => {
                self.alive = false;
                return Err(Error::ProtocolTimeout {
                    wanted: "start of result",
                    received,
                });
            }
        }

        let result = match self.await_marker(&[&[EOT]], self.timeouts.exec)? {
            Wait::Matched { preceding } => preceding,
            Wait::TimedOut { received } => {
                self.alive = false;
                return Err(Error::ProtocolTimeout {
                    wanted: "end of result",
                    received,
                });
            }
        };

        match self.await_marker(&[&[RAW_PROMPT]], self.timeouts.exec)? {
            Wait::Matched { preceding } if preceding.is_empty() => {
                self.alive = true;
                Ok(result)
            }
            Wait::Matched { preceding } => Err(Error::RemoteExecution { output: preceding }),
            Wait::TimedOut { received } if received.is_empty() => {
                self.alive = false;
                Err(Error::ProtocolTimeout {
                    wanted: "raw prompt",
                    received,
                })
            }
            Wait::TimedOut { received } => {
                self.alive = false;
                Err(Error::UnexpectedResponse { received })
            }
        }
    }

    /// `execute` plus lossy text decode and surrounding-whitespace trim.
    pub fn execute_text(&mut self, statement: &str) -> Result<String> {
        let out = self.execute(statement.as_bytes())?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }

    /// Quick end-to-end check that raw mode actually works.
    pub fn probe(&mut self) -> Result<String> {
        self.execute_text("print(\"It works!\")")
    }

    /* ---------- internals ---------- */

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        if self.debug {
            eprintln!("[repl] -> \"{}\"", bytes.escape_ascii());
        }
        self.link.write_all(bytes)?;
        Ok(())
    }

    /// Read until the buffer tail matches one of `markers` or `deadline`
    /// elapses. A timeout hands back everything received so far; the caller
    /// picks between hard failure and best-effort use of the partial data.
    fn await_marker(&mut self, markers: &[&[u8]], deadline: Duration) -> Result<Wait> {
        let start = Instant::now();
        let mut buf: Vec<u8> = Vec::new();
        loop {
            if start.elapsed() >= deadline {
                if self.debug {
                    eprintln!(
                        "[repl] timeout after {:?}, got \"{}\"",
                        deadline,
                        buf.escape_ascii()
                    );
                }
                return Ok(Wait::TimedOut { received: buf });
            }
            let Some(byte) = self.link.read_byte()? else {
                continue;
            };
            buf.push(byte);
            for marker in markers {
                if buf.ends_with(marker) {
                    let preceding = buf[..buf.len() - marker.len()].to_vec();
                    if self.debug {
                        eprintln!(
                            "[repl] <- \"{}\" after {} bytes",
                            marker.escape_ascii(),
                            preceding.len()
                        );
                    }
                    return Ok(Wait::Matched { preceding });
                }
            }
        }
    }
}
