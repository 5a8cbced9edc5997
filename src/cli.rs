use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::board::Board;
use crate::pov::{self, ViewVectors};
use crate::repl::Timeouts;

#[derive(Parser, Debug, Clone)]
#[command(name = "rbzctl", about = "raybox-zero host control: REPL transport + payload codec")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Cmd {
    /// Handshake into raw mode and run a sanity statement
    Probe(ProbeOpts),
    /// Run one statement remotely and print its result
    Exec(ExecOpts),
    /// Write one register command
    Reg(RegOpts),
    /// Send a point-of-view update
    Pov(PovOpts),
    /// Orbit the player around a point at a fixed tick rate
    Demo(DemoOpts),
    /// Encode payloads offline and print them (no port needed)
    Pack(PackOpts),
}

#[derive(Args, Debug, Clone)]
pub struct SerialOpts {
    /// Serial device path
    #[arg(long, default_value = "/dev/ttyACM0")]
    pub dev: String,
    /// Baud rate; nominal on a USB-CDC link (1200 is reserved: it makes the
    /// RP2040 reset itself)
    #[arg(long, default_value_t = 9600)]
    pub baud: u32,
    /// Aggregate timeout per protocol marker, in seconds
    #[arg(long, default_value_t = 5.0)]
    pub timeout: f64,
    /// Print every byte exchanged with the remote
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

impl SerialOpts {
    pub fn timeouts(&self) -> Timeouts {
        let t = Duration::from_secs_f64(self.timeout);
        Timeouts {
            handshake: t,
            ack: t,
            exec: t,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TargetOpts {
    #[command(flatten)]
    pub ser: SerialOpts,
    /// Chip revision being driven
    #[arg(long, value_enum, default_value = "ci2311")]
    pub board: Board,
    /// Remote peripheral source to load during bring-up
    #[arg(long)]
    pub setup: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ProbeOpts {
    #[command(flatten)]
    pub ser: SerialOpts,
}

#[derive(Args, Debug, Clone)]
pub struct ExecOpts {
    #[command(flatten)]
    pub ser: SerialOpts,
    /// Statement to run (exactly one of this or --file)
    pub stmt: Option<String>,
    /// Read the statement block from a file instead
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RegOpts {
    #[command(flatten)]
    pub target: TargetOpts,
    /// Command name: sky, floor, leak, other, vshift, vinf, mapd, texadd0..texadd3
    pub name: String,
    /// Operand values; count must match the command (other: x y; mapd: x y xwall ywall)
    pub values: Vec<u64>,
}

/// Player pose, shared by `pov` and `pack pov`.
#[derive(Args, Debug, Clone)]
pub struct PoseArgs {
    /// Player X position (UQ6.9, 0..64)
    #[arg(long, default_value_t = 11.5)]
    pub x: f64,
    /// Player Y position (UQ6.9, 0..64)
    #[arg(long, default_value_t = 10.5)]
    pub y: f64,
    /// Heading in radians; 0 faces +y
    #[arg(long, default_value_t = 0.0)]
    pub angle: f64,
    /// Facing vector magnitude
    #[arg(long, default_value_t = pov::FACING_SCALE)]
    pub facing_scale: f64,
    /// Viewplane magnitude; half the facing gives the usual frustum
    #[arg(long, default_value_t = pov::VPLANE_SCALE)]
    pub vplane_scale: f64,
}

impl PoseArgs {
    pub fn view(&self) -> ViewVectors {
        ViewVectors::from_heading_scaled(
            self.x,
            self.y,
            self.angle,
            self.facing_scale,
            self.vplane_scale,
        )
    }
}

#[derive(Args, Debug, Clone)]
pub struct PovOpts {
    #[command(flatten)]
    pub target: TargetOpts,
    #[command(flatten)]
    pub pose: PoseArgs,
    /// Send these payload bytes verbatim instead of the pose (hex string)
    #[arg(long)]
    pub raw: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DemoOpts {
    #[command(flatten)]
    pub target: TargetOpts,
    /// Update interval in milliseconds
    #[arg(long, default_value_t = 8)]
    pub tick_ms: u64,
    /// How long to run, in seconds
    #[arg(long, default_value_t = 10.0)]
    pub seconds: f64,
    /// Orbit center X
    #[arg(long, default_value_t = 11.5)]
    pub center_x: f64,
    /// Orbit center Y
    #[arg(long, default_value_t = 10.5)]
    pub center_y: f64,
    /// Orbit radius
    #[arg(long, default_value_t = 2.0)]
    pub radius: f64,
    /// Angular speed, radians per second
    #[arg(long, default_value_t = 0.5)]
    pub turn_rate: f64,
    /// Trigger the environment flash every N ticks (0 = never)
    #[arg(long, default_value_t = 250)]
    pub flash_every: u64,
    /// Stats print interval in seconds
    #[arg(long, default_value_t = 2.0)]
    pub stats: f64,
}

#[derive(Args, Debug, Clone)]
pub struct PackOpts {
    #[command(subcommand)]
    pub what: PackWhat,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PackWhat {
    /// Encode a register command payload
    Reg {
        /// Chip revision whose alignment to use
        #[arg(long, value_enum, default_value = "ci2311")]
        board: Board,
        /// Command name: sky, floor, leak, other, vshift, vinf, mapd, texadd0..texadd3
        name: String,
        /// Operand values; count must match the command
        values: Vec<u64>,
    },
    /// Encode a point-of-view payload
    Pov {
        #[command(flatten)]
        pose: PoseArgs,
    },
    /// Quantize one value into a fixed-point format
    Quant {
        /// Format name: Q12.12, UQ6.9 or SQ2.9
        format: String,
        /// Decimal value to quantize
        value: f64,
    },
}
