use std::time::Duration;

use clap::ValueEnum;

use crate::bits::AlignmentPolicy;

/// One step of a board's bring-up script.
#[derive(Debug, Clone, Copy)]
pub enum SetupStep {
    /// Statement to run on the remote interpreter.
    Stmt(&'static str),
    /// Host-side pause, for settling times the remote cannot time itself
    /// (reset pulses and the like).
    Settle(Duration),
}

/// Everything that differs between chip revisions: how each sub-interface
/// pads its payloads, which remote objects front them, and the statements
/// that bring the board from power-on to a driveable state.
#[derive(Debug, Clone, Copy)]
pub struct BoardProfile {
    pub name: &'static str,
    pub pov_policy: AlignmentPolicy,
    pub reg_policy: AlignmentPolicy,
    pub pov_object: &'static str,
    pub reg_object: &'static str,
    pub setup: &'static [SetupStep],
}

/// Supported chip revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Board {
    /// Tiny Tapeout 4 silicon; demo-board SDK drives the pins.
    Tt04,
    /// Tiny Tapeout 7 silicon; register interface shifts operands through
    /// an internal buffer, so operand bits must arrive right-aligned.
    Tt07,
    /// Caravel CI 2311 silicon behind a UART bridge firmware.
    Ci2311,
}

impl Board {
    pub fn profile(self) -> &'static BoardProfile {
        match self {
            Board::Tt04 => &TT04,
            Board::Tt07 => &TT07,
            Board::Ci2311 => &CI2311,
        }
    }
}

/// TT04's register interface clocks payloads in whole and discards the
/// trailing pad bits, so plain left alignment is correct there.
static TT04: BoardProfile = BoardProfile {
    name: "tt04",
    pov_policy: AlignmentPolicy::LeftAlign,
    reg_policy: AlignmentPolicy::LeftAlign,
    pov_object: "pov",
    reg_object: "reg",
    setup: &[
        SetupStep::Stmt("tt.mode=RPMode.ASIC_RP_CONTROL"),
        SetupStep::Stmt("tt.input_byte=8"),
        SetupStep::Stmt("tt.shuttle.tt_um_algofoogle_raybox_zero.enable()"),
        SetupStep::Stmt("machine.freq(225000000)"),
        SetupStep::Stmt("tt.clock_project_PWM(25000000)"),
        SetupStep::Stmt("tt.reset_project(True)"),
        SetupStep::Settle(Duration::from_millis(100)),
        SetupStep::Stmt("tt.reset_project(False)"),
    ],
};

static TT07: BoardProfile = BoardProfile {
    name: "tt07",
    pov_policy: AlignmentPolicy::LeftAlign,
    reg_policy: AlignmentPolicy::RightAlignWithPreamble(4),
    pov_object: "pov",
    reg_object: "reg",
    setup: &[
        SetupStep::Stmt("tt.clock_project_stop()"),
        SetupStep::Stmt("tt.mode = RPMode.ASIC_RP_CONTROL"),
        SetupStep::Stmt("tt.uio_oe_pico.value = 0b00000000"),
        SetupStep::Stmt("tt.reset_project(True)"),
        SetupStep::Stmt("tt.shuttle.tt_um_algofoogle_raybox_zero.enable()"),
        // Generated textures and the debug overlay on, POV SPI deselected.
        SetupStep::Stmt("tt.ui_in = 0b10001100"),
        // Project selection can deassert reset, so assert it again and
        // clock the pulse through before releasing.
        SetupStep::Stmt("tt.reset_project(True)"),
        SetupStep::Stmt("for _ in range(10): tt.clock_project_once()"),
        SetupStep::Stmt("tt.reset_project(False)"),
        // Skewed duty cycle helps the texture SPI ROM meet timing.
        SetupStep::Stmt(
            "tt.clock_project_PWM(25_000_000, max_rp2040_freq=250_000_000, duty_u16=0xb000)",
        ),
        // Switch from generated to SPI textures.
        SetupStep::Stmt("tt.ui_in = 0b00001100"),
    ],
};

/// The CI2311 bridge firmware configures its own clock and pins; the host
/// only has to load the peripheral objects.
static CI2311: BoardProfile = BoardProfile {
    name: "ci2311",
    pov_policy: AlignmentPolicy::LeftAlign,
    reg_policy: AlignmentPolicy::RightAlignWithPreamble(4),
    pov_object: "pov",
    reg_object: "reg",
    setup: &[],
};
