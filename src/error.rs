use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between a caller and the chip. Nothing here
/// is retried internally; callers decide between giving up and re-running
/// the raw-mode handshake.
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "timed out waiting for {wanted}; received {} bytes: \"{}\"",
        received.len(),
        received.escape_ascii()
    )]
    ProtocolTimeout {
        wanted: &'static str,
        received: Vec<u8>,
    },

    #[error("marker followed by unexpected bytes: \"{}\"", received.escape_ascii())]
    UnexpectedResponse { received: Vec<u8> },

    #[error("remote statement failed: {}", String::from_utf8_lossy(output).trim())]
    RemoteExecution { output: Vec<u8> },

    #[error("bit field width {width} out of range (1..=64)")]
    InvalidField { width: u32 },

    #[error("unsupported fixed-point format: {0}")]
    UnsupportedFormat(String),

    #[error("no such register command: {0}")]
    UnknownCommand(String),

    #[error("transaction already open on {channel}")]
    TransactionReentrancy { channel: String },

    #[error("serial I/O: {0}")]
    Io(#[from] std::io::Error),
}
