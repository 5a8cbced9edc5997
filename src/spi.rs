use crate::bits::{self, AlignmentPolicy, BitField};
use crate::error::{Error, Result};
use crate::link::Link;
use crate::repl::ReplSession;

/// Host-side handle for one remote SPI channel (an `RBZSPI` instance living
/// in the remote interpreter). Select, deselect and data writes are remote
/// statements run through the session; the host never touches pins itself.
pub struct RemoteSpi {
    object: String,
    policy: AlignmentPolicy,
    open: bool,
}

impl RemoteSpi {
    pub fn new(object: impl Into<String>, policy: AlignmentPolicy) -> Self {
        Self {
            object: object.into(),
            policy,
            open: false,
        }
    }

    /// Clear a stale open flag left behind by an abandoned transaction.
    /// Only meaningful after the session has been re-handshaken.
    pub fn reset(&mut self) {
        self.open = false;
    }

    /// Open a transaction: deassert then assert select, so the peripheral
    /// sees a clean falling edge whatever state the line was left in. The
    /// bus has no reset line; this edge is the only synchronization point.
    pub fn begin<'a, L: Link>(
        &'a mut self,
        session: &'a mut ReplSession<L>,
    ) -> Result<Transaction<'a, L>> {
        if self.open {
            return Err(Error::TransactionReentrancy {
                channel: self.object.clone(),
            });
        }
        session.execute(format!("{}.disable()", self.object).as_bytes())?;
        session.execute(format!("{}.enable()", self.object).as_bytes())?;
        self.open = true;
        Ok(Transaction { spi: self, session })
    }

    /// Encode `fields` under this channel's alignment policy and send them
    /// as one select/write/deselect cycle.
    pub fn send_fields<L: Link>(
        &mut self,
        session: &mut ReplSession<L>,
        fields: &[BitField],
    ) -> Result<()> {
        let payload = bits::pad_to_bytes(&bits::concat(fields), self.policy);
        self.send_raw(session, &payload)
    }

    /// Send pre-built payload bytes as one select/write/deselect cycle.
    pub fn send_raw<L: Link>(
        &mut self,
        session: &mut ReplSession<L>,
        payload: &[u8],
    ) -> Result<()> {
        let mut txn = self.begin(session)?;
        txn.write(payload)?;
        txn.end()
    }
}

/// One select → write → deselect cycle. Holds the channel and the session
/// exclusively. Dropping it without `end` leaves the channel flagged open;
/// see `RemoteSpi::reset`.
pub struct Transaction<'a, L: Link> {
    spi: &'a mut RemoteSpi,
    session: &'a mut ReplSession<L>,
}

impl<L: Link> Transaction<'_, L> {
    /// Clock `payload` out through the remote serial primitive. An empty
    /// payload writes nothing at all.
    pub fn write(&mut self, payload: &[u8]) -> Result<()> {
        if payload.is_empty() {
            return Ok(());
        }
        let stmt = format!(
            "{}.spi.write({})",
            self.spi.object,
            py_bytes_literal(payload)
        );
        self.session.execute(stmt.as_bytes())?;
        Ok(())
    }

    /// Deassert select and release the channel.
    pub fn end(self) -> Result<()> {
        self.session
            .execute(format!("{}.disable()", self.spi.object).as_bytes())?;
        self.spi.open = false;
        Ok(())
    }
}

/// Render bytes as a Python `bytes` literal with unambiguous hex escapes.
pub fn py_bytes_literal(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(bytes.len() * 4 + 3);
    s.push_str("b'");
    for b in bytes {
        let _ = write!(s, "\\x{b:02x}");
    }
    s.push('\'');
    s
}
