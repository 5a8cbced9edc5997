use std::io::{self, Read, Write};

use serialport::SerialPort;

/// Byte stream the session talks through.
///
/// `read_byte` polls for one byte and returns `None` when the poll window
/// closes with nothing received, so callers can re-check their own deadlines
/// between reads. The poll window belongs to the concrete link (the serial
/// port is opened with a 100 ms read timeout).
pub trait Link {
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;
}

impl Link for Box<dyn SerialPort> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match Read::read(self, &mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        Write::write_all(self, buf)?;
        self.flush()
    }
}

#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;
    use std::io;
    use std::thread;
    use std::time::Duration;

    use super::Link;

    /// Scripted in-memory link: reads come from a canned byte queue, writes
    /// are captured for assertions. An exhausted queue reads as silence.
    pub struct MockLink {
        pub script: VecDeque<u8>,
        pub sent: Vec<u8>,
    }

    impl MockLink {
        pub fn new() -> Self {
            Self {
                script: VecDeque::new(),
                sent: Vec::new(),
            }
        }

        pub fn feed(&mut self, bytes: &[u8]) {
            self.script.extend(bytes.iter().copied());
        }

        /// Queue the canned reply for one successful raw-mode handshake.
        pub fn feed_handshake(&mut self) {
            self.feed(b">>> ");
            self.feed(b"\r\nraw REPL; CTRL-B to exit\r\n>");
        }

        /// Queue the canned reply for one raw-exec cycle.
        pub fn feed_exec_reply(&mut self, telemetry: &[u8], result: &[u8]) {
            self.feed(b"OK");
            self.feed(telemetry);
            self.feed(&[0x04]);
            self.feed(result);
            self.feed(&[0x04, b'>']);
        }

        pub fn sent_text(&self) -> String {
            String::from_utf8_lossy(&self.sent).into_owned()
        }
    }

    impl Link for MockLink {
        fn read_byte(&mut self) -> io::Result<Option<u8>> {
            match self.script.pop_front() {
                Some(b) => Ok(Some(b)),
                None => {
                    // Stand in for the serial poll window so deadline loops
                    // advance in wall-clock time instead of spinning.
                    thread::sleep(Duration::from_millis(1));
                    Ok(None)
                }
            }
        }

        fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
            self.sent.extend_from_slice(buf);
            Ok(())
        }
    }
}
