use crate::{OutgoingFrame, Result};

#[cfg(feature = "serial")]
use crate::LinkError;

/// A minimal blocking interface to the display link.
pub trait HmiPort {
    /// Open a link by device path (e.g., "/dev/serial0").
    fn open(path: &str, baud: u32) -> Result<Self>
    where
        Self: Sized;

    /// Read whatever bytes are available; `Ok(0)` on timeout.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write one frame, terminator included.
    fn write_frame(&mut self, frame: &OutgoingFrame) -> Result<()>;
}

/// Real serial link to the display.
#[cfg(feature = "serial")]
pub struct SerialHmiPort {
    port: Box<dyn serialport::SerialPort>,
}

#[cfg(feature = "serial")]
impl HmiPort for SerialHmiPort {
    fn open(path: &str, baud: u32) -> Result<Self> {
        let port = serialport::new(path, baud)
            .timeout(std::time::Duration::from_millis(100))
            .open()
            .map_err(|e| LinkError::Io(e.to_string()))?;
        Ok(Self { port })
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        use std::io::Read;
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(LinkError::Io(e.to_string())),
        }
    }

    fn write_frame(&mut self, frame: &OutgoingFrame) -> Result<()> {
        use std::io::Write;
        self.port
            .write_all(&frame.encode())
            .map_err(|e| LinkError::Io(e.to_string()))
    }
}

/// In-process port: scripted input, recorded output.
#[cfg(feature = "mock")]
#[derive(Debug, Default)]
pub struct MockPort {
    incoming: Vec<u8>,
    /// Encoded wire bytes of every frame written, in order.
    pub written: Vec<Vec<u8>>,
}

#[cfg(feature = "mock")]
impl MockPort {
    /// Queue bytes to be returned by later `read_chunk` calls.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.incoming.extend_from_slice(bytes);
    }
}

#[cfg(feature = "mock")]
impl HmiPort for MockPort {
    fn open(_path: &str, _baud: u32) -> Result<Self> {
        Ok(Self::default())
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.incoming.len().min(buf.len());
        buf[..n].copy_from_slice(&self.incoming[..n]);
        self.incoming.drain(..n);
        Ok(n)
    }

    fn write_frame(&mut self, frame: &OutgoingFrame) -> Result<()> {
        self.written.push(frame.encode());
        Ok(())
    }
}
