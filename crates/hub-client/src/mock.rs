use crate::{HubError, PortReading, Result, Timestamp, PORT_COUNT};
use time::OffsetDateTime;

/// In-process mock hub replaying a fixed idle pattern so flows are testable.
pub struct MockHub {
    tick: u64,
}

/// Micrometre readings per port, matching a part sitting in the fixture.
const BASE_UM: [u32; PORT_COUNT as usize] = [0, 0, 0, 5, 10, 0, 5, 10];

impl MockHub {
    pub fn new() -> Self {
        Self { tick: 0 }
    }
}

impl Default for MockHub {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::HubClient for MockHub {
    fn read_port(&mut self, port: u8) -> Result<PortReading> {
        if port == 0 || port > PORT_COUNT {
            return Err(HubError::InvalidPort(port));
        }
        self.tick += 1;
        let value = BASE_UM[usize::from(port - 1)];
        Ok(PortReading {
            port,
            raw_hex: format!("0x{value:08X}"),
            timestamp: Some(Timestamp(OffsetDateTime::now_utc())),
        })
    }
}
