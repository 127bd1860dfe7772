use time::OffsetDateTime;

/// Ports are numbered 1..=8 on the hub faceplate.
pub const PORT_COUNT: u8 = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timestamp(pub OffsetDateTime);

/// One successful port read: the raw register as reported, still hex text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PortReading {
    pub port: u8,
    pub raw_hex: String,
    pub timestamp: Option<Timestamp>,
}
