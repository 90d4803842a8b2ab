use thiserror::Error;

/// Programmer errors the core can detect. Stepping itself is a closed,
/// infallible contract (every opcode byte has a table entry, every address
/// is a valid `u16`) — these are only raised when something outside that
/// contract has gone wrong: a hand-assembled opcode table missing an entry,
/// or a host `Bus` implementation that violates the capability split the
/// core relies on.
#[derive(Debug, Error)]
pub enum CpuError {
    #[error("opcode table for {variant} is missing an entry for opcode ${opcode:02X}")]
    MissingOpcodeEntry { variant: &'static str, opcode: u8 },

    #[error("opcode table for {variant} has {count} entries, expected 256")]
    MalformedOpcodeTable { variant: &'static str, count: usize },

    #[error("conformance fixture could not be parsed: {0}")]
    FixtureDecode(#[from] serde_json::Error),

    #[error("conformance fixture I/O error: {0}")]
    FixtureIo(#[from] std::io::Error),
}
