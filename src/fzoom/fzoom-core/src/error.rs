use crate::flags::StatusFlags;
use crate::instructions::Opcode;

/// Failures surfaced by the handshake and the coprocessor facade
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoprocError {
    #[error("{opcode} rejected address {address} (frame holds {limit} pixels)")]
    InvalidAddress {
        opcode: Opcode,
        address: u32,
        limit: u32,
    },

    #[error("hardware reported an error for {opcode} (instruction 0x{word:08x}, flags {flags})")]
    HardwareError {
        opcode: Opcode,
        word: u32,
        flags: StatusFlags,
    },

    #[error("{pending} is still in flight, refusing to issue {rejected}")]
    Busy { pending: Opcode, rejected: Opcode },

    #[error("no instruction in flight")]
    NotIssued,

    #[error("{opcode} did not complete within {polls} flag polls")]
    PollTimeout { opcode: Opcode, polls: u32 },

    #[error("unsupported frame geometry {width}x{height}")]
    UnsupportedGeometry { width: u32, height: u32 },
}

pub type CoprocResult<T = ()> = Result<T, CoprocError>;
