#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod constants;
pub mod coprocessor;
pub mod decoder;
pub mod error;
pub mod flags;
pub mod geometry;
pub mod handshake;
pub mod instructions;
pub mod navigation;
pub mod transfer;
pub mod utils;
pub mod window;

pub use coprocessor::{CommandRecord, Coprocessor, Status, ZoomOutcome};
pub use error::{CoprocError, CoprocResult};
pub use flags::{Boundary, StatusFlags};
pub use geometry::FrameGeometry;
pub use handshake::{Completion, Handshake, HandshakeState, PollLimit};
pub use instructions::{Instruction, MemoryBank, Offset, Opcode};
pub use navigation::{Navigation, PanDirection, ZoomDirection, ZoomInMode, ZoomOutMode};
pub use transfer::{ImageSource, Progress, TransferReport};
pub use window::{Register, RegisterWindow};
