//! Issue / poll / complete handshake around a single in-flight instruction.
//!
//! ```text
//!   Idle --issue--> Issued --FLAGS.DONE--> Completed --release--> Idle
//! ```
//!
//! Issuing writes the instruction word to INSTRUCT, then latches it by writing
//! ENABLE. Completion is a level on FLAGS.DONE; ERROR is reported alongside it.
//! ENABLE is released only after the flags for the instruction have been read,
//! and nothing else may be issued until then.

use crate::constants::registers::{ENABLE_LATCH, ENABLE_RELEASE};
use crate::error::{CoprocError, CoprocResult};
use crate::flags::{Boundary, StatusFlags};
use crate::instructions::Instruction;
use crate::window::{Register, RegisterWindow};
use log::{debug, trace};

/// How long `wait` may spin on FLAGS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollLimit {
    /// Spin until the hardware reports DONE. The only mode for real hardware.
    Unbounded,
    /// Give up after this many polls that did not see DONE. Test harnesses only.
    Iterations(u32),
}

impl Default for PollLimit {
    fn default() -> Self {
        PollLimit::Unbounded
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Idle,
    Issued { instruction: Instruction, word: u32 },
}

/// Outcome of one instruction as reported by the hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub instruction: Instruction,
    pub word: u32,          // raw INSTRUCT value
    pub flags: StatusFlags, // FLAGS as observed when DONE was seen
    pub data: Option<u32>,  // DATAOUT, LOAD only
}

impl Completion {
    pub fn is_error(&self) -> bool {
        self.flags.error
    }

    pub fn boundary(&self) -> Option<Boundary> {
        self.flags.boundary()
    }
}

pub struct Handshake<W> {
    window: W,
    state: HandshakeState,
    poll_limit: PollLimit,
    issued: u64, // instructions latched since creation
}

impl<W: RegisterWindow> Handshake<W> {
    pub fn new(window: W) -> Self {
        Self {
            window,
            state: HandshakeState::Idle,
            poll_limit: PollLimit::Unbounded,
            issued: 0,
        }
    }

    pub fn with_poll_limit(mut self, poll_limit: PollLimit) -> Self {
        self.poll_limit = poll_limit;
        self
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == HandshakeState::Idle
    }

    pub fn issued_count(&self) -> u64 {
        self.issued
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    /// Write the instruction and latch it. Rejected while another is in flight.
    pub fn issue(&mut self, instruction: Instruction) -> CoprocResult {
        if let HandshakeState::Issued { instruction: pending, .. } = self.state {
            return Err(CoprocError::Busy {
                pending: pending.opcode,
                rejected: instruction.opcode,
            });
        }

        let word = instruction.encode();
        self.window.write(Register::Instruct, word);
        self.window.write(Register::Enable, ENABLE_LATCH);

        self.state = HandshakeState::Issued { instruction, word };
        self.issued += 1;
        debug!("Issued {} (0x{:08x})", instruction, word);
        Ok(())
    }

    /// Spin on FLAGS until DONE, collect DATAOUT for loads, then release ENABLE.
    ///
    /// When a bounded poll runs out the instruction stays in flight: a latched
    /// instruction cannot be cancelled, so the caller may only wait again.
    pub fn wait(&mut self) -> CoprocResult<Completion> {
        let (instruction, word) = match self.state {
            HandshakeState::Issued { instruction, word } => (instruction, word),
            HandshakeState::Idle => return Err(CoprocError::NotIssued),
        };

        let mut polls: u32 = 0;
        let flags = loop {
            let flags = StatusFlags::from_bits(self.window.read(Register::Flags));
            if flags.done {
                break flags;
            }

            polls = polls.saturating_add(1);
            if let PollLimit::Iterations(limit) = self.poll_limit {
                if polls >= limit {
                    trace!("{} still busy after {} polls", instruction.opcode, polls);
                    return Err(CoprocError::PollTimeout {
                        opcode: instruction.opcode,
                        polls,
                    });
                }
            }
            core::hint::spin_loop();
        };

        let data = if instruction.reads_data() && !flags.error {
            Some(self.window.read(Register::DataOut))
        } else {
            None
        };

        self.window.write(Register::Enable, ENABLE_RELEASE);
        self.state = HandshakeState::Idle;

        debug!(
            "Completed {} with flags {} after {} polls",
            instruction.opcode, flags, polls
        );
        Ok(Completion {
            instruction,
            word,
            flags,
            data,
        })
    }

    /// Full round trip: issue, wait, release
    pub fn execute(&mut self, instruction: Instruction) -> CoprocResult<Completion> {
        self.issue(instruction)?;
        self.wait()
    }
}
