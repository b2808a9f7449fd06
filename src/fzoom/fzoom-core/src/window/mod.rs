#[cfg(test)]
pub(crate) mod scripted;

use crate::constants::registers;
use core::fmt;

/// The four PIO registers exposed through the bridge window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    Instruct, // write: opcode + operands
    Enable,   // write: latches the pending instruction
    DataOut,  // read: LOAD result
    Flags,    // read: status bits
}

impl Register {
    pub const ALL: [Register; 4] = [
        Register::Instruct,
        Register::Enable,
        Register::DataOut,
        Register::Flags,
    ];

    /// Byte offset from the window base
    pub const fn offset(self) -> usize {
        match self {
            Register::Instruct => registers::PIO_INSTRUCT_OFFSET,
            Register::Enable => registers::PIO_ENABLE_OFFSET,
            Register::DataOut => registers::PIO_DATAOUT_OFFSET,
            Register::Flags => registers::PIO_FLAGS_OFFSET,
        }
    }

    /// Whether every register fits in a window of `span` bytes
    pub fn fits(span: usize) -> bool {
        Register::ALL
            .iter()
            .all(|reg| reg.offset() + registers::REGISTER_WIDTH <= span)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Register::Instruct => "INSTRUCT",
            Register::Enable => "ENABLE",
            Register::DataOut => "DATAOUT",
            Register::Flags => "FLAGS",
        };
        write!(f, "{}@+0x{:02x}", name, self.offset())
    }
}

/// Access to the coprocessor's memory-mapped registers.
///
/// Reads take `&mut self` because reading FLAGS or DATAOUT may have side
/// effects on the device side. Implementations are expected to have been
/// bounds-checked against their span when they were created.
pub trait RegisterWindow {
    fn read(&mut self, reg: Register) -> u32;
    fn write(&mut self, reg: Register, value: u32);
}

impl<W: RegisterWindow + ?Sized> RegisterWindow for &mut W {
    fn read(&mut self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }
}
