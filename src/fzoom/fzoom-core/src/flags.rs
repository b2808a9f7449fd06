use crate::constants::flags::*;
use core::fmt;

/// Decoded contents of the FLAGS register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusFlags {
    pub done: bool,     // operation finished
    pub error: bool,    // invalid address or invalid operation
    pub zoom_max: bool, // no further zoom in possible
    pub zoom_min: bool, // no further zoom out possible
}

/// Which end of the zoom range the hardware reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Max,
    Min,
}

impl StatusFlags {
    pub fn from_bits(bits: u32) -> Self {
        Self {
            done: bits & FLAG_DONE_MASK != 0,
            error: bits & FLAG_ERROR_MASK != 0,
            zoom_max: bits & FLAG_ZMAX_MASK != 0,
            zoom_min: bits & FLAG_ZMIN_MASK != 0,
        }
    }

    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.done {
            bits |= FLAG_DONE_MASK;
        }
        if self.error {
            bits |= FLAG_ERROR_MASK;
        }
        if self.zoom_max {
            bits |= FLAG_ZMAX_MASK;
        }
        if self.zoom_min {
            bits |= FLAG_ZMIN_MASK;
        }
        bits
    }

    /// Advisory zoom limit, if any. ZMAX wins if the device raises both.
    pub fn boundary(&self) -> Option<Boundary> {
        if self.zoom_max {
            Some(Boundary::Max)
        } else if self.zoom_min {
            Some(Boundary::Min)
        } else {
            None
        }
    }
}

impl fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.done, "DONE"),
            (self.error, "ERROR"),
            (self.zoom_max, "ZMAX"),
            (self.zoom_min, "ZMIN"),
        ];
        let mut first = true;
        for (_, name) in names.iter().filter(|(set, _)| *set) {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        if first {
            f.write_str("-")?;
        }
        Ok(())
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Max => f.write_str("maximum zoom"),
            Boundary::Min => f.write_str("minimum zoom"),
        }
    }
}
