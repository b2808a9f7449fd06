use crate::constants::opcodes::*;
use crate::constants::operands::*;
use core::fmt;

/// Instruction opcodes understood by the coprocessor (bits [2:0] of INSTRUCT)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    RefreshScreen, // Redraw from the live buffer
    Load,          // Read one pixel into DATAOUT
    Store,         // Write one pixel
    NearestIn,     // Zoom in, nearest neighbour
    PixelRepeatIn, // Zoom in, pixel repetition
    BlockAvgOut,   // Zoom out, block average
    NearestOut,    // Zoom out, nearest neighbour
    Reset,         // Restore live buffer from the pristine copy
}

impl Opcode {
    pub const fn bits(self) -> u32 {
        match self {
            Opcode::RefreshScreen => OP_REFRESH_SCREEN,
            Opcode::Load => OP_LOAD,
            Opcode::Store => OP_STORE,
            Opcode::NearestIn => OP_NHI_ALG,
            Opcode::PixelRepeatIn => OP_PR_ALG,
            Opcode::BlockAvgOut => OP_BA_ALG,
            Opcode::NearestOut => OP_NH_ALG,
            Opcode::Reset => OP_RESET,
        }
    }

    /// Extract the opcode from an instruction word; every 3-bit value is valid
    pub fn from_word(word: u32) -> Opcode {
        match word & OPCODE_MASK {
            OP_REFRESH_SCREEN => Opcode::RefreshScreen,
            OP_LOAD => Opcode::Load,
            OP_STORE => Opcode::Store,
            OP_NHI_ALG => Opcode::NearestIn,
            OP_PR_ALG => Opcode::PixelRepeatIn,
            OP_BA_ALG => Opcode::BlockAvgOut,
            OP_NH_ALG => Opcode::NearestOut,
            _ => Opcode::Reset,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::RefreshScreen => "REFRESH",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::NearestIn => "NEAREST_IN",
            Opcode::PixelRepeatIn => "PIXEL_REPEAT_IN",
            Opcode::BlockAvgOut => "BLOCK_AVG_OUT",
            Opcode::NearestOut => "NEAREST_OUT",
            Opcode::Reset => "RESET",
        }
    }

    pub fn is_zoom_in(self) -> bool {
        matches!(self, Opcode::NearestIn | Opcode::PixelRepeatIn)
    }

    pub fn is_zoom_out(self) -> bool {
        matches!(self, Opcode::BlockAvgOut | Opcode::NearestOut)
    }

    pub fn is_zoom(self) -> bool {
        self.is_zoom_in() || self.is_zoom_out()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Frame buffer a LOAD reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryBank {
    Live,     // what is currently displayed
    Pristine, // unmodified copy of the loaded image
}

/// Viewport position carried by positioned zoom instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub x: u32,
    pub y: u32,
}

impl Offset {
    pub const ORIGIN: Offset = Offset { x: 0, y: 0 };

    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Operand fields packed above the opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    Load { address: u32, bank: MemoryBank },
    Store { address: u32, value: u8 },
    Viewport { offset: Offset, hold_scale: bool },
}

/// One instruction ready to be written to INSTRUCT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: Operand,
}

impl Instruction {
    pub fn refresh() -> Self {
        Self {
            opcode: Opcode::RefreshScreen,
            operand: Operand::None,
        }
    }

    pub fn reset() -> Self {
        Self {
            opcode: Opcode::Reset,
            operand: Operand::None,
        }
    }

    pub fn load(address: u32, bank: MemoryBank) -> Self {
        Self {
            opcode: Opcode::Load,
            operand: Operand::Load { address, bank },
        }
    }

    pub fn store(address: u32, value: u8) -> Self {
        Self {
            opcode: Opcode::Store,
            operand: Operand::Store { address, value },
        }
    }

    /// Zoom step, optionally centred on `offset`
    pub fn zoom(opcode: Opcode, offset: Option<Offset>) -> Self {
        let operand = match offset {
            Some(offset) => Operand::Viewport {
                offset,
                hold_scale: false,
            },
            None => Operand::None,
        };
        Self { opcode, operand }
    }

    /// Re-render at `offset` without changing the scale
    pub fn pan(opcode: Opcode, offset: Offset) -> Self {
        Self {
            opcode,
            operand: Operand::Viewport {
                offset,
                hold_scale: true,
            },
        }
    }

    /// LOAD results are read back from DATAOUT
    pub fn reads_data(&self) -> bool {
        self.opcode == Opcode::Load
    }

    /// Pack into the INSTRUCT word. Operands are masked to their field width.
    pub fn encode(&self) -> u32 {
        let operand_bits = match self.operand {
            Operand::None => 0,
            Operand::Load { address, bank } => {
                let bank_bit = match bank {
                    MemoryBank::Live => 0,
                    MemoryBank::Pristine => BANK_SELECT_BIT,
                };
                ((address & ADDRESS_MASK) << ADDRESS_SHIFT) | bank_bit
            }
            Operand::Store { address, value } => {
                ((address & ADDRESS_MASK) << ADDRESS_SHIFT)
                    | ((value as u32 & DATA_MASK) << DATA_SHIFT)
            }
            Operand::Viewport { offset, hold_scale } => {
                let mut bits = ((offset.x & X_MASK) << X_SHIFT)
                    | ((offset.y & Y_MASK) << Y_SHIFT)
                    | POSITIONED_BIT;
                if hold_scale {
                    bits |= HOLD_SCALE_BIT;
                }
                bits
            }
        };
        operand_bits | self.opcode.bits()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand {
            Operand::None => write!(f, "{}", self.opcode),
            Operand::Load { address, bank } => {
                write!(f, "{} {} ({:?})", self.opcode, address, bank)
            }
            Operand::Store { address, value } => {
                write!(f, "{} {} <- {}", self.opcode, address, value)
            }
            Operand::Viewport { offset, hold_scale } => {
                let kind = if hold_scale { "pan" } else { "at" };
                write!(f, "{} {} {}", self.opcode, kind, offset)
            }
        }
    }
}

#[cfg(test)]
mod encoding_tests {
    use super::*;

    #[test]
    fn test_opcode_occupies_low_bits() {
        for word in 0..8 {
            assert_eq!(Opcode::from_word(word).bits(), word);
            // Operand bits never leak into the opcode
            assert_eq!(Opcode::from_word(word | 0xFFFF_FFF8).bits(), word);
        }
    }

    #[test]
    fn test_store_layout() {
        let word = Instruction::store(76799, 0xAB).encode();
        assert_eq!(word & OPCODE_MASK, OP_STORE);
        assert_eq!((word >> ADDRESS_SHIFT) & ADDRESS_MASK, 76799);
        assert_eq!((word >> DATA_SHIFT) & DATA_MASK, 0xAB);
    }

    #[test]
    fn test_load_bank_select() {
        let live = Instruction::load(5, MemoryBank::Live).encode();
        let pristine = Instruction::load(5, MemoryBank::Pristine).encode();
        assert_eq!(live & BANK_SELECT_BIT, 0);
        assert_ne!(pristine & BANK_SELECT_BIT, 0);
        assert_eq!(live | BANK_SELECT_BIT, pristine);
    }

    #[test]
    fn test_unpositioned_zoom_is_bare_opcode() {
        assert_eq!(Instruction::zoom(Opcode::BlockAvgOut, None).encode(), OP_BA_ALG);
    }

    #[test]
    fn test_pan_sets_hold_scale() {
        let zoom = Instruction::zoom(Opcode::PixelRepeatIn, Some(Offset::new(319, 239))).encode();
        let pan = Instruction::pan(Opcode::PixelRepeatIn, Offset::new(319, 239)).encode();
        assert_eq!((zoom >> X_SHIFT) & X_MASK, 319);
        assert_eq!((zoom >> Y_SHIFT) & Y_MASK, 239);
        assert_ne!(zoom & POSITIONED_BIT, 0);
        assert_eq!(zoom & HOLD_SCALE_BIT, 0);
        assert_eq!(pan, zoom | HOLD_SCALE_BIT);
    }

    #[test]
    fn test_only_load_reads_data() {
        assert!(Instruction::load(0, MemoryBank::Live).reads_data());
        assert!(!Instruction::store(0, 0).reads_data());
        assert!(!Instruction::reset().reads_data());
    }
}
