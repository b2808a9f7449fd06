use crate::constants::operands::*;
use crate::instructions::{Instruction, MemoryBank, Offset, Opcode, Operand};
use log::error;

/// Decode the operand fields of a zoom instruction
fn decode_viewport(word: u32) -> Result<Operand, &'static str> {
    let positioned = word & POSITIONED_BIT != 0;
    let hold_scale = word & HOLD_SCALE_BIT != 0;

    match (positioned, hold_scale) {
        (false, false) => Ok(Operand::None),
        (false, true) => {
            error!("Hold-scale bit without a position: 0x{:08x}", word);
            Err("Hold-scale requires a position")
        }
        (true, _) => Ok(Operand::Viewport {
            offset: Offset::new((word >> X_SHIFT) & X_MASK, (word >> Y_SHIFT) & Y_MASK),
            hold_scale,
        }),
    }
}

/// Decode a raw INSTRUCT word, the inverse of `Instruction::encode`
pub fn decoder(word: u32) -> Result<Instruction, &'static str> {
    let opcode = Opcode::from_word(word);
    let address = (word >> ADDRESS_SHIFT) & ADDRESS_MASK;

    let operand = match opcode {
        Opcode::Load => {
            let bank = if word & BANK_SELECT_BIT != 0 {
                MemoryBank::Pristine
            } else {
                MemoryBank::Live
            };
            Operand::Load { address, bank }
        }
        Opcode::Store => Operand::Store {
            address,
            value: ((word >> DATA_SHIFT) & DATA_MASK) as u8,
        },
        Opcode::NearestIn | Opcode::PixelRepeatIn => decode_viewport(word)?,

        // Pans are re-renders at the zoom-in scale only
        Opcode::BlockAvgOut | Opcode::NearestOut => match decode_viewport(word)? {
            Operand::Viewport {
                hold_scale: true, ..
            } => {
                error!("Pan requested with zoom-out opcode {}", opcode);
                return Err("Pan requires a zoom-in opcode");
            }
            operand => operand,
        },
        Opcode::RefreshScreen | Opcode::Reset => Operand::None,
    };

    Ok(Instruction { opcode, operand })
}

#[cfg(test)]
mod decoder_tests {
    use super::*;

    #[test]
    fn test_decode_inverts_encode() {
        let samples = [
            Instruction::refresh(),
            Instruction::reset(),
            Instruction::load(76799, MemoryBank::Pristine),
            Instruction::store(1234, 200),
            Instruction::zoom(Opcode::NearestIn, None),
            Instruction::zoom(Opcode::NearestOut, Some(Offset::new(12, 34))),
            Instruction::pan(Opcode::PixelRepeatIn, Offset::new(160, 120)),
        ];
        for instr in samples.iter() {
            assert_eq!(decoder(instr.encode()), Ok(*instr));
        }
    }

    #[test]
    fn test_hold_without_position_rejected() {
        assert!(decoder(HOLD_SCALE_BIT | Opcode::PixelRepeatIn.bits()).is_err());
    }

    #[test]
    fn test_pan_with_zoom_out_rejected() {
        let word = Instruction::pan(Opcode::BlockAvgOut, Offset::new(1, 1)).encode();
        assert!(decoder(word).is_err());
    }
}
