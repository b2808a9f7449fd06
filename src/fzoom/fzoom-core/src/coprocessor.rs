use crate::constants::HISTORY_DEPTH;
use crate::error::{CoprocError, CoprocResult};
use crate::flags::{Boundary, StatusFlags};
use crate::geometry::FrameGeometry;
use crate::handshake::{Completion, Handshake, HandshakeState, PollLimit};
use crate::instructions::{Instruction, MemoryBank, Offset, Opcode, Operand};
use crate::navigation::{Navigation, PanDirection, ZoomDirection, ZoomInMode, ZoomOutMode};
use crate::window::RegisterWindow;
use heapless::HistoryBuffer;
use log::{debug, info, warn};

/// Result of a zoom or pan the hardware accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomOutcome {
    Applied,
    BoundaryReached(Boundary), // completed, but the scale is at a limit
}

/// One completed instruction, kept for status queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRecord {
    pub opcode: Opcode,
    pub word: u32,
    pub flags: StatusFlags,
}

/// Snapshot returned by `Coprocessor::status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub navigation: Navigation,
    pub last: Option<CommandRecord>,
    pub issued: u64,
    pub pending: Option<Opcode>, // still in flight after a bounded poll ran out
}

/// Typed operations on the image coprocessor.
///
/// Every operation is a complete handshake; the facade never leaves an
/// instruction in flight when it returns successfully, so callers cannot
/// interleave instructions.
pub struct Coprocessor<W> {
    handshake: Handshake<W>,
    navigation: Navigation,
    history: HistoryBuffer<CommandRecord, HISTORY_DEPTH>,
}

impl<W: RegisterWindow> Coprocessor<W> {
    pub fn new(window: W) -> Self {
        Self::with_navigation(window, Navigation::default())
    }

    pub fn with_navigation(window: W, navigation: Navigation) -> Self {
        Self {
            handshake: Handshake::new(window),
            navigation,
            history: HistoryBuffer::new(),
        }
    }

    /// Bound the FLAGS spin. Meant for test doubles and diagnostics.
    pub fn with_poll_limit(mut self, poll_limit: PollLimit) -> Self {
        self.handshake = self.handshake.with_poll_limit(poll_limit);
        self
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.navigation.geometry()
    }

    pub fn window(&self) -> &W {
        self.handshake.window()
    }

    /// Completed commands, oldest first
    pub fn history(&self) -> impl Iterator<Item = &CommandRecord> {
        self.history.oldest_ordered()
    }

    pub fn status(&self) -> Status {
        Status {
            navigation: self.navigation,
            last: self.history.recent().copied(),
            issued: self.handshake.issued_count(),
            pending: match self.handshake.state() {
                HandshakeState::Issued { instruction, .. } => Some(instruction.opcode),
                HandshakeState::Idle => None,
            },
        }
    }

    pub fn toggle_zoom_in_mode(&mut self) -> ZoomInMode {
        let mode = self.navigation.toggle_zoom_in_mode();
        info!("Zoom-in algorithm: {}", mode);
        mode
    }

    pub fn toggle_zoom_out_mode(&mut self) -> ZoomOutMode {
        let mode = self.navigation.toggle_zoom_out_mode();
        info!("Zoom-out algorithm: {}", mode);
        mode
    }

    /// Round trip through the handshake, translating ERROR into a typed failure.
    /// An instruction left in flight by an earlier timeout is finished first.
    fn run(&mut self, instruction: Instruction) -> CoprocResult<Completion> {
        match self.resume() {
            Ok(_) => {}
            Err(err @ CoprocError::PollTimeout { .. }) => return Err(err),
            Err(err) => warn!("Earlier instruction failed late: {}", err),
        }

        let completion = self.handshake.execute(instruction)?;
        self.complete(completion)
    }

    /// Wait again for an instruction whose bounded poll ran out.
    ///
    /// Returns `None` when nothing is in flight. On completion the instruction
    /// is recorded and its navigation change applied, as if the original call
    /// had succeeded.
    pub fn resume(&mut self) -> CoprocResult<Option<Completion>> {
        match self.handshake.state() {
            HandshakeState::Idle => return Ok(None),
            HandshakeState::Issued { instruction, .. } => {
                debug!("Waiting again for {}", instruction)
            }
        }
        let completion = self.handshake.wait()?;
        self.complete(completion).map(Some)
    }

    /// Record a finished instruction and commit its effect on navigation
    fn complete(&mut self, completion: Completion) -> CoprocResult<Completion> {
        let instruction = completion.instruction;
        self.history.write(CommandRecord {
            opcode: instruction.opcode,
            word: completion.word,
            flags: completion.flags,
        });

        if !completion.is_error() {
            match instruction.operand {
                Operand::Viewport { offset, .. } => self.navigation.commit_pan(offset),
                Operand::None if instruction.opcode == Opcode::Reset => {
                    self.navigation.reset_pan()
                }
                _ => {}
            }
            return Ok(completion);
        }

        warn!("Hardware rejected {} (flags {})", instruction, completion.flags);
        let err = match instruction.operand {
            Operand::Load { address, .. } | Operand::Store { address, .. } => {
                CoprocError::InvalidAddress {
                    opcode: instruction.opcode,
                    address,
                    limit: self.geometry().pixels(),
                }
            }
            Operand::None | Operand::Viewport { .. } => CoprocError::HardwareError {
                opcode: instruction.opcode,
                word: completion.word,
                flags: completion.flags,
            },
        };
        Err(err)
    }

    /// Addresses outside the frame never reach the hardware
    fn check_address(&self, opcode: Opcode, address: u32) -> CoprocResult {
        let geometry = self.geometry();
        if geometry.contains(address) {
            Ok(())
        } else {
            Err(CoprocError::InvalidAddress {
                opcode,
                address,
                limit: geometry.pixels(),
            })
        }
    }

    pub fn write_pixel(&mut self, address: u32, value: u8) -> CoprocResult {
        self.check_address(Opcode::Store, address)?;
        self.run(Instruction::store(address, value))?;
        Ok(())
    }

    pub fn read_pixel(&mut self, address: u32, bank: MemoryBank) -> CoprocResult<u8> {
        self.check_address(Opcode::Load, address)?;
        let completion = self.run(Instruction::load(address, bank))?;
        match completion.data {
            Some(data) => Ok((data & 0xFF) as u8),
            None => Err(CoprocError::HardwareError {
                opcode: Opcode::Load,
                word: completion.word,
                flags: completion.flags,
            }),
        }
    }

    /// Zoom one step using the current algorithm for `direction`, optionally
    /// centred on `offset` (capped to the frame)
    pub fn apply_zoom(
        &mut self,
        direction: ZoomDirection,
        offset: Option<Offset>,
    ) -> CoprocResult<ZoomOutcome> {
        let opcode = self.navigation.opcode_for(direction);
        let offset = offset.map(|offset| self.geometry().clamp(offset));

        let completion = self.run(Instruction::zoom(opcode, offset))?;
        Ok(Self::outcome(&completion))
    }

    /// Re-render the viewport at `(x, y)` without changing the scale
    pub fn pan_to(&mut self, x: u32, y: u32) -> CoprocResult<ZoomOutcome> {
        let offset = self.geometry().clamp(Offset::new(x, y));
        let opcode = self.navigation.opcode_for(ZoomDirection::In);

        let completion = self.run(Instruction::pan(opcode, offset))?;
        Ok(Self::outcome(&completion))
    }

    /// Move the viewport one step, saturating at the frame edges
    pub fn pan(&mut self, direction: PanDirection) -> CoprocResult<ZoomOutcome> {
        let target = self.navigation.stepped(direction);
        self.pan_to(target.x, target.y)
    }

    /// Restore the live buffer from the pristine copy and recentre
    pub fn reset_image(&mut self) -> CoprocResult {
        self.run(Instruction::reset())?;
        Ok(())
    }

    pub fn refresh(&mut self) -> CoprocResult {
        self.run(Instruction::refresh())?;
        Ok(())
    }

    fn outcome(completion: &Completion) -> ZoomOutcome {
        match completion.boundary() {
            Some(boundary) => {
                warn!("{} reached {}", completion.instruction.opcode, boundary);
                ZoomOutcome::BoundaryReached(boundary)
            }
            None => ZoomOutcome::Applied,
        }
    }
}

#[cfg(test)]
mod coprocessor_tests {
    use super::*;
    use crate::constants::flags::*;
    use crate::constants::operands::{HOLD_SCALE_BIT, POSITIONED_BIT};
    use crate::window::scripted::ScriptedWindow;
    use std::vec;
    use std::vec::Vec;

    fn coproc() -> Coprocessor<ScriptedWindow> {
        Coprocessor::new(ScriptedWindow::completing())
    }

    #[test]
    fn test_out_of_range_load_never_issued() {
        let mut coproc = coproc();
        coproc.pan_to(100, 50).unwrap();
        let before = *coproc.navigation();

        let err = coproc.read_pixel(76800, MemoryBank::Live).unwrap_err();
        assert_eq!(
            err,
            CoprocError::InvalidAddress {
                opcode: Opcode::Load,
                address: 76800,
                limit: 76800
            }
        );
        assert_eq!(*coproc.navigation(), before);
        assert_eq!(coproc.window().instruction_words().len(), 1);
    }

    #[test]
    fn test_hardware_address_error_is_typed() {
        let mut window = ScriptedWindow::completing();
        window.script_flags(&[FLAG_DONE_MASK | FLAG_ERROR_MASK]);
        let mut coproc = Coprocessor::new(window);

        let err = coproc.write_pixel(10, 1).unwrap_err();
        assert!(matches!(err, CoprocError::InvalidAddress { address: 10, .. }));
    }

    #[test]
    fn test_hardware_error_leaves_navigation_untouched() {
        let mut window = ScriptedWindow::completing();
        window.script_flags(&[FLAG_DONE_MASK | FLAG_ERROR_MASK]);
        let mut coproc = Coprocessor::new(window);

        let err = coproc.pan(PanDirection::Right).unwrap_err();
        assert!(matches!(
            err,
            CoprocError::HardwareError {
                opcode: Opcode::PixelRepeatIn,
                ..
            }
        ));
        assert_eq!(coproc.navigation().pan(), Offset::ORIGIN);
    }

    #[test]
    fn test_read_pixel_returns_low_byte() {
        let mut window = ScriptedWindow::completing();
        window.data_out = 0x1234_56C3;
        let mut coproc = Coprocessor::new(window);
        assert_eq!(coproc.read_pixel(0, MemoryBank::Pristine).unwrap(), 0xC3);
    }

    #[test]
    fn test_zoom_uses_selected_algorithm() {
        let mut coproc = coproc();
        coproc.apply_zoom(ZoomDirection::In, None).unwrap();
        coproc.apply_zoom(ZoomDirection::Out, None).unwrap();
        coproc.toggle_zoom_in_mode();
        coproc.toggle_zoom_out_mode();
        coproc.apply_zoom(ZoomDirection::In, None).unwrap();
        coproc.apply_zoom(ZoomDirection::Out, None).unwrap();

        let opcodes: Vec<Opcode> = coproc
            .window()
            .instruction_words()
            .into_iter()
            .map(Opcode::from_word)
            .collect();
        assert_eq!(
            opcodes,
            vec![
                Opcode::PixelRepeatIn,
                Opcode::BlockAvgOut,
                Opcode::NearestIn,
                Opcode::NearestOut
            ]
        );
    }

    #[test]
    fn test_positioned_zoom_updates_pan() {
        let mut coproc = coproc();
        coproc
            .apply_zoom(ZoomDirection::In, Some(Offset::new(500, 20)))
            .unwrap();
        assert_eq!(coproc.navigation().pan(), Offset::new(319, 20));

        let word = coproc.window().instruction_words()[0];
        assert_ne!(word & POSITIONED_BIT, 0);
        assert_eq!(word & HOLD_SCALE_BIT, 0);
    }

    #[test]
    fn test_pan_clamps_and_rerenders() {
        let mut coproc = coproc();
        coproc.pan_to(310, 235).unwrap();
        coproc.pan(PanDirection::Right).unwrap();
        coproc.pan(PanDirection::Down).unwrap();
        assert_eq!(coproc.navigation().pan(), Offset::new(319, 239));

        let words = coproc.window().instruction_words();
        assert_eq!(words.len(), 3);
        for word in words {
            assert_eq!(Opcode::from_word(word), Opcode::PixelRepeatIn);
            assert_ne!(word & HOLD_SCALE_BIT, 0);
        }
    }

    #[test]
    fn test_boundary_is_not_an_error() {
        let mut window = ScriptedWindow::completing();
        window.script_flags(&[FLAG_DONE_MASK | FLAG_ZMIN_MASK]);
        let mut coproc = Coprocessor::new(window);

        let outcome = coproc.apply_zoom(ZoomDirection::Out, None).unwrap();
        assert_eq!(outcome, ZoomOutcome::BoundaryReached(Boundary::Min));
    }

    #[test]
    fn test_reset_returns_to_origin() {
        let mut coproc = coproc();
        coproc.pan_to(200, 100).unwrap();
        coproc.toggle_zoom_in_mode();
        coproc.reset_image().unwrap();

        assert_eq!(coproc.navigation().pan(), Offset::ORIGIN);
        // Algorithm selections survive a reset
        assert_eq!(coproc.navigation().zoom_in_mode(), ZoomInMode::NearestNeighbor);
    }

    #[test]
    fn test_status_reports_last_command() {
        let mut coproc = coproc();
        assert_eq!(coproc.status().last, None);

        coproc.refresh().unwrap();
        coproc.reset_image().unwrap();
        let status = coproc.status();
        assert_eq!(status.issued, 2);
        assert_eq!(status.last.map(|record| record.opcode), Some(Opcode::Reset));

        let opcodes: Vec<Opcode> = coproc.history().map(|record| record.opcode).collect();
        assert_eq!(opcodes, vec![Opcode::RefreshScreen, Opcode::Reset]);
    }

    #[test]
    fn test_timed_out_instruction_finishes_before_next() {
        let mut window = ScriptedWindow::completing();
        window.script_flags(&[0, 0, 0, 0]);
        let mut coproc = Coprocessor::new(window).with_poll_limit(PollLimit::Iterations(3));

        let err = coproc.pan_to(50, 20).unwrap_err();
        assert!(matches!(err, CoprocError::PollTimeout { polls: 3, .. }));
        assert_eq!(coproc.navigation().pan(), Offset::ORIGIN);
        assert_eq!(coproc.status().pending, Some(Opcode::PixelRepeatIn));

        coproc.refresh().unwrap();
        assert_eq!(coproc.navigation().pan(), Offset::new(50, 20));
        assert_eq!(coproc.status().pending, None);

        let opcodes: Vec<Opcode> = coproc.history().map(|record| record.opcode).collect();
        assert_eq!(opcodes, vec![Opcode::PixelRepeatIn, Opcode::RefreshScreen]);
    }

    #[test]
    fn test_resume_when_idle() {
        let mut coproc = coproc();
        assert_eq!(coproc.resume().unwrap(), None);
        assert!(coproc.window().instruction_words().is_empty());
    }
}
