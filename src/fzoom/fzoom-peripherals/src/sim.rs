//! Software model of the image coprocessor behind the register window.
//!
//! Tracks the live and pristine frame buffers, the zoom level and the
//! viewport. The scaling algorithms themselves are not modelled: zooming only
//! moves the level, and the buffers change only on STORE and RESET.

use fzoom_core::constants::flags::*;
use fzoom_core::constants::registers::ENABLE_LATCH;
use fzoom_core::decoder::decoder;
use fzoom_core::instructions::{Instruction, MemoryBank, Offset, Opcode, Operand};
use fzoom_core::window::{Register, RegisterWindow};
use fzoom_core::FrameGeometry;
use log::{debug, warn};

/// Zoom steps available in each direction from the unscaled image
pub const MAX_ZOOM_STEPS: i32 = 2;

pub struct SimulatedCoprocessor {
    geometry: FrameGeometry,
    live: Vec<u8>,     // displayed frame buffer
    pristine: Vec<u8>, // copy restored by RESET

    instruct: u32,
    enable: u32,
    data_out: u32,
    result: u32, // FLAGS value once the current instruction finishes

    latency: u32,    // busy FLAGS reads after each latch
    busy_polls: u32, // busy reads left for the current instruction

    zoom_level: i32,
    viewport: Offset,
    executed: Vec<Instruction>,
}

impl SimulatedCoprocessor {
    pub fn new(geometry: FrameGeometry) -> Self {
        let pixels = geometry.pixels() as usize;
        Self {
            geometry,
            live: vec![0; pixels],
            pristine: vec![0; pixels],
            instruct: 0,
            enable: 0,
            data_out: 0,
            result: 0,
            latency: 0,
            busy_polls: 0,
            zoom_level: 0,
            viewport: Offset::ORIGIN,
            executed: Vec::new(),
        }
    }

    /// Report busy for `latency` FLAGS reads before completing
    pub fn with_latency(mut self, latency: u32) -> Self {
        self.latency = latency;
        self
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn live(&self) -> &[u8] {
        &self.live
    }

    pub fn pristine(&self) -> &[u8] {
        &self.pristine
    }

    pub fn zoom_level(&self) -> i32 {
        self.zoom_level
    }

    pub fn viewport(&self) -> Offset {
        self.viewport
    }

    /// Instructions latched so far, malformed words excluded
    pub fn executed(&self) -> &[Instruction] {
        &self.executed
    }

    fn latch(&mut self) {
        self.busy_polls = self.latency;
        self.result = match decoder(self.instruct) {
            Ok(instruction) => {
                debug!("Simulating {}", instruction);
                self.executed.push(instruction);
                self.execute(&instruction)
            }
            Err(reason) => {
                warn!("Malformed instruction 0x{:08x}: {}", self.instruct, reason);
                FLAG_DONE_MASK | FLAG_ERROR_MASK
            }
        };
    }

    fn execute(&mut self, instruction: &Instruction) -> u32 {
        let pixels = self.live.len();
        let status = match (instruction.opcode, instruction.operand) {
            (Opcode::Load, Operand::Load { address, bank }) => {
                let buffer = match bank {
                    MemoryBank::Live => &self.live,
                    MemoryBank::Pristine => &self.pristine,
                };
                match buffer.get(address as usize) {
                    Some(value) => {
                        self.data_out = u32::from(*value);
                        FLAG_DONE_MASK
                    }
                    None => FLAG_DONE_MASK | FLAG_ERROR_MASK,
                }
            }
            (Opcode::Store, Operand::Store { address, value }) => {
                let address = address as usize;
                if address < pixels {
                    self.live[address] = value;
                    self.pristine[address] = value;
                    FLAG_DONE_MASK
                } else {
                    FLAG_DONE_MASK | FLAG_ERROR_MASK
                }
            }
            (Opcode::Reset, _) => {
                self.live.copy_from_slice(&self.pristine);
                self.zoom_level = 0;
                self.viewport = Offset::ORIGIN;
                FLAG_DONE_MASK
            }
            (Opcode::RefreshScreen, _) => FLAG_DONE_MASK,
            (opcode, operand) => self.zoom(opcode, operand),
        };
        status | self.boundary_flags(instruction.opcode)
    }

    fn zoom(&mut self, opcode: Opcode, operand: Operand) -> u32 {
        let (offset, hold_scale) = match operand {
            Operand::Viewport { offset, hold_scale } => (Some(offset), hold_scale),
            _ => (None, false),
        };

        if let Some(offset) = offset {
            if offset.x >= self.geometry.width() || offset.y >= self.geometry.height() {
                return FLAG_DONE_MASK | FLAG_ERROR_MASK;
            }
            self.viewport = offset;
        }

        if !hold_scale {
            let step = if opcode.is_zoom_in() { 1 } else { -1 };
            self.zoom_level = (self.zoom_level + step).clamp(-MAX_ZOOM_STEPS, MAX_ZOOM_STEPS);
        }
        FLAG_DONE_MASK
    }

    fn boundary_flags(&self, opcode: Opcode) -> u32 {
        if !opcode.is_zoom() {
            return 0;
        }
        match self.zoom_level {
            MAX_ZOOM_STEPS => FLAG_ZMAX_MASK,
            level if level == -MAX_ZOOM_STEPS => FLAG_ZMIN_MASK,
            _ => 0,
        }
    }
}

impl RegisterWindow for SimulatedCoprocessor {
    fn read(&mut self, reg: Register) -> u32 {
        match reg {
            Register::Flags => {
                if self.enable & ENABLE_LATCH == 0 {
                    0
                } else if self.busy_polls > 0 {
                    self.busy_polls -= 1;
                    0
                } else {
                    self.result
                }
            }
            Register::DataOut => self.data_out,
            Register::Instruct => self.instruct,
            Register::Enable => self.enable,
        }
    }

    fn write(&mut self, reg: Register, value: u32) {
        match reg {
            Register::Instruct => self.instruct = value,
            Register::Enable => {
                let rising = self.enable & ENABLE_LATCH == 0 && value & ENABLE_LATCH != 0;
                self.enable = value;
                if rising {
                    self.latch();
                }
            }
            Register::DataOut | Register::Flags => {
                warn!("Write attempt to read-only register {}", reg);
            }
        }
    }
}

#[cfg(test)]
mod sim_tests {
    use super::*;
    use fzoom_core::{
        Boundary, CoprocError, Coprocessor, Handshake, ImageSource, PanDirection, PollLimit,
        ZoomDirection, ZoomOutcome,
    };

    fn small() -> FrameGeometry {
        FrameGeometry::new(16, 8).unwrap()
    }

    #[test]
    fn test_write_read_round_trip_every_address() {
        let mut coproc = Coprocessor::new(SimulatedCoprocessor::new(FrameGeometry::DEFAULT));
        let pixels = FrameGeometry::DEFAULT.pixels();

        for address in 0..pixels {
            coproc.write_pixel(address, (address * 7 % 251) as u8).unwrap();
        }
        for address in 0..pixels {
            let value = coproc.read_pixel(address, MemoryBank::Live).unwrap();
            assert_eq!(value, (address * 7 % 251) as u8);
        }
    }

    #[test]
    fn test_load_one_past_end() {
        let mut coproc = Coprocessor::new(SimulatedCoprocessor::new(FrameGeometry::DEFAULT));
        let before = *coproc.navigation();

        let err = coproc.read_pixel(76800, MemoryBank::Live).unwrap_err();
        assert!(matches!(err, CoprocError::InvalidAddress { address: 76800, .. }));
        assert_eq!(*coproc.navigation(), before);
        assert!(coproc.window().executed().is_empty());
    }

    #[test]
    fn test_hardware_rejects_raw_out_of_range_store() {
        // Bypass the facade's range check to exercise the ERROR path
        let mut handshake = Handshake::new(SimulatedCoprocessor::new(small()));
        let completion = handshake.execute(Instruction::store(128, 1)).unwrap();
        assert!(completion.is_error());
    }

    #[test]
    fn test_latency_is_polled_through() {
        let sim = SimulatedCoprocessor::new(small()).with_latency(25);
        let mut coproc = Coprocessor::new(sim).with_poll_limit(PollLimit::Iterations(100));
        coproc.write_pixel(3, 99).unwrap();
        assert_eq!(coproc.read_pixel(3, MemoryBank::Pristine).unwrap(), 99);
    }

    #[test]
    fn test_poll_limit_exceeded() {
        let sim = SimulatedCoprocessor::new(small()).with_latency(25);
        let mut coproc = Coprocessor::new(sim).with_poll_limit(PollLimit::Iterations(10));
        let err = coproc.reset_image().unwrap_err();
        assert_eq!(
            err,
            CoprocError::PollTimeout {
                opcode: Opcode::Reset,
                polls: 10
            }
        );
    }

    #[test]
    fn test_slow_instructions_complete_on_resume() {
        let sim = SimulatedCoprocessor::new(FrameGeometry::DEFAULT).with_latency(15);
        let mut coproc = Coprocessor::new(sim).with_poll_limit(PollLimit::Iterations(10));

        let err = coproc.pan_to(40, 30).unwrap_err();
        assert!(matches!(err, CoprocError::PollTimeout { .. }));
        assert_eq!(coproc.navigation().pan(), Offset::ORIGIN);

        let completion = coproc.resume().unwrap().unwrap();
        assert_eq!(completion.instruction.opcode, Opcode::PixelRepeatIn);
        assert_eq!(coproc.navigation().pan(), Offset::new(40, 30));
        assert_eq!(coproc.window().viewport(), Offset::new(40, 30));

        let err = coproc.reset_image().unwrap_err();
        assert_eq!(
            err,
            CoprocError::PollTimeout {
                opcode: Opcode::Reset,
                polls: 10
            }
        );

        // The pending RESET lands first, then the store is issued
        let err = coproc.write_pixel(0, 9).unwrap_err();
        assert_eq!(
            err,
            CoprocError::PollTimeout {
                opcode: Opcode::Store,
                polls: 10
            }
        );
        assert_eq!(coproc.navigation().pan(), Offset::ORIGIN);

        assert!(coproc.resume().unwrap().is_some());
        assert_eq!(coproc.status().pending, None);
        assert_eq!(coproc.window().live()[0], 9);

        let opcodes: Vec<Opcode> = coproc.history().map(|record| record.opcode).collect();
        assert_eq!(
            opcodes,
            vec![Opcode::PixelRepeatIn, Opcode::Reset, Opcode::Store]
        );
    }

    #[test]
    fn test_load_then_reset_restores_pristine() {
        let geometry = FrameGeometry::new(4, 4).unwrap();
        let mut coproc = Coprocessor::new(SimulatedCoprocessor::new(geometry));
        let pixels: Vec<u8> = (0..16).collect();

        coproc
            .load_image(&ImageSource::new(4, 4, &pixels), |_| {})
            .unwrap();
        coproc.reset_image().unwrap();

        // Bottom-up source: stream row 0 is frame row 3
        let sim = coproc.window();
        assert_eq!(&sim.live()[12..16], &[0, 1, 2, 3]);
        assert_eq!(&sim.live()[0..4], &[12, 13, 14, 15]);
        assert_eq!(sim.live(), sim.pristine());
    }

    #[test]
    fn test_zoom_limits_reported() {
        let mut coproc = Coprocessor::new(SimulatedCoprocessor::new(small()));

        let mut outcomes = Vec::new();
        for _ in 0..3 {
            outcomes.push(coproc.apply_zoom(ZoomDirection::In, None).unwrap());
        }
        assert_eq!(
            outcomes,
            vec![
                ZoomOutcome::Applied,
                ZoomOutcome::BoundaryReached(Boundary::Max),
                ZoomOutcome::BoundaryReached(Boundary::Max),
            ]
        );
        assert_eq!(coproc.window().zoom_level(), MAX_ZOOM_STEPS);

        for _ in 0..2 * MAX_ZOOM_STEPS {
            coproc.apply_zoom(ZoomDirection::Out, None).unwrap();
        }
        assert_eq!(
            coproc.apply_zoom(ZoomDirection::Out, None).unwrap(),
            ZoomOutcome::BoundaryReached(Boundary::Min)
        );
    }

    #[test]
    fn test_pan_keeps_scale_and_clamps() {
        let mut coproc = Coprocessor::new(SimulatedCoprocessor::new(FrameGeometry::DEFAULT));
        coproc.apply_zoom(ZoomDirection::In, None).unwrap();

        coproc
            .apply_zoom(ZoomDirection::In, Some(Offset::new(310, 235)))
            .unwrap();
        let level = coproc.window().zoom_level();
        for _ in 0..3 {
            coproc.pan(PanDirection::Right).unwrap();
            coproc.pan(PanDirection::Down).unwrap();
        }

        assert_eq!(coproc.navigation().pan(), Offset::new(319, 239));
        assert_eq!(coproc.window().viewport(), Offset::new(319, 239));
        assert_eq!(coproc.window().zoom_level(), level);
    }

    #[test]
    fn test_reset_recentres() {
        let mut coproc = Coprocessor::new(SimulatedCoprocessor::new(FrameGeometry::DEFAULT));
        coproc.pan_to(40, 30).unwrap();
        coproc.apply_zoom(ZoomDirection::Out, None).unwrap();
        coproc.reset_image().unwrap();

        assert_eq!(coproc.navigation().pan(), Offset::ORIGIN);
        assert_eq!(coproc.window().viewport(), Offset::ORIGIN);
        assert_eq!(coproc.window().zoom_level(), 0);
    }

    #[test]
    fn test_flags_clear_on_release() {
        let mut sim = SimulatedCoprocessor::new(small());
        {
            let mut handshake = Handshake::new(&mut sim);
            handshake.execute(Instruction::refresh()).unwrap();
        }
        assert_eq!(sim.read(Register::Flags), 0);
    }
}
