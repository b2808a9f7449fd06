use crate::constants::frame::PAN_STEP;
use crate::geometry::FrameGeometry;
use crate::instructions::{Offset, Opcode};
use crate::utils::step_clamped;
use core::fmt;

/// Algorithm used when zooming in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomInMode {
    PixelRepetition,
    NearestNeighbor,
}

/// Algorithm used when zooming out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomOutMode {
    NearestNeighbor,
    BlockAverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
    Up,
    Down,
}

impl ZoomInMode {
    pub fn toggled(self) -> Self {
        match self {
            ZoomInMode::PixelRepetition => ZoomInMode::NearestNeighbor,
            ZoomInMode::NearestNeighbor => ZoomInMode::PixelRepetition,
        }
    }

    pub fn opcode(self) -> Opcode {
        match self {
            ZoomInMode::PixelRepetition => Opcode::PixelRepeatIn,
            ZoomInMode::NearestNeighbor => Opcode::NearestIn,
        }
    }
}

impl ZoomOutMode {
    pub fn toggled(self) -> Self {
        match self {
            ZoomOutMode::BlockAverage => ZoomOutMode::NearestNeighbor,
            ZoomOutMode::NearestNeighbor => ZoomOutMode::BlockAverage,
        }
    }

    pub fn opcode(self) -> Opcode {
        match self {
            ZoomOutMode::BlockAverage => Opcode::BlockAvgOut,
            ZoomOutMode::NearestNeighbor => Opcode::NearestOut,
        }
    }
}

impl fmt::Display for ZoomInMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoomInMode::PixelRepetition => f.write_str("pixel repetition"),
            ZoomInMode::NearestNeighbor => f.write_str("nearest neighbour"),
        }
    }
}

impl fmt::Display for ZoomOutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoomOutMode::BlockAverage => f.write_str("block average"),
            ZoomOutMode::NearestNeighbor => f.write_str("nearest neighbour"),
        }
    }
}

impl PanDirection {
    /// Signed (dx, dy) for one step of `step` pixels
    fn delta(self, step: u32) -> (i64, i64) {
        let step = i64::from(step);
        match self {
            PanDirection::Left => (-step, 0),
            PanDirection::Right => (step, 0),
            PanDirection::Up => (0, -step),
            PanDirection::Down => (0, step),
        }
    }
}

/// Algorithm selections and viewport position.
///
/// Only the coprocessor facade mutates the pan offset, and only after the
/// hardware accepted the instruction that moved it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    geometry: FrameGeometry,
    zoom_in_mode: ZoomInMode,
    zoom_out_mode: ZoomOutMode,
    pan: Offset,
    step: u32,
}

impl Navigation {
    pub fn new(geometry: FrameGeometry, step: u32) -> Self {
        Self {
            geometry,
            zoom_in_mode: ZoomInMode::PixelRepetition,
            zoom_out_mode: ZoomOutMode::BlockAverage,
            pan: Offset::ORIGIN,
            step,
        }
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn zoom_in_mode(&self) -> ZoomInMode {
        self.zoom_in_mode
    }

    pub fn zoom_out_mode(&self) -> ZoomOutMode {
        self.zoom_out_mode
    }

    pub fn pan(&self) -> Offset {
        self.pan
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn toggle_zoom_in_mode(&mut self) -> ZoomInMode {
        self.zoom_in_mode = self.zoom_in_mode.toggled();
        self.zoom_in_mode
    }

    pub fn toggle_zoom_out_mode(&mut self) -> ZoomOutMode {
        self.zoom_out_mode = self.zoom_out_mode.toggled();
        self.zoom_out_mode
    }

    /// Concrete opcode for a zoom in the current mode
    pub fn opcode_for(&self, direction: ZoomDirection) -> Opcode {
        match direction {
            ZoomDirection::In => self.zoom_in_mode.opcode(),
            ZoomDirection::Out => self.zoom_out_mode.opcode(),
        }
    }

    /// Where one pan step would land, capped at the frame edges
    pub fn stepped(&self, direction: PanDirection) -> Offset {
        let (dx, dy) = direction.delta(self.step);
        Offset::new(
            step_clamped(self.pan.x, dx, self.geometry.width()),
            step_clamped(self.pan.y, dy, self.geometry.height()),
        )
    }

    pub(crate) fn commit_pan(&mut self, offset: Offset) {
        self.pan = self.geometry.clamp(offset);
    }

    pub(crate) fn reset_pan(&mut self) {
        self.pan = Offset::ORIGIN;
    }
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new(FrameGeometry::DEFAULT, PAN_STEP)
    }
}
