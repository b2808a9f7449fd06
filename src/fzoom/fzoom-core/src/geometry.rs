use crate::constants::frame::{FRAME_HEIGHT, FRAME_WIDTH};
use crate::constants::operands::{ADDRESS_MASK, X_MASK, Y_MASK};
use crate::error::{CoprocError, CoprocResult};
use crate::instructions::Offset;

/// Dimensions of the coprocessor frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    width: u32,
    height: u32,
}

impl FrameGeometry {
    /// The 320x240 frame of the shipped bitstream
    pub const DEFAULT: FrameGeometry = FrameGeometry {
        width: FRAME_WIDTH,
        height: FRAME_HEIGHT,
    };

    /// Geometry must be non-empty and addressable by the operand fields
    pub fn new(width: u32, height: u32) -> CoprocResult<Self> {
        let addressable = u64::from(width) * u64::from(height) <= u64::from(ADDRESS_MASK) + 1;
        if width == 0 || height == 0 || width > X_MASK + 1 || height > Y_MASK + 1 || !addressable
        {
            return Err(CoprocError::UnsupportedGeometry { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of addressable pixels
    pub fn pixels(&self) -> u32 {
        self.width * self.height
    }

    pub fn contains(&self, address: u32) -> bool {
        address < self.pixels()
    }

    pub fn address_of(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Saturate an offset into the frame
    pub fn clamp(&self, offset: Offset) -> Offset {
        Offset::new(offset.x.min(self.width - 1), offset.y.min(self.height - 1))
    }
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod geometry_tests {
    use super::*;
    use crate::constants::frame::FRAME_PIXELS;

    #[test]
    fn test_default_frame() {
        let geometry = FrameGeometry::default();
        assert_eq!(geometry.pixels(), FRAME_PIXELS);
        assert!(geometry.contains(76799));
        assert!(!geometry.contains(76800));
        assert_eq!(geometry.address_of(319, 239), Some(76799));
        assert_eq!(geometry.address_of(320, 0), None);
    }

    #[test]
    fn test_rejects_unaddressable_geometry() {
        assert!(FrameGeometry::new(0, 10).is_err());
        assert!(FrameGeometry::new(1025, 1).is_err());
        assert!(FrameGeometry::new(1024, 512).is_err());
        assert!(FrameGeometry::new(4, 4).is_ok());
    }

    #[test]
    fn test_clamp() {
        let geometry = FrameGeometry::default();
        assert_eq!(geometry.clamp(Offset::new(400, 300)), Offset::new(319, 239));
        assert_eq!(geometry.clamp(Offset::new(10, 20)), Offset::new(10, 20));
    }
}
