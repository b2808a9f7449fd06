use crate::error::WindowError;
use fzoom_core::constants::bridge::{BRIDGE_BASE, BRIDGE_SPAN, DEVICE_PATH};
use fzoom_core::constants::registers::REGISTER_SPAN_MIN;
use fzoom_core::window::{Register, RegisterWindow};
use log::info;
use memmap2::{MmapOptions, MmapRaw};
use std::fs::OpenOptions;
use std::path::Path;

/// The lightweight bridge mapped from a physical-memory device.
///
/// The mapping lives exactly as long as this value: it is created by `open`
/// and unmapped on drop, so no register access can happen outside it.
pub struct DevMemWindow {
    map: MmapRaw,
    base: u64,
}

impl DevMemWindow {
    /// Map the default bridge window from /dev/mem
    pub fn open_bridge() -> Result<Self, WindowError> {
        Self::open(DEVICE_PATH, BRIDGE_BASE, BRIDGE_SPAN)
    }

    pub fn open<P: AsRef<Path>>(path: P, base: u64, span: usize) -> Result<Self, WindowError> {
        if !Register::fits(span) {
            return Err(WindowError::SpanTooSmall {
                span,
                min: REGISTER_SPAN_MIN,
            });
        }

        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| WindowError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let map = MmapOptions::new()
            .offset(base)
            .len(span)
            .map_raw(&file)
            .map_err(|source| WindowError::Map { base, span, source })?;

        info!("Mapped 0x{:x} bytes of {} at 0x{:08x}", span, path.display(), base);
        Ok(Self { map, base })
    }

    fn register_ptr(&self, reg: Register) -> *mut u32 {
        // Offsets were checked against the span in `open`
        unsafe { self.map.as_mut_ptr().add(reg.offset()) as *mut u32 }
    }
}

impl RegisterWindow for DevMemWindow {
    fn read(&mut self, reg: Register) -> u32 {
        unsafe { self.register_ptr(reg).read_volatile() }
    }

    fn write(&mut self, reg: Register, value: u32) {
        unsafe { self.register_ptr(reg).write_volatile(value) }
    }
}

impl Drop for DevMemWindow {
    fn drop(&mut self) {
        info!("Unmapping bridge window at 0x{:08x}", self.base);
    }
}
