use crate::config::WindowConfig;
use crate::error::AppError;
use fzoom_core::{FrameGeometry, Register, RegisterWindow};
use fzoom_peripherals::{DevMemWindow, SimulatedCoprocessor};
use log::info;

/// Register window chosen at startup
pub enum Backend {
    DevMem(DevMemWindow),
    Simulated(SimulatedCoprocessor),
}

impl Backend {
    pub fn open(config: &WindowConfig, geometry: FrameGeometry) -> Result<Self, AppError> {
        let backend = match config {
            WindowConfig::DevMem { device, base, span } => {
                Backend::DevMem(DevMemWindow::open(device, *base, *span)?)
            }
            WindowConfig::Simulated { latency } => {
                info!("Using simulated coprocessor ({} busy polls)", latency);
                Backend::Simulated(SimulatedCoprocessor::new(geometry).with_latency(*latency))
            }
        };
        Ok(backend)
    }
}

impl RegisterWindow for Backend {
    fn read(&mut self, reg: Register) -> u32 {
        match self {
            Backend::DevMem(window) => window.read(reg),
            Backend::Simulated(sim) => sim.read(reg),
        }
    }

    fn write(&mut self, reg: Register, value: u32) {
        match self {
            Backend::DevMem(window) => window.write(reg, value),
            Backend::Simulated(sim) => sim.write(reg, value),
        }
    }
}
