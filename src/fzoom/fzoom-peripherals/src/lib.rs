#[cfg(feature = "devmem")]
pub mod devmem;
pub mod error;
pub mod sim;

#[cfg(feature = "devmem")]
pub use devmem::DevMemWindow;
pub use error::WindowError;
pub use sim::SimulatedCoprocessor;
