use std::io;
use std::path::PathBuf;

/// Failures while establishing the register window
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("a window of {span} bytes cannot hold the coprocessor registers (need {min})")]
    SpanTooSmall { span: usize, min: usize },

    #[error("failed to open {}: {source} (root privileges are usually required)", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to map 0x{span:x} bytes at 0x{base:08x}: {source}")]
    Map {
        base: u64,
        span: usize,
        source: io::Error,
    },
}
