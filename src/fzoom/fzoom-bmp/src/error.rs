use std::io;
use std::path::PathBuf;

/// Reasons a file cannot be handed to the coprocessor
#[derive(Debug, thiserror::Error)]
pub enum BitmapError {
    #[error("failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to read bitmap: {0}")]
    Io(#[from] io::Error),

    #[error("bitmap header is truncated")]
    TruncatedHeader,

    #[error("not a BMP file (magic 0x{0:04x})")]
    NotBitmap(u16),

    #[error("unsupported info header of {0} bytes")]
    UnsupportedHeader(u32),

    #[error("expected an 8-bit grayscale bitmap, found {0} bits per pixel")]
    UnsupportedDepth(u16),

    #[error("compressed bitmaps are not supported (compression type {0})")]
    Compressed(u32),

    #[error("top-down bitmaps are not supported")]
    TopDown,

    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
}
