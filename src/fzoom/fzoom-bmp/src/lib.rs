//! Decoder for uncompressed 8-bit grayscale BMP files.
//!
//! Produces the raw bottom-up, row-padded sample stream the coprocessor's
//! transfer pipeline consumes. Palette entries are not applied: sample values
//! are sent to the hardware as gray levels.

pub mod error;
pub mod header;

pub use error::BitmapError;
pub use header::Header;

use header::{parse_header, validate, FILE_HEADER_LEN, HEADERS_LEN};
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

const ROW_ALIGNMENT: usize = 4;
const MAX_PALETTE_ENTRIES: u32 = 256;

/// A decoded bitmap: dimensions plus the pixel array exactly as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>, // bottom-up rows, padding included, possibly short
}

impl Bitmap {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BitmapError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| BitmapError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read(&mut BufReader::new(file))
    }

    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, BitmapError> {
        let mut raw = [0u8; HEADERS_LEN];
        reader.read_exact(&mut raw).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => BitmapError::TruncatedHeader,
            _ => BitmapError::Io(e),
        })?;

        let header = parse_header(&raw)?;
        validate(&header)?;
        debug!("Bitmap header: {:?}", header);

        let (width, height) = (header.width as u32, header.height as u32);
        check_palette(reader, &header)?;

        reader.seek(SeekFrom::Start(u64::from(header.pixel_offset)))?;
        let expected = row_stride(width) as u64 * u64::from(height);
        let mut pixels = Vec::new();
        reader.take(expected).read_to_end(&mut pixels)?;

        if (pixels.len() as u64) < expected {
            warn!(
                "Pixel data is short: {} of {} bytes, missing samples will be black",
                pixels.len(),
                expected
            );
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn row_stride(&self) -> usize {
        row_stride(self.width)
    }

    /// Whether every row, padding included, was present in the file
    pub fn is_complete(&self) -> bool {
        self.pixels.len() >= self.row_stride() * self.height as usize
    }
}

/// Row length rounded up to a 4-byte boundary
pub fn row_stride(width: u32) -> usize {
    let width = width as usize;
    (width + ROW_ALIGNMENT - 1) / ROW_ALIGNMENT * ROW_ALIGNMENT
}

/// Warn when the palette is not a gray ramp; samples are sent as-is either way
fn check_palette<R: Read + Seek>(reader: &mut R, header: &Header) -> Result<(), BitmapError> {
    let palette_start = (FILE_HEADER_LEN as u64) + u64::from(header.info_size);
    let entries = match header.colors_used {
        0 => MAX_PALETTE_ENTRIES,
        n => n.min(MAX_PALETTE_ENTRIES),
    };
    let available = u64::from(header.pixel_offset).saturating_sub(palette_start);
    let len = (u64::from(entries) * 4).min(available);
    if len == 0 {
        return Ok(());
    }

    reader.seek(SeekFrom::Start(palette_start))?;
    let mut palette = Vec::new();
    reader.take(len).read_to_end(&mut palette)?;

    let colored = palette
        .chunks_exact(4)
        .filter(|bgra| bgra[0] != bgra[1] || bgra[1] != bgra[2])
        .count();
    if colored > 0 {
        warn!(
            "Palette has {} non-gray entries, indices will be shown as gray levels",
            colored
        );
    }
    Ok(())
}
