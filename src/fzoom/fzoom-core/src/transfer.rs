//! Full-frame pixel load.
//!
//! Sources arrive in BMP order: rows bottom-up, each row padded to a 4-byte
//! boundary. Row `r` of the stream lands on frame row `height - 1 - r`.

use crate::constants::frame::{PROGRESS_MILESTONES, ROW_ALIGNMENT};
use crate::coprocessor::Coprocessor;
use crate::error::CoprocResult;
use crate::utils::padded_row_len;
use crate::window::RegisterWindow;
use log::{info, warn};

/// 8-bit grayscale samples in bottom-up row order
#[derive(Debug, Clone, Copy)]
pub struct ImageSource<'a> {
    width: u32,
    height: u32,
    pixels: &'a [u8],
}

impl<'a> ImageSource<'a> {
    /// `pixels` may be shorter than the geometry implies; missing samples read as black
    pub fn new(width: u32, height: u32, pixels: &'a [u8]) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per stored row, padding included
    pub fn row_stride(&self) -> usize {
        padded_row_len(self.width, ROW_ALIGNMENT) as usize
    }

    pub fn row_padding(&self) -> usize {
        self.row_stride() - self.width as usize
    }

    /// Bytes a complete source would hold
    pub fn expected_len(&self) -> usize {
        self.row_stride() * self.height as usize
    }

    /// Sample `x` of stream row `row`, `None` past the end of the data
    fn sample(&self, row: u32, x: u32) -> Option<u8> {
        let index = row as usize * self.row_stride() + x as usize;
        self.pixels.get(index).copied()
    }
}

/// Rows transferred so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub rows_done: u32,
    pub total_rows: u32,
}

impl Progress {
    pub fn percent(&self) -> u32 {
        if self.total_rows == 0 {
            return 100;
        }
        (u64::from(self.rows_done) * 100 / u64::from(self.total_rows)) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferReport {
    pub written: u32,     // pixels stored
    pub clipped: u32,     // samples dropped because they fell outside the frame
    pub zero_filled: u32, // samples missing from the source, sent as black
}

impl<W: RegisterWindow> Coprocessor<W> {
    /// Write every sample of `source` into the frame buffer.
    ///
    /// Samples whose address falls outside the frame end their row early. A
    /// handshake failure aborts immediately; pixels already written stay.
    pub fn load_image<F>(
        &mut self,
        source: &ImageSource<'_>,
        mut on_progress: F,
    ) -> CoprocResult<TransferReport>
    where
        F: FnMut(Progress),
    {
        let frame_pixels = u64::from(self.geometry().pixels());
        let (width, height) = (source.width(), source.height());
        let milestone = (height / PROGRESS_MILESTONES).max(1);
        let mut report = TransferReport::default();

        info!(
            "Transferring {}x{} image ({} bytes of {} expected)",
            width,
            height,
            source.pixels.len(),
            source.expected_len()
        );

        for y in (0..height).rev() {
            let row = height - 1 - y;
            for x in 0..width {
                let address = u64::from(y) * u64::from(width) + u64::from(x);
                if address >= frame_pixels {
                    report.clipped += width - x;
                    break;
                }

                let value = match source.sample(row, x) {
                    Some(value) => value,
                    None => {
                        report.zero_filled += 1;
                        0
                    }
                };
                self.write_pixel(address as u32, value)?;
                report.written += 1;
            }

            if y > 0 && y % milestone == 0 {
                let progress = Progress {
                    rows_done: row + 1,
                    total_rows: height,
                };
                info!("Progress: {}%", progress.percent());
                on_progress(progress);
            }
        }

        on_progress(Progress {
            rows_done: height,
            total_rows: height,
        });

        if report.zero_filled > 0 {
            warn!("Source ended early, {} samples sent as black", report.zero_filled);
        }
        if report.clipped > 0 {
            warn!("{} samples fell outside the frame", report.clipped);
        }
        info!("Transfer complete: {} pixels written", report.written);
        Ok(report)
    }
}
