//! Line-mode menu driving one coprocessor.

use crate::error::AppError;
use fzoom_bmp::Bitmap;
use fzoom_core::{
    Coprocessor, ImageSource, PanDirection, RegisterWindow, Status, TransferReport,
    ZoomDirection, ZoomOutcome,
};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  i, +        zoom in
  o, -        zoom out
  w a s d     pan up, left, down, right
  n           toggle zoom-in algorithm
  m           toggle zoom-out algorithm
  l [path]    load a bitmap (reloads the last one without a path)
  r           reset to the loaded image
  f           refresh the screen
  p           show status
  h           show this help
  q           quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Zoom(ZoomDirection),
    Pan(PanDirection),
    ToggleZoomIn,
    ToggleZoomOut,
    Load(Option<PathBuf>),
    Reset,
    Refresh,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (key, rest) = match line.find(char::is_whitespace) {
            Some(split) => (&line[..split], line[split..].trim()),
            None => (line, ""),
        };

        let command = match key {
            "i" | "+" => Command::Zoom(ZoomDirection::In),
            "o" | "-" => Command::Zoom(ZoomDirection::Out),
            "w" => Command::Pan(PanDirection::Up),
            "a" => Command::Pan(PanDirection::Left),
            "s" => Command::Pan(PanDirection::Down),
            "d" => Command::Pan(PanDirection::Right),
            "n" => Command::ToggleZoomIn,
            "m" => Command::ToggleZoomOut,
            "l" if rest.is_empty() => Command::Load(None),
            "l" => Command::Load(Some(PathBuf::from(rest))),
            "r" => Command::Reset,
            "f" => Command::Refresh,
            "p" => Command::Status,
            "h" | "?" => Command::Help,
            "q" => Command::Quit,
            _ => return Err(AppError::UnknownCommand(line.to_string())),
        };
        Ok(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<W> {
    coproc: Coprocessor<W>,
    last_image: Option<PathBuf>,
}

impl<W: RegisterWindow> Session<W> {
    pub fn new(coproc: Coprocessor<W>) -> Self {
        Self {
            coproc,
            last_image: None,
        }
    }

    #[cfg(test)]
    pub fn coprocessor(&self) -> &Coprocessor<W> {
        &self.coproc
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow, AppError> {
        match command {
            Command::Zoom(direction) => {
                let outcome = self.coproc.apply_zoom(direction, None)?;
                report_outcome(outcome);
            }
            Command::Pan(direction) => {
                let outcome = self.coproc.pan(direction)?;
                report_outcome(outcome);
                println!("Viewport at {}", self.coproc.navigation().pan());
            }
            Command::ToggleZoomIn => {
                println!("Zoom-in algorithm: {}", self.coproc.toggle_zoom_in_mode());
            }
            Command::ToggleZoomOut => {
                println!("Zoom-out algorithm: {}", self.coproc.toggle_zoom_out_mode());
            }
            Command::Load(path) => {
                let path = path
                    .or_else(|| self.last_image.clone())
                    .ok_or(AppError::NoImagePath)?;
                self.load_image(&path)?;
            }
            Command::Reset => {
                self.coproc.reset_image()?;
                println!("Image reset");
            }
            Command::Refresh => self.coproc.refresh()?,
            Command::Status => println!("{}", describe(&self.coproc.status())),
            Command::Help => println!("{}", HELP),
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Decode `path`, stream it into the frame buffer, then show it
    pub fn load_image(&mut self, path: &Path) -> Result<TransferReport, AppError> {
        let bitmap = Bitmap::open(path)?;
        info!(
            "Loading {} ({}x{})",
            path.display(),
            bitmap.width(),
            bitmap.height()
        );
        let report = self.load_bitmap(&bitmap)?;
        self.last_image = Some(path.to_path_buf());
        Ok(report)
    }

    pub fn load_bitmap(&mut self, bitmap: &Bitmap) -> Result<TransferReport, AppError> {
        let source = ImageSource::new(bitmap.width(), bitmap.height(), bitmap.pixels());
        let report = self.coproc.load_image(&source, |progress| {
            info!("Transfer {}% complete", progress.percent());
        })?;

        if report.clipped > 0 {
            warn!("{} samples fell outside the frame", report.clipped);
        }
        // The transfer writes the pristine copy; RESET puts it on screen
        self.coproc.reset_image()?;
        info!(
            "Wrote {} pixels ({} zero-filled)",
            report.written, report.zero_filled
        );
        Ok(report)
    }
}

fn report_outcome(outcome: ZoomOutcome) {
    if let ZoomOutcome::BoundaryReached(boundary) = outcome {
        println!("Scale limit reached: {}", boundary);
    }
}

fn describe(status: &Status) -> String {
    let navigation = &status.navigation;
    let mut text = format!(
        "Viewport {} (step {}) | zoom in: {} | zoom out: {} | {} instructions issued",
        navigation.pan(),
        navigation.step(),
        navigation.zoom_in_mode(),
        navigation.zoom_out_mode(),
        status.issued
    );
    if let Some(opcode) = status.pending {
        text.push_str(&format!("\n{} still in flight", opcode));
    }
    if let Some(last) = status.last {
        text.push_str(&format!(
            "\nLast: {} (0x{:08x}) flags {}",
            last.opcode, last.word, last.flags
        ));
    }
    text
}
