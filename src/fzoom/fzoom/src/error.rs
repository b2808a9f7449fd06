use fzoom_bmp::BitmapError;
use fzoom_core::CoprocError;
use fzoom_peripherals::WindowError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Coproc(#[from] CoprocError),

    #[error("image load failed: {0}")]
    Bitmap(#[from] BitmapError),

    #[error("register window unavailable: {0}")]
    Window(#[from] WindowError),

    #[error("signal handler failed: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("invalid value {value:?} for --{name}")]
    InvalidArgument { name: &'static str, value: String },

    #[error("unknown command {0:?}, type h for help")]
    UnknownCommand(String),

    #[error("no image path given and nothing loaded yet")]
    NoImagePath,
}

impl AppError {
    /// Errors after which the session cannot continue
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Window(_) | AppError::Signal(_))
    }
}
