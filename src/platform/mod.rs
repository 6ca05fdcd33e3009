//! Host windows
//!
//! The session never talks to the OS directly. A `HostWindow` turns OS
//! events into `RawInput`, shows finished frames and carries out the
//! window requests a frame produced. On Windows this is a layered topmost
//! popup; everywhere else (and in tests) a scripted headless window.

use tiny_skia::Pixmap;

use crate::input::InputCollector;

pub mod headless;
#[cfg(windows)]
pub mod windows;

pub use headless::{HeadlessWindow, Script};
#[cfg(windows)]
pub use self::windows::LayeredWindow;

/// Host window errors
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Failed to register window class")]
    ClassRegistrationFailed,

    #[error("Failed to create host window")]
    WindowCreationFailed,

    #[error("Failed to get screen device context")]
    DeviceContextFailed,

    #[error("Failed to create memory device context")]
    MemoryDeviceContextFailed,

    #[error("Failed to create DIB section")]
    DibSectionCreationFailed,

    #[error("Failed to select bitmap into device context")]
    BitmapSelectionFailed,

    #[error("Failed to update layered window")]
    LayerUpdateFailed,

    #[error("Frame is {actual:?} but the window is {expected:?}")]
    FrameSizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Win32 error: {0}")]
    Win32Error(String),
}

/// A window the overlay is shown in
pub trait HostWindow {
    /// Drains pending OS events into `input` without blocking
    fn pump(&mut self, input: &mut InputCollector);

    /// Shows a finished frame; the pixmap matches the window size
    fn present(&mut self, pixmap: &Pixmap) -> Result<(), PlatformError>;

    fn minimize(&mut self);

    fn move_by(&mut self, dx: i32, dy: i32);

    /// False once the OS window is gone
    fn is_open(&self) -> bool;

    /// Destroys the window; called once the session stops running
    fn close(&mut self);

    /// Fixed frame delta for hosts without a wall clock
    fn fixed_timestep(&self) -> Option<f32> {
        None
    }
}
