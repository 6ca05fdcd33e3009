pub mod keyboard;
pub mod pointer;

pub use keyboard::Key;
pub use pointer::{FrameInput, InputCollector, RawInput};
