//! Presentation layer
//!
//! Screens describe themselves as `DrawList`s through the `Ui` context;
//! the `Rasterizer` turns a finished list into pixels.

pub mod draw;
pub mod renderer;
pub mod screens;
pub mod theme;
pub mod widgets;

pub use draw::{DrawCommand, DrawList};
pub use renderer::{Rasterizer, RendererError};
