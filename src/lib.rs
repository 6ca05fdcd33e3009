//! Ember Gate: a themed license gate and launcher overlay
//!
//! A glass panel walks the user through license entry, validation, a
//! result screen and a one-item launcher, then fades away once the chosen
//! program has started. Presentation is driven by a phase state machine in
//! [`app::session`]; drawing goes through a command list rasterized with
//! tiny-skia and shown in a layered Win32 window.

pub mod app;
pub mod backend;
pub mod config;
pub mod domain;
pub mod input;
pub mod logging;
pub mod platform;
pub mod ui;
