//! Application orchestration layer
//!
//! Ties input, domain, UI and platform together: the phase table, the
//! animation clocks, background tasks, the per-frame session and the host
//! loop that drives it.

pub mod clock;
pub mod controller;
pub mod session;
pub mod state;
pub mod task;

pub use controller::{AppController, AppError, RunSummary};
pub use session::{Frame, Session, UiAction, WindowRequest};
pub use state::{Phase, PhaseEvent, Screen, StateMachine};
