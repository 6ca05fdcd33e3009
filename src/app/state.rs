//! Application phase state machine
//!
//! Defines the ordered application phases and the pure transition table.
//! Entry actions (starting tasks, resetting animations) are applied by the
//! session; this module only decides which phase comes next.

use std::fmt;

/// One discrete step of the application's top-level flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Login,
    TransitionToLoading,
    Loading,
    TransitionFromLoading,
    Result,
    TransitionToLogin,
    TransitionToMainMenu,
    MainMenu,
    TransitionToLaunching,
    Launching,
}

impl Phase {
    pub const ALL: [Phase; 10] = [
        Phase::Login,
        Phase::TransitionToLoading,
        Phase::Loading,
        Phase::TransitionFromLoading,
        Phase::Result,
        Phase::TransitionToLogin,
        Phase::TransitionToMainMenu,
        Phase::MainMenu,
        Phase::TransitionToLaunching,
        Phase::Launching,
    ];

    /// True for phases that fade content out before crossing a screen boundary
    pub fn is_transition(self) -> bool {
        matches!(
            self,
            Phase::TransitionToLoading
                | Phase::TransitionFromLoading
                | Phase::TransitionToLogin
                | Phase::TransitionToMainMenu
                | Phase::TransitionToLaunching
        )
    }

    /// The screen drawn while this phase is current
    ///
    /// A transition phase keeps drawing the screen it is leaving.
    pub fn screen(self) -> Screen {
        match self {
            Phase::Login | Phase::TransitionToLoading => Screen::Login,
            Phase::Loading | Phase::TransitionFromLoading => Screen::Loading,
            Phase::Result | Phase::TransitionToLogin | Phase::TransitionToMainMenu => {
                Screen::Result
            }
            Phase::MainMenu | Phase::TransitionToLaunching => Screen::MainMenu,
            Phase::Launching => Screen::Launching,
        }
    }

    /// Window chrome (minimize/close) is hidden while launching
    pub fn shows_window_controls(self) -> bool {
        self != Phase::Launching
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The five screen renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Loading,
    Result,
    MainMenu,
    Launching,
}

/// Conditions that can move the machine to another phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// User confirmed the login form with a non-empty key
    KeyConfirmed,
    /// Content opacity reached zero during a transition phase
    FadedOut,
    /// The validation task delivered its outcome
    ValidationFinished { success: bool },
    /// The result reveal passed the dwell threshold for the recorded outcome
    ResultDwellElapsed { success: bool },
    /// User picked a catalog entry from the main menu
    ItemSelected,
}

/// State machine for phase transitions
pub struct StateMachine;

impl StateMachine {
    /// Processes an event and returns the next phase
    ///
    /// Events that do not apply to the current phase leave it unchanged.
    pub fn process_event(current: Phase, event: PhaseEvent) -> Phase {
        match (current, event) {
            (Phase::Login, PhaseEvent::KeyConfirmed) => Phase::TransitionToLoading,

            (Phase::TransitionToLoading, PhaseEvent::FadedOut) => Phase::Loading,

            (Phase::Loading, PhaseEvent::ValidationFinished { .. }) => {
                Phase::TransitionFromLoading
            }

            (Phase::TransitionFromLoading, PhaseEvent::FadedOut) => Phase::Result,

            (Phase::Result, PhaseEvent::ResultDwellElapsed { success: false }) => {
                Phase::TransitionToLogin
            }
            (Phase::Result, PhaseEvent::ResultDwellElapsed { success: true }) => {
                Phase::TransitionToMainMenu
            }

            (Phase::TransitionToLogin, PhaseEvent::FadedOut) => Phase::Login,
            (Phase::TransitionToMainMenu, PhaseEvent::FadedOut) => Phase::MainMenu,

            (Phase::MainMenu, PhaseEvent::ItemSelected) => Phase::TransitionToLaunching,

            (Phase::TransitionToLaunching, PhaseEvent::FadedOut) => Phase::Launching,

            // Invalid transitions - ignore event
            (phase, _) => phase,
        }
    }
}
