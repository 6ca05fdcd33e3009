//! Presentation session
//!
//! `Session` is the single long-lived owner of everything that changes from
//! frame to frame: the current phase, the clocks, both opacity scalars, the
//! widget tweens and the two backend task handles. Only `frame` and `step`
//! mutate it, and both run on the render thread.
//!
//! Per frame the session:
//! 1. hit tests the pointer against the active screen's layout and queues
//!    `UiAction`s (user-triggered transitions run first),
//! 2. advances time, fades and async polls for the current phase,
//! 3. emits the draw list for the screen mapped from the (possibly new) phase.
//!
//! The shutdown sequence is orthogonal to the phase: once started, window
//! opacity only ramps down and no phase logic runs again.

use std::mem;

use crate::app::clock::{AnimationClock, Shake, Tween};
use crate::app::state::{Phase, PhaseEvent, Screen, StateMachine};
use crate::app::task::{TaskHandle, TaskKind, TaskPoll};
use crate::backend::Backend;
use crate::config::{MotionConfig, Settings};
use crate::domain::blob::BlobField;
use crate::domain::catalog::{Catalog, CatalogEntry};
use crate::domain::core::{Rect, Vec2};
use crate::input::keyboard::is_text_char;
use crate::input::{FrameInput, Key};
use crate::ui::draw::DrawList;
use crate::ui::screens::{self, LaunchView, LoginLayout, LoginView, MenuLayout, MenuView};
use crate::ui::widgets::{ButtonState, ChromeLayout, Ui};

/// Maximum license key length in bytes: a 64-byte buffer less its terminator
pub const KEY_CAPACITY: usize = 63;

/// User intents collected during a frame and applied by the next step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    /// Confirm the login form
    Confirm,
    /// Launch the catalog entry at this index
    SelectItem(usize),
    /// Start the shutdown sequence
    RequestClose,
}

/// Requests the host window should carry out after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRequest {
    Minimize,
    /// Move the window by a screen-space delta
    MoveBy { dx: i32, dy: i32 },
}

/// Output of one session frame
#[derive(Debug)]
pub struct Frame {
    pub commands: DrawList,
    pub requests: Vec<WindowRequest>,
    /// False once the shutdown sequence has finished
    pub running: bool,
}

/// Widget a pointer press started on; only a release over it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressTarget {
    Minimize,
    Close,
    Eye,
    Confirm,
    Launch,
}

#[derive(Debug, Clone, Copy)]
struct WidgetTweens {
    key_focus: Tween,
    button_hover: Tween,
    button_click: Tween,
    minimize_hover: Tween,
    close_hover: Tween,
}

impl WidgetTweens {
    fn new(motion: &MotionConfig) -> Self {
        Self {
            key_focus: Tween::new(motion.focus_rate),
            button_hover: Tween::new(motion.hover_rate),
            button_click: Tween::new(motion.click_rate),
            minimize_hover: Tween::new(motion.hover_rate),
            close_hover: Tween::new(motion.hover_rate),
        }
    }

    fn button(&self) -> ButtonState {
        ButtonState {
            hover: self.button_hover.value(),
            click: self.button_click.value(),
        }
    }
}

pub struct Session {
    settings: Settings,
    backend: Backend,
    catalog: Catalog,

    phase: Phase,
    clock: AnimationClock,
    content_alpha: f32,
    window_alpha: f32,

    outcome: Option<bool>,
    selected: Option<usize>,
    license_key: String,
    show_key: bool,
    key_focused: bool,

    tweens: WidgetTweens,
    shake: Shake,
    result_reveal: f32,
    launch_progress: f32,
    blobs: BlobField,

    validation: TaskHandle<bool>,
    validation_unstarted: bool,
    launch: TaskHandle<bool>,
    launch_started: bool,

    shutting_down: bool,
    running: bool,

    drag_anchor: Option<(i32, i32)>,
    press_target: Option<PressTarget>,
    pending: Vec<UiAction>,
    requests: Vec<WindowRequest>,
}

impl Session {
    /// Builds a session in `Login`; the catalog is fetched here, once
    pub fn new(settings: Settings, backend: Backend) -> Self {
        let catalog = backend.catalog();
        tracing::info!(entries = catalog.len(), "catalog loaded");

        let motion = settings.motion;
        Self {
            phase: Phase::default(),
            clock: AnimationClock::new(),
            content_alpha: 1.0,
            window_alpha: 0.0,
            outcome: None,
            selected: None,
            license_key: String::with_capacity(KEY_CAPACITY),
            show_key: false,
            key_focused: false,
            tweens: WidgetTweens::new(&motion),
            shake: Shake::new(
                motion.shake_decay_rate,
                motion.shake_frequency,
                motion.shake_amplitude,
            ),
            result_reveal: 0.0,
            launch_progress: 0.0,
            blobs: BlobField::default(),
            validation: TaskHandle::new(TaskKind::Validation),
            validation_unstarted: false,
            launch: TaskHandle::new(TaskKind::Launch),
            launch_started: false,
            shutting_down: false,
            running: true,
            drag_anchor: None,
            press_target: None,
            pending: Vec::new(),
            requests: Vec::new(),
            settings,
            backend,
            catalog,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn content_alpha(&self) -> f32 {
        self.content_alpha
    }

    pub fn window_alpha(&self) -> f32 {
        self.window_alpha
    }

    /// Outcome of the last validation, `None` before the first one finishes
    pub fn outcome(&self) -> Option<bool> {
        self.outcome
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn license_key(&self) -> &str {
        &self.license_key
    }

    pub fn shake_level(&self) -> f32 {
        self.shake.level()
    }

    pub fn result_reveal(&self) -> f32 {
        self.result_reveal
    }

    pub fn launch_progress(&self) -> f32 {
        self.launch_progress
    }

    pub fn launch_started(&self) -> bool {
        self.launch_started
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Queues a user action for the next update step
    pub fn dispatch(&mut self, action: UiAction) {
        self.pending.push(action);
    }

    /// Appends printable characters to the license key up to `KEY_CAPACITY`
    pub fn type_text(&mut self, text: &str) {
        for c in text.chars().filter(|c| is_text_char(*c)) {
            if self.license_key.len() + c.len_utf8() > KEY_CAPACITY {
                break;
            }
            self.license_key.push(c);
        }
    }

    /// Runs one full frame: interaction, update, then drawing
    pub fn frame(&mut self, input: &FrameInput) -> Frame {
        if self.running {
            self.handle_input(input);
            self.step(input.delta_time);
        }

        let commands = if self.running {
            self.draw()
        } else {
            DrawList::new()
        };

        Frame {
            commands,
            requests: mem::take(&mut self.requests),
            running: self.running,
        }
    }

    /// The per-frame update step
    ///
    /// Queued actions are applied even when `dt` is zero; everything
    /// time-driven requires a strictly positive `dt`.
    pub fn step(&mut self, dt: f32) {
        self.apply_actions();

        if dt <= 0.0 || !self.running {
            return;
        }

        self.shake.step(dt);
        self.blobs.step(dt, self.settings.panel.panel_size);

        if self.shutting_down {
            self.window_alpha =
                (self.window_alpha - dt * self.settings.motion.window_fade_out_rate).max(0.0);
            if self.window_alpha <= 0.0 {
                self.running = false;
                tracing::info!("shutdown sequence finished");
            }
            return;
        }

        self.clock.advance(dt);
        self.window_alpha =
            (self.window_alpha + dt * self.settings.motion.window_fade_in_rate).min(1.0);
        self.update_phase(dt);
    }

    fn apply_actions(&mut self) {
        for action in mem::take(&mut self.pending) {
            if self.shutting_down {
                break;
            }
            match action {
                UiAction::Confirm => self.confirm(),
                UiAction::SelectItem(index) => self.select(index),
                UiAction::RequestClose => self.begin_shutdown("close requested"),
            }
        }
    }

    fn confirm(&mut self) {
        if self.phase != Phase::Login {
            return;
        }
        if self.license_key.is_empty() {
            tracing::debug!("empty license key rejected");
            self.shake.trigger();
            return;
        }
        self.transition(PhaseEvent::KeyConfirmed);
    }

    fn select(&mut self, index: usize) {
        if self.phase != Phase::MainMenu {
            return;
        }
        let Some(entry) = self.catalog.get(index) else {
            tracing::warn!(index, "selected index outside the catalog");
            return;
        };
        tracing::info!(index, id = entry.id, name = %entry.name, "catalog entry selected");
        self.selected = Some(index);
        self.transition(PhaseEvent::ItemSelected);
    }

    fn begin_shutdown(&mut self, reason: &'static str) {
        if !self.shutting_down {
            tracing::info!(reason, "shutdown sequence started");
            self.shutting_down = true;
            self.drag_anchor = None;
            self.press_target = None;
        }
    }

    fn transition(&mut self, event: PhaseEvent) {
        let next = StateMachine::process_event(self.phase, event);
        if next == self.phase {
            return;
        }
        tracing::info!(from = %self.phase, to = %next, "phase transition");
        self.phase = next;
        self.clock.reset_phase();
        self.enter(next);
    }

    /// Entry actions
    fn enter(&mut self, phase: Phase) {
        match phase {
            Phase::Login => {
                self.license_key.clear();
                self.key_focused = false;
            }
            // Outgoing content always fades from full opacity.
            Phase::TransitionToLoading | Phase::TransitionToMainMenu => self.content_alpha = 1.0,
            Phase::Loading => self.start_validation(),
            Phase::Result => self.result_reveal = 0.0,
            Phase::Launching => self.launch_progress = 0.0,
            _ => {}
        }
    }

    fn update_phase(&mut self, dt: f32) {
        let motion = self.settings.motion;

        if self.phase.is_transition() {
            self.content_alpha -= dt * motion.content_fade_out_rate;
            if self.content_alpha <= 0.0 {
                self.content_alpha = 0.0;
                self.transition(PhaseEvent::FadedOut);
            }
            return;
        }

        let fade_in = match self.phase {
            Phase::MainMenu | Phase::Launching => motion.menu_fade_in_rate,
            _ => motion.content_fade_in_rate,
        };
        self.content_alpha = (self.content_alpha + dt * fade_in).min(1.0);

        match self.phase {
            Phase::Loading => self.poll_validation(),
            Phase::Result => self.advance_result(dt),
            Phase::Launching => self.advance_launch(dt),
            _ => {}
        }
    }

    fn start_validation(&mut self) {
        let backend = self.backend.clone();
        let key = self.license_key.clone();
        match self.validation.start(move || backend.validate_user(&key)) {
            Ok(()) => {
                self.validation_unstarted = false;
                tracing::info!("license validation started");
            }
            Err(err) => {
                self.validation_unstarted = true;
                tracing::error!(error = %err, "license validation not started");
            }
        }
    }

    fn poll_validation(&mut self) {
        // Results are applied whenever they arrive while Loading; nothing
        // discards a result that was started for an earlier attempt.
        let poll = if mem::take(&mut self.validation_unstarted) {
            TaskPoll::Failed
        } else {
            self.validation.poll()
        };

        let success = match poll {
            TaskPoll::Ready(success) => success,
            TaskPoll::Failed => {
                tracing::warn!("license validation produced no result, treating key as rejected");
                false
            }
            TaskPoll::NotReady => return,
        };
        tracing::info!(success, "license validation finished");
        self.outcome = Some(success);
        self.transition(PhaseEvent::ValidationFinished { success });
    }

    fn advance_result(&mut self, dt: f32) {
        let motion = self.settings.motion;
        self.result_reveal += dt * motion.result_reveal_rate;

        let Some(success) = self.outcome else {
            return;
        };
        let dwell = if success {
            motion.success_dwell
        } else {
            motion.failure_dwell
        };
        if self.result_reveal > dwell {
            self.transition(PhaseEvent::ResultDwellElapsed { success });
        }
    }

    fn advance_launch(&mut self, dt: f32) {
        let motion = self.settings.motion;
        self.launch_progress += dt;

        if !self.launch_started && self.launch_progress > motion.launch_start_after {
            self.start_launch();
        }

        if self.launch_started && self.launch_progress > motion.launch_poll_after {
            match self.launch.poll() {
                TaskPoll::Ready(true) => {
                    tracing::info!("launch succeeded");
                    self.begin_shutdown("launch succeeded");
                }
                TaskPoll::Ready(false) => {
                    tracing::warn!("launch failed, staying on the launching screen");
                }
                TaskPoll::Failed => {
                    tracing::warn!("launch produced no result, staying on the launching screen");
                }
                TaskPoll::NotReady => {}
            }
        }
    }

    fn start_launch(&mut self) {
        self.launch_started = true;

        let id = match self.selected_entry() {
            Some(entry) => entry.id,
            None => {
                tracing::error!(selected = ?self.selected, "nothing selected to launch");
                return;
            }
        };

        let backend = self.backend.clone();
        match self.launch.start(move || backend.launch_item(id)) {
            Ok(()) => tracing::info!(id, "launch started"),
            Err(err) => tracing::error!(id, error = %err, "launch not started"),
        }
    }

    fn selected_entry(&self) -> Option<&CatalogEntry> {
        self.selected.and_then(|index| self.catalog.get(index))
    }

    /// Panel rectangle including the current shake offset
    fn panel_rect(&self) -> Rect {
        self.settings
            .panel
            .panel_rect()
            .translate(Vec2::new(self.shake.offset(), 0.0))
    }

    fn handle_input(&mut self, input: &FrameInput) {
        if input.close_requested {
            self.dispatch(UiAction::RequestClose);
        }
        if self.shutting_down {
            return;
        }

        let dt = input.delta_time.max(0.0);
        let panel = self.panel_rect();
        let pointer = input.pointer;
        if input.pointer_pressed {
            self.press_target = None;
        }

        let chrome = ChromeLayout::new(panel);
        let controls = self.phase.shows_window_controls();
        let minimize_hovered = controls && chrome.minimize.contains(pointer);
        let close_hovered = controls && chrome.close.contains(pointer);
        self.tweens.minimize_hover.step_toward(minimize_hovered, dt);
        self.tweens.close_hover.step_toward(close_hovered, dt);

        if self.track_press(input, PressTarget::Minimize, minimize_hovered) {
            self.requests.push(WindowRequest::Minimize);
        }
        if self.track_press(input, PressTarget::Close, close_hovered) {
            self.dispatch(UiAction::RequestClose);
        }

        let over_screen_widget = match self.phase.screen() {
            Screen::Login => self.handle_login_input(input, panel, dt),
            Screen::MainMenu => self.handle_menu_input(input, panel, dt),
            Screen::Loading | Screen::Result | Screen::Launching => {
                self.settle_widgets(dt);
                false
            }
        };

        let over_widget = minimize_hovered || close_hovered || over_screen_widget;
        self.handle_drag(input, panel, over_widget);

        if !input.pointer_down {
            self.press_target = None;
        }
    }

    /// Records a press on `target` and reports a release that completes it
    fn track_press(&mut self, input: &FrameInput, target: PressTarget, hovered: bool) -> bool {
        if input.pointer_pressed && hovered {
            self.press_target = Some(target);
        }
        input.pointer_released && hovered && self.press_target == Some(target)
    }

    fn handle_login_input(&mut self, input: &FrameInput, panel: Rect, dt: f32) -> bool {
        let layout = LoginLayout::new(panel);
        let pointer = input.pointer;
        let over_eye = layout.eye.contains(pointer);
        let over_button = layout.button.contains(pointer);

        if input.pointer_pressed {
            self.key_focused = layout.input.contains(pointer) && !over_eye;
        }
        if self.track_press(input, PressTarget::Eye, over_eye) {
            self.show_key = !self.show_key;
        }

        // The key is frozen once confirmed; it is read when Loading starts.
        if self.key_focused && self.phase == Phase::Login {
            self.type_text(&input.text);
            for key in &input.keys {
                match key {
                    Key::Backspace => {
                        self.license_key.pop();
                    }
                    Key::Enter => self.dispatch(UiAction::Confirm),
                    Key::Escape => self.key_focused = false,
                    Key::Tab => {}
                }
            }
        }

        self.tweens.key_focus.step_toward(self.key_focused, dt);
        self.step_button(over_button, input.pointer_down, dt);

        if self.track_press(input, PressTarget::Confirm, over_button) {
            self.dispatch(UiAction::Confirm);
        }

        layout.is_interactive(pointer)
    }

    fn handle_menu_input(&mut self, input: &FrameInput, panel: Rect, dt: f32) -> bool {
        if self.catalog.is_empty() {
            self.settle_widgets(dt);
            return false;
        }

        let layout = MenuLayout::new(panel);
        let over_button = layout.button.contains(input.pointer);
        self.tweens.key_focus.step_toward(false, dt);
        self.step_button(over_button, input.pointer_down, dt);

        if self.track_press(input, PressTarget::Launch, over_button) {
            self.dispatch(UiAction::SelectItem(0));
        }
        over_button
    }

    fn step_button(&mut self, hovered: bool, pointer_down: bool, dt: f32) {
        self.tweens.button_hover.step_toward(hovered, dt);
        self.tweens.button_click.step_toward(hovered && pointer_down, dt);
    }

    fn settle_widgets(&mut self, dt: f32) {
        self.tweens.key_focus.step_toward(false, dt);
        self.step_button(false, false, dt);
    }

    /// Drags the host window while the pointer is held on bare panel area
    fn handle_drag(&mut self, input: &FrameInput, panel: Rect, over_widget: bool) {
        if !input.pointer_down {
            self.drag_anchor = None;
            return;
        }

        let Some((last_x, last_y)) = self.drag_anchor else {
            if input.pointer_pressed && !over_widget && panel.contains(input.pointer) {
                self.drag_anchor = Some(input.screen_pointer);
            }
            return;
        };

        let (x, y) = input.screen_pointer;
        let (dx, dy) = (x - last_x, y - last_y);
        if dx != 0 || dy != 0 {
            self.requests.push(WindowRequest::MoveBy { dx, dy });
            self.drag_anchor = Some((x, y));
        }
    }

    fn draw(&self) -> DrawList {
        let mut list = DrawList::new();
        let motion = &self.settings.motion;
        let panel_config = &self.settings.panel;
        let panel = self.panel_rect();
        let window_alpha = motion.window_easing.apply(self.window_alpha);

        let mut ui = Ui::new(&mut list, window_alpha);
        ui.glass_background(panel, panel_config);
        ui.blobs(panel, &self.blobs, panel_config);
        ui.glass_border(panel, panel_config);
        if self.phase.shows_window_controls() {
            ui.chrome(
                &ChromeLayout::new(panel),
                self.tweens.minimize_hover.value(),
                self.tweens.close_hover.value(),
            );
        }

        ui.set_alpha(window_alpha * self.content_alpha.clamp(0.0, 1.0));
        match self.phase.screen() {
            Screen::Login => screens::draw_login(
                &mut ui,
                panel,
                &LoginView {
                    key: &self.license_key,
                    show_key: self.show_key,
                    key_focused: self.key_focused,
                    key_focus: self.tweens.key_focus.value(),
                    button: self.tweens.button(),
                },
            ),
            Screen::Loading => {
                screens::draw_loading(&mut ui, panel, self.clock.time(), motion.spinner_speed)
            }
            Screen::Result => screens::draw_result(
                &mut ui,
                panel,
                self.outcome.unwrap_or(false),
                self.result_reveal,
            ),
            Screen::MainMenu => screens::draw_main_menu(
                &mut ui,
                panel,
                &MenuView {
                    entry: self.catalog.get(0),
                    button: self.tweens.button(),
                },
            ),
            Screen::Launching => screens::draw_launching(
                &mut ui,
                panel,
                &LaunchView {
                    entry: self.selected_entry(),
                    progress: self.launch_progress,
                    bar_cycle: motion.launch_bar_cycle,
                },
            ),
        }

        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::IconRef;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    const DT: f32 = 1.0 / 60.0;

    #[derive(Default, Clone)]
    struct Calls {
        keys: Arc<Mutex<Vec<String>>>,
        launches: Arc<Mutex<Vec<i32>>>,
    }

    fn one_entry() -> Catalog {
        Catalog::new(vec![CatalogEntry::new(
            "FPS Boost",
            IconRef::new("software"),
            0,
        )])
    }

    fn backend(accept: bool, launch_ok: bool, catalog: Catalog, calls: &Calls) -> Backend {
        let keys = Arc::clone(&calls.keys);
        let launches = Arc::clone(&calls.launches);
        Backend::new(
            move |key| {
                keys.lock().unwrap().push(key.to_owned());
                accept
            },
            move || catalog.clone(),
            move |id| {
                launches.lock().unwrap().push(id);
                launch_ok
            },
        )
    }

    fn session(accept: bool, launch_ok: bool, calls: &Calls) -> Session {
        Session::new(
            Settings::default(),
            backend(accept, launch_ok, one_entry(), calls),
        )
    }

    /// Steps idle frames until `done`, returning the distinct phases visited
    fn run_until(session: &mut Session, max_frames: usize, done: impl Fn(&Session) -> bool) -> Vec<Phase> {
        let mut visited = vec![session.phase()];
        for _ in 0..max_frames {
            if done(session) {
                return visited;
            }
            if matches!(session.phase(), Phase::Loading | Phase::Launching) {
                // Give the worker thread a chance to deliver.
                thread::sleep(Duration::from_millis(1));
            }
            session.frame(&FrameInput::idle(DT));
            if visited.last() != Some(&session.phase()) {
                visited.push(session.phase());
            }
        }
        panic!("condition not reached in {max_frames} frames, visited {visited:?}");
    }

    fn click(session: &mut Session, point: Vec2) -> Vec<WindowRequest> {
        let mut requests = session
            .frame(&FrameInput {
                pointer: point,
                pointer_down: true,
                pointer_pressed: true,
                ..FrameInput::idle(DT)
            })
            .requests;
        requests.extend(
            session
                .frame(&FrameInput {
                    pointer: point,
                    pointer_released: true,
                    ..FrameInput::idle(DT)
                })
                .requests,
        );
        requests
    }

    fn signed_in(session: &mut Session) {
        session.type_text("ABC123");
        session.dispatch(UiAction::Confirm);
        run_until(session, 2_000, |s| s.phase() == Phase::MainMenu);
    }

    fn panel() -> Rect {
        Settings::default().panel.panel_rect()
    }

    #[test]
    fn successful_validation_reaches_main_menu() {
        let calls = Calls::default();
        let mut session = session(true, true, &calls);
        session.type_text("ABC123");
        session.dispatch(UiAction::Confirm);

        let visited = run_until(&mut session, 2_000, |s| s.phase() == Phase::MainMenu);
        assert_eq!(
            visited,
            vec![
                Phase::Login,
                Phase::TransitionToLoading,
                Phase::Loading,
                Phase::TransitionFromLoading,
                Phase::Result,
                Phase::TransitionToMainMenu,
                Phase::MainMenu,
            ]
        );
        assert_eq!(*calls.keys.lock().unwrap(), vec!["ABC123".to_owned()]);
        assert_eq!(session.outcome(), Some(true));
    }

    #[test]
    fn success_dwell_is_shorter_than_failure_dwell() {
        let frames_in_result = |accept: bool| {
            let mut session = session(accept, true, &Calls::default());
            session.type_text("KEY");
            session.dispatch(UiAction::Confirm);
            run_until(&mut session, 2_000, |s| s.phase() == Phase::Result);
            let mut frames = 0;
            while session.phase() == Phase::Result {
                session.frame(&FrameInput::idle(DT));
                frames += 1;
            }
            frames
        };

        // Reveal grows at 1.5/s: T2 = 1.5 is one second, T1 = 2.0 is 4/3 s.
        let success = frames_in_result(true);
        let failure = frames_in_result(false);
        assert!((59..=62).contains(&success), "success dwell took {success} frames");
        assert!((79..=82).contains(&failure), "failure dwell took {failure} frames");
    }

    #[test]
    fn empty_key_shakes_and_stays_on_login() {
        let mut session = session(true, true, &Calls::default());
        session.dispatch(UiAction::Confirm);
        session.step(0.0);

        assert_eq!(session.phase(), Phase::Login);
        assert_eq!(session.shake_level(), Shake::MAX);

        let duration = Shake::MAX / session.settings().motion.shake_decay_rate;
        let mut elapsed = 0.0;
        while session.shake_level() > 0.0 {
            session.step(DT);
            elapsed += DT;
            assert!(elapsed <= duration + DT, "shake outlived its duration");
        }
        assert_eq!(session.phase(), Phase::Login);
    }

    #[test]
    fn rejected_key_returns_to_login_with_key_cleared() {
        let calls = Calls::default();
        let mut session = session(false, true, &calls);
        session.type_text("WRONG-KEY");
        session.dispatch(UiAction::Confirm);

        let visited = run_until(&mut session, 2_000, |s| {
            s.phase() == Phase::Login && s.outcome().is_some()
        });
        assert_eq!(
            visited,
            vec![
                Phase::Login,
                Phase::TransitionToLoading,
                Phase::Loading,
                Phase::TransitionFromLoading,
                Phase::Result,
                Phase::TransitionToLogin,
                Phase::Login,
            ]
        );
        assert_eq!(session.outcome(), Some(false));
        assert_eq!(session.license_key(), "");
    }

    #[test]
    fn selecting_entry_launches_once_then_shuts_down() {
        let calls = Calls::default();
        let mut session = session(true, true, &calls);
        signed_in(&mut session);

        click(&mut session, MenuLayout::new(panel()).button.center());
        assert!(matches!(
            session.phase(),
            Phase::TransitionToLaunching | Phase::Launching
        ));
        assert_eq!(session.selected(), Some(0));

        run_until(&mut session, 1_000, |s| s.phase() == Phase::Launching);
        assert!(!session.launch_started());

        run_until(&mut session, 1_000, |s| s.is_shutting_down());
        assert!(session.launch_progress() > session.settings().motion.launch_poll_after);

        let mut last_alpha = session.window_alpha();
        let mut frames = 0;
        while session.is_running() {
            session.frame(&FrameInput::idle(DT));
            assert!(session.window_alpha() <= last_alpha);
            last_alpha = session.window_alpha();
            frames += 1;
            assert!(frames < 1_000, "shutdown did not finish");
        }

        assert_eq!(session.window_alpha(), 0.0);
        assert_eq!(*calls.launches.lock().unwrap(), vec![0]);
    }

    #[test]
    fn failed_launch_stays_on_launching_screen() {
        let calls = Calls::default();
        let mut session = session(true, false, &calls);
        signed_in(&mut session);
        session.dispatch(UiAction::SelectItem(0));

        run_until(&mut session, 1_000, |s| s.phase() == Phase::Launching);
        run_until(&mut session, 1_000, |s| s.launch_progress() > 3.0);

        assert_eq!(session.phase(), Phase::Launching);
        assert!(session.is_running());
        assert!(!session.is_shutting_down());
        assert_eq!(*calls.launches.lock().unwrap(), vec![0]);
    }

    #[test]
    fn empty_catalog_offers_nothing_to_launch() {
        let calls = Calls::default();
        let mut session = Session::new(
            Settings::default(),
            backend(true, true, Catalog::default(), &calls),
        );
        signed_in(&mut session);

        click(&mut session, MenuLayout::new(panel()).button.center());
        session.dispatch(UiAction::SelectItem(0));
        let frame = session.frame(&FrameInput::idle(DT));

        assert_eq!(session.phase(), Phase::MainMenu);
        assert!(frame.commands.texts().any(|t| t == screens::EMPTY_CATALOG_TEXT));
    }

    #[test]
    fn close_request_is_irreversible() {
        let mut session = session(true, true, &Calls::default());
        run_until(&mut session, 200, |s| s.window_alpha() >= 1.0);

        click(&mut session, ChromeLayout::new(panel()).close.center());
        assert!(session.is_shutting_down());

        session.type_text("ABC123");
        let mut last_alpha = session.window_alpha();
        while session.is_running() {
            session.dispatch(UiAction::Confirm);
            let frame = session.frame(&FrameInput::idle(DT));
            assert!(session.window_alpha() <= last_alpha);
            assert_eq!(session.phase(), Phase::Login);
            last_alpha = session.window_alpha();
            assert_eq!(frame.running, session.is_running());
        }

        let frame = session.frame(&FrameInput::idle(DT));
        assert!(!frame.running);
        assert!(frame.commands.is_empty());
    }

    #[test]
    fn typing_into_focused_field_and_enter_confirms() {
        let mut session = session(true, true, &Calls::default());
        let layout = LoginLayout::new(panel());

        session.frame(&FrameInput {
            text: "AB".into(),
            ..FrameInput::idle(DT)
        });
        assert_eq!(session.license_key(), "", "unfocused field ignores text");

        click(&mut session, layout.input.center());
        session.frame(&FrameInput {
            text: "AB\u{7}C".into(),
            keys: vec![Key::Backspace],
            ..FrameInput::idle(DT)
        });
        assert_eq!(session.license_key(), "AB");

        session.frame(&FrameInput {
            keys: vec![Key::Enter],
            ..FrameInput::idle(DT)
        });
        assert_eq!(session.phase(), Phase::TransitionToLoading);
    }

    #[test]
    fn eye_toggle_reveals_key() {
        let mut session = session(true, true, &Calls::default());
        session.type_text("SECRET");

        let masked = session.frame(&FrameInput::idle(DT));
        assert!(masked.commands.texts().any(|t| t == "******"));

        click(&mut session, LoginLayout::new(panel()).eye.center());
        let revealed = session.frame(&FrameInput::idle(DT));
        assert!(revealed.commands.texts().any(|t| t == "SECRET"));
    }

    #[test]
    fn key_is_capped_at_capacity() {
        let mut boundary = session(true, true, &Calls::default());
        let mut session = session(true, true, &Calls::default());
        session.type_text(&"K".repeat(100));
        assert_eq!(session.license_key().len(), KEY_CAPACITY);

        boundary.type_text(&format!("{}XY", "K".repeat(62)));
        assert_eq!(boundary.license_key().len(), 63);
        assert!(boundary.license_key().ends_with('X'));
    }

    #[test]
    fn dragging_bare_panel_moves_window() {
        let mut session = session(true, true, &Calls::default());
        let bare = LoginLayout::new(panel()).logo.center();

        let requests = session
            .frame(&FrameInput {
                pointer: bare,
                screen_pointer: (500, 500),
                pointer_down: true,
                pointer_pressed: true,
                ..FrameInput::idle(DT)
            })
            .requests;
        assert!(requests.is_empty());

        let requests = session
            .frame(&FrameInput {
                pointer: bare,
                screen_pointer: (510, 495),
                pointer_down: true,
                ..FrameInput::idle(DT)
            })
            .requests;
        assert_eq!(requests, vec![WindowRequest::MoveBy { dx: 10, dy: -5 }]);
    }

    #[test]
    fn pressing_a_widget_does_not_drag() {
        let mut session = session(true, true, &Calls::default());
        let button = LoginLayout::new(panel()).button.center();

        session.frame(&FrameInput {
            pointer: button,
            screen_pointer: (500, 500),
            pointer_down: true,
            pointer_pressed: true,
            ..FrameInput::idle(DT)
        });
        let frame = session.frame(&FrameInput {
            pointer: button,
            screen_pointer: (540, 540),
            pointer_down: true,
            ..FrameInput::idle(DT)
        });
        assert!(frame.requests.is_empty());
    }

    #[test]
    fn minimize_button_requests_minimize() {
        let mut session = session(true, true, &Calls::default());
        let requests = click(&mut session, ChromeLayout::new(panel()).minimize.center());
        assert_eq!(requests, vec![WindowRequest::Minimize]);
        assert!(session.is_running());
    }

    #[test]
    fn window_fades_in_and_login_is_drawn() {
        let mut session = session(true, true, &Calls::default());
        assert_eq!(session.window_alpha(), 0.0);

        let frame = session.frame(&FrameInput::idle(DT));
        assert!(session.window_alpha() > 0.0);
        assert!(frame.running);
        assert!(frame.commands.texts().any(|t| t == screens::LOGIN_TITLE));

        run_until(&mut session, 200, |s| s.window_alpha() >= 1.0);
        assert_eq!(session.phase(), Phase::Login);
    }

    #[test]
    fn validator_that_dies_without_result_counts_as_rejection() {
        struct Bomb;
        impl Drop for Bomb {
            fn drop(&mut self) {
                panic!("panic payload exploded on drop");
            }
        }

        let backend = Backend::new(
            |_: &str| -> bool { std::panic::panic_any(Bomb) },
            one_entry,
            |_| true,
        );
        let mut session = Session::new(Settings::default(), backend);
        session.type_text("ABC123");
        session.dispatch(UiAction::Confirm);

        let visited = run_until(&mut session, 2_000, |s| {
            s.phase() == Phase::Login && s.outcome().is_some()
        });
        assert!(visited.contains(&Phase::Result));
        assert_eq!(session.outcome(), Some(false));
        assert_eq!(session.license_key(), "");
    }

    #[test]
    fn confirm_after_a_rejection_fades_from_full_opacity() {
        let mut session = session(false, true, &Calls::default());
        session.type_text("WRONG-KEY");
        session.dispatch(UiAction::Confirm);
        run_until(&mut session, 2_000, |s| {
            s.phase() == Phase::Login && s.outcome().is_some()
        });
        assert!(session.content_alpha() < 0.1);

        session.type_text("ABC123");
        session.dispatch(UiAction::Confirm);
        session.frame(&FrameInput::idle(DT));

        assert_eq!(session.phase(), Phase::TransitionToLoading);
        let expected = 1.0 - DT * Settings::default().motion.content_fade_out_rate;
        assert!((session.content_alpha() - expected).abs() < 1e-4);
    }

    #[test]
    fn press_elsewhere_released_over_confirm_does_nothing() {
        let mut session = session(true, true, &Calls::default());
        session.type_text("ABC123");
        let layout = LoginLayout::new(panel());

        session.frame(&FrameInput {
            pointer: layout.logo.center(),
            pointer_down: true,
            pointer_pressed: true,
            ..FrameInput::idle(DT)
        });
        session.frame(&FrameInput {
            pointer: layout.button.center(),
            pointer_released: true,
            ..FrameInput::idle(DT)
        });
        for _ in 0..10 {
            session.frame(&FrameInput::idle(DT));
        }

        assert_eq!(session.phase(), Phase::Login);
        assert_eq!(session.license_key(), "ABC123");
        assert_eq!(session.shake_level(), 0.0);
    }

    #[test]
    fn drag_ending_over_close_keeps_window_open() {
        let mut session = session(true, true, &Calls::default());
        let bare = LoginLayout::new(panel()).logo.center();
        let close = ChromeLayout::new(panel()).close.center();

        session.frame(&FrameInput {
            pointer: bare,
            screen_pointer: (500, 500),
            pointer_down: true,
            pointer_pressed: true,
            ..FrameInput::idle(DT)
        });
        session.frame(&FrameInput {
            pointer: close,
            screen_pointer: (520, 500),
            pointer_down: true,
            ..FrameInput::idle(DT)
        });
        let frame = session.frame(&FrameInput {
            pointer: close,
            screen_pointer: (520, 500),
            pointer_released: true,
            ..FrameInput::idle(DT)
        });

        assert!(frame.requests.is_empty());
        assert!(!session.is_shutting_down());
        assert!(session.is_running());
    }

    #[test]
    fn press_leaving_and_returning_to_confirm_still_fires() {
        let mut session = session(true, true, &Calls::default());
        session.type_text("ABC123");
        let layout = LoginLayout::new(panel());

        session.frame(&FrameInput {
            pointer: layout.button.center(),
            pointer_down: true,
            pointer_pressed: true,
            ..FrameInput::idle(DT)
        });
        session.frame(&FrameInput {
            pointer: layout.logo.center(),
            pointer_down: true,
            ..FrameInput::idle(DT)
        });
        session.frame(&FrameInput {
            pointer: layout.button.center(),
            pointer_released: true,
            ..FrameInput::idle(DT)
        });
        session.frame(&FrameInput::idle(DT));

        assert_eq!(session.phase(), Phase::TransitionToLoading);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn zero_delta_frames_never_change_phase(warmup in 0usize..300, idle in 1usize..50) {
            let mut session = session(true, true, &Calls::default());
            session.type_text("ABC123");
            session.dispatch(UiAction::Confirm);
            session.step(0.0);

            for _ in 0..warmup {
                session.frame(&FrameInput::idle(DT));
            }

            let phase = session.phase();
            let content = session.content_alpha();
            for _ in 0..idle {
                session.frame(&FrameInput::idle(0.0));
                prop_assert_eq!(session.phase(), phase);
                prop_assert_eq!(session.content_alpha(), content);
            }
        }

        #[test]
        fn zero_delta_frames_freeze_launch_and_shutdown(
            launch_ok in any::<bool>(),
            warmup in 0usize..260,
            idle in 1usize..30,
        ) {
            let mut session = session(true, launch_ok, &Calls::default());
            signed_in(&mut session);
            session.dispatch(UiAction::SelectItem(0));
            for _ in 0..warmup {
                session.frame(&FrameInput::idle(DT));
            }

            let phase = session.phase();
            let content = session.content_alpha();
            let window = session.window_alpha();
            let progress = session.launch_progress();
            let started = session.launch_started();
            let shutting_down = session.is_shutting_down();
            let running = session.is_running();
            for _ in 0..idle {
                thread::sleep(Duration::from_millis(1));
                session.frame(&FrameInput::idle(0.0));
                prop_assert_eq!(session.phase(), phase);
                prop_assert_eq!(session.content_alpha(), content);
                prop_assert_eq!(session.window_alpha(), window);
                prop_assert_eq!(session.launch_progress(), progress);
                prop_assert_eq!(session.launch_started(), started);
                prop_assert_eq!(session.is_shutting_down(), shutting_down);
                prop_assert_eq!(session.is_running(), running);
            }
        }

        #[test]
        fn failed_round_trip_always_clears_key(key in "[A-Za-z0-9-]{1,63}") {
            let mut session = session(false, true, &Calls::default());
            session.type_text(&key);
            session.dispatch(UiAction::Confirm);

            run_until(&mut session, 2_000, |s| s.phase() == Phase::TransitionToLogin);
            prop_assert_eq!(session.license_key(), key.as_str());

            run_until(&mut session, 2_000, |s| s.phase() == Phase::Login);
            prop_assert_eq!(session.license_key(), "");
        }
    }
}
