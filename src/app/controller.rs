//! Application controller and frame loop
//!
//! The controller binds a `HostWindow`, the `Session` and the `Rasterizer`.
//! Each iteration pumps host input, runs one session frame, carries out the
//! window requests the frame produced, then rasterizes and presents it.
//! The loop ends when the session finishes its shutdown sequence or the
//! host window disappears.

use std::thread;
use std::time::{Duration, Instant};

use crate::app::session::{Session, WindowRequest};
use crate::app::state::Phase;
use crate::config::ConfigError;
use crate::input::InputCollector;
use crate::platform::{HostWindow, PlatformError};
use crate::ui::renderer::{Rasterizer, RendererError};

/// Application errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Renderer error: {0}")]
    Renderer(#[from] RendererError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub final_phase: Phase,
    /// True when the session finished its shutdown sequence
    pub completed: bool,
}

pub struct AppController<W: HostWindow> {
    session: Session,
    window: W,
    rasterizer: Rasterizer,
    input: InputCollector,
    max_frame_delta: f32,
    max_frames: Option<u64>,
}

impl<W: HostWindow> AppController<W> {
    /// Frame pacing for hosts with a real clock
    pub const TARGET_FRAME_TIME: Duration = Duration::from_micros(16_667);

    pub fn new(session: Session, window: W, rasterizer: Rasterizer) -> Self {
        let max_frame_delta = session.settings().motion.max_frame_delta;
        Self {
            session,
            window,
            rasterizer,
            input: InputCollector::new(),
            max_frame_delta,
            max_frames: None,
        }
    }

    /// Stops the loop after `limit` frames even if the session keeps running
    pub fn with_max_frames(mut self, limit: u64) -> Self {
        self.max_frames = Some(limit);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    /// Runs frames until the session or the window ends
    pub fn run(&mut self) -> Result<RunSummary, AppError> {
        tracing::info!(phase = %self.session.phase(), "frame loop started");

        let mut frames: u64 = 0;
        let mut last = Instant::now();

        let completed = loop {
            if !self.window.is_open() {
                tracing::info!("host window closed");
                break false;
            }
            if self.max_frames.is_some_and(|limit| frames >= limit) {
                tracing::warn!(frames, phase = %self.session.phase(), "frame limit reached");
                break false;
            }

            let frame_start = Instant::now();
            let fixed = self.window.fixed_timestep();
            let dt = fixed.unwrap_or_else(|| frame_start.duration_since(last).as_secs_f32());
            last = frame_start;

            let running = self.tick(dt)?;
            frames += 1;
            if !running {
                break true;
            }

            if fixed.is_none() {
                let elapsed = frame_start.elapsed();
                if elapsed < Self::TARGET_FRAME_TIME {
                    thread::sleep(Self::TARGET_FRAME_TIME - elapsed);
                }
            }
        };

        self.window.close();
        let summary = RunSummary {
            frames,
            final_phase: self.session.phase(),
            completed,
        };
        tracing::info!(frames, completed, phase = %summary.final_phase, "frame loop finished");
        Ok(summary)
    }

    /// One frame; returns whether the session is still running
    pub fn tick(&mut self, dt: f32) -> Result<bool, AppError> {
        let dt = dt.clamp(0.0, self.max_frame_delta);

        self.window.pump(&mut self.input);
        let input = self.input.take_frame(dt);
        let frame = self.session.frame(&input);

        for request in &frame.requests {
            match *request {
                WindowRequest::Minimize => self.window.minimize(),
                WindowRequest::MoveBy { dx, dy } => self.window.move_by(dx, dy),
            }
        }

        if !frame.running {
            return Ok(false);
        }

        let pixmap = self.rasterizer.render(&frame.commands)?;
        self.window.present(pixmap)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::config::Settings;
    use crate::domain::catalog::{Catalog, CatalogEntry, IconRef};
    use crate::domain::core::{Rect, Vec2};
    use crate::input::Key;
    use crate::platform::{HeadlessWindow, Script};
    use crate::ui::screens::{LoginLayout, MenuLayout};
    use std::sync::{Arc, Mutex};

    fn controller(script: Script, launches: Arc<Mutex<Vec<i32>>>) -> AppController<HeadlessWindow> {
        let settings = Settings::default();
        let size = settings.panel.pixel_size();
        let backend = Backend::new(
            |key| key == "ABC123",
            || Catalog::new(vec![CatalogEntry::new("Tool", IconRef::new("software"), 7)]),
            move |id| {
                launches.lock().unwrap().push(id);
                true
            },
        );
        let session = Session::new(settings, backend);
        let window = HeadlessWindow::new(size).with_script(script);
        let rasterizer = Rasterizer::new(size.0, size.1).unwrap();
        AppController::new(session, window, rasterizer).with_max_frames(5_000)
    }

    fn panel() -> Rect {
        Settings::default().panel.panel_rect()
    }

    #[test]
    fn scripted_sign_in_and_launch_completes() {
        let launches = Arc::new(Mutex::new(Vec::new()));
        let script = Script::new((100, 100))
            .click(LoginLayout::new(panel()).input.center())
            .type_text("ABC123")
            .press(Key::Enter)
            .idle(250)
            .click(MenuLayout::new(panel()).button.center());
        let mut controller = controller(script, Arc::clone(&launches));

        let summary = controller.run().unwrap();

        assert!(summary.completed);
        assert_eq!(summary.final_phase, Phase::Launching);
        assert_eq!(*launches.lock().unwrap(), vec![7]);
        assert!(!controller.window().is_open());
        assert!(controller.window().frames_presented() > 0);
    }

    #[test]
    fn frame_limit_stops_idle_session() {
        let launches = Arc::new(Mutex::new(Vec::new()));
        let mut controller = controller(Script::new((0, 0)), launches).with_max_frames(10);

        let summary = controller.run().unwrap();
        assert!(!summary.completed);
        assert_eq!(summary.frames, 10);
        assert_eq!(summary.final_phase, Phase::Login);
        assert_eq!(controller.window().frames_presented(), 10);
    }

    #[test]
    fn close_request_ends_run() {
        let launches = Arc::new(Mutex::new(Vec::new()));
        let script = Script::new((0, 0)).idle(5).close();
        let mut controller = controller(script, Arc::clone(&launches));

        let summary = controller.run().unwrap();
        assert!(summary.completed);
        assert_eq!(summary.final_phase, Phase::Login);
        assert!(launches.lock().unwrap().is_empty());
    }

    #[test]
    fn drag_moves_host_window() {
        let launches = Arc::new(Mutex::new(Vec::new()));
        let logo = LoginLayout::new(panel()).logo.center();
        let script = Script::new((100, 100)).drag(logo, logo.add(Vec2::new(30.0, 12.0)));
        let mut controller = controller(script, launches);

        for _ in 0..3 {
            controller.tick(1.0 / 60.0).unwrap();
        }
        assert_eq!(controller.window().position(), (130, 112));
    }

    #[test]
    fn oversized_delta_is_clamped() {
        let launches = Arc::new(Mutex::new(Vec::new()));
        let mut controller = controller(Script::new((0, 0)), launches);

        controller.tick(5.0).unwrap();
        let max = controller.session().settings().motion.max_frame_delta;
        let expected = max * controller.session().settings().motion.window_fade_in_rate;
        assert!((controller.session().window_alpha() - expected.min(1.0)).abs() < 1e-5);
    }
}
