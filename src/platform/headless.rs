//! Scripted host window without a display
//!
//! Feeds a prepared list of input frames to the session and keeps the last
//! presented pixmap. Used by the non-Windows binary and by tests.

use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use tiny_skia::Pixmap;

use crate::domain::core::Vec2;
use crate::input::{InputCollector, Key, RawInput};
use crate::platform::{HostWindow, PlatformError};

/// Input events grouped by the frame they arrive in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    frames: Vec<Vec<RawInput>>,
    origin: (i32, i32),
}

impl Script {
    /// `origin` is the window's screen position, used for screen coordinates
    pub fn new(origin: (i32, i32)) -> Self {
        Self {
            frames: Vec::new(),
            origin,
        }
    }

    /// Frames without any input
    pub fn idle(mut self, frames: usize) -> Self {
        self.frames.extend((0..frames).map(|_| Vec::new()));
        self
    }

    /// Press on one frame, release on the next
    pub fn click(mut self, at: Vec2) -> Self {
        let moved = self.moved(at);
        self.frames.push(vec![moved, RawInput::PointerDown]);
        self.frames.push(vec![RawInput::PointerUp]);
        self
    }

    /// Press at `from`, move to `to` on the next frame, release on the third
    pub fn drag(mut self, from: Vec2, to: Vec2) -> Self {
        let down = self.moved(from);
        let moved = self.moved(to);
        self.frames.push(vec![down, RawInput::PointerDown]);
        self.frames.push(vec![moved]);
        self.frames.push(vec![RawInput::PointerUp]);
        self
    }

    pub fn type_text(mut self, text: &str) -> Self {
        self.frames.push(text.chars().map(RawInput::Char).collect());
        self
    }

    pub fn press(mut self, key: Key) -> Self {
        self.frames.push(vec![RawInput::KeyDown(key)]);
        self
    }

    pub fn close(mut self) -> Self {
        self.frames.push(vec![RawInput::CloseRequested]);
        self
    }

    fn moved(&self, local: Vec2) -> RawInput {
        RawInput::PointerMoved {
            local,
            screen: (
                self.origin.0 + local.x.round() as i32,
                self.origin.1 + local.y.round() as i32,
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn into_frames(self) -> Vec<Vec<RawInput>> {
        self.frames
    }
}

#[derive(Debug)]
pub struct HeadlessWindow {
    pending: VecDeque<Vec<RawInput>>,
    size: (u32, u32),
    position: (i32, i32),
    timestep: f32,
    paced: bool,
    minimized: bool,
    open: bool,
    presented: usize,
    last_frame: Option<Pixmap>,
}

impl HeadlessWindow {
    pub const DEFAULT_TIMESTEP: f32 = 1.0 / 60.0;

    pub fn new(size: (u32, u32)) -> Self {
        Self {
            pending: VecDeque::new(),
            size,
            position: (0, 0),
            timestep: Self::DEFAULT_TIMESTEP,
            paced: false,
            minimized: false,
            open: true,
            presented: 0,
            last_frame: None,
        }
    }

    pub fn with_script(mut self, script: Script) -> Self {
        self.position = script.origin;
        self.pending.extend(script.into_frames());
        self
    }

    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Sleep one timestep per frame so background work sees real time pass
    pub fn with_pacing(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    pub fn position(&self) -> (i32, i32) {
        self.position
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn frames_presented(&self) -> usize {
        self.presented
    }

    pub fn last_frame(&self) -> Option<&Pixmap> {
        self.last_frame.as_ref()
    }

    /// True once every scripted frame has been delivered
    pub fn script_finished(&self) -> bool {
        self.pending.is_empty()
    }
}

impl HostWindow for HeadlessWindow {
    fn pump(&mut self, input: &mut InputCollector) {
        if self.paced {
            thread::sleep(Duration::from_secs_f32(self.timestep.max(0.0)));
        }
        if let Some(events) = self.pending.pop_front() {
            for event in events {
                input.feed(event);
            }
        }
    }

    fn present(&mut self, pixmap: &Pixmap) -> Result<(), PlatformError> {
        let actual = (pixmap.width(), pixmap.height());
        if actual != self.size {
            return Err(PlatformError::FrameSizeMismatch {
                expected: self.size,
                actual,
            });
        }
        self.last_frame = Some(pixmap.clone());
        self.presented += 1;
        Ok(())
    }

    fn minimize(&mut self) {
        tracing::debug!("headless window minimized");
        self.minimized = true;
    }

    fn move_by(&mut self, dx: i32, dy: i32) {
        self.position = (self.position.0 + dx, self.position.1 + dy);
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn fixed_timestep(&self) -> Option<f32> {
        Some(self.timestep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_spans_two_frames() {
        let script = Script::new((100, 200)).click(Vec2::new(10.0, 20.0));
        let mut window = HeadlessWindow::new((4, 4)).with_script(script);
        let mut input = InputCollector::new();

        window.pump(&mut input);
        let frame = input.take_frame(0.016);
        assert!(frame.pointer_pressed);
        assert_eq!(frame.screen_pointer, (110, 220));

        window.pump(&mut input);
        let frame = input.take_frame(0.016);
        assert!(frame.pointer_released && !frame.pointer_down);
        assert!(window.script_finished());
    }

    #[test]
    fn typed_text_and_keys_arrive() {
        let script = Script::new((0, 0)).type_text("AB").press(Key::Enter);
        assert_eq!(script.len(), 2);
        let mut window = HeadlessWindow::new((4, 4)).with_script(script);
        let mut input = InputCollector::new();

        window.pump(&mut input);
        assert_eq!(input.take_frame(0.0).text, "AB");
        window.pump(&mut input);
        assert_eq!(input.take_frame(0.0).keys, vec![Key::Enter]);
    }

    #[test]
    fn present_checks_size_and_keeps_frame() {
        let mut window = HeadlessWindow::new((8, 8));
        let wrong = Pixmap::new(4, 4).unwrap();
        assert!(matches!(
            window.present(&wrong),
            Err(PlatformError::FrameSizeMismatch { .. })
        ));

        let right = Pixmap::new(8, 8).unwrap();
        window.present(&right).unwrap();
        assert_eq!(window.frames_presented(), 1);
        assert!(window.last_frame().is_some());
    }

    #[test]
    fn window_requests_are_tracked() {
        let mut window = HeadlessWindow::new((4, 4)).with_script(Script::new((50, 60)));
        window.move_by(5, -10);
        window.minimize();
        assert_eq!(window.position(), (55, 50));
        assert!(window.is_minimized());

        window.close();
        assert!(!window.is_open());
    }
}
