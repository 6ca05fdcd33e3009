//! Per-frame input snapshot
//!
//! The host window feeds raw events into an `InputCollector` as they
//! arrive; once per frame the collector is drained into a `FrameInput`
//! that the session and widgets read without further mutation.

use crate::domain::core::Vec2;
use crate::input::keyboard::{Key, is_text_char};

/// Raw events produced by a host window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    /// Pointer moved; window-local and screen coordinates
    PointerMoved { local: Vec2, screen: (i32, i32) },
    PointerDown,
    PointerUp,
    Char(char),
    KeyDown(Key),
    /// The OS asked the window to close
    CloseRequested,
}

/// Input state for one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameInput {
    pub delta_time: f32,
    pub pointer: Vec2,
    pub screen_pointer: (i32, i32),
    pub pointer_down: bool,
    /// Pointer went down during this frame
    pub pointer_pressed: bool,
    /// Pointer went up during this frame
    pub pointer_released: bool,
    pub text: String,
    pub keys: Vec<Key>,
    pub close_requested: bool,
}

impl FrameInput {
    /// An input frame carrying only elapsed time
    pub fn idle(delta_time: f32) -> Self {
        Self {
            delta_time,
            // Keep the idle pointer away from every widget.
            pointer: Vec2::new(-1.0, -1.0),
            ..Self::default()
        }
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }
}

/// Accumulates raw events between frames
#[derive(Debug, Clone, Default)]
pub struct InputCollector {
    pointer: Vec2,
    screen_pointer: (i32, i32),
    pointer_down: bool,
    pressed: bool,
    released: bool,
    text: String,
    keys: Vec<Key>,
    close_requested: bool,
}

impl InputCollector {
    pub fn new() -> Self {
        Self {
            pointer: Vec2::new(-1.0, -1.0),
            ..Self::default()
        }
    }

    pub fn feed(&mut self, event: RawInput) {
        match event {
            RawInput::PointerMoved { local, screen } => {
                self.pointer = local;
                self.screen_pointer = screen;
            }
            RawInput::PointerDown => {
                if !self.pointer_down {
                    self.pressed = true;
                }
                self.pointer_down = true;
            }
            RawInput::PointerUp => {
                if self.pointer_down {
                    self.released = true;
                }
                self.pointer_down = false;
            }
            RawInput::Char(c) => {
                if is_text_char(c) {
                    self.text.push(c);
                }
            }
            RawInput::KeyDown(key) => self.keys.push(key),
            RawInput::CloseRequested => self.close_requested = true,
        }
    }

    /// Drains per-frame edges into a snapshot; held state carries over
    pub fn take_frame(&mut self, delta_time: f32) -> FrameInput {
        FrameInput {
            delta_time,
            pointer: self.pointer,
            screen_pointer: self.screen_pointer,
            pointer_down: self.pointer_down,
            pointer_pressed: std::mem::take(&mut self.pressed),
            pointer_released: std::mem::take(&mut self.released),
            text: std::mem::take(&mut self.text),
            keys: std::mem::take(&mut self.keys),
            close_requested: std::mem::take(&mut self.close_requested),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_edges_are_reported_once() {
        let mut collector = InputCollector::new();
        collector.feed(RawInput::PointerMoved {
            local: Vec2::new(10.0, 20.0),
            screen: (110, 120),
        });
        collector.feed(RawInput::PointerDown);

        let frame = collector.take_frame(0.016);
        assert!(frame.pointer_down && frame.pointer_pressed);
        assert_eq!(frame.pointer, Vec2::new(10.0, 20.0));
        assert_eq!(frame.screen_pointer, (110, 120));

        let frame = collector.take_frame(0.016);
        assert!(frame.pointer_down && !frame.pointer_pressed);

        collector.feed(RawInput::PointerUp);
        let frame = collector.take_frame(0.016);
        assert!(!frame.pointer_down && frame.pointer_released);
    }

    #[test]
    fn text_and_keys_are_drained() {
        let mut collector = InputCollector::new();
        for c in "AB\r".chars() {
            collector.feed(RawInput::Char(c));
        }
        collector.feed(RawInput::KeyDown(Key::Enter));

        let frame = collector.take_frame(0.0);
        assert_eq!(frame.text, "AB");
        assert!(frame.key_pressed(Key::Enter));

        let frame = collector.take_frame(0.0);
        assert!(frame.text.is_empty());
        assert!(frame.keys.is_empty());
    }

    #[test]
    fn close_request_is_one_shot() {
        let mut collector = InputCollector::new();
        collector.feed(RawInput::CloseRequested);
        assert!(collector.take_frame(0.0).close_requested);
        assert!(!collector.take_frame(0.0).close_requested);
    }
}
