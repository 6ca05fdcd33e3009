//! Keyboard events relevant to the overlay
//!
//! Only a handful of editing and confirmation keys matter; printable text
//! arrives separately as characters.

/// Keys the overlay reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Backspace,
    Escape,
    Tab,
}

impl Key {
    /// Convert a Windows virtual key code to a Key
    pub fn from_vk_code(vk_code: u32) -> Option<Self> {
        match vk_code {
            0x0D => Some(Key::Enter),
            0x08 => Some(Key::Backspace),
            0x1B => Some(Key::Escape),
            0x09 => Some(Key::Tab),
            _ => None,
        }
    }
}

/// Returns true for characters accepted into the license key field
///
/// Control characters are delivered as `Key`s instead.
pub fn is_text_char(c: char) -> bool {
    !c.is_control()
}
