//! Input events delivered by the windowing layer

/// A discrete key-down event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Space,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Tab,
    Other,
}

impl Key {
    /// Keys that count as a bounce press: a-z, space and the arrows
    pub fn is_trigger(&self) -> bool {
        match self {
            Key::Char(c) => c.is_ascii_lowercase(),
            Key::Space | Key::Left | Key::Right | Key::Up | Key::Down => true,
            Key::Escape | Key::Tab | Key::Other => false,
        }
    }
}

/// Turns a continuously polled pointer button into one press per click
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerLatch {
    down: bool,
}

impl PointerLatch {
    /// Feed the current button state; true only on the down edge
    pub fn update(&mut self, pressed: bool) -> bool {
        let edge = pressed && !self.down;
        self.down = pressed;
        edge
    }

    pub fn is_down(&self) -> bool {
        self.down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_keys() {
        assert!(Key::Char('a').is_trigger());
        assert!(Key::Char('z').is_trigger());
        assert!(Key::Space.is_trigger());
        assert!(Key::Left.is_trigger());
        assert!(Key::Down.is_trigger());

        assert!(!Key::Char('A').is_trigger());
        assert!(!Key::Char('1').is_trigger());
        assert!(!Key::Char('é').is_trigger());
        assert!(!Key::Escape.is_trigger());
        assert!(!Key::Tab.is_trigger());
        assert!(!Key::Other.is_trigger());
    }

    #[test]
    fn test_pointer_latch_debounces_hold() {
        let mut latch = PointerLatch::default();
        assert!(latch.update(true));
        assert!(!latch.update(true));
        assert!(!latch.update(true));
        assert!(!latch.update(false));
        assert!(!latch.is_down());
        assert!(latch.update(true));
    }
}
