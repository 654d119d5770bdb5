//! Event types dispatched through the surface
//!
//! Mirrors the subset of browser input that the choreographies care about:
//! scroll-capable input (wheel, touch, keys), pointer tracking for hover
//! effects, clicks for accordions, and window scroll/resize notifications.

use crate::surface::ElementId;

/// Where a listener is attached
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The browser window (scroll, resize, and bubbled input)
    Window,
    /// The document (input bubbles here before reaching the window)
    Document,
    /// A single element
    Element(ElementId),
}

/// Kind of event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Wheel,
    TouchMove,
    KeyDown,
    PointerEnter,
    PointerLeave,
    PointerMove,
    Click,
    Scroll,
    Resize,
}

/// Keyboard keys relevant to scrolling and activation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Home,
    End,
    Space,
    Enter,
    Escape,
    Tab,
    Char(char),
}

impl KeyCode {
    /// Returns true if the browser would scroll the page for this key
    pub fn scrolls(&self) -> bool {
        matches!(
            self,
            KeyCode::ArrowUp
                | KeyCode::ArrowDown
                | KeyCode::PageUp
                | KeyCode::PageDown
                | KeyCode::Home
                | KeyCode::End
                | KeyCode::Space
        )
    }
}

/// A dispatched event
///
/// Handlers receive `&mut Event` and may call [`Event::prevent_default`] to
/// cancel the browser's default action (for input events, the scroll).
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub event_type: EventType,
    /// Pointer position in viewport coordinates
    pub pointer: Option<(f32, f32)>,
    pub key: Option<KeyCode>,
    /// Vertical scroll delta for wheel/touch input, or scroll offset for `Scroll`
    pub delta_y: f32,
    /// New viewport size for `Resize`
    pub size: Option<(f32, f32)>,
    default_prevented: bool,
}

impl Event {
    fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            pointer: None,
            key: None,
            delta_y: 0.0,
            size: None,
            default_prevented: false,
        }
    }

    pub fn wheel(delta_y: f32) -> Self {
        Self {
            delta_y,
            ..Self::new(EventType::Wheel)
        }
    }

    pub fn touch_move(delta_y: f32) -> Self {
        Self {
            delta_y,
            ..Self::new(EventType::TouchMove)
        }
    }

    pub fn key_down(key: KeyCode) -> Self {
        Self {
            key: Some(key),
            ..Self::new(EventType::KeyDown)
        }
    }

    pub fn pointer_enter(x: f32, y: f32) -> Self {
        Self {
            pointer: Some((x, y)),
            ..Self::new(EventType::PointerEnter)
        }
    }

    pub fn pointer_leave(x: f32, y: f32) -> Self {
        Self {
            pointer: Some((x, y)),
            ..Self::new(EventType::PointerLeave)
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self {
            pointer: Some((x, y)),
            ..Self::new(EventType::PointerMove)
        }
    }

    pub fn click(x: f32, y: f32) -> Self {
        Self {
            pointer: Some((x, y)),
            ..Self::new(EventType::Click)
        }
    }

    pub fn scroll(scroll_y: f32) -> Self {
        Self {
            delta_y: scroll_y,
            ..Self::new(EventType::Scroll)
        }
    }

    pub fn resize(width: f32, height: f32) -> Self {
        Self {
            size: Some((width, height)),
            ..Self::new(EventType::Resize)
        }
    }

    /// Cancel the default action for this event
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_keys() {
        assert!(KeyCode::Space.scrolls());
        assert!(KeyCode::PageDown.scrolls());
        assert!(KeyCode::End.scrolls());
        assert!(!KeyCode::Enter.scrolls());
        assert!(!KeyCode::Char('a').scrolls());
    }

    #[test]
    fn test_prevent_default() {
        let mut event = Event::wheel(120.0);
        assert!(!event.default_prevented());
        event.prevent_default();
        assert!(event.default_prevented());
        assert_eq!(event.delta_y, 120.0);
    }
}
