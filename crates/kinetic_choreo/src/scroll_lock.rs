//! Scroll lock
//!
//! Owns every side effect of blocking document scroll: `overflow: hidden` on
//! both root containers, plus window listeners cancelling wheel, touch and
//! scroll-key input (overflow alone does not stop every input source).

use kinetic_core::{EventTarget, EventType, ListenerId, Overflow, Surface};
use smallvec::SmallVec;

pub struct ScrollLockController {
    surface: Surface,
    listeners: SmallVec<[ListenerId; 3]>,
}

impl ScrollLockController {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            listeners: SmallVec::new(),
        }
    }

    pub fn is_locked(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Block scrolling; a no-op when already locked
    pub fn lock(&mut self) {
        if self.is_locked() {
            return;
        }
        set_root_overflow(&self.surface, Overflow::Hidden);

        let surface = &self.surface;
        self.listeners.push(surface.add_listener(EventTarget::Window, EventType::Wheel, |e| {
            e.prevent_default()
        }));
        self.listeners.push(surface.add_listener(
            EventTarget::Window,
            EventType::TouchMove,
            |e| e.prevent_default(),
        ));
        self.listeners.push(surface.add_listener(EventTarget::Window, EventType::KeyDown, |e| {
            if e.key.map(|k| k.scrolls()).unwrap_or(false) {
                e.prevent_default();
            }
        }));
        tracing::debug!("scroll lock: engaged");
    }

    /// Detach the input listeners and restore `overflow: auto`
    pub fn unlock(&mut self) {
        if !self.is_locked() {
            return;
        }
        for id in self.listeners.drain(..) {
            self.surface.remove_listener(id);
        }
        set_root_overflow(&self.surface, Overflow::Auto);
        tracing::debug!("scroll lock: released");
    }

    /// Unlock and force `overflow: auto` even if this controller never locked
    pub fn restore(&mut self) {
        self.unlock();
        restore_document_scroll(&self.surface);
    }
}

impl Drop for ScrollLockController {
    fn drop(&mut self) {
        self.unlock();
    }
}

/// Set `overflow: auto` on both root containers
pub fn restore_document_scroll(surface: &Surface) {
    set_root_overflow(surface, Overflow::Auto);
}

fn set_root_overflow(surface: &Surface, overflow: Overflow) {
    for id in [surface.root(), surface.body()] {
        surface.update_style(id, |style| style.overflow = overflow);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetic_core::{KeyCode, Rect, Viewport};

    fn tall_surface() -> Surface {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let main = surface.create_element("main", None);
        surface.set_rect(main, Rect::new(0.0, 0.0, 1280.0, 4000.0));
        surface
    }

    #[test]
    fn test_lock_blocks_every_input() {
        let surface = tall_surface();
        let mut lock = ScrollLockController::new(surface.clone());
        lock.lock();

        assert!(surface.is_scroll_blocked());
        assert!(!surface.user_wheel(100.0));
        assert!(!surface.user_touch_move(100.0));
        assert!(!surface.user_key(KeyCode::PageDown));
        assert!(!surface.user_key(KeyCode::Space));
        assert_eq!(surface.scroll_y(), 0.0);
        assert_eq!(surface.listener_count(EventTarget::Window), 3);
    }

    #[test]
    fn test_input_listeners_cancel_even_without_overflow() {
        let surface = tall_surface();
        let mut lock = ScrollLockController::new(surface.clone());
        lock.lock();
        // Something else resets overflow; the listeners still hold
        restore_document_scroll(&surface);
        assert!(!surface.user_wheel(100.0));
        assert!(!surface.user_key(KeyCode::ArrowDown));
        // Non-scroll keys are not cancelled
        let event = surface.dispatch(
            EventTarget::Window,
            kinetic_core::Event::key_down(KeyCode::Char('a')),
        );
        assert!(!event.default_prevented());
    }

    #[test]
    fn test_unlock_restores_scroll() {
        let surface = tall_surface();
        let mut lock = ScrollLockController::new(surface.clone());
        lock.lock();
        lock.lock();
        assert_eq!(surface.listener_count(EventTarget::Window), 3);

        lock.unlock();
        assert!(!lock.is_locked());
        assert_eq!(surface.total_listener_count(), 0);
        assert!(surface.user_wheel(100.0));
        assert_eq!(surface.scroll_y(), 100.0);
    }

    #[test]
    fn test_drop_unlocks() {
        let surface = tall_surface();
        {
            let mut lock = ScrollLockController::new(surface.clone());
            lock.lock();
        }
        assert_eq!(surface.total_listener_count(), 0);
        assert!(!surface.is_scroll_blocked());
    }
}
