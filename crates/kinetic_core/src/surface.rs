//! Headless animation surface
//!
//! The surface is the only shared mutable resource between the rendering
//! layer and the animation layer. Ownership is split by property:
//!
//! - The rendering layer creates/removes elements, sets text and layout rects
//! - The animation layer writes [`Property`] values (transform, opacity, height)
//!
//! The surface also owns the window state (viewport size, scroll offset) and
//! every event listener, so listener leaks are observable through
//! [`Surface::listener_count`] and [`Surface::total_listener_count`].
//!
//! Everything runs on one thread; `Surface` is a cheap `Rc` handle. Event
//! dispatch snapshots the handler list and releases the internal borrow
//! before invoking handlers, so handlers may freely call back into the
//! surface (add/remove listeners, write styles, scroll).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, Key, SlotMap};
use smallvec::SmallVec;

use crate::error::{Result, SurfaceError};
use crate::events::{Event, EventTarget, EventType, KeyCode};

new_key_type! {
    /// Handle to an element on the surface
    pub struct ElementId;
    /// Handle to a registered event listener
    pub struct ListenerId;
}

impl ElementId {
    /// Stable numeric form used in snapshots
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }
}

// ============================================================================
// Style
// ============================================================================

/// CSS overflow behavior of a container
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Auto,
}

/// Properties the animation layer is allowed to write
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Opacity,
    /// Horizontal translation in px
    X,
    /// Vertical translation in px
    Y,
    Scale,
    /// Rotation around Z in degrees
    Rotation,
    /// Rotation around X in degrees (3D tilt)
    RotationX,
    /// Explicit height in px
    Height,
}

impl Property {
    pub const ALL: [Property; 7] = [
        Property::Opacity,
        Property::X,
        Property::Y,
        Property::Scale,
        Property::Rotation,
        Property::RotationX,
        Property::Height,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Property::Opacity => "opacity",
            Property::X => "x",
            Property::Y => "y",
            Property::Scale => "scale",
            Property::Rotation => "rotation",
            Property::RotationX => "rotationX",
            Property::Height => "height",
        }
    }
}

/// Inline style of an element
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    pub opacity: f32,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub rotation: f32,
    pub rotation_x: f32,
    /// Explicit height; `None` means the natural (layout) height
    pub height: Option<f32>,
    /// Trailing inline margin, in em
    pub margin_right_em: f32,
    pub overflow: Overflow,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation: 0.0,
            rotation_x: 0.0,
            height: None,
            margin_right_em: 0.0,
            overflow: Overflow::Visible,
        }
    }
}

impl ElementStyle {
    /// Read a property; `natural_height` backs `Height` when no explicit height is set
    pub fn get(&self, property: Property, natural_height: f32) -> f32 {
        match property {
            Property::Opacity => self.opacity,
            Property::X => self.x,
            Property::Y => self.y,
            Property::Scale => self.scale,
            Property::Rotation => self.rotation,
            Property::RotationX => self.rotation_x,
            Property::Height => self.height.unwrap_or(natural_height),
        }
    }

    pub fn set(&mut self, property: Property, value: f32) {
        match property {
            Property::Opacity => self.opacity = value,
            Property::X => self.x = value,
            Property::Y => self.y = value,
            Property::Scale => self.scale = value,
            Property::Rotation => self.rotation = value,
            Property::RotationX => self.rotation_x = value,
            Property::Height => self.height = Some(value),
        }
    }

    /// True when nothing has moved the element away from its resting state
    pub fn is_identity(&self) -> bool {
        self.opacity == 1.0
            && self.x == 0.0
            && self.y == 0.0
            && self.scale == 1.0
            && self.rotation == 0.0
            && self.rotation_x == 0.0
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Layout box in document coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.bottom()
    }
}

/// Browser viewport size
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

// ============================================================================
// Internal State
// ============================================================================

/// Listener callback
pub type ListenerFn = Rc<dyn Fn(&mut Event)>;

struct ElementNode {
    tag: String,
    text: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    style: ElementStyle,
    rect: Rect,
}

struct ListenerEntry {
    target: EventTarget,
    event_type: EventType,
    handler: ListenerFn,
}

struct SurfaceInner {
    elements: SlotMap<ElementId, ElementNode>,
    listeners: SlotMap<ListenerId, ListenerEntry>,
    root: ElementId,
    body: ElementId,
    viewport: Viewport,
    scroll_y: f32,
}

impl SurfaceInner {
    fn document_height(&self) -> f32 {
        self.elements
            .values()
            .map(|e| e.rect.bottom())
            .fold(self.viewport.height, f32::max)
    }

    fn max_scroll(&self) -> f32 {
        (self.document_height() - self.viewport.height).max(0.0)
    }

    fn is_scroll_blocked(&self) -> bool {
        [self.root, self.body].iter().any(|id| {
            self.elements
                .get(*id)
                .map(|e| e.style.overflow == Overflow::Hidden)
                .unwrap_or(false)
        })
    }
}

// ============================================================================
// Surface
// ============================================================================

/// Shared handle to the headless document
#[derive(Clone)]
pub struct Surface {
    inner: Rc<RefCell<SurfaceInner>>,
}

/// Non-owning surface handle for use inside listeners
#[derive(Clone)]
pub struct WeakSurface {
    inner: Weak<RefCell<SurfaceInner>>,
}

impl WeakSurface {
    pub fn upgrade(&self) -> Option<Surface> {
        self.inner.upgrade().map(|inner| Surface { inner })
    }
}

impl Surface {
    /// Create a document with its two root scrolling containers (`html`, `body`)
    pub fn new(viewport: Viewport) -> Self {
        let mut elements = SlotMap::with_key();
        let root = elements.insert(ElementNode {
            tag: "html".to_string(),
            text: None,
            parent: None,
            children: Vec::new(),
            style: ElementStyle {
                overflow: Overflow::Auto,
                ..Default::default()
            },
            rect: Rect::new(0.0, 0.0, viewport.width, viewport.height),
        });
        let body = elements.insert(ElementNode {
            tag: "body".to_string(),
            text: None,
            parent: Some(root),
            children: Vec::new(),
            style: ElementStyle {
                overflow: Overflow::Auto,
                ..Default::default()
            },
            rect: Rect::new(0.0, 0.0, viewport.width, viewport.height),
        });
        elements[root].children.push(body);

        Self {
            inner: Rc::new(RefCell::new(SurfaceInner {
                elements,
                listeners: SlotMap::with_key(),
                root,
                body,
                viewport,
                scroll_y: 0.0,
            })),
        }
    }

    pub fn downgrade(&self) -> WeakSurface {
        WeakSurface {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// The `html` element
    pub fn root(&self) -> ElementId {
        self.inner.borrow().root
    }

    /// The `body` element
    pub fn body(&self) -> ElementId {
        self.inner.borrow().body
    }

    // =========================================================================
    // Structure (rendering layer)
    // =========================================================================

    /// Create an element under `parent` (the body when `None`)
    pub fn create_element(&self, tag: &str, parent: Option<ElementId>) -> ElementId {
        let mut inner = self.inner.borrow_mut();
        let parent = parent
            .filter(|p| inner.elements.contains_key(*p))
            .unwrap_or(inner.body);
        let id = inner.elements.insert(ElementNode {
            tag: tag.to_string(),
            text: None,
            parent: Some(parent),
            children: Vec::new(),
            style: ElementStyle::default(),
            rect: Rect::default(),
        });
        inner.elements[parent].children.push(id);
        id
    }

    /// Remove an element, its subtree, and every listener attached to them
    pub fn remove_element(&self, id: ElementId) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if !inner.elements.contains_key(id) {
            return Err(SurfaceError::NotMounted(id));
        }
        if id == inner.root || id == inner.body {
            return Err(SurfaceError::RootContainer(id));
        }

        let mut doomed: SmallVec<[ElementId; 16]> = SmallVec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = inner.elements.get(next) {
                stack.extend(node.children.iter().copied());
            }
            doomed.push(next);
        }

        let parent = inner.elements[id].parent;
        if let Some(parent) = parent {
            if let Some(parent) = inner.elements.get_mut(parent) {
                parent.children.retain(|c| *c != id);
            }
        }
        for element in &doomed {
            inner.elements.remove(*element);
        }
        inner.listeners.retain(|_, l| match l.target {
            EventTarget::Element(e) => !doomed.contains(&e),
            _ => true,
        });

        tracing::trace!("surface: removed {} element(s)", doomed.len());
        Ok(())
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.inner.borrow().elements.contains_key(id)
    }

    /// Fail with [`SurfaceError::NotMounted`] if the element is missing
    pub fn require(&self, id: ElementId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(SurfaceError::NotMounted(id))
        }
    }

    pub fn tag(&self, id: ElementId) -> Option<String> {
        self.inner.borrow().elements.get(id).map(|e| e.tag.clone())
    }

    pub fn set_text(&self, id: ElementId, text: &str) -> bool {
        match self.inner.borrow_mut().elements.get_mut(id) {
            Some(element) => {
                element.text = Some(text.to_string());
                true
            }
            None => false,
        }
    }

    pub fn text(&self, id: ElementId) -> Option<String> {
        self.inner
            .borrow()
            .elements
            .get(id)
            .and_then(|e| e.text.clone())
    }

    /// Clear an element's own text (children are untouched)
    pub fn clear_text(&self, id: ElementId) {
        if let Some(element) = self.inner.borrow_mut().elements.get_mut(id) {
            element.text = None;
        }
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.inner
            .borrow()
            .elements
            .get(id)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.inner.borrow().elements.get(id).and_then(|e| e.parent)
    }

    pub fn set_rect(&self, id: ElementId, rect: Rect) -> bool {
        match self.inner.borrow_mut().elements.get_mut(id) {
            Some(element) => {
                element.rect = rect;
                true
            }
            None => false,
        }
    }

    /// Layout box in document coordinates (ignores transforms)
    pub fn rect(&self, id: ElementId) -> Option<Rect> {
        self.inner.borrow().elements.get(id).map(|e| e.rect)
    }

    /// Layout box relative to the current viewport
    pub fn bounding_client_rect(&self, id: ElementId) -> Option<Rect> {
        let inner = self.inner.borrow();
        let scroll_y = inner.scroll_y;
        inner.elements.get(id).map(|e| Rect {
            y: e.rect.y - scroll_y,
            ..e.rect
        })
    }

    // =========================================================================
    // Style (animation layer)
    // =========================================================================

    pub fn style(&self, id: ElementId) -> Option<ElementStyle> {
        self.inner.borrow().elements.get(id).map(|e| e.style)
    }

    /// Mutate an element's style; returns false if the element is gone
    pub fn update_style<F>(&self, id: ElementId, f: F) -> bool
    where
        F: FnOnce(&mut ElementStyle),
    {
        match self.inner.borrow_mut().elements.get_mut(id) {
            Some(element) => {
                f(&mut element.style);
                true
            }
            None => false,
        }
    }

    pub fn read_property(&self, id: ElementId, property: Property) -> Option<f32> {
        self.inner
            .borrow()
            .elements
            .get(id)
            .map(|e| e.style.get(property, e.rect.height))
    }

    pub fn write_property(&self, id: ElementId, property: Property, value: f32) -> bool {
        self.update_style(id, |style| style.set(property, value))
    }

    // =========================================================================
    // Window
    // =========================================================================

    pub fn viewport(&self) -> Viewport {
        self.inner.borrow().viewport
    }

    /// Resize the viewport and notify `Resize` listeners on the window
    pub fn set_viewport(&self, width: f32, height: f32) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.viewport = Viewport::new(width, height);
            let max = inner.max_scroll();
            inner.scroll_y = inner.scroll_y.min(max);
        }
        self.dispatch(EventTarget::Window, Event::resize(width, height));
    }

    pub fn scroll_y(&self) -> f32 {
        self.inner.borrow().scroll_y
    }

    pub fn document_height(&self) -> f32 {
        self.inner.borrow().document_height()
    }

    pub fn max_scroll(&self) -> f32 {
        self.inner.borrow().max_scroll()
    }

    /// True while root or body has `overflow: hidden`
    pub fn is_scroll_blocked(&self) -> bool {
        self.inner.borrow().is_scroll_blocked()
    }

    /// Programmatic scroll (ignores overflow, like `window.scrollTo`)
    pub fn scroll_to(&self, y: f32) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let clamped = y.clamp(0.0, inner.max_scroll());
            let changed = clamped != inner.scroll_y;
            inner.scroll_y = clamped;
            changed
        };
        if changed {
            let y = self.scroll_y();
            self.dispatch(EventTarget::Window, Event::scroll(y));
        }
    }

    // =========================================================================
    // User Input
    // =========================================================================

    /// Simulate a mouse wheel; returns true if the page scrolled
    pub fn user_wheel(&self, delta_y: f32) -> bool {
        self.user_scroll(Event::wheel(delta_y), delta_y)
    }

    /// Simulate a touch drag; returns true if the page scrolled
    pub fn user_touch_move(&self, delta_y: f32) -> bool {
        self.user_scroll(Event::touch_move(delta_y), delta_y)
    }

    /// Simulate a key press; returns true if the page scrolled
    pub fn user_key(&self, key: KeyCode) -> bool {
        let (viewport, scroll_y, max) = {
            let inner = self.inner.borrow();
            (inner.viewport, inner.scroll_y, inner.max_scroll())
        };
        let delta = match key {
            KeyCode::ArrowDown => 40.0,
            KeyCode::ArrowUp => -40.0,
            KeyCode::PageDown | KeyCode::Space => viewport.height * 0.9,
            KeyCode::PageUp => -viewport.height * 0.9,
            KeyCode::Home => -scroll_y,
            KeyCode::End => max - scroll_y,
            _ => 0.0,
        };
        self.user_scroll(Event::key_down(key), delta)
    }

    fn user_scroll(&self, event: Event, delta_y: f32) -> bool {
        let mut event = event;
        self.dispatch_into(EventTarget::Document, &mut event);
        self.dispatch_into(EventTarget::Window, &mut event);

        if event.default_prevented() || self.is_scroll_blocked() || delta_y == 0.0 {
            return false;
        }
        let before = self.scroll_y();
        self.scroll_to(before + delta_y);
        self.scroll_y() != before
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    pub fn add_listener<F>(&self, target: EventTarget, event_type: EventType, handler: F) -> ListenerId
    where
        F: Fn(&mut Event) + 'static,
    {
        self.inner.borrow_mut().listeners.insert(ListenerEntry {
            target,
            event_type,
            handler: Rc::new(handler),
        })
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().listeners.remove(id).is_some()
    }

    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow().listeners.contains_key(id)
    }

    /// Number of listeners attached to `target`
    pub fn listener_count(&self, target: EventTarget) -> usize {
        self.inner
            .borrow()
            .listeners
            .values()
            .filter(|l| l.target == target)
            .count()
    }

    /// Number of listeners of one type attached to `target`
    pub fn listener_count_of(&self, target: EventTarget, event_type: EventType) -> usize {
        self.inner
            .borrow()
            .listeners
            .values()
            .filter(|l| l.target == target && l.event_type == event_type)
            .count()
    }

    pub fn total_listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Dispatch an event to listeners on `target`, returning it afterwards
    pub fn dispatch(&self, target: EventTarget, event: Event) -> Event {
        let mut event = event;
        self.dispatch_into(target, &mut event);
        event
    }

    fn dispatch_into(&self, target: EventTarget, event: &mut Event) {
        let handlers: SmallVec<[(ListenerId, ListenerFn); 8]> = {
            let inner = self.inner.borrow();
            inner
                .listeners
                .iter()
                .filter(|(_, l)| l.target == target && l.event_type == event.event_type)
                .map(|(id, l)| (id, Rc::clone(&l.handler)))
                .collect()
        };

        for (id, handler) in handlers {
            // A previous handler in this dispatch may have detached this one
            if self.has_listener(id) {
                handler(event);
            }
        }
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    pub fn snapshot(&self) -> SurfaceSnapshot {
        let inner = self.inner.borrow();
        let mut elements = Vec::with_capacity(inner.elements.len());
        let mut stack = vec![inner.root];
        while let Some(id) = stack.pop() {
            if let Some(node) = inner.elements.get(id) {
                elements.push(ElementSnapshot {
                    id: id.to_raw(),
                    tag: node.tag.clone(),
                    text: node.text.clone(),
                    rect: node.rect,
                    style: node.style,
                });
                stack.extend(node.children.iter().rev().copied());
            }
        }
        SurfaceSnapshot {
            viewport: inner.viewport,
            scroll_y: inner.scroll_y,
            listeners: inner.listeners.len(),
            elements,
        }
    }
}

/// Serializable view of one element
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub id: u64,
    pub tag: String,
    pub text: Option<String>,
    pub rect: Rect,
    pub style: ElementStyle,
}

/// Serializable view of the whole surface, in document order
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    pub viewport: Viewport,
    pub scroll_y: f32,
    pub listeners: usize,
    pub elements: Vec<ElementSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn tall_surface() -> (Surface, ElementId) {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let section = surface.create_element("section", None);
        surface.set_rect(section, Rect::new(0.0, 0.0, 1280.0, 3000.0));
        (surface, section)
    }

    #[test]
    fn test_remove_element_drops_subtree_and_listeners() {
        let (surface, section) = tall_surface();
        let child = surface.create_element("p", Some(section));
        surface.add_listener(EventTarget::Element(child), EventType::Click, |_| {});
        surface.add_listener(EventTarget::Window, EventType::Scroll, |_| {});

        surface.remove_element(section).unwrap();

        assert!(!surface.contains(child));
        assert_eq!(surface.listener_count(EventTarget::Element(child)), 0);
        assert_eq!(surface.total_listener_count(), 1);
        assert!(!surface.write_property(child, Property::Opacity, 0.0));
        assert_eq!(
            surface.remove_element(section),
            Err(SurfaceError::NotMounted(section))
        );
    }

    #[test]
    fn test_root_containers_are_protected() {
        let (surface, _) = tall_surface();
        let body = surface.body();
        assert_eq!(
            surface.remove_element(body),
            Err(SurfaceError::RootContainer(body))
        );
    }

    #[test]
    fn test_height_reads_natural_height_until_set() {
        let (surface, section) = tall_surface();
        assert_eq!(surface.read_property(section, Property::Height), Some(3000.0));
        surface.write_property(section, Property::Height, 0.0);
        assert_eq!(surface.read_property(section, Property::Height), Some(0.0));
    }

    #[test]
    fn test_user_wheel_scrolls_and_clamps() {
        let (surface, _) = tall_surface();
        assert!(surface.user_wheel(500.0));
        assert_eq!(surface.scroll_y(), 500.0);
        surface.user_wheel(10_000.0);
        assert_eq!(surface.scroll_y(), 2200.0);
        assert!(!surface.user_wheel(10.0));
    }

    #[test]
    fn test_prevented_input_does_not_scroll() {
        let (surface, _) = tall_surface();
        surface.add_listener(EventTarget::Window, EventType::Wheel, |e| e.prevent_default());

        assert!(!surface.user_wheel(200.0));
        assert_eq!(surface.scroll_y(), 0.0);
        assert!(surface.user_key(KeyCode::PageDown));
        assert_eq!(surface.scroll_y(), 720.0);
    }

    #[test]
    fn test_hidden_overflow_blocks_user_scroll() {
        let (surface, _) = tall_surface();
        let body = surface.body();
        surface.update_style(body, |s| s.overflow = Overflow::Hidden);

        assert!(!surface.user_touch_move(300.0));
        assert!(!surface.user_key(KeyCode::Space));

        // Programmatic scrolling still works
        surface.scroll_to(300.0);
        assert_eq!(surface.scroll_y(), 300.0);
    }

    #[test]
    fn test_scroll_event_reports_offset() {
        let (surface, _) = tall_surface();
        let seen = Rc::new(Cell::new(0.0));
        let seen_in = Rc::clone(&seen);
        surface.add_listener(EventTarget::Window, EventType::Scroll, move |e| {
            seen_in.set(e.delta_y)
        });

        surface.scroll_to(640.0);
        assert_eq!(seen.get(), 640.0);
    }

    #[test]
    fn test_handler_can_detach_listeners_reentrantly() {
        let (surface, _) = tall_surface();
        let weak = surface.downgrade();
        let calls = Rc::new(Cell::new(0));
        let calls_in = Rc::clone(&calls);
        let id = Rc::new(Cell::new(None::<ListenerId>));
        let id_in = Rc::clone(&id);
        let listener = surface.add_listener(EventTarget::Window, EventType::Resize, move |_| {
            calls_in.set(calls_in.get() + 1);
            if let (Some(surface), Some(id)) = (weak.upgrade(), id_in.get()) {
                surface.remove_listener(id);
            }
        });
        id.set(Some(listener));

        surface.set_viewport(1024.0, 768.0);
        surface.set_viewport(800.0, 600.0);
        assert_eq!(calls.get(), 1);
        assert_eq!(surface.total_listener_count(), 0);
    }

    #[test]
    fn test_bounding_client_rect_tracks_scroll() {
        let (surface, section) = tall_surface();
        let card = surface.create_element("div", Some(section));
        surface.set_rect(card, Rect::new(0.0, 1200.0, 300.0, 200.0));
        surface.scroll_to(1000.0);
        assert_eq!(surface.bounding_client_rect(card).unwrap().y, 200.0);
    }

    #[test]
    fn test_snapshot_in_document_order() {
        let (surface, section) = tall_surface();
        let a = surface.create_element("h1", Some(section));
        surface.set_text(a, "Hello");
        let snapshot = surface.snapshot();
        let tags: Vec<_> = snapshot.elements.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["html", "body", "section", "h1"]);
        assert_eq!(snapshot.elements[3].text.as_deref(), Some("Hello"));
    }
}
