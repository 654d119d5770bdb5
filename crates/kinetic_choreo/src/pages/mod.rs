//! Page choreographies
//!
//! Each page module has three parts:
//!
//! - a `*Refs` struct of optional element ids (what the rendering layer hands
//!   over after the first paint),
//! - `render`, a small markup builder producing those elements on a surface,
//! - `choreograph`, which registers the page's callbacks on a
//!   [`ComponentScope`].
//!
//! Refs are resolved all-or-nothing per unit: if any element a unit needs is
//! missing, that unit silently does nothing.

pub mod about;
pub mod home;
pub mod services;
pub mod work;

use std::fmt;
use std::str::FromStr;

use kinetic_animation::AnimationHandle;
use kinetic_core::{ElementId, Rect, Surface, Viewport};

use crate::error::Result;
use crate::hook::{Cleanup, ComponentScope};
use crate::intro_gate::IntroGate;

// ============================================================================
// Layout
// ============================================================================

/// Geometry used by the markup builders
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageLayout {
    pub viewport: Viewport,
    /// Height of a regular content section
    pub section_height: f32,
}

impl PageLayout {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            section_height: viewport.height.max(600.0),
        }
    }

    pub fn for_surface(surface: &Surface) -> Self {
        Self::new(surface.viewport())
    }
}

/// Stacks blocks down the document
pub(crate) struct Flow<'a> {
    surface: &'a Surface,
    width: f32,
    y: f32,
}

impl<'a> Flow<'a> {
    pub(crate) fn new(surface: &'a Surface, layout: &PageLayout) -> Self {
        Self {
            surface,
            width: layout.viewport.width,
            y: 0.0,
        }
    }

    /// Next top-level block, `height` tall
    pub(crate) fn block(&mut self, tag: &str, height: f32) -> ElementId {
        let id = self.surface.create_element(tag, None);
        self.surface
            .set_rect(id, Rect::new(0.0, self.y, self.width, height));
        self.y += height;
        id
    }

    /// Element inside `parent`, `offset` below the parent's top
    pub(crate) fn child(
        &self,
        parent: ElementId,
        tag: &str,
        text: Option<&str>,
        offset: f32,
        height: f32,
    ) -> ElementId {
        let top = self.surface.rect(parent).map(|r| r.y).unwrap_or(0.0);
        let id = self.surface.create_element(tag, Some(parent));
        self.surface
            .set_rect(id, Rect::new(0.0, top + offset, self.width, height));
        if let Some(text) = text {
            self.surface.set_text(id, text);
        }
        id
    }

    /// `count` equal-height children laid out one below the other
    pub(crate) fn list(
        &self,
        parent: ElementId,
        tag: &str,
        count: usize,
        offset: f32,
        height: f32,
    ) -> Vec<ElementId> {
        (0..count)
            .map(|i| self.child(parent, tag, None, offset + i as f32 * height, height))
            .collect()
    }
}

// ============================================================================
// Ref resolution
// ============================================================================

/// All refs, if every one is mounted
pub(crate) fn mounted<const N: usize>(
    surface: &Surface,
    refs: [Option<ElementId>; N],
) -> Option<[ElementId; N]> {
    let mut ids = [ElementId::default(); N];
    for (slot, id) in ids.iter_mut().zip(refs) {
        *slot = id.filter(|id| surface.contains(*id))?;
    }
    Some(ids)
}

/// A non-empty list whose every element is mounted
pub(crate) fn mounted_list(surface: &Surface, ids: &[ElementId]) -> Option<Vec<ElementId>> {
    if ids.is_empty() || !ids.iter().all(|id| surface.contains(*id)) {
        return None;
    }
    Some(ids.to_vec())
}

/// Cleanup killing `handles` and their observers
pub(crate) fn killing(handles: Vec<AnimationHandle>) -> Cleanup {
    Box::new(move || {
        for handle in handles {
            handle.kill();
        }
    })
}

// ============================================================================
// Page registry
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageKind {
    Home,
    About,
    Work,
    Services,
}

impl PageKind {
    pub const ALL: [PageKind; 4] = [PageKind::Home, PageKind::About, PageKind::Work, PageKind::Services];

    pub fn name(&self) -> &'static str {
        match self {
            PageKind::Home => "home",
            PageKind::About => "about",
            PageKind::Work => "work",
            PageKind::Services => "services",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PageKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown page '{}' (expected home, about, work or services)", s))
    }
}

/// A rendered page with its choreographies registered
pub struct MountedPage {
    pub kind: PageKind,
    /// The home page's intro gate
    pub gate: Option<IntroGate>,
}

/// Render `kind` on the scope's surface, register its choreographies, and commit
pub fn mount(kind: PageKind, scope: &ComponentScope) -> Result<MountedPage> {
    let surface = scope.context().surface;
    let layout = PageLayout::for_surface(&surface);
    let gate = match kind {
        PageKind::Home => {
            let refs = home::render(&surface, &layout);
            Some(home::choreograph(scope, refs))
        }
        PageKind::About => {
            about::choreograph(scope, about::render(&surface, &layout));
            None
        }
        PageKind::Work => {
            work::choreograph(scope, work::render(&surface, &layout));
            None
        }
        PageKind::Services => {
            services::choreograph(scope, services::render(&surface, &layout));
            None
        }
    };
    scope.commit()?;
    tracing::info!("pages: mounted {}", kind);
    Ok(MountedPage { kind, gate })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mounted_is_all_or_nothing() {
        let surface = Surface::new(Viewport::new(800.0, 600.0));
        let a = surface.create_element("div", None);
        let b = surface.create_element("div", None);
        assert_eq!(mounted(&surface, [Some(a), Some(b)]), Some([a, b]));
        assert_eq!(mounted(&surface, [Some(a), None]), None);

        surface.remove_element(b).unwrap();
        assert_eq!(mounted(&surface, [Some(a), Some(b)]), None);
        assert_eq!(mounted_list(&surface, &[a, b]), None);
        assert_eq!(mounted_list(&surface, &[]), None);
        assert_eq!(mounted_list(&surface, &[a]), Some(vec![a]));
    }

    #[test]
    fn test_flow_stacks_blocks() {
        let surface = Surface::new(Viewport::new(800.0, 600.0));
        let layout = PageLayout::for_surface(&surface);
        let mut flow = Flow::new(&surface, &layout);
        let first = flow.block("section", 600.0);
        let second = flow.block("section", 400.0);
        let inner = flow.child(second, "h2", Some("Title"), 50.0, 80.0);
        assert_eq!(surface.rect(first).unwrap().y, 0.0);
        assert_eq!(surface.rect(second).unwrap().y, 600.0);
        assert_eq!(surface.rect(inner).unwrap().y, 650.0);
        assert_eq!(surface.document_height(), 1000.0);
    }

    #[test]
    fn test_page_names() {
        assert_eq!("Work".parse::<PageKind>(), Ok(PageKind::Work));
        assert!("contact".parse::<PageKind>().is_err());
        assert_eq!(PageKind::Services.to_string(), "services");
    }
}
