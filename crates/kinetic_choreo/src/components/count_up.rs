//! Count-up number
//!
//! Writes an eased count from `from` to `to` into an element's text, with
//! thousands separators and a fixed number of decimals. By default the count
//! starts once, the first time the element scrolls into view.

use std::cell::Cell;
use std::rc::Rc;

use kinetic_animation::{
    Anchor, AnimationHandle, Easing, ScrollPosition, ScrollTriggerConfig, Tween, TweenVars,
};
use kinetic_core::ElementId;

use crate::error::Result;
use crate::hook::ChoreoContext;

#[derive(Clone, Debug, PartialEq)]
pub struct CountUpOptions {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub decimals: usize,
    pub separator: Option<char>,
    pub prefix: String,
    pub suffix: String,
    pub ease: Easing,
    /// Wait until the element enters the viewport
    pub start_on_view: bool,
}

impl Default for CountUpOptions {
    fn default() -> Self {
        Self {
            from: 0.0,
            to: 0.0,
            duration: 2.0,
            decimals: 0,
            separator: Some(','),
            prefix: String::new(),
            suffix: String::new(),
            ease: Easing::EXPO_OUT,
            start_on_view: true,
        }
    }
}

impl CountUpOptions {
    pub fn to(value: f32) -> Self {
        Self {
            to: value,
            ..Default::default()
        }
    }

    fn format(&self, value: f32) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            format_number(value, self.decimals, self.separator),
            self.suffix
        )
    }
}

pub struct CountUp {
    element: ElementId,
    handle: Option<AnimationHandle>,
    value: Rc<Cell<f32>>,
}

impl CountUp {
    pub fn mount(ctx: &ChoreoContext, element: ElementId, options: CountUpOptions) -> Result<Self> {
        ctx.surface.require(element)?;
        ctx.surface.set_text(element, &options.format(options.from));
        let value = Rc::new(Cell::new(options.from));

        let current = Rc::clone(&value);
        let surface = ctx.surface.downgrade();
        let (from, to, ease) = (options.from, options.to, options.ease);
        let start_on_view = options.start_on_view;
        let mut tween = Tween::to(&[], TweenVars::new())
            .duration(options.duration)
            .ease(Easing::LINEAR)
            .on_update(move |progress| {
                let next = from + (to - from) * ease.apply(progress);
                current.set(next);
                if let Some(surface) = surface.upgrade() {
                    surface.set_text(element, &options.format(next));
                }
            });
        if start_on_view {
            tween = tween.scroll_trigger(
                ScrollTriggerConfig::new(element)
                    .start(ScrollPosition::edge(Anchor::Top, Anchor::Percent(90.0)))
                    .once(true),
            );
        }

        let handle = ctx.utils.play(tween)?;
        tracing::trace!("count up: mounted on {:?} ({} -> {})", element, from, to);
        Ok(Self {
            element,
            handle: Some(handle),
            value,
        })
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    /// The value last written to the element
    pub fn value(&self) -> f32 {
        self.value.get()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_active()).unwrap_or(false)
    }

    pub fn dispose(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.kill();
        }
    }
}

impl Drop for CountUp {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Format with `decimals` places and `separator` between thousands
pub fn format_number(value: f32, decimals: usize, separator: Option<char>) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };
    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');

    let mut out = String::with_capacity(formatted.len() + integer.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    let len = integer.len();
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            if let Some(separator) = separator {
                out.push(separator);
            }
        }
        out.push(digit);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChoreoConfig;
    use kinetic_animation::AnimationEngine;
    use kinetic_core::{Rect, Surface, Viewport};

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567.0, 0, Some(',')), "1,234,567");
        assert_eq!(format_number(1234.5, 2, Some(',')), "1,234.50");
        assert_eq!(format_number(999.0, 0, Some(',')), "999");
        assert_eq!(format_number(-1500.0, 0, Some(' ')), "-1 500");
        assert_eq!(format_number(1500.0, 0, None), "1500");
        assert_eq!(format_number(-0.001, 1, None), "0.0");
    }

    #[test]
    fn test_counts_when_scrolled_into_view() {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let page = surface.create_element("main", None);
        surface.set_rect(page, Rect::new(0.0, 0.0, 1280.0, 4000.0));
        let stat = surface.create_element("span", Some(page));
        surface.set_rect(stat, Rect::new(0.0, 1600.0, 200.0, 80.0));
        let engine = AnimationEngine::new(surface.clone());
        let ctx = ChoreoContext::new(engine.handle(), ChoreoConfig::default()).unwrap();

        let counter = CountUp::mount(
            &ctx,
            stat,
            CountUpOptions {
                suffix: "+".to_string(),
                ..CountUpOptions::to(2500.0)
            },
        )
        .unwrap();
        assert_eq!(surface.text(stat).as_deref(), Some("0+"));

        engine.advance(1.0);
        assert_eq!(counter.value(), 0.0);

        surface.scroll_to(1000.0);
        engine.advance(0.0);
        engine.advance(1.0);
        assert!(counter.value() > 0.0 && counter.value() < 2500.0);
        engine.advance(1.5);
        assert_eq!(surface.text(stat).as_deref(), Some("2,500+"));
        // Spent observer: scrolling back does not restart
        assert_eq!(engine.observer_count(), 0);
    }

    #[test]
    fn test_immediate_count_and_dispose() {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let stat = surface.create_element("span", None);
        let engine = AnimationEngine::new(surface.clone());
        let ctx = ChoreoContext::new(engine.handle(), ChoreoConfig::default()).unwrap();

        let mut counter = CountUp::mount(
            &ctx,
            stat,
            CountUpOptions {
                from: 10.0,
                to: 20.0,
                duration: 1.0,
                decimals: 1,
                ease: Easing::LINEAR,
                start_on_view: false,
                ..Default::default()
            },
        )
        .unwrap();
        engine.advance(0.5);
        assert_eq!(surface.text(stat).as_deref(), Some("15.0"));

        counter.dispose();
        assert_eq!(engine.animation_count(), 0);
        engine.advance(1.0);
        assert_eq!(surface.text(stat).as_deref(), Some("15.0"));
    }

    #[test]
    fn test_unmounted_element_is_an_error() {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let stat = surface.create_element("span", None);
        surface.remove_element(stat).unwrap();
        let engine = AnimationEngine::new(surface);
        let ctx = ChoreoContext::new(engine.handle(), ChoreoConfig::default()).unwrap();
        assert!(CountUp::mount(&ctx, stat, CountUpOptions::to(5.0)).is_err());
    }
}
