//! Render surface capability and an in-memory element model.

use std::collections::BTreeSet;
use std::fmt;

use crate::markup::HostMarkup;

/// Marker class on the active slide and the active dot.
pub const ACTIVE_CLASS: &str = "active";
/// Additional marker class on the active dot.
pub const DOT_ACTIVE_CLASS: &str = "slider-counter__link--active";
/// Marker class on the autoplay toggle while autoplay is disabled.
pub const AUTOPLAY_PAUSED_CLASS: &str = "slideshow__autoplay--paused";

/// Visual-state operations a carousel performs on its host.
///
/// The controller only calls the dot, counter and toggle methods for
/// elements the host declares.
pub trait RenderSurface {
    fn set_slide_active(&mut self, index: usize, active: bool);
    fn set_dot_active(&mut self, index: usize, active: bool);
    fn set_current_text(&mut self, text: &str);
    fn set_total_text(&mut self, text: &str);
    fn set_autoplay_paused(&mut self, paused: bool);
}

/// A single element: its class list and text content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    classes: BTreeSet<String>,
    text: String,
}

impl Element {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn toggle_class(&mut self, class: &str, on: bool) {
        if on {
            self.classes.insert(class.to_string());
        } else {
            self.classes.remove(class);
        }
    }
}

/// Element model of one host, mirroring the class/text contract of the
/// page markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassListSurface {
    slides: Vec<Element>,
    dots: Vec<Element>,
    current: Option<Element>,
    total: Option<Element>,
    autoplay_button: Option<Element>,
}

impl ClassListSurface {
    pub fn for_markup(host: &HostMarkup) -> Self {
        Self {
            slides: vec![Element::default(); host.slides],
            dots: vec![Element::default(); host.dots],
            current: host.current_counter.then(Element::default),
            total: host.total_counter.then(Element::default),
            autoplay_button: host.autoplay_button.then(Element::default),
        }
    }

    pub fn slides(&self) -> &[Element] {
        &self.slides
    }

    pub fn dots(&self) -> &[Element] {
        &self.dots
    }

    /// Indices of slides currently carrying the active class.
    pub fn active_slides(&self) -> Vec<usize> {
        marked(&self.slides, ACTIVE_CLASS)
    }

    /// Indices of dots currently carrying the dot-active class.
    pub fn active_dots(&self) -> Vec<usize> {
        marked(&self.dots, DOT_ACTIVE_CLASS)
    }

    pub fn current_text(&self) -> Option<&str> {
        self.current.as_ref().map(Element::text)
    }

    pub fn total_text(&self) -> Option<&str> {
        self.total.as_ref().map(Element::text)
    }

    pub fn autoplay_paused(&self) -> Option<bool> {
        self.autoplay_button
            .as_ref()
            .map(|b| b.has_class(AUTOPLAY_PAUSED_CLASS))
    }
}

fn marked(elements: &[Element], class: &str) -> Vec<usize> {
    elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.has_class(class))
        .map(|(i, _)| i)
        .collect()
}

impl RenderSurface for ClassListSurface {
    fn set_slide_active(&mut self, index: usize, active: bool) {
        if let Some(slide) = self.slides.get_mut(index) {
            slide.toggle_class(ACTIVE_CLASS, active);
        }
    }

    fn set_dot_active(&mut self, index: usize, active: bool) {
        if let Some(dot) = self.dots.get_mut(index) {
            dot.toggle_class(ACTIVE_CLASS, active);
            dot.toggle_class(DOT_ACTIVE_CLASS, active);
        }
    }

    fn set_current_text(&mut self, text: &str) {
        if let Some(el) = self.current.as_mut() {
            el.text = text.to_string();
        }
    }

    fn set_total_text(&mut self, text: &str) {
        if let Some(el) = self.total.as_mut() {
            el.text = text.to_string();
        }
    }

    fn set_autoplay_paused(&mut self, paused: bool) {
        if let Some(el) = self.autoplay_button.as_mut() {
            el.toggle_class(AUTOPLAY_PAUSED_CLASS, paused);
        }
    }
}

/// One-line view, e.g. `[ ][#][ ][ ] 2/4 (o)[*][ ][ ] ||`.
impl fmt::Display for ClassListSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slide in &self.slides {
            let mark = if slide.has_class(ACTIVE_CLASS) { '#' } else { ' ' };
            write!(f, "[{mark}]")?;
        }
        if self.current.is_some() || self.total.is_some() {
            write!(
                f,
                " {}/{}",
                self.current_text().unwrap_or("-"),
                self.total_text().unwrap_or("-")
            )?;
        }
        if !self.dots.is_empty() {
            f.write_str(" (o)")?;
            for dot in &self.dots {
                let mark = if dot.has_class(DOT_ACTIVE_CLASS) { '*' } else { ' ' };
                write!(f, "[{mark}]")?;
            }
        }
        if let Some(paused) = self.autoplay_paused() {
            f.write_str(if paused { " ||" } else { " >" })?;
        }
        Ok(())
    }
}
