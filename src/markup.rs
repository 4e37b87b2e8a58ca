//! Typed description of the host markup a carousel is mounted on.
//!
//! Every control except the slides themselves is optional; a controller
//! only attaches behavior to the elements a host actually declares.

use serde::Deserialize;

/// The slider sub-element carrying the data attributes.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct SliderElement {
    pub id: String,
    /// Raw `data-autoplay` value; only `"true"` enables autoplay.
    pub autoplay: Option<String>,
    /// Raw `data-speed` value in seconds.
    pub speed: Option<String>,
}

/// One carousel host as found on a page.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct HostMarkup {
    /// Identifier used in logs and console output.
    pub id: String,
    pub slider: Option<SliderElement>,
    /// Number of slide elements.
    pub slides: usize,
    pub previous_button: bool,
    pub next_button: bool,
    /// Number of dot/index buttons.
    pub dots: usize,
    pub autoplay_button: bool,
    pub current_counter: bool,
    pub total_counter: bool,
}

impl HostMarkup {
    /// A host with `slides` slides, a slider element and every optional control,
    /// one dot per slide.
    pub fn complete(id: impl Into<String>, slides: usize) -> Self {
        let id = id.into();
        Self {
            slider: Some(SliderElement {
                id: format!("Slider-{id}"),
                autoplay: None,
                speed: None,
            }),
            id,
            slides,
            previous_button: true,
            next_button: true,
            dots: slides,
            autoplay_button: true,
            current_counter: true,
            total_counter: true,
        }
    }

    pub fn with_autoplay(mut self, speed_secs: u64) -> Self {
        let slider = self.slider.get_or_insert_with(SliderElement::default);
        slider.autoplay = Some("true".to_string());
        slider.speed = Some(speed_secs.to_string());
        self
    }
}
