use std::path::Path;
use std::time::Duration;

use anyhow::{Result, ensure};
use serde::Deserialize;

use crate::error::Error;
use crate::markup::{HostMarkup, SliderElement};

/// Autoplay interval used when the slider does not specify a usable speed.
pub const DEFAULT_SPEED: Duration = Duration::from_secs(5);

/// Per-instance settings read from the slider element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselConfig {
    pub autoplay: bool,
    pub speed: Duration,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            autoplay: false,
            speed: DEFAULT_SPEED,
        }
    }
}

impl CarouselConfig {
    pub fn from_slider(slider: &SliderElement) -> Self {
        let autoplay = slider.autoplay.as_deref() == Some("true");
        let speed = slider
            .speed
            .as_deref()
            .and_then(parse_int_prefix)
            .filter(|secs| *secs > 0)
            .map(|secs| Duration::from_secs(secs.unsigned_abs()))
            .unwrap_or(DEFAULT_SPEED);
        Self { autoplay, speed }
    }

    pub fn from_markup(host: &HostMarkup) -> Self {
        host.slider
            .as_ref()
            .map(Self::from_slider)
            .unwrap_or_default()
    }

    pub fn with_speed(mut self, speed: Duration) -> Self {
        self.speed = speed;
        self
    }
}

/// Leading-integer parse of an attribute value: optional whitespace, an
/// optional sign, then digits. Anything after the digits is ignored.
fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Page description consumed by the `carousel` binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Every host found on the page, in document order.
    pub carousels: Vec<HostMarkup>,
    /// Capacity of each instance's event queue.
    pub event_queue_capacity: usize,
    /// Replaces every slider's own speed when set.
    #[serde(with = "humantime_serde")]
    pub speed_override: Option<Duration>,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.event_queue_capacity > 0,
            "event-queue-capacity must be greater than zero"
        );
        if let Some(speed) = self.speed_override {
            ensure!(!speed.is_zero(), "speed-override must be positive");
        }
        for (idx, host) in self.carousels.iter().enumerate() {
            ensure!(
                !host.id.trim().is_empty(),
                "carousels[{idx}] must have a non-empty id"
            );
            ensure!(
                !self.carousels[..idx].iter().any(|other| other.id == host.id),
                "duplicate carousel id '{}'",
                host.id
            );
        }
        Ok(self)
    }

    /// Effective per-instance settings for `host`, honoring `speed-override`.
    pub fn carousel_config(&self, host: &HostMarkup) -> CarouselConfig {
        let cfg = CarouselConfig::from_markup(host);
        match self.speed_override {
            Some(speed) => cfg.with_speed(speed),
            None => cfg,
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            carousels: Vec::new(),
            event_queue_capacity: 64,
            speed_override: None,
        }
    }
}
