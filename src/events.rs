use crate::scheduler::TimerId;

/// Clickable controls a host may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Previous,
    Next,
    /// Dot/index button at this position.
    Dot(usize),
    AutoplayToggle,
}

/// Keyboard keys, named after DOM `KeyboardEvent.key` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Space,
    Other(String),
}

impl Key {
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            " " | "Spacebar" => Self::Space,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Everything a mounted carousel reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarouselEvent {
    Click(Control),
    PointerEnter,
    PointerLeave,
    KeyDown(Key),
    /// A recurring timer fired; ignored unless it is the live autoplay timer.
    TimerFired(TimerId),
}

/// Whether the host should still perform the event's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultAction {
    Allow,
    Prevent,
}
