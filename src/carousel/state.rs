use crate::scheduler::TimerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayState {
    Running,
    Stopped,
}

/// Index bookkeeping and autoplay ownership for one carousel.
///
/// `current_index < slide_count` always holds; `slide_count >= 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselState {
    current_index: usize,
    slide_count: usize,
    autoplay_enabled: bool,
    autoplay_handle: Option<TimerId>,
}

impl CarouselState {
    pub fn new(slide_count: usize, autoplay_enabled: bool) -> Self {
        Self {
            current_index: 0,
            slide_count: slide_count.max(1),
            autoplay_enabled,
            autoplay_handle: None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub fn autoplay_enabled(&self) -> bool {
        self.autoplay_enabled
    }

    pub fn autoplay_handle(&self) -> Option<TimerId> {
        self.autoplay_handle
    }

    pub fn autoplay_state(&self) -> AutoplayState {
        if self.autoplay_handle.is_some() {
            AutoplayState::Running
        } else {
            AutoplayState::Stopped
        }
    }

    pub fn clamp(&self, index: usize) -> usize {
        index.min(self.slide_count - 1)
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.slide_count
    }

    pub fn next_index(&self) -> usize {
        (self.current_index + 1) % self.slide_count
    }

    pub fn prev_index(&self) -> usize {
        (self.current_index + self.slide_count - 1) % self.slide_count
    }

    /// Clamps and stores `index`, returning the stored value.
    pub(crate) fn set_current(&mut self, index: usize) -> usize {
        self.current_index = self.clamp(index);
        self.current_index
    }

    pub(crate) fn set_autoplay_enabled(&mut self, enabled: bool) {
        self.autoplay_enabled = enabled;
    }

    /// Takes the live timer, leaving none armed.
    pub(crate) fn take_handle(&mut self) -> Option<TimerId> {
        self.autoplay_handle.take()
    }

    /// Callers must have taken the previous handle first.
    pub(crate) fn install_handle(&mut self, id: TimerId) {
        debug_assert!(self.autoplay_handle.is_none(), "timer already armed");
        self.autoplay_handle = Some(id);
    }
}
