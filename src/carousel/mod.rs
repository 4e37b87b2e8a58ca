//! The carousel controller.
//!
//! A [`Carousel`] owns one host's state plus the two capabilities it drives:
//! a [`RenderSurface`] for visual state and a [`Scheduler`] for autoplay.
//! All mutation goes through [`Carousel::handle`] or the navigation methods,
//! which run to completion; callers serialize events (see
//! [`crate::tasks::runner`]).

mod state;

pub use state::{AutoplayState, CarouselState};

use tracing::{debug, info, trace};

use crate::config::CarouselConfig;
use crate::events::{CarouselEvent, Control, DefaultAction, Key};
use crate::markup::HostMarkup;
use crate::scheduler::Scheduler;
use crate::surface::RenderSurface;

/// Why a host was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InertReason {
    MissingSlider,
    TooFewSlides(usize),
}

/// Outcome of mounting a host.
#[derive(Debug)]
pub enum Mount<S, T> {
    Active(Carousel<S, T>),
    /// Nothing was rendered and no listener is attached; the surface is
    /// handed back unchanged.
    Inert { reason: InertReason, surface: S },
}

impl<S, T> Mount<S, T> {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub fn active(self) -> Option<Carousel<S, T>> {
        match self {
            Self::Active(carousel) => Some(carousel),
            Self::Inert { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct Carousel<S, T> {
    host: HostMarkup,
    config: CarouselConfig,
    state: CarouselState,
    surface: S,
    scheduler: T,
}

impl<S: RenderSurface, T: Scheduler> Carousel<S, T> {
    /// Mounts `host` with the settings from its slider element.
    pub fn mount(host: &HostMarkup, surface: S, scheduler: T) -> Mount<S, T> {
        Self::mount_with_config(host, CarouselConfig::from_markup(host), surface, scheduler)
    }

    /// Hosts without a slider element or with fewer than two slides stay
    /// inert: no rendering, no timer, no listeners.
    pub fn mount_with_config(
        host: &HostMarkup,
        config: CarouselConfig,
        surface: S,
        scheduler: T,
    ) -> Mount<S, T> {
        if host.slider.is_none() {
            info!(host = %host.id, "slideshow has no slider element; not initializing");
            return Mount::Inert {
                reason: InertReason::MissingSlider,
                surface,
            };
        }
        if host.slides < 2 {
            info!(host = %host.id, slides = host.slides, "not enough slides to initialize");
            return Mount::Inert {
                reason: InertReason::TooFewSlides(host.slides),
                surface,
            };
        }

        info!(
            host = %host.id,
            slides = host.slides,
            autoplay = config.autoplay,
            speed = %humantime::format_duration(config.speed),
            "initializing slideshow"
        );
        let mut carousel = Self {
            host: host.clone(),
            config,
            state: CarouselState::new(host.slides, config.autoplay),
            surface,
            scheduler,
        };
        carousel.initialize();
        Mount::Active(carousel)
    }

    fn initialize(&mut self) {
        self.show_slide(0);
        self.update_controls();
        if self.host.total_counter {
            self.surface
                .set_total_text(&self.state.slide_count().to_string());
        }
        if self.host.current_counter {
            self.surface.set_current_text("1");
        }
        if self.state.autoplay_enabled() {
            self.start_autoplay();
        }
        debug!(host = %self.host.id, "slideshow initialized");
    }

    pub fn id(&self) -> &str {
        &self.host.id
    }

    pub fn host(&self) -> &HostMarkup {
        &self.host
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn state(&self) -> &CarouselState {
        &self.state
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    /// Activates `index` (clamped to the last slide) and refreshes the
    /// current counter. Dots are left to [`Self::update_controls`].
    pub fn show_slide(&mut self, index: usize) {
        for i in 0..self.state.slide_count() {
            self.surface.set_slide_active(i, false);
        }
        let shown = self.state.set_current(index);
        self.surface.set_slide_active(shown, true);
        if self.host.current_counter {
            self.surface.set_current_text(&(shown + 1).to_string());
        }
        debug!(host = %self.host.id, slide = shown + 1, "showing slide");
    }

    pub fn next_slide(&mut self) {
        self.show_slide(self.state.next_index());
        self.update_controls();
    }

    pub fn prev_slide(&mut self) {
        self.show_slide(self.state.prev_index());
        self.update_controls();
    }

    /// Returns `false` (and changes nothing) when `index` is out of range.
    pub fn go_to_slide(&mut self, index: usize) -> bool {
        if !self.state.contains(index) {
            trace!(host = %self.host.id, index, "ignoring out-of-range slide request");
            return false;
        }
        self.show_slide(index);
        self.update_controls();
        true
    }

    /// Converges dot markers onto the current index.
    pub fn update_controls(&mut self) {
        let current = self.state.current_index();
        for i in 0..self.host.dots {
            self.surface.set_dot_active(i, i == current);
        }
    }

    /// (Re)arms the autoplay timer; any previous timer is cancelled first.
    pub fn start_autoplay(&mut self) {
        if let Some(previous) = self.state.take_handle() {
            self.scheduler.cancel(previous);
        }
        let id = self.scheduler.arm_repeating(self.config.speed);
        self.state.install_handle(id);
        debug!(host = %self.host.id, %id, "autoplay started");
    }

    pub fn stop_autoplay(&mut self) {
        if let Some(previous) = self.state.take_handle() {
            self.scheduler.cancel(previous);
            debug!(host = %self.host.id, id = %previous, "autoplay stopped");
        }
    }

    pub fn toggle_autoplay(&mut self) {
        let enable = !self.state.autoplay_enabled();
        if enable {
            self.start_autoplay();
        } else {
            self.stop_autoplay();
        }
        self.state.set_autoplay_enabled(enable);
        if self.host.autoplay_button {
            self.surface.set_autoplay_paused(!enable);
        }
        info!(host = %self.host.id, enabled = enable, "autoplay toggled");
    }

    /// Pauses the timer without touching the enabled flag.
    pub fn pointer_enter(&mut self) {
        if self.state.autoplay_enabled() {
            self.stop_autoplay();
        }
    }

    pub fn pointer_leave(&mut self) {
        if self.state.autoplay_enabled() {
            self.start_autoplay();
        }
    }

    /// Re-arms the timer after manual navigation, even while hovered.
    fn restart_if_enabled(&mut self) {
        if self.state.autoplay_enabled() {
            self.start_autoplay();
        }
    }

    /// Dispatches one event and reports whether the host's default action
    /// for it is suppressed.
    pub fn handle(&mut self, event: CarouselEvent) -> DefaultAction {
        match event {
            CarouselEvent::Click(Control::Previous) if self.host.previous_button => {
                self.prev_slide();
                self.restart_if_enabled();
                DefaultAction::Prevent
            }
            CarouselEvent::Click(Control::Next) if self.host.next_button => {
                self.next_slide();
                self.restart_if_enabled();
                DefaultAction::Prevent
            }
            CarouselEvent::Click(Control::Dot(index)) if index < self.host.dots => {
                self.go_to_slide(index);
                self.restart_if_enabled();
                DefaultAction::Prevent
            }
            CarouselEvent::Click(Control::AutoplayToggle) if self.host.autoplay_button => {
                self.toggle_autoplay();
                DefaultAction::Prevent
            }
            CarouselEvent::Click(control) => {
                trace!(host = %self.host.id, ?control, "no such control on host");
                DefaultAction::Allow
            }
            CarouselEvent::PointerEnter => {
                self.pointer_enter();
                DefaultAction::Allow
            }
            CarouselEvent::PointerLeave => {
                self.pointer_leave();
                DefaultAction::Allow
            }
            CarouselEvent::KeyDown(Key::ArrowLeft) => {
                self.prev_slide();
                self.restart_if_enabled();
                DefaultAction::Prevent
            }
            CarouselEvent::KeyDown(Key::ArrowRight) => {
                self.next_slide();
                self.restart_if_enabled();
                DefaultAction::Prevent
            }
            CarouselEvent::KeyDown(Key::Space) => {
                self.toggle_autoplay();
                DefaultAction::Prevent
            }
            CarouselEvent::KeyDown(Key::Other(_)) => DefaultAction::Allow,
            CarouselEvent::TimerFired(id) => {
                if self.state.autoplay_handle() == Some(id) {
                    self.next_slide();
                } else {
                    trace!(host = %self.host.id, %id, "ignoring stale timer tick");
                }
                DefaultAction::Allow
            }
        }
    }

    /// Cancels any armed timer and releases the capabilities.
    pub fn dispose(mut self) -> (S, T) {
        self.stop_autoplay();
        info!(host = %self.host.id, "slideshow disposed");
        (self.surface, self.scheduler)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::scheduler::ManualScheduler;
    use crate::surface::ClassListSurface;

    type TestCarousel = Carousel<ClassListSurface, ManualScheduler>;

    fn mount(host: HostMarkup) -> TestCarousel {
        let surface = ClassListSurface::for_markup(&host);
        Carousel::mount(&host, surface, ManualScheduler::new())
            .active()
            .expect("host should activate")
    }

    /// Advances virtual time in 100 ms steps, delivering ticks as they fire.
    fn run_for(c: &mut TestCarousel, total: Duration) {
        let step = Duration::from_millis(100);
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            for id in c.scheduler_mut().advance(step) {
                c.handle(CarouselEvent::TimerFired(id));
            }
            elapsed += step;
        }
    }

    #[test]
    fn mount_renders_first_slide() {
        let c = mount(HostMarkup::complete("h", 3));
        assert_eq!(c.surface().active_slides(), vec![0]);
        assert_eq!(c.surface().active_dots(), vec![0]);
        assert_eq!(c.surface().current_text(), Some("1"));
        assert_eq!(c.surface().total_text(), Some("3"));
        assert_eq!(c.state().autoplay_state(), AutoplayState::Stopped);
        assert_eq!(c.scheduler().live_timers(), 0);
    }

    #[test]
    fn autoplay_host_starts_running() {
        let c = mount(HostMarkup::complete("h", 3).with_autoplay(2));
        assert_eq!(c.state().autoplay_state(), AutoplayState::Running);
        let id = c.state().autoplay_handle().unwrap();
        assert_eq!(c.scheduler().period(id), Some(Duration::from_secs(2)));
    }

    #[test]
    fn show_slide_clamps_without_wrapping() {
        let mut c = mount(HostMarkup::complete("h", 3));
        c.show_slide(99);
        assert_eq!(c.current_index(), 2);
        assert_eq!(c.surface().active_slides(), vec![2]);
        assert_eq!(c.surface().current_text(), Some("3"));
        // dots follow only after update_controls
        assert_eq!(c.surface().active_dots(), vec![0]);
        c.update_controls();
        c.update_controls();
        assert_eq!(c.surface().active_dots(), vec![2]);
    }

    #[test]
    fn dot_click_jumps_and_ignores_unknown_dots() {
        let mut host = HostMarkup::complete("h", 4);
        host.dots = 6;
        let mut c = mount(host);
        assert_eq!(c.handle(CarouselEvent::Click(Control::Dot(2))), DefaultAction::Prevent);
        assert_eq!(c.current_index(), 2);
        // dot 5 exists on the page but has no slide behind it
        assert_eq!(c.handle(CarouselEvent::Click(Control::Dot(5))), DefaultAction::Prevent);
        assert_eq!(c.current_index(), 2);
        // dot 9 has no listener at all
        assert_eq!(c.handle(CarouselEvent::Click(Control::Dot(9))), DefaultAction::Allow);
        assert_eq!(c.current_index(), 2);
    }

    #[test]
    fn clicks_on_absent_controls_do_nothing() {
        let mut host = HostMarkup::complete("h", 3);
        host.next_button = false;
        host.autoplay_button = false;
        let mut c = mount(host);
        assert_eq!(c.handle(CarouselEvent::Click(Control::Next)), DefaultAction::Allow);
        assert_eq!(
            c.handle(CarouselEvent::Click(Control::AutoplayToggle)),
            DefaultAction::Allow
        );
        assert_eq!(c.current_index(), 0);
        assert!(!c.state().autoplay_enabled());
        assert_eq!(c.handle(CarouselEvent::Click(Control::Previous)), DefaultAction::Prevent);
        assert_eq!(c.current_index(), 2);
    }

    #[test]
    fn keyboard_maps_to_navigation_and_toggle() {
        let mut c = mount(HostMarkup::complete("h", 3));
        assert_eq!(c.handle(CarouselEvent::KeyDown(Key::ArrowLeft)), DefaultAction::Prevent);
        assert_eq!(c.current_index(), 2);
        assert_eq!(c.handle(CarouselEvent::KeyDown(Key::ArrowRight)), DefaultAction::Prevent);
        assert_eq!(c.current_index(), 0);
        assert_eq!(c.handle(CarouselEvent::KeyDown(Key::Space)), DefaultAction::Prevent);
        assert!(c.state().autoplay_enabled());
        assert_eq!(
            c.handle(CarouselEvent::KeyDown(Key::Other("Tab".into()))),
            DefaultAction::Allow
        );
    }

    #[test]
    fn toggle_updates_paused_marker() {
        let mut c = mount(HostMarkup::complete("h", 3).with_autoplay(5));
        assert_eq!(c.surface().autoplay_paused(), Some(false));
        c.toggle_autoplay();
        assert_eq!(c.surface().autoplay_paused(), Some(true));
        assert_eq!(c.scheduler().live_timers(), 0);
        c.toggle_autoplay();
        assert_eq!(c.surface().autoplay_paused(), Some(false));
        assert_eq!(c.scheduler().live_timers(), 1);
    }

    #[test]
    fn timer_advances_slides() {
        let mut c = mount(HostMarkup::complete("h", 3).with_autoplay(1));
        run_for(&mut c, Duration::from_millis(2500));
        assert_eq!(c.current_index(), 2);
        assert_eq!(c.surface().active_dots(), vec![2]);
        run_for(&mut c, Duration::from_secs(1));
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn manual_navigation_resets_timer_phase() {
        let mut c = mount(HostMarkup::complete("h", 5).with_autoplay(1));
        run_for(&mut c, Duration::from_millis(700));
        let before = c.state().autoplay_handle();
        c.handle(CarouselEvent::Click(Control::Next));
        assert_ne!(c.state().autoplay_handle(), before);
        assert_eq!(c.current_index(), 1);
        run_for(&mut c, Duration::from_millis(700));
        assert_eq!(c.current_index(), 1, "restarted timer must not fire early");
        run_for(&mut c, Duration::from_millis(400));
        assert_eq!(c.current_index(), 2);
        assert_eq!(c.scheduler().live_timers(), 1);
    }

    #[test]
    fn navigation_while_hovered_rearms_timer() {
        let mut c = mount(HostMarkup::complete("h", 3).with_autoplay(1));
        c.handle(CarouselEvent::PointerEnter);
        assert_eq!(c.state().autoplay_state(), AutoplayState::Stopped);
        c.handle(CarouselEvent::Click(Control::Next));
        assert_eq!(c.state().autoplay_state(), AutoplayState::Running);
        assert_eq!(c.scheduler().live_timers(), 1);
        run_for(&mut c, Duration::from_millis(900));
        assert_eq!(c.current_index(), 1);
        run_for(&mut c, Duration::from_millis(100));
        assert_eq!(c.current_index(), 2);
    }

    #[test]
    fn navigation_with_autoplay_disabled_arms_nothing() {
        let mut c = mount(HostMarkup::complete("h", 3));
        c.handle(CarouselEvent::PointerEnter);
        c.handle(CarouselEvent::Click(Control::Next));
        c.handle(CarouselEvent::KeyDown(Key::ArrowLeft));
        c.handle(CarouselEvent::Click(Control::Dot(2)));
        assert_eq!(c.state().autoplay_state(), AutoplayState::Stopped);
        assert_eq!(c.scheduler().live_timers(), 0);
    }

    #[test]
    fn stale_tick_is_ignored() {
        let mut c = mount(HostMarkup::complete("h", 3).with_autoplay(1));
        let old = c.state().autoplay_handle().unwrap();
        c.start_autoplay();
        assert_eq!(c.handle(CarouselEvent::TimerFired(old)), DefaultAction::Allow);
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn stop_without_timer_is_noop() {
        let mut c = mount(HostMarkup::complete("h", 2));
        c.stop_autoplay();
        c.stop_autoplay();
        assert_eq!(c.state().autoplay_state(), AutoplayState::Stopped);
    }

    #[test]
    fn missing_counters_are_skipped() {
        let mut host = HostMarkup::complete("h", 3);
        host.current_counter = false;
        host.total_counter = false;
        host.dots = 0;
        let mut c = mount(host);
        c.next_slide();
        assert_eq!(c.surface().current_text(), None);
        assert_eq!(c.surface().total_text(), None);
        assert_eq!(c.surface().active_slides(), vec![1]);
    }

    #[test]
    fn host_without_slider_is_inert() {
        let mut host = HostMarkup::complete("h", 3);
        host.slider = None;
        let surface = ClassListSurface::for_markup(&host);
        match Carousel::mount(&host, surface.clone(), ManualScheduler::new()) {
            Mount::Inert { reason, surface: back } => {
                assert_eq!(reason, InertReason::MissingSlider);
                assert_eq!(back, surface);
            }
            Mount::Active(_) => panic!("host without slider must stay inert"),
        }
    }

    #[test]
    fn dispose_cancels_timer() {
        let c = mount(HostMarkup::complete("h", 3).with_autoplay(1));
        let (surface, mut scheduler) = c.dispose();
        assert_eq!(scheduler.live_timers(), 0);
        assert!(scheduler.advance(Duration::from_secs(10)).is_empty());
        assert_eq!(surface.active_slides(), vec![0]);
    }
}
