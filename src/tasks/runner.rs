use std::fmt;

use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace};

use crate::carousel::{AutoplayState, Carousel};
use crate::events::CarouselEvent;
use crate::scheduler::Scheduler;
use crate::surface::RenderSurface;

/// Published after every handled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub index: usize,
    pub slides: usize,
    pub autoplay_enabled: bool,
    pub autoplay: AutoplayState,
    /// Rendered surface, as produced by its `Display` impl.
    pub view: String,
}

impl Snapshot {
    pub fn of<S, T>(carousel: &Carousel<S, T>) -> Self
    where
        S: RenderSurface + fmt::Display,
        T: Scheduler,
    {
        let state = carousel.state();
        Self {
            index: state.current_index(),
            slides: state.slide_count(),
            autoplay_enabled: state.autoplay_enabled(),
            autoplay: state.autoplay_state(),
            view: carousel.surface().to_string(),
        }
    }
}

/// Drains one carousel's event queue until cancelled or every sender is gone.
///
/// Timer ticks arrive on the same queue as user events, so each handler runs
/// to completion before the next event is looked at. The carousel is
/// disposed on exit and its surface returned.
#[instrument(skip_all, fields(host = %carousel.id()))]
pub async fn run<S, T>(
    mut carousel: Carousel<S, T>,
    mut events: Receiver<CarouselEvent>,
    snapshots: watch::Sender<Snapshot>,
    cancel: CancellationToken,
) -> S
where
    S: RenderSurface + fmt::Display,
    T: Scheduler,
{
    snapshots.send_replace(Snapshot::of(&carousel));

    loop {
        select! {
            _ = cancel.cancelled() => {
                debug!("cancel received; exiting carousel runner");
                break;
            }
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    debug!("event queue closed; exiting carousel runner");
                    break;
                };
                trace!(?event, "handling");
                let before = Snapshot::of(&carousel);
                let default = carousel.handle(event);
                let after = Snapshot::of(&carousel);
                if after != before {
                    info!(default = ?default, "{}", after.view);
                }
                snapshots.send_replace(after);
            }
        }
    }

    let (surface, _scheduler) = carousel.dispose();
    surface
}
