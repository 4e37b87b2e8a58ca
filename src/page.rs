//! Mounting every carousel host of a page.

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::carousel::{Carousel, Mount};
use crate::config::{CarouselConfig, Configuration};
use crate::error::Error;
use crate::events::CarouselEvent;
use crate::markup::HostMarkup;
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::surface::{ClassListSurface, RenderSurface};
use crate::tasks::runner::{self, Snapshot};

/// Mounts each host once, in order, with the capabilities `setup` provides.
/// Inert hosts are dropped; the rest come back in document order, each
/// paired with the position of its host in `hosts`.
pub fn mount_all<S, T, F>(hosts: &[HostMarkup], mut setup: F) -> Vec<(usize, Carousel<S, T>)>
where
    S: RenderSurface,
    T: Scheduler,
    F: FnMut(&HostMarkup) -> (CarouselConfig, S, T),
{
    let mut mounted = Vec::with_capacity(hosts.len());
    for (position, host) in hosts.iter().enumerate() {
        let (config, surface, scheduler) = setup(host);
        match Carousel::mount_with_config(host, config, surface, scheduler) {
            Mount::Active(carousel) => mounted.push((position, carousel)),
            Mount::Inert { reason, .. } => {
                info!(host = %host.id, ?reason, "skipping inert slideshow");
            }
        }
    }
    info!(
        found = hosts.len(),
        mounted = mounted.len(),
        "page slideshows mounted"
    );
    mounted
}

/// Handle to one running carousel.
#[derive(Debug)]
pub struct Instance {
    id: String,
    events: mpsc::Sender<CarouselEvent>,
    snapshots: watch::Receiver<Snapshot>,
}

impl Instance {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Waits for the next published snapshot.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.snapshots.changed().await.ok()?;
        Some(self.snapshots.borrow_and_update().clone())
    }
}

/// Every active carousel of a page, each driven by its own runner task.
#[derive(Debug)]
pub struct RunningPage {
    instances: Vec<Instance>,
    tasks: JoinSet<(usize, ClassListSurface)>,
    cancel: CancellationToken,
}

impl RunningPage {
    /// Mounts `cfg.carousels` and spawns a runner per active host. Must be
    /// called from within a tokio runtime; cancelling `parent` stops them all.
    pub fn spawn(cfg: &Configuration, parent: &CancellationToken) -> Self {
        let cancel = parent.child_token();
        // one queue per host, indexed by host position
        let mut queues = Vec::with_capacity(cfg.carousels.len());

        let carousels = mount_all(&cfg.carousels, |host| {
            let (tx, rx) = mpsc::channel::<CarouselEvent>(cfg.event_queue_capacity);
            let scheduler = TokioScheduler::new(tx.clone(), cancel.child_token());
            queues.push(Some((tx, rx)));
            (
                cfg.carousel_config(host),
                ClassListSurface::for_markup(host),
                scheduler,
            )
        });

        let mut instances = Vec::with_capacity(carousels.len());
        let mut tasks = JoinSet::new();
        for (position, carousel) in carousels {
            let id = carousel.id().to_string();
            let Some((tx, rx)) = queues.get_mut(position).and_then(Option::take) else {
                warn!(host = %id, position, "no event queue for mounted slideshow");
                continue;
            };
            let (snap_tx, snap_rx) = watch::channel(Snapshot::of(&carousel));
            let slot = instances.len();
            tasks.spawn({
                let cancel = cancel.clone();
                async move { (slot, runner::run(carousel, rx, snap_tx, cancel).await) }
            });
            instances.push(Instance {
                id,
                events: tx,
                snapshots: snap_rx,
            });
        }

        Self {
            instances,
            tasks,
            cancel,
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn instance(&self, index: usize) -> Result<&Instance, Error> {
        self.instances
            .get(index)
            .ok_or(Error::UnknownInstance(index))
    }

    pub fn instance_mut(&mut self, index: usize) -> Result<&mut Instance, Error> {
        self.instances
            .get_mut(index)
            .ok_or(Error::UnknownInstance(index))
    }

    /// Enqueues `event` for the carousel at `index`.
    pub async fn dispatch(&self, index: usize, event: CarouselEvent) -> Result<(), Error> {
        let instance = self.instance(index)?;
        instance
            .events
            .send(event)
            .await
            .map_err(|_| Error::QueueClosed(instance.id.clone()))
    }

    /// Stops every runner and returns the final surfaces in mount order.
    pub async fn shutdown(mut self) -> Result<Vec<(String, ClassListSurface)>> {
        self.cancel.cancel();
        let mut finished: Vec<Option<ClassListSurface>> = vec![None; self.instances.len()];
        while let Some(joined) = self.tasks.join_next().await {
            let (slot, surface) = joined.context("slideshow runner panicked")?;
            finished[slot] = Some(surface);
        }
        Ok(self
            .instances
            .iter()
            .zip(finished)
            .filter_map(|(inst, surface)| surface.map(|s| (inst.id.clone(), s)))
            .collect())
    }
}
