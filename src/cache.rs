use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::task::AbortHandle;
use tracing::{debug, warn};
use url::Url;

use crate::mirror::MirrorClient;
use crate::tok_id::TokId;

/// A resolution in flight, can be awaited by any number of callers
pub type Resolution = Shared<BoxFuture<'static, Option<Url>>>;

enum Entry {
    Pending {
        generation: u64,
        resolution: Resolution,
        abort: AbortHandle,
    },
    Resolved(Url),
    Unavailable,
}

/// Current state of an id in the cache
pub enum Lookup {
    /// Settled, `None` means play the original
    Ready(Option<Url>),
    InFlight(Resolution),
}

impl Lookup {
    pub async fn url(self) -> Option<Url> {
        match self {
            Lookup::Ready(url) => url,
            Lookup::InFlight(resolution) => resolution.await,
        }
    }
}

#[derive(Default)]
struct State {
    entries: HashMap<TokId, Entry>,
    next_generation: u64,
}

struct Inner<M> {
    mirror: M,
    state: Mutex<State>,
}

impl<M> Inner<M> {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Maps tok ids to source quality urls, asking the mirror at most once per id.
///
/// Resolutions run as spawned tokio tasks, so the cache must be used from
/// within a runtime. Failures are stored as unavailable and never returned
/// to callers.
pub struct SourceCache<M> {
    inner: Arc<Inner<M>>,
}

impl<M> Clone for SourceCache<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M: MirrorClient> SourceCache<M> {
    pub fn new(mirror: M) -> Self {
        Self {
            inner: Arc::new(Inner {
                mirror,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Look at an id without starting a resolution
    pub fn lookup(&self, id: &TokId) -> Option<Lookup> {
        self.inner.lock().entries.get(id).map(Entry::lookup)
    }

    /// Look at an id, starting a resolution if it has never been seen
    pub fn begin(&self, id: &TokId) -> Lookup {
        let mut state = self.inner.lock();
        if let Some(entry) = state.entries.get(id) {
            return entry.lookup();
        }
        // The pending entry goes in under the same lock that found it missing
        Lookup::InFlight(self.start(&mut state, id))
    }

    /// Start resolving an id in the background
    pub fn prefetch(&self, id: &TokId) {
        let _ = self.begin(id);
    }

    pub async fn resolve(&self, id: &TokId) -> Option<Url> {
        self.begin(id).url().await
    }

    /// Drop whatever is known about an id so the next lookup asks the mirror again
    pub fn forget(&self, id: &TokId) {
        if self.inner.lock().entries.remove(id).is_some() {
            debug!("Forgot tok {}", id);
        }
    }

    /// Drop every entry and abort resolutions in flight
    pub fn dispose(&self) {
        let entries = std::mem::take(&mut self.inner.lock().entries);
        for entry in entries.into_values() {
            if let Entry::Pending { abort, .. } = entry {
                abort.abort();
            }
        }
    }

    fn start(&self, state: &mut State, id: &TokId) -> Resolution {
        state.next_generation += 1;
        let generation = state.next_generation;

        debug!("Resolving tok {}", id);
        let inner = self.inner.clone();
        let task_id = id.clone();
        let task = tokio::spawn(async move {
            let url = match inner.mirror.hd_source(&task_id).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("No source for tok {}: {}", task_id, e);
                    None
                }
            };
            inner.settle(&task_id, generation, url.clone());
            url
        });

        let abort = task.abort_handle();
        let resolution = task.map(|r| r.ok().flatten()).boxed().shared();
        state.entries.insert(
            id.clone(),
            Entry::Pending {
                generation,
                resolution: resolution.clone(),
                abort,
            },
        );
        resolution
    }
}

impl<M> Inner<M> {
    fn settle(&self, id: &TokId, generation: u64, url: Option<Url>) {
        let mut state = self.lock();
        match state.entries.get(id) {
            Some(Entry::Pending { generation: g, .. }) if *g == generation => {
                debug!("Resolved tok {}: {:?}", id, url.as_ref().map(Url::as_str));
                let entry = match url {
                    Some(url) => Entry::Resolved(url),
                    None => Entry::Unavailable,
                };
                state.entries.insert(id.clone(), entry);
            }
            // Forgotten or replaced while in flight
            _ => debug!("Discarding stale resolution of tok {}", id),
        }
    }
}

impl Entry {
    fn lookup(&self) -> Lookup {
        match self {
            Entry::Pending { resolution, .. } => Lookup::InFlight(resolution.clone()),
            Entry::Resolved(url) => Lookup::Ready(Some(url.clone())),
            Entry::Unavailable => Lookup::Ready(None),
        }
    }
}
