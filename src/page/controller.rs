use std::sync::{Mutex, MutexGuard, PoisonError};

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::{Article, ChildEvent, MediaElement, Status, StatusIndicator};
use crate::cache::{Lookup, SourceCache};
use crate::mirror::MirrorClient;
use crate::tok_id::{TokId, TokIdWindow};

/// A source quality tok put into an element, keep it to undo on playback errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub id: TokId,
    /// The element's source before it was replaced
    pub original: Option<String>,
}

enum Swap {
    Replaced(Substitution),
    Restored,
    /// Element left the page before the tok was resolved
    Stale,
}

/// Reacts to hovers and container changes by swapping toks in and out
pub struct Controller<M> {
    cache: SourceCache<M>,
    indicator: StatusIndicator,
    // Tok of the most recently hovered thumbnail
    current: Mutex<Option<TokId>>,
    clock: fn() -> OffsetDateTime,
}

impl<M: MirrorClient> Controller<M> {
    pub fn new(cache: SourceCache<M>) -> Self {
        Self::with_clock(cache, OffsetDateTime::now_utc)
    }

    pub fn with_clock(cache: SourceCache<M>, clock: fn() -> OffsetDateTime) -> Self {
        Self {
            cache,
            indicator: StatusIndicator::new(),
            current: Mutex::new(None),
            clock,
        }
    }

    pub fn cache(&self) -> &SourceCache<M> {
        &self.cache
    }

    pub fn indicator(&self) -> &StatusIndicator {
        &self.indicator
    }

    /// The pointer moved onto a new thumbnail
    pub fn on_hover(&self, article: &Article) {
        let id = article.tok_id(&self.window());
        if let Some(id) = &id {
            self.cache.prefetch(id);
        }
        *self.current() = id;
    }

    /// The hover overlay gained or lost its preview
    pub async fn on_overlay<E: MediaElement>(&self, event: ChildEvent<E>) -> Option<Substitution> {
        let element = match event {
            ChildEvent::Added(element) => element,
            ChildEvent::Removed(_) => {
                self.indicator.set(Status::Idle);
                return None;
            }
        };
        if !element.is_video() {
            return None;
        }
        let id = self.current().clone()?;

        let lookup = self.cache.begin(&id);
        if matches!(lookup, Lookup::InFlight(_)) {
            self.indicator.set(Status::Loading);
        }
        match swap(&element, id, lookup).await {
            Swap::Replaced(substitution) => {
                self.indicator.set(Status::Playing);
                Some(substitution)
            }
            Swap::Restored => {
                self.indicator.set(Status::Idle);
                None
            }
            Swap::Stale => None,
        }
    }

    /// A thumbnail in `article` was expanded into an inline player
    pub async fn on_expansion<E: MediaElement>(
        &self,
        event: ChildEvent<E>,
        article: &Article,
    ) -> Option<Substitution> {
        let ChildEvent::Added(element) = event else {
            return None;
        };
        if !(element.is_video() && element.is_expanded()) {
            return None;
        }
        let id = article.tok_id(&self.window());
        *self.current() = id.clone();
        let id = id?;

        let lookup = self.cache.begin(&id);
        match swap(&element, id, lookup).await {
            Swap::Replaced(substitution) => Some(substitution),
            Swap::Restored | Swap::Stale => None,
        }
    }

    /// A substituted tok failed to play, go back to the original
    pub fn on_playback_error<E: MediaElement>(&self, element: &E, substitution: &Substitution) {
        warn!("Source quality tok {} failed to play", substitution.id);
        match &substitution.original {
            Some(src) => element.set_src(src),
            None => element.remove_src(),
        }
        self.cache.forget(&substitution.id);
    }

    /// Look the tok in `article` up again next time
    pub fn reset_article(&self, article: &Article) {
        if let Some(id) = article.tok_id(&self.window()) {
            self.cache.forget(&id);
        }
    }

    fn window(&self) -> TokIdWindow {
        TokIdWindow::at((self.clock)())
    }

    fn current(&self) -> MutexGuard<'_, Option<TokId>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn swap<E: MediaElement>(element: &E, id: TokId, lookup: Lookup) -> Swap {
    // Keep the original from loading while the mirror is asked
    let original = element.src();
    element.remove_src();

    let url = lookup.url().await;
    if !element.is_connected() {
        debug!("Discarding tok {}, element is gone", id);
        return Swap::Stale;
    }

    match url {
        Some(url) => {
            info!("Playing source quality tok {}", id);
            element.set_src(url.as_str());
            Swap::Replaced(Substitution { id, original })
        }
        None => {
            if let Some(src) = &original {
                element.set_src(src);
            }
            Swap::Restored
        }
    }
}
