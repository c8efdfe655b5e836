use std::future::Future;

use url::Url;

use crate::error::MirrorError;
use crate::tok_id::TokId;

mod tikwm;

pub use self::tikwm::TikwmMirror;

/// A service that serves source quality copies of toks
pub trait MirrorClient: Send + Sync + 'static {
    /// Ask the mirror for a playable url of the source quality tok.
    ///
    /// Called at most once per id by [`crate::cache::SourceCache`] until the
    /// id is forgotten.
    fn hd_source(&self, id: &TokId) -> impl Future<Output = Result<Url, MirrorError>> + Send;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use time::macros::datetime;
    use tokio::sync::Semaphore;

    use super::*;
    use crate::tok_id::TokIdWindow;

    pub fn tok_id() -> TokId {
        TokIdWindow::at(datetime!(2024-01-01 0:00 UTC))
            .extract("7123456789012345678")
            .unwrap()
    }

    /// Mirror that counts requests and can hold them until the test lets go
    pub struct FakeMirror {
        pub calls: Arc<AtomicUsize>,
        pub gate: Arc<Semaphore>,
        gated: bool,
        url: Option<&'static str>,
    }

    impl FakeMirror {
        pub fn ok(url: &'static str) -> Self {
            Self {
                calls: Default::default(),
                gate: Arc::new(Semaphore::new(0)),
                gated: false,
                url: Some(url),
            }
        }

        pub fn failing() -> Self {
            Self {
                url: None,
                ..Self::ok("https://unused.example/")
            }
        }

        pub fn gated(self) -> Self {
            Self {
                gated: true,
                ..self
            }
        }
    }

    impl MirrorClient for FakeMirror {
        async fn hd_source(&self, _id: &TokId) -> Result<Url, MirrorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.gated {
                self.gate.acquire().await.unwrap().forget();
            }
            match self.url {
                Some(url) => Ok(Url::parse(url).unwrap()),
                None => Err(MirrorError::Status(404)),
            }
        }
    }
}
