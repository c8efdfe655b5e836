//! The parts of the forum page that toks are swapped on.
//!
//! The page itself lives elsewhere (a browser, a headless driver, tests), it
//! only has to describe its posts as [`Article`]s, hand over its video
//! elements as [`MediaElement`]s and report container changes as
//! [`ChildEvent`]s.

mod controller;
mod status;

pub use self::controller::{Controller, Substitution};
pub use self::status::{Status, StatusIndicator, INFO_TEXT, LABEL};

use crate::tok_id::{TokId, TokIdWindow};

/// The `a[download]` link in a post's caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub href: String,
    /// Original filename, the `download` attribute
    pub filename: String,
}

/// A post that may hold a tok
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    pub link: Option<DownloadLink>,
    /// Last entry of the post's file info, e.g. `H264` or `HEVC`
    pub codec: Option<String>,
}

impl Article {
    /// Id of the tok in this post, if it is a video worth replacing
    pub fn tok_id(&self, window: &TokIdWindow) -> Option<TokId> {
        let link = self.link.as_ref()?;
        if !(link.href.ends_with(".mp4") || link.href.ends_with(".webm")) {
            return None;
        }
        // Already source quality
        if self.codec.as_deref() == Some("HEVC") {
            return None;
        }
        window.extract(&link.filename)
    }
}

/// Handle to a media element on the page
pub trait MediaElement {
    fn is_video(&self) -> bool;
    /// Inline player opened by expanding a thumbnail
    fn is_expanded(&self) -> bool;
    /// Still attached to the document
    fn is_connected(&self) -> bool;
    fn src(&self) -> Option<String>;
    fn set_src(&self, src: &str);
    fn remove_src(&self);
}

/// A change in the children of an observed container
#[derive(Debug)]
pub enum ChildEvent<E> {
    Added(E),
    Removed(E),
}
