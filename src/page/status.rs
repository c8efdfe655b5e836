use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

pub static LABEL: &str = "SQ";
pub static INFO_TEXT: &str = "Press E to play videos if stuck";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Nothing replaced, playing the original
    #[default]
    Idle,
    /// Waiting on the mirror
    Loading,
    /// Playing the source quality tok
    Playing,
}

impl Status {
    pub fn color(&self) -> &'static str {
        match self {
            Status::Idle => "gray",
            Status::Loading => "yellow",
            Status::Playing => "lime",
        }
    }
}

/// The "SQ" link next to the thread counters and the info panel it toggles
pub struct StatusIndicator {
    status: watch::Sender<Status>,
    panel: Mutex<bool>,
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusIndicator {
    pub fn new() -> Self {
        let (status, _) = watch::channel(Status::Idle);
        Self {
            status,
            panel: Mutex::new(false),
        }
    }

    pub fn status(&self) -> Status {
        *self.status.borrow()
    }

    pub fn set(&self, status: Status) {
        self.status.send_replace(status);
    }

    /// Follow status changes, e.g. to recolor the indicator
    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }

    /// Toggle the info panel, return whether it is now shown
    pub fn click(&self) -> bool {
        let mut panel = self.panel.lock().unwrap_or_else(PoisonError::into_inner);
        *panel = !*panel;
        *panel
    }

    pub fn info_panel(&self) -> Option<&'static str> {
        let panel = self.panel.lock().unwrap_or_else(PoisonError::into_inner);
        (*panel).then_some(INFO_TEXT)
    }
}
