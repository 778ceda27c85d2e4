//! User-facing messages. Errors stay until dismissed; everything else expires.

use std::fmt;
use std::time::{Duration, Instant};

pub const AUTO_DISMISS_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Danger,
    Warning,
    Info,
}

impl NoticeKind {
    pub fn auto_dismiss(self) -> Option<Duration> {
        match self {
            NoticeKind::Danger => None,
            _ => Some(AUTO_DISMISS_AFTER),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NoticeKind::Success => "ok",
            NoticeKind::Danger => "erro",
            NoticeKind::Warning => "aviso",
            NoticeKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    pub shown_at: Instant,
}

impl Notice {
    pub fn is_expired(&self, now: Instant) -> bool {
        self.kind
            .auto_dismiss()
            .is_some_and(|ttl| now.saturating_duration_since(self.shown_at) >= ttl)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.label(), self.message)
    }
}

#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
    next_id: u64,
}

impl NoticeBoard {
    pub fn push_at(&mut self, kind: NoticeKind, message: impl Into<String>, now: Instant) -> &Notice {
        self.next_id += 1;
        self.notices.push(Notice {
            id: self.next_id,
            kind,
            message: message.into(),
            shown_at: now,
        });
        &self.notices[self.notices.len() - 1]
    }

    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>) -> &Notice {
        self.push_at(kind, message, Instant::now())
    }

    /// Returns false when no notice has that id.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }

    pub fn prune(&mut self, now: Instant) {
        self.notices.retain(|n| !n.is_expired(now));
    }

    pub fn visible(&self) -> &[Notice] {
        &self.notices
    }
}
