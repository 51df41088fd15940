//! User-facing notifications.
//!
//! The engine reports outcomes through [`Notifier`]; the desktop front-end
//! implements it with [`Toasts`], tests with a plain `Vec<Notice>`.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }
}

/// Fire-and-forget sink for notices.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

impl Notifier for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}

fn log(notice: &Notice) {
    match notice.kind {
        NoticeKind::Success | NoticeKind::Info => tracing::info!("{}", notice.message),
        NoticeKind::Error => tracing::error!("{}", notice.message),
    }
}

/// Toast queue with per-notice expiry.
#[derive(Debug)]
pub struct Toasts {
    items: Vec<(Notice, Instant)>,
    lifetime: Duration,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(Duration::from_secs(4))
    }
}

impl Toasts {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            items: Vec::new(),
            lifetime,
        }
    }

    /// Drop expired toasts and return the rest, oldest first.
    pub fn visible(&mut self, now: Instant) -> impl Iterator<Item = &Notice> {
        let lifetime = self.lifetime;
        self.items
            .retain(|(_, shown)| now.saturating_duration_since(*shown) < lifetime);
        self.items.iter().map(|(n, _)| n)
    }

    pub fn dismiss(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Notifier for Toasts {
    fn notify(&mut self, notice: Notice) {
        log(&notice);
        self.items.push((notice, Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire() {
        let mut toasts = Toasts::new(Duration::from_millis(100));
        toasts.notify(Notice::success("Saved"));
        let later = Instant::now() + Duration::from_millis(500);
        assert_eq!(toasts.visible(Instant::now()).count(), 1);
        assert_eq!(toasts.visible(later).count(), 0);
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_dismiss_out_of_range_is_ignored() {
        let mut toasts = Toasts::default();
        toasts.notify(Notice::error("Failed"));
        toasts.dismiss(3);
        toasts.dismiss(0);
        assert!(toasts.is_empty());
    }
}
