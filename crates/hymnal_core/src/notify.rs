//! Transient, auto-dismissing user notices.
//!
//! # Invariants
//! - Every notice expires a fixed TTL after it was raised.
//! - Expired notices are never returned by [`NoticeBoard::visible`].

use log::{error, info, warn};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);
const MAX_NOTICES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub expires_at: Instant,
}

/// Bounded queue of recent notices, oldest first.
#[derive(Debug)]
pub struct NoticeBoard {
    notices: VecDeque<Notice>,
    ttl: Duration,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::with_ttl(NOTICE_TTL)
    }
}

impl NoticeBoard {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            notices: VecDeque::new(),
            ttl,
        }
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.push_at(level, message, Instant::now());
    }

    pub fn push_at(&mut self, level: NoticeLevel, message: impl Into<String>, now: Instant) {
        let message = message.into();
        match level {
            NoticeLevel::Info => info!("event=notice module=notify level=info"),
            NoticeLevel::Warning => warn!("event=notice module=notify level=warning"),
            NoticeLevel::Error => error!("event=notice module=notify level=error"),
        }
        self.prune(now);
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            level,
            message,
            expires_at: now + self.ttl,
        });
    }

    /// Drops notices that expired at or before `now`.
    pub fn prune(&mut self, now: Instant) {
        self.notices.retain(|notice| notice.expires_at > now);
    }

    pub fn visible(&self, now: Instant) -> Vec<&Notice> {
        self.notices
            .iter()
            .filter(|notice| notice.expires_at > now)
            .collect()
    }

    /// Most recent notice regardless of expiry.
    pub fn latest(&self) -> Option<&Notice> {
        self.notices.back()
    }
}

#[cfg(test)]
mod tests {
    use super::{NoticeBoard, NoticeLevel};
    use std::time::{Duration, Instant};

    #[test]
    fn notices_dismiss_after_ttl() {
        let mut board = NoticeBoard::with_ttl(Duration::from_secs(3));
        let start = Instant::now();
        board.push_at(NoticeLevel::Warning, "offline copy", start);

        assert_eq!(board.visible(start + Duration::from_secs(1)).len(), 1);
        assert!(board.visible(start + Duration::from_secs(3)).is_empty());

        board.prune(start + Duration::from_secs(4));
        assert!(board.latest().is_none());
    }

    #[test]
    fn board_keeps_only_recent_notices() {
        let mut board = NoticeBoard::default();
        let now = Instant::now();
        for idx in 0..20 {
            board.push_at(NoticeLevel::Info, format!("n{idx}"), now);
        }
        let visible = board.visible(now);
        assert_eq!(visible.len(), 8);
        assert_eq!(visible[0].message, "n12");
    }
}
