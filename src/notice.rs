//! Applicant-facing notices with broadcast fan-out to any listening view.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

const BROADCAST_CAPACITY: usize = 64;
const HISTORY_LIMIT: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A toast-style message. Persistent notices stay up until cleared
/// (camera problems); transient ones are shown once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub persistent: bool,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Collects notices raised by the wizard and broadcasts each one.
#[derive(Debug)]
pub struct NoticeBus {
    tx: broadcast::Sender<Notice>,
    history: VecDeque<Notice>,
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            history: VecDeque::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.raise(NoticeLevel::Success, false, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.raise(NoticeLevel::Error, false, message.into());
    }

    /// An error that stays visible until [`clear_persistent`](Self::clear_persistent).
    pub fn persistent_error(&mut self, message: impl Into<String>) {
        self.raise(NoticeLevel::Error, true, message.into());
    }

    pub fn clear_persistent(&mut self) {
        self.history.retain(|n| !n.persistent);
    }

    /// The notice currently blocking the step, if any.
    pub fn active_persistent(&self) -> Option<&Notice> {
        self.history.iter().rev().find(|n| n.persistent)
    }

    pub fn last(&self) -> Option<&Notice> {
        self.history.back()
    }

    pub fn history(&self) -> impl Iterator<Item = &Notice> {
        self.history.iter()
    }

    fn raise(&mut self, level: NoticeLevel, persistent: bool, message: String) {
        let notice = Notice {
            id: Uuid::new_v4(),
            level,
            persistent,
            message,
            created_at: Utc::now(),
        };
        if self.history.len() == HISTORY_LIMIT {
            // Persistent notices stay until cleared; evict the oldest transient one.
            match self.history.iter().position(|n| !n.persistent) {
                Some(pos) => {
                    self.history.remove(pos);
                }
                None => {
                    self.history.pop_front();
                }
            }
        }
        self.history.push_back(notice.clone());
        // No subscriber is fine; the history still has it.
        let _ = self.tx.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_notices() {
        let mut bus = NoticeBus::new();
        let mut rx = bus.subscribe();
        bus.success("Basic info saved successfully!");
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.message, "Basic info saved successfully!");
    }

    #[test]
    fn persistent_notice_survives_until_cleared() {
        let mut bus = NoticeBus::new();
        bus.persistent_error("Camera permission denied");
        bus.error("Failed to save address.");
        assert_eq!(
            bus.active_persistent().map(|n| n.message.as_str()),
            Some("Camera permission denied")
        );
        bus.clear_persistent();
        assert!(bus.active_persistent().is_none());
        assert_eq!(bus.last().unwrap().message, "Failed to save address.");
    }

    #[test]
    fn history_is_bounded() {
        let mut bus = NoticeBus::new();
        for i in 0..(HISTORY_LIMIT + 5) {
            bus.error(format!("n{i}"));
        }
        assert_eq!(bus.history().count(), HISTORY_LIMIT);
        assert_eq!(bus.history().next().unwrap().message, "n5");
    }

    #[test]
    fn full_history_keeps_persistent_notice() {
        let mut bus = NoticeBus::new();
        bus.persistent_error("Camera permission denied");
        for i in 0..(HISTORY_LIMIT + 5) {
            bus.error(format!("n{i}"));
        }
        assert_eq!(bus.history().count(), HISTORY_LIMIT);
        assert_eq!(
            bus.active_persistent().map(|n| n.message.as_str()),
            Some("Camera permission denied")
        );
        assert_eq!(bus.history().nth(1).unwrap().message, "n6");
        assert_eq!(bus.last().unwrap().message, format!("n{}", HISTORY_LIMIT + 4));
    }
}
