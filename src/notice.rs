use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a notice stays on screen unless dismissed.
pub const NOTICE_LIFETIME: Duration = Duration::from_secs(4);

const MAX_NOTICES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub id: u64,
    pub level: Level,
    pub title: String,
    pub body: String,
    raised_at: Instant,
}

/// Short-lived notifications, newest last.
#[derive(Debug, Default)]
pub struct Notices {
    queue: VecDeque<Notice>,
    next_id: u64,
}

impl Notices {
    pub fn info(&mut self, title: impl Into<String>, body: impl Into<String>) -> u64 {
        self.raise(Level::Info, title.into(), body.into(), Instant::now())
    }

    pub fn error(&mut self, title: impl Into<String>, body: impl Into<String>) -> u64 {
        self.raise(Level::Error, title.into(), body.into(), Instant::now())
    }

    fn raise(&mut self, level: Level, title: String, body: String, raised_at: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        if self.queue.len() == MAX_NOTICES {
            self.queue.pop_front();
        }
        self.queue.push_back(Notice {
            id,
            level,
            title,
            body,
            raised_at,
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.queue.retain(|notice| notice.id != id);
    }

    /// Drops every notice older than [`NOTICE_LIFETIME`] at `now`.
    pub fn expire(&mut self, now: Instant) {
        self.queue
            .retain(|notice| now.saturating_duration_since(notice.raised_at) < NOTICE_LIFETIME);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.queue.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
