//! User-facing notification channel used by the invoker and operations.

use std::sync::Mutex;

pub trait Notifier: Send + Sync {
    /// `completed` of `total` actions of `activity` have executed.
    fn progress(&self, activity: &str, completed: usize, total: usize);
    fn warning(&self, message: &str);
    fn verbose(&self, message: &str);
}

/// Forwards notifications to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn progress(&self, activity: &str, completed: usize, total: usize) {
        tracing::info!(activity, completed, total, "executed {completed} of {total} actions");
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn verbose(&self, message: &str) {
        tracing::debug!("{message}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Progress {
        activity: String,
        completed: usize,
        total: usize,
    },
    Warning(String),
    Verbose(String),
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.lock().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|n| match n {
                Notice::Warning(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn verbose_messages(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|n| match n {
                Notice::Verbose(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notice>> {
        self.notices.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Notifier for RecordingNotifier {
    fn progress(&self, activity: &str, completed: usize, total: usize) {
        self.lock().push(Notice::Progress {
            activity: activity.to_string(),
            completed,
            total,
        });
    }

    fn warning(&self, message: &str) {
        self.lock().push(Notice::Warning(message.to_string()));
    }

    fn verbose(&self, message: &str) {
        self.lock().push(Notice::Verbose(message.to_string()));
    }
}
