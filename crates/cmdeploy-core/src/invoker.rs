//! The action contract and the all-or-nothing batch executor.
//!
//! An [`ActionInvoker`] runs its actions in insertion order. A restorable
//! action is backed up right before it executes and only becomes eligible for
//! rollback once that backup succeeded. The first failure stops the batch:
//! eligible actions are rolled back newest first, one attempt each, and the
//! failure comes back as an [`Unwind`] that still owns the original error.

use crate::error::DeployError;
use crate::notify::Notifier;
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One change to one subsystem.
///
/// Actions that can be undone override [`Action::is_restorable`] together
/// with [`Action::backup`] and [`Action::rollback`].
pub trait Action {
    fn description(&self) -> String;

    fn execute(&mut self) -> crate::Result<()>;

    fn is_restorable(&self) -> bool {
        false
    }

    /// Capture whatever [`Action::rollback`] needs. Called right before
    /// [`Action::execute`].
    fn backup(&mut self) -> crate::Result<()> {
        Ok(())
    }

    fn rollback(&mut self) -> crate::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for dyn Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

pub type BoxedAction = Box<dyn Action>;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeReport {
    pub executed: usize,
}

#[derive(Debug)]
pub struct RollbackFailure {
    pub index: usize,
    pub action: String,
    pub error: DeployError,
}

/// A failed batch after its rollback pass.
#[derive(Debug)]
pub struct Unwind {
    /// Index of the action whose backup or execute failed.
    pub failed_index: usize,
    pub failed_action: String,
    /// The original failure.
    pub error: DeployError,
    /// Indices rolled back successfully, in the order they were rolled back.
    pub rolled_back: Vec<usize>,
    pub rollback_failures: Vec<RollbackFailure>,
}

impl Unwind {
    pub fn is_clean(&self) -> bool {
        self.rollback_failures.is_empty()
    }

    pub fn into_error(self) -> DeployError {
        self.error
    }
}

impl fmt::Display for Unwind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "action {} ({}) failed: {}",
            self.failed_index + 1,
            self.failed_action,
            self.error
        )
    }
}

impl std::error::Error for Unwind {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<Unwind> for DeployError {
    fn from(unwind: Unwind) -> Self {
        unwind.into_error()
    }
}

// ---------------------------------------------------------------------------
// ActionInvoker
// ---------------------------------------------------------------------------

pub struct ActionInvoker {
    activity: String,
    actions: Vec<BoxedAction>,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for ActionInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionInvoker")
            .field("activity", &self.activity)
            .field("actions", &self.descriptions())
            .finish()
    }
}

impl ActionInvoker {
    pub fn new(notifier: Arc<dyn Notifier>, activity: impl Into<String>) -> Self {
        Self {
            activity: activity.into(),
            actions: Vec::new(),
            notifier,
        }
    }

    pub fn activity(&self) -> &str {
        &self.activity
    }

    pub fn add_action(&mut self, action: impl Action + 'static) {
        self.actions.push(Box::new(action));
    }

    pub fn add_boxed(&mut self, action: BoxedAction) {
        self.actions.push(action);
    }

    /// Append the actions of another batch, e.g. a sub-operation.
    pub fn add_actions(&mut self, actions: impl IntoIterator<Item = BoxedAction>) {
        self.actions.extend(actions);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.description()).collect()
    }

    pub fn into_actions(self) -> Vec<BoxedAction> {
        self.actions
    }

    /// Run every action, or roll back and return the first failure.
    pub fn invoke(self) -> Result<InvokeReport, Unwind> {
        let ActionInvoker {
            activity,
            mut actions,
            notifier,
        } = self;
        let total = actions.len();
        let mut eligible: Vec<usize> = Vec::new();

        for i in 0..total {
            let step = run_step(actions[i].as_mut(), &mut eligible, i);
            match step {
                Ok(()) => {
                    tracing::debug!(index = i, action = %actions[i].description(), "action executed");
                    notifier.progress(&activity, i + 1, total);
                }
                Err(error) => {
                    let failed_action = actions[i].description();
                    notifier.warning(&format!(
                        "{activity} failed at '{failed_action}': {error}. Rolling back all changes..."
                    ));
                    let (rolled_back, rollback_failures) =
                        unwind(&mut actions, &eligible, notifier.as_ref());
                    return Err(Unwind {
                        failed_index: i,
                        failed_action,
                        error,
                        rolled_back,
                        rollback_failures,
                    });
                }
            }
        }

        Ok(InvokeReport { executed: total })
    }
}

fn run_step(action: &mut dyn Action, eligible: &mut Vec<usize>, index: usize) -> crate::Result<()> {
    if action.is_restorable() {
        action.backup()?;
        eligible.push(index);
    }
    action.execute()
}

fn unwind(
    actions: &mut [BoxedAction],
    eligible: &[usize],
    notifier: &dyn Notifier,
) -> (Vec<usize>, Vec<RollbackFailure>) {
    let mut rolled_back = Vec::new();
    let mut failures = Vec::new();
    for &index in eligible.iter().rev() {
        let action = &mut actions[index];
        match action.rollback() {
            Ok(()) => {
                tracing::debug!(index, action = %action.description(), "action rolled back");
                rolled_back.push(index);
            }
            Err(error) => {
                notifier.warning(&format!(
                    "rollback of '{}' failed: {error}",
                    action.description()
                ));
                failures.push(RollbackFailure {
                    index,
                    action: action.description(),
                    error,
                });
            }
        }
    }
    (rolled_back, failures)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Notice, RecordingNotifier};
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    #[derive(Default, Clone, Copy)]
    struct Faults {
        backup: bool,
        execute: bool,
        rollback: bool,
    }

    struct Probe {
        name: String,
        restorable: bool,
        faults: Faults,
        log: Log,
    }

    impl Probe {
        fn new(name: &str, restorable: bool, faults: Faults, log: &Log) -> Self {
            Self {
                name: name.to_string(),
                restorable,
                faults,
                log: Arc::clone(log),
            }
        }

        fn record(&self, what: &str) {
            self.log.lock().unwrap().push(format!("{what}:{}", self.name));
        }
    }

    impl Action for Probe {
        fn description(&self) -> String {
            self.name.clone()
        }

        fn execute(&mut self) -> crate::Result<()> {
            self.record("execute");
            if self.faults.execute {
                return Err(DeployError::subsystem("probe", &self.name, "boom"));
            }
            Ok(())
        }

        fn is_restorable(&self) -> bool {
            self.restorable
        }

        fn backup(&mut self) -> crate::Result<()> {
            self.record("backup");
            if self.faults.backup {
                return Err(DeployError::subsystem("probe", &self.name, "backup failed"));
            }
            Ok(())
        }

        fn rollback(&mut self) -> crate::Result<()> {
            self.record("rollback");
            if self.faults.rollback {
                return Err(DeployError::subsystem("probe", &self.name, "rollback failed"));
            }
            Ok(())
        }
    }

    fn invoker(notifier: &Arc<RecordingNotifier>) -> ActionInvoker {
        ActionInvoker::new(Arc::clone(notifier) as Arc<dyn Notifier>, "test batch")
    }

    fn log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn runs_all_actions_in_order() {
        let notifier = Arc::new(RecordingNotifier::new());
        let log = log();
        let mut inv = invoker(&notifier);
        inv.add_action(Probe::new("a", true, Faults::default(), &log));
        inv.add_action(Probe::new("b", false, Faults::default(), &log));
        let report = inv.invoke().unwrap();
        assert_eq!(report.executed, 2);
        assert_eq!(entries(&log), vec!["backup:a", "execute:a", "execute:b"]);
        let progress: Vec<_> = notifier
            .notices()
            .into_iter()
            .filter(|n| matches!(n, Notice::Progress { .. }))
            .collect();
        assert_eq!(
            progress.last(),
            Some(&Notice::Progress {
                activity: "test batch".to_string(),
                completed: 2,
                total: 2
            })
        );
    }

    #[test]
    fn third_of_five_failing_rolls_back_second_then_first() {
        let notifier = Arc::new(RecordingNotifier::new());
        let log = log();
        let mut inv = invoker(&notifier);
        inv.add_action(Probe::new("1", true, Faults::default(), &log));
        inv.add_action(Probe::new("2", true, Faults::default(), &log));
        let fail = Faults {
            execute: true,
            ..Faults::default()
        };
        inv.add_action(Probe::new("3", false, fail, &log));
        inv.add_action(Probe::new("4", true, Faults::default(), &log));
        inv.add_action(Probe::new("5", true, Faults::default(), &log));

        let unwind = inv.invoke().unwrap_err();
        assert_eq!(unwind.failed_index, 2);
        assert_eq!(
            entries(&log),
            vec![
                "backup:1",
                "execute:1",
                "backup:2",
                "execute:2",
                "execute:3",
                "rollback:2",
                "rollback:1",
            ]
        );
        assert_eq!(unwind.rolled_back, vec![1, 0]);
        assert!(!entries(&log).iter().any(|e| e.ends_with(":4") || e.ends_with(":5")));
        match unwind.into_error() {
            DeployError::Subsystem { name, message, .. } => {
                assert_eq!(name, "3");
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(notifier.warnings().len(), 1);
    }

    #[test]
    fn failing_restorable_action_is_rolled_back_first() {
        let notifier = Arc::new(RecordingNotifier::new());
        let log = log();
        let mut inv = invoker(&notifier);
        inv.add_action(Probe::new("a", true, Faults::default(), &log));
        let fail = Faults {
            execute: true,
            ..Faults::default()
        };
        inv.add_action(Probe::new("b", true, fail, &log));
        let unwind = inv.invoke().unwrap_err();
        assert_eq!(unwind.rolled_back, vec![1, 0]);
        assert_eq!(
            entries(&log),
            vec!["backup:a", "execute:a", "backup:b", "execute:b", "rollback:b", "rollback:a"]
        );
    }

    #[test]
    fn failing_backup_is_not_rolled_back() {
        let notifier = Arc::new(RecordingNotifier::new());
        let log = log();
        let mut inv = invoker(&notifier);
        inv.add_action(Probe::new("a", true, Faults::default(), &log));
        let fail = Faults {
            backup: true,
            ..Faults::default()
        };
        inv.add_action(Probe::new("b", true, fail, &log));
        let unwind = inv.invoke().unwrap_err();
        assert_eq!(unwind.failed_index, 1);
        assert_eq!(
            entries(&log),
            vec!["backup:a", "execute:a", "backup:b", "rollback:a"]
        );
    }

    #[test]
    fn non_restorable_failure_unwinds_prior_actions() {
        let notifier = Arc::new(RecordingNotifier::new());
        let log = log();
        let mut inv = invoker(&notifier);
        inv.add_action(Probe::new("a", true, Faults::default(), &log));
        inv.add_action(Probe::new("plain", false, Faults::default(), &log));
        let fail = Faults {
            execute: true,
            ..Faults::default()
        };
        inv.add_action(Probe::new("c", false, fail, &log));
        let unwind = inv.invoke().unwrap_err();
        assert_eq!(unwind.rolled_back, vec![0]);
        assert_eq!(
            entries(&log),
            vec!["backup:a", "execute:a", "execute:plain", "execute:c", "rollback:a"]
        );
    }

    #[test]
    fn rollback_failures_do_not_stop_unwinding() {
        let notifier = Arc::new(RecordingNotifier::new());
        let log = log();
        let mut inv = invoker(&notifier);
        inv.add_action(Probe::new("a", true, Faults::default(), &log));
        let bad_rollback = Faults {
            rollback: true,
            ..Faults::default()
        };
        inv.add_action(Probe::new("b", true, bad_rollback, &log));
        let fail = Faults {
            execute: true,
            ..Faults::default()
        };
        inv.add_action(Probe::new("c", false, fail, &log));

        let unwind = inv.invoke().unwrap_err();
        assert!(!unwind.is_clean());
        assert_eq!(unwind.rollback_failures.len(), 1);
        assert_eq!(unwind.rollback_failures[0].index, 1);
        assert_eq!(unwind.rolled_back, vec![0]);
        assert_eq!(
            entries(&log).iter().filter(|e| e.starts_with("rollback")).count(),
            2
        );
        assert!(matches!(
            unwind.into_error(),
            DeployError::Subsystem { ref name, .. } if name == "c"
        ));
    }

    #[test]
    fn composed_batches_keep_order() {
        let notifier = Arc::new(RecordingNotifier::new());
        let log = log();
        let mut inner = invoker(&notifier);
        inner.add_action(Probe::new("inner", false, Faults::default(), &log));
        let mut outer = invoker(&notifier);
        outer.add_action(Probe::new("first", false, Faults::default(), &log));
        outer.add_actions(inner.into_actions());
        outer.add_action(Probe::new("last", false, Faults::default(), &log));
        assert_eq!(outer.descriptions(), vec!["first", "inner", "last"]);
        outer.invoke().unwrap();
        assert_eq!(
            entries(&log),
            vec!["execute:first", "execute:inner", "execute:last"]
        );
    }
}
