use crate::invoker::Action;
use crate::notify::Notifier;
use crate::Result;
use std::sync::Arc;

/// Emits a warning when it runs.
pub struct WarningAction {
    notifier: Arc<dyn Notifier>,
    message: String,
}

impl WarningAction {
    pub fn new(notifier: Arc<dyn Notifier>, message: impl Into<String>) -> Self {
        Self {
            notifier,
            message: message.into(),
        }
    }
}

impl Action for WarningAction {
    fn description(&self) -> String {
        format!("Warn: {}", self.message)
    }

    fn execute(&mut self) -> Result<()> {
        self.notifier.warning(&self.message);
        Ok(())
    }
}

/// Emits a verbose note when it runs.
pub struct VerboseAction {
    notifier: Arc<dyn Notifier>,
    message: String,
}

impl VerboseAction {
    pub fn new(notifier: Arc<dyn Notifier>, message: impl Into<String>) -> Self {
        Self {
            notifier,
            message: message.into(),
        }
    }
}

impl Action for VerboseAction {
    fn description(&self) -> String {
        format!("Note: {}", self.message)
    }

    fn execute(&mut self) -> Result<()> {
        self.notifier.verbose(&self.message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;

    #[test]
    fn warning_emits_on_execute_only() {
        let notifier = Arc::new(RecordingNotifier::new());
        let mut action = WarningAction::new(notifier.clone(), "shown");
        assert_eq!(action.description(), "Warn: shown");
        assert!(notifier.warnings().is_empty());
        action.execute().unwrap();
        assert_eq!(notifier.warnings(), vec!["shown".to_string()]);
    }

    #[test]
    fn verbose_always_emits() {
        let notifier = Arc::new(RecordingNotifier::new());
        VerboseAction::new(notifier.clone(), "already enabled")
            .execute()
            .unwrap();
        assert_eq!(notifier.verbose_messages(), vec!["already enabled".to_string()]);
    }
}
