use crate::host::ComPlusManager;
use crate::invoker::Action;
use crate::Result;
use std::sync::Arc;

pub struct EnableComPlusAction {
    complus: Arc<dyn ComPlusManager>,
    component: String,
}

impl EnableComPlusAction {
    pub fn new(complus: Arc<dyn ComPlusManager>, component: impl Into<String>) -> Self {
        Self {
            complus,
            component: component.into(),
        }
    }
}

impl Action for EnableComPlusAction {
    fn description(&self) -> String {
        format!("Enable COM+ component {}", self.component)
    }

    fn execute(&mut self) -> Result<()> {
        self.complus.enable(&self.component)
    }

    // Only queued for components that were disabled.
    fn is_restorable(&self) -> bool {
        true
    }

    fn rollback(&mut self) -> Result<()> {
        self.complus.disable(&self.component)
    }
}

pub struct DisableComPlusAction {
    complus: Arc<dyn ComPlusManager>,
    component: String,
}

impl DisableComPlusAction {
    pub fn new(complus: Arc<dyn ComPlusManager>, component: impl Into<String>) -> Self {
        Self {
            complus,
            component: component.into(),
        }
    }
}

impl Action for DisableComPlusAction {
    fn description(&self) -> String {
        format!("Disable COM+ component {}", self.component)
    }

    fn execute(&mut self) -> Result<()> {
        self.complus.disable(&self.component)
    }

    // Only queued for components that were enabled.
    fn is_restorable(&self) -> bool {
        true
    }

    fn rollback(&mut self) -> Result<()> {
        self.complus.enable(&self.component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ComPlusComponent, Inventory, InventoryHost};

    #[test]
    fn enable_then_rollback() {
        let host = Arc::new(InventoryHost::in_memory(Inventory {
            complus: vec![ComPlusComponent {
                name: "Trisoft-InfoShare-Author".to_string(),
                enabled: false,
            }],
            ..Inventory::default()
        }));
        let mut action = EnableComPlusAction::new(host.clone(), "Trisoft-InfoShare-Author");
        action.backup().unwrap();
        action.execute().unwrap();
        assert!(host.components().unwrap()[0].enabled);
        action.rollback().unwrap();
        assert!(!host.components().unwrap()[0].enabled);
    }
}
