use crate::host::AppPoolManager;
use crate::invoker::Action;
use crate::Result;
use std::sync::Arc;

pub struct StartAppPoolAction {
    pools: Arc<dyn AppPoolManager>,
    pool: String,
    was_running: Option<bool>,
}

impl StartAppPoolAction {
    pub fn new(pools: Arc<dyn AppPoolManager>, pool: impl Into<String>) -> Self {
        Self {
            pools,
            pool: pool.into(),
            was_running: None,
        }
    }
}

impl Action for StartAppPoolAction {
    fn description(&self) -> String {
        format!("Start application pool {}", self.pool)
    }

    fn execute(&mut self) -> Result<()> {
        self.pools.start(&self.pool)
    }

    fn is_restorable(&self) -> bool {
        true
    }

    fn backup(&mut self) -> Result<()> {
        self.was_running = Some(self.pools.is_running(&self.pool)?);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        match self.was_running {
            Some(false) => self.pools.stop(&self.pool),
            _ => Ok(()),
        }
    }
}

pub struct StopAppPoolAction {
    pools: Arc<dyn AppPoolManager>,
    pool: String,
    was_running: Option<bool>,
}

impl StopAppPoolAction {
    pub fn new(pools: Arc<dyn AppPoolManager>, pool: impl Into<String>) -> Self {
        Self {
            pools,
            pool: pool.into(),
            was_running: None,
        }
    }
}

impl Action for StopAppPoolAction {
    fn description(&self) -> String {
        format!("Stop application pool {}", self.pool)
    }

    fn execute(&mut self) -> Result<()> {
        self.pools.stop(&self.pool)
    }

    fn is_restorable(&self) -> bool {
        true
    }

    fn backup(&mut self) -> Result<()> {
        self.was_running = Some(self.pools.is_running(&self.pool)?);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        match self.was_running {
            Some(true) => self.pools.start(&self.pool),
            _ => Ok(()),
        }
    }
}

pub struct SetAppPoolPropertyAction {
    pools: Arc<dyn AppPoolManager>,
    pool: String,
    property: String,
    value: String,
    previous: Option<Option<String>>,
}

impl SetAppPoolPropertyAction {
    pub fn new(
        pools: Arc<dyn AppPoolManager>,
        pool: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            pools,
            pool: pool.into(),
            property: property.into(),
            value: value.into(),
            previous: None,
        }
    }
}

impl Action for SetAppPoolPropertyAction {
    fn description(&self) -> String {
        format!(
            "Set {} of application pool {} to {}",
            self.property, self.pool, self.value
        )
    }

    fn execute(&mut self) -> Result<()> {
        self.pools
            .set_property(&self.pool, &self.property, Some(&self.value))
    }

    fn is_restorable(&self) -> bool {
        true
    }

    fn backup(&mut self) -> Result<()> {
        self.previous = Some(self.pools.property(&self.pool, &self.property)?);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        match &self.previous {
            Some(previous) => self
                .pools
                .set_property(&self.pool, &self.property, previous.as_deref()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{AppPoolEntry, Inventory, InventoryHost};

    fn host() -> Arc<InventoryHost> {
        let mut pool = AppPoolEntry::new("TrisoftAppPoolInfoShareSTS", false);
        pool.properties
            .insert("identity_type".to_string(), "SpecificUser".to_string());
        Arc::new(InventoryHost::in_memory(Inventory {
            app_pools: vec![pool],
            ..Inventory::default()
        }))
    }

    #[test]
    fn start_rollback_stops_a_pool_that_was_stopped() {
        let host = host();
        let mut action = StartAppPoolAction::new(host.clone(), "TrisoftAppPoolInfoShareSTS");
        action.backup().unwrap();
        action.execute().unwrap();
        assert!(AppPoolManager::is_running(host.as_ref(), "TrisoftAppPoolInfoShareSTS").unwrap());
        action.rollback().unwrap();
        assert!(!AppPoolManager::is_running(host.as_ref(), "TrisoftAppPoolInfoShareSTS").unwrap());
    }

    #[test]
    fn property_rollback_restores_previous_value() {
        let host = host();
        let mut action = SetAppPoolPropertyAction::new(
            host.clone(),
            "TrisoftAppPoolInfoShareSTS",
            "identity_type",
            "ApplicationPoolIdentity",
        );
        action.backup().unwrap();
        action.execute().unwrap();
        assert_eq!(
            host.property("TrisoftAppPoolInfoShareSTS", "identity_type")
                .unwrap()
                .as_deref(),
            Some("ApplicationPoolIdentity")
        );
        action.rollback().unwrap();
        assert_eq!(
            host.property("TrisoftAppPoolInfoShareSTS", "identity_type")
                .unwrap()
                .as_deref(),
            Some("SpecificUser")
        );
    }
}
