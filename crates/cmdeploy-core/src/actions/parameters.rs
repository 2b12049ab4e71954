use crate::invoker::Action;
use crate::io;
use crate::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Sets one key of a flat `key: value` YAML parameter file.
///
/// The whole file is snapshotted on backup, so rollback also removes a file
/// this action created.
pub struct SetParameterAction {
    path: PathBuf,
    key: String,
    value: String,
    snapshot: Option<Option<Vec<u8>>>,
}

impl SetParameterAction {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            value: value.into(),
            snapshot: None,
        }
    }

    fn read(&self) -> Result<BTreeMap<String, String>> {
        match io::read_snapshot(&self.path)? {
            Some(bytes) if !bytes.is_empty() => Ok(serde_yaml::from_slice(&bytes)?),
            _ => Ok(BTreeMap::new()),
        }
    }
}

impl Action for SetParameterAction {
    fn description(&self) -> String {
        format!(
            "Set parameter {} to {} in {}",
            self.key,
            self.value,
            self.path.display()
        )
    }

    fn execute(&mut self) -> Result<()> {
        let mut params = self.read()?;
        if params.get(&self.key) == Some(&self.value) {
            return Ok(());
        }
        params.insert(self.key.clone(), self.value.clone());
        let data = serde_yaml::to_string(&params)?;
        io::atomic_write(&self.path, data.as_bytes())
    }

    fn is_restorable(&self) -> bool {
        true
    }

    fn backup(&mut self) -> Result<()> {
        self.snapshot = Some(io::read_snapshot(&self.path)?);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        match &self.snapshot {
            Some(snapshot) => io::restore_snapshot(&self.path, snapshot.as_deref()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sets_key_and_keeps_others() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input-parameters.yaml");
        std::fs::write(&path, "baseurl: https://cms.example.com\n").unwrap();

        let mut action = SetParameterAction::new(&path, "authentication_type", "windows");
        action.backup().unwrap();
        action.execute().unwrap();

        let params: BTreeMap<String, String> =
            serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(params["authentication_type"], "windows");
        assert_eq!(params["baseurl"], "https://cms.example.com");

        action.rollback().unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "baseurl: https://cms.example.com\n"
        );
    }

    #[test]
    fn rollback_removes_a_created_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("input-parameters.yaml");

        let mut action = SetParameterAction::new(&path, "authentication_type", "username");
        action.backup().unwrap();
        action.execute().unwrap();
        assert!(path.exists());

        action.rollback().unwrap();
        assert!(!path.exists());
    }
}
