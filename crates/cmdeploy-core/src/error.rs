use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("not initialized: run 'cmdeploy init'")]
    NotInitialized,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown component: {0}")]
    UnknownComponent(String),

    #[error("invalid deployment status: {0}")]
    InvalidStatus(String),

    #[error("deployment not found: {0}")]
    DeploymentNotFound(String),

    #[error("invalid deployment name '{0}': must be alphanumeric with '-' or '_'")]
    InvalidDeploymentName(String),

    #[error("the background task component with role '{0}' does not exist")]
    RoleNotFound(String),

    #[error("administrator role not found: start a new process with elevated rights")]
    ElevationRequired,

    #[error("{subsystem} '{name}': {message}")]
    Subsystem {
        subsystem: &'static str,
        name: String,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl DeployError {
    pub fn subsystem(
        subsystem: &'static str,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        DeployError::Subsystem {
            subsystem,
            name: name.into(),
            message: message.into(),
        }
    }

    /// Usage errors are raised before any action is queued.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            DeployError::InvalidArgument(_)
                | DeployError::UnknownComponent(_)
                | DeployError::InvalidStatus(_)
                | DeployError::InvalidDeploymentName(_)
                | DeployError::RoleNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
