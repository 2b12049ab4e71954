use crate::error::DeployError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ComponentName
// ---------------------------------------------------------------------------

/// The controllable units of a content manager deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentName {
    /// Content manager web tier (application pool).
    #[serde(rename = "cm")]
    Cm,
    /// Web services tier (application pool).
    #[serde(rename = "ws")]
    Ws,
    /// Security token service tier (application pool).
    #[serde(rename = "sts")]
    Sts,
    #[serde(rename = "translation-builder")]
    TranslationBuilder,
    #[serde(rename = "translation-organizer")]
    TranslationOrganizer,
    /// One record per role; the only kind with role multiplicity.
    #[serde(rename = "background-task")]
    BackgroundTask,
    #[serde(rename = "crawler")]
    Crawler,
    /// Search index the crawler feeds.
    #[serde(rename = "solr-lucene")]
    SolrLucene,
    /// COM+ components, shared by every deployment on the host.
    #[serde(rename = "complus")]
    ComPlus,
}

/// Where a component's effects land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentScope {
    Deployment,
    Host,
}

impl ComponentName {
    pub fn all() -> &'static [ComponentName] {
        &[
            ComponentName::Cm,
            ComponentName::Ws,
            ComponentName::Sts,
            ComponentName::TranslationBuilder,
            ComponentName::TranslationOrganizer,
            ComponentName::BackgroundTask,
            ComponentName::Crawler,
            ComponentName::SolrLucene,
            ComponentName::ComPlus,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentName::Cm => "cm",
            ComponentName::Ws => "ws",
            ComponentName::Sts => "sts",
            ComponentName::TranslationBuilder => "translation-builder",
            ComponentName::TranslationOrganizer => "translation-organizer",
            ComponentName::BackgroundTask => "background-task",
            ComponentName::Crawler => "crawler",
            ComponentName::SolrLucene => "solr-lucene",
            ComponentName::ComPlus => "complus",
        }
    }

    pub fn has_roles(self) -> bool {
        self == ComponentName::BackgroundTask
    }

    pub fn scope(self) -> ComponentScope {
        match self {
            ComponentName::ComPlus => ComponentScope::Host,
            _ => ComponentScope::Deployment,
        }
    }

    /// The Windows service kind backing this component, if any.
    pub fn service_kind(self) -> Option<ServiceKind> {
        match self {
            ComponentName::TranslationBuilder => Some(ServiceKind::TranslationBuilder),
            ComponentName::TranslationOrganizer => Some(ServiceKind::TranslationOrganizer),
            ComponentName::BackgroundTask => Some(ServiceKind::BackgroundTask),
            ComponentName::Crawler => Some(ServiceKind::Crawler),
            ComponentName::SolrLucene => Some(ServiceKind::SolrLucene),
            ComponentName::Cm | ComponentName::Ws | ComponentName::Sts | ComponentName::ComPlus => {
                None
            }
        }
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ComponentName {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentName::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DeployError::UnknownComponent(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ServiceKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    TranslationBuilder,
    TranslationOrganizer,
    BackgroundTask,
    Crawler,
    SolrLucene,
}

impl ServiceKind {
    pub fn all() -> &'static [ServiceKind] {
        &[
            ServiceKind::TranslationBuilder,
            ServiceKind::TranslationOrganizer,
            ServiceKind::BackgroundTask,
            ServiceKind::Crawler,
            ServiceKind::SolrLucene,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::TranslationBuilder => "translation-builder",
            ServiceKind::TranslationOrganizer => "translation-organizer",
            ServiceKind::BackgroundTask => "background-task",
            ServiceKind::Crawler => "crawler",
            ServiceKind::SolrLucene => "solr-lucene",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StartupType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupType {
    Automatic,
    Manual,
    Disabled,
}

impl StartupType {
    pub fn as_str(self) -> &'static str {
        match self {
            StartupType::Automatic => "automatic",
            StartupType::Manual => "manual",
            StartupType::Disabled => "disabled",
        }
    }
}

impl fmt::Display for StartupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DeploymentStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    Started,
    Starting,
    Stopped,
    Stopping,
}

impl DeploymentStatus {
    /// Subsystems are only started or stopped while the deployment is
    /// started or on its way up.
    pub fn is_active(self) -> bool {
        matches!(self, DeploymentStatus::Started | DeploymentStatus::Starting)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeploymentStatus::Started => "started",
            DeploymentStatus::Starting => "starting",
            DeploymentStatus::Stopped => "stopped",
            DeploymentStatus::Stopping => "stopping",
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeploymentStatus {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(DeploymentStatus::Started),
            "starting" => Ok(DeploymentStatus::Starting),
            "stopped" => Ok(DeploymentStatus::Stopped),
            "stopping" => Ok(DeploymentStatus::Stopping),
            _ => Err(DeployError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthenticationType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationType {
    Windows,
    Username,
}

impl AuthenticationType {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthenticationType::Windows => "windows",
            AuthenticationType::Username => "username",
        }
    }

    /// Identity the STS application pool runs under for this authentication type.
    pub fn app_pool_identity(self) -> &'static str {
        match self {
            AuthenticationType::Windows => "ApplicationPoolIdentity",
            AuthenticationType::Username => "SpecificUser",
        }
    }
}

impl fmt::Display for AuthenticationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuthenticationType {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" => Ok(AuthenticationType::Windows),
            "username" => Ok(AuthenticationType::Username),
            _ => Err(DeployError::InvalidArgument(format!(
                "unknown authentication type '{s}': expected windows or username"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_name_roundtrip() {
        for c in ComponentName::all() {
            let parsed: ComponentName = c.as_str().parse().unwrap();
            assert_eq!(parsed, *c);
        }
    }

    #[test]
    fn component_name_parse_is_case_insensitive() {
        assert_eq!("CM".parse::<ComponentName>().unwrap(), ComponentName::Cm);
        assert_eq!(
            "Solr-Lucene".parse::<ComponentName>().unwrap(),
            ComponentName::SolrLucene
        );
        assert!(matches!(
            "web".parse::<ComponentName>(),
            Err(DeployError::UnknownComponent(_))
        ));
    }

    #[test]
    fn only_complus_is_host_wide() {
        for c in ComponentName::all() {
            let host = c.scope() == ComponentScope::Host;
            assert_eq!(host, *c == ComponentName::ComPlus, "{c}");
        }
    }

    #[test]
    fn serde_names_match_display() {
        let yaml = serde_yaml::to_string(&ComponentName::SolrLucene).unwrap();
        assert_eq!(yaml.trim(), "solr-lucene");
        let yaml = serde_yaml::to_string(&ComponentName::ComPlus).unwrap();
        assert_eq!(yaml.trim(), "complus");
    }

    #[test]
    fn active_statuses() {
        assert!(DeploymentStatus::Started.is_active());
        assert!(DeploymentStatus::Starting.is_active());
        assert!(!DeploymentStatus::Stopped.is_active());
        assert!(!DeploymentStatus::Stopping.is_active());
    }
}
