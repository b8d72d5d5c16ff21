//! Error types for deployment translation and the resource lifecycle.

use std::fmt;

use thiserror::Error;

use crate::component::ComponentKind;
use crate::schema::Diagnostic;

/// Errors that can occur while translating or applying a deployment plan.
#[derive(Debug, Error)]
pub enum DeploymentError {
    /// A size string did not match `<number>(.<number>)?g`.
    #[error("invalid size format \"{size}\": expected a value in gigabytes such as \"2g\" or \"0.5g\"")]
    InvalidSizeFormat {
        /// The text the user supplied.
        size: String,
    },

    /// A topology identifier did not match any template element.
    #[error(
        "{component} topology: invalid {field}: \"{id}\" doesn't match any of the deployment template instance configurations; use a different {field} or deployment template"
    )]
    TopologyElementNotFound {
        /// The component whose topology failed to match.
        component: ComponentKind,
        /// Name of the identifying attribute (`id` or `instance_configuration_id`).
        field: &'static str,
        /// The identifier that was offered.
        id: String,
    },

    /// The plan declares a component the deployment template does not offer.
    #[error(
        "{kind} specified but deployment template \"{template_id}\" has no {kind} resource; select a different deployment template"
    )]
    ComponentNotInTemplate {
        /// The component kind that was requested.
        kind: ComponentKind,
        /// The template that was searched.
        template_id: String,
    },

    /// An inline JSON settings blob could not be parsed.
    #[error("failed expanding {component} {field}: {source}")]
    SettingsParse {
        /// The component the settings belong to.
        component: ComponentKind,
        /// The settings attribute that failed to parse.
        field: &'static str,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Every deployment needs an Elasticsearch resource.
    #[error("elasticsearch block is required: a deployment must contain an Elasticsearch resource")]
    MissingElasticsearch,

    /// The observability block is not usable.
    #[error("invalid observability settings: {0}")]
    InvalidObservability(String),

    /// One or more components failed to reconcile.
    #[error("{0}")]
    Components(ComponentErrors),

    /// The plan failed syntactic validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The deployment API rejected a call.
    #[error("API error: {0}")]
    Api(String),

    /// The deployment does not exist.
    #[error("Deployment not found: {0}")]
    NotFound(String),

    /// A pending plan did not finish in time.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DeploymentError {
    /// A short, stable summary used as the diagnostic headline.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::InvalidSizeFormat { .. } => "Invalid size",
            Self::TopologyElementNotFound { .. } => "Topology element not found",
            Self::ComponentNotInTemplate { .. } => "Component not offered by deployment template",
            Self::SettingsParse { .. } => "Invalid settings JSON",
            Self::MissingElasticsearch => "Missing Elasticsearch resource",
            Self::InvalidObservability(_) => "Invalid observability settings",
            Self::Components(_) => "Deployment plan has errors",
            Self::Validation(_) => "Validation error",
            Self::Configuration(_) => "Configuration error",
            Self::Api(_) => "API error",
            Self::NotFound(_) => "Deployment not found",
            Self::Timeout(_) => "Timed out",
            Self::Serialization(_) => "Serialization error",
        }
    }

    /// The component this error is attributed to, if any.
    pub fn component(&self) -> Option<ComponentKind> {
        match self {
            Self::TopologyElementNotFound { component, .. } => Some(*component),
            Self::ComponentNotInTemplate { kind, .. } => Some(*kind),
            Self::SettingsParse { component, .. } => Some(*component),
            Self::MissingElasticsearch => Some(ComponentKind::Elasticsearch),
            _ => None,
        }
    }

    /// Convert into diagnostics, expanding aggregated component errors.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        match self {
            Self::Components(errors) => errors.into_diagnostics(),
            other => {
                let diagnostic = Diagnostic::error(other.summary()).with_detail(other.to_string());
                match other.component() {
                    Some(kind) => vec![diagnostic.with_attribute(kind.name())],
                    None => vec![diagnostic],
                }
            },
        }
    }
}

impl From<ComponentErrors> for DeploymentError {
    fn from(errors: ComponentErrors) -> Self {
        Self::Components(errors)
    }
}

/// A failure attributed to one section of the plan.
#[derive(Debug)]
pub struct ComponentError {
    /// Attribute path of the failing section (e.g. `apm`, `observability`).
    pub path: &'static str,
    /// What went wrong.
    pub error: DeploymentError,
}

/// Ordered collection of per-section failures.
///
/// The request builders return every failing section in one pass so a user can
/// fix all of them before the next apply.
#[derive(Debug, Default)]
pub struct ComponentErrors {
    errors: Vec<ComponentError>,
}

impl ComponentErrors {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for the given section.
    pub fn push(&mut self, path: &'static str, error: DeploymentError) {
        self.errors.push(ComponentError { path, error });
    }

    /// Record the error of `result` (if any) and hand back its value.
    pub fn collect<T>(&mut self, path: &'static str, result: Result<T, DeploymentError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(path, err);
                None
            },
        }
    }

    /// Number of recorded failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True when nothing failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate over the recorded failures in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentError> {
        self.errors.iter()
    }

    /// Paths of the failing sections, in order.
    pub fn paths(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.path).collect()
    }

    /// `Ok(value)` when nothing failed, the collection otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, ComponentErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// One error diagnostic per failure, tagged with the section path.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.errors
            .into_iter()
            .map(|e| {
                Diagnostic::error(e.error.summary())
                    .with_detail(e.error.to_string())
                    .with_attribute(e.path)
            })
            .collect()
    }
}

impl fmt::Display for ComponentErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", e.path, e.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ComponentErrors {}

impl IntoIterator for ComponentErrors {
    type Item = ComponentError;
    type IntoIter = std::vec::IntoIter<ComponentError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DiagnosticSeverity;

    #[test]
    fn test_topology_not_found_display() {
        let err = DeploymentError::TopologyElementNotFound {
            component: ComponentKind::Apm,
            field: "instance_configuration_id",
            id: "bogus-id".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("apm topology"));
        assert!(msg.contains("\"bogus-id\""));
        assert!(msg.contains("doesn't match any of the deployment template instance configurations"));
    }

    #[test]
    fn test_component_not_in_template_display() {
        let err = DeploymentError::ComponentNotInTemplate {
            kind: ComponentKind::Kibana,
            template_id: "aws-io-optimized-v2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "kibana specified but deployment template \"aws-io-optimized-v2\" has no kibana resource; select a different deployment template"
        );
        assert_eq!(err.component(), Some(ComponentKind::Kibana));
    }

    #[test]
    fn test_invalid_size_display_keeps_input() {
        let err = DeploymentError::InvalidSizeFormat {
            size: "2gb".to_string(),
        };
        assert!(err.to_string().contains("\"2gb\""));
        assert_eq!(err.summary(), "Invalid size");
    }

    #[test]
    fn test_component_errors_collect() {
        let mut errors = ComponentErrors::new();
        assert_eq!(errors.collect("kibana", Ok::<_, DeploymentError>(1)), Some(1));
        assert_eq!(
            errors.collect::<i32>("apm", Err(DeploymentError::Validation("bad".into()))),
            None
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.paths(), vec!["apm"]);
        assert!(errors.into_result(()).is_err());
    }

    #[test]
    fn test_component_errors_into_diagnostics() {
        let mut errors = ComponentErrors::new();
        errors.push(
            "apm",
            DeploymentError::ComponentNotInTemplate {
                kind: ComponentKind::Apm,
                template_id: "t".into(),
            },
        );
        errors.push(
            "kibana",
            DeploymentError::ComponentNotInTemplate {
                kind: ComponentKind::Kibana,
                template_id: "t".into(),
            },
        );

        let diags = DeploymentError::from(errors).into_diagnostics();
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.severity == DiagnosticSeverity::Error));
        assert_eq!(diags[0].attribute.as_deref(), Some("apm"));
        assert_eq!(diags[1].attribute.as_deref(), Some("kibana"));
    }

    #[test]
    fn test_component_errors_display_is_line_per_error() {
        let mut errors = ComponentErrors::new();
        errors.push("elasticsearch", DeploymentError::MissingElasticsearch);
        errors.push(
            "observability",
            DeploymentError::InvalidObservability("deployment_id must be set".into()),
        );
        let display = errors.to_string();
        assert_eq!(display.lines().count(), 2);
        assert!(display.lines().nth(1).unwrap().starts_with("observability: "));
    }

    #[test]
    fn test_plain_error_has_no_attribute() {
        let diags = DeploymentError::Api("boom".into()).into_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "API error");
        assert!(diags[0].attribute.is_none());
    }
}
