//! Logs and metrics shipping to a monitoring deployment.

use crate::error::DeploymentError;
use crate::models::{
    DeploymentObservabilityDestination, DeploymentObservabilitySettings,
    ObservabilityAbsoluteDeployment,
};
use crate::plan::ObservabilityBlock;

/// Deployment id that refers to the deployment being configured.
pub const SELF_DEPLOYMENT: &str = "self";

/// Build the observability settings of a request.
///
/// `own_elasticsearch_ref_id` fills the target `ref_id` when the block ships
/// to `self` and names none. A block that ships neither logs nor metrics
/// yields `None`.
pub fn expand(
    block: &ObservabilityBlock,
    own_elasticsearch_ref_id: &str,
) -> Result<Option<DeploymentObservabilitySettings>, DeploymentError> {
    let deployment_id = block.deployment_id.trim();
    if deployment_id.is_empty() {
        return Err(DeploymentError::InvalidObservability(
            "deployment_id must not be empty".to_string(),
        ));
    }
    if !block.logs && !block.metrics {
        return Ok(None);
    }

    let ref_id = block
        .ref_id
        .clone()
        .filter(|r| !r.is_empty())
        .or_else(|| (deployment_id == SELF_DEPLOYMENT).then(|| own_elasticsearch_ref_id.to_string()));
    let destination = DeploymentObservabilityDestination {
        destination: ObservabilityAbsoluteDeployment {
            deployment_id: deployment_id.to_string(),
            ref_id,
        },
    };

    Ok(Some(DeploymentObservabilitySettings {
        logging: block.logs.then(|| destination.clone()),
        metrics: block.metrics.then_some(destination),
    }))
}

/// Read back observability settings.
///
/// A destination equal to `own_deployment_id` is reported as `self`.
pub fn flatten(
    settings: Option<&DeploymentObservabilitySettings>,
    own_deployment_id: &str,
) -> Option<ObservabilityBlock> {
    let settings = settings?;
    let destination = settings
        .logging
        .as_ref()
        .or(settings.metrics.as_ref())
        .map(|d| &d.destination)?;

    let deployment_id = if destination.deployment_id == own_deployment_id {
        SELF_DEPLOYMENT.to_string()
    } else {
        destination.deployment_id.clone()
    };

    Some(ObservabilityBlock {
        deployment_id,
        ref_id: destination.ref_id.clone(),
        logs: settings.logging.is_some(),
        metrics: settings.metrics.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(deployment_id: &str, logs: bool, metrics: bool) -> ObservabilityBlock {
        ObservabilityBlock {
            deployment_id: deployment_id.to_string(),
            ref_id: None,
            logs,
            metrics,
        }
    }

    #[test]
    fn test_self_uses_own_ref_id() {
        let settings = expand(&block("self", true, true), "main-elasticsearch")
            .unwrap()
            .unwrap();
        let logging = settings.logging.unwrap();
        assert_eq!(logging.destination.deployment_id, "self");
        assert_eq!(logging.destination.ref_id.as_deref(), Some("main-elasticsearch"));
        assert!(settings.metrics.is_some());
    }

    #[test]
    fn test_other_deployment_keeps_ref_id_unset() {
        let settings = expand(&block("f1d2e3", false, true), "main-elasticsearch")
            .unwrap()
            .unwrap();
        assert!(settings.logging.is_none());
        assert_eq!(settings.metrics.unwrap().destination.ref_id, None);
    }

    #[test]
    fn test_nothing_shipped() {
        assert_eq!(expand(&block("self", false, false), "x").unwrap(), None);
    }

    #[test]
    fn test_empty_deployment_id() {
        let err = expand(&block("  ", true, true), "x").unwrap_err();
        assert!(matches!(err, DeploymentError::InvalidObservability(_)));
    }

    #[test]
    fn test_flatten_reports_self() {
        let settings = expand(&block("abc123", true, false), "main-elasticsearch")
            .unwrap()
            .unwrap();
        let flattened = flatten(Some(&settings), "abc123").unwrap();
        assert_eq!(flattened.deployment_id, "self");
        assert!(flattened.logs);
        assert!(!flattened.metrics);

        let flattened = flatten(Some(&settings), "other").unwrap();
        assert_eq!(flattened.deployment_id, "abc123");
        assert!(flatten(None, "abc123").is_none());
    }
}
