//! Per-component reconcilers.
//!
//! Elasticsearch has its own module with tier-specific handling. Kibana, APM,
//! Enterprise Search and Integrations Server ("satellites") share
//! [`expand_satellite`] and [`flatten_satellite`]; their modules only wire the
//! wire types into the component traits and add the odd extra field.

pub mod apm;
pub mod elasticsearch;
pub mod enterprise_search;
pub mod integrations_server;
pub mod kibana;

use crate::component::{
    require_component, ComponentConfiguration, ComponentPayload, ComponentPlan,
};
use crate::error::DeploymentError;
use crate::models::{ClusterMetadataInfo, DeploymentTemplateInfo, ResourceInfo};
use crate::plan::{ComponentBlock, ComponentConfig};
use crate::settings::{expand_configuration, flatten_configuration};
use crate::topology::{flatten_topology, reconcile_topology};

/// Plan-wide values every component payload needs.
#[derive(Debug, Clone, Copy)]
pub struct ExpandContext<'a> {
    /// Deployment region.
    pub region: &'a str,
    /// Stack version.
    pub version: &'a str,
    /// The Elasticsearch `ref_id` satellites attach to by default.
    pub elasticsearch_ref_id: &'a str,
}

/// A payload that attaches to an Elasticsearch resource.
pub trait SatellitePayload: ComponentPayload {
    /// Mutable `elasticsearch_cluster_ref_id`.
    fn elasticsearch_cluster_ref_id_mut(&mut self) -> &mut String;

    /// Apply config fields specific to this kind.
    fn expand_extras(&mut self, _config: &ComponentConfig) {}

    /// Read back config fields specific to this kind.
    fn flatten_extras(_plan: &Self::Plan, _config: &mut ComponentConfig) {}
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Build the payload of a satellite component from its block and the template.
pub fn expand_satellite<P: SatellitePayload>(
    block: &ComponentBlock,
    ctx: &ExpandContext<'_>,
    template: &DeploymentTemplateInfo,
) -> Result<P, DeploymentError> {
    let kind = P::KIND;
    let mut payload: P = require_component(template)?;

    *payload.ref_id_mut() =
        non_empty(&block.ref_id).unwrap_or_else(|| kind.default_ref_id().to_string());
    *payload.elasticsearch_cluster_ref_id_mut() = non_empty(&block.elasticsearch_cluster_ref_id)
        .unwrap_or_else(|| ctx.elasticsearch_ref_id.to_string());
    *payload.region_mut() = ctx.region.to_string();

    let plan = payload.plan_mut();
    if !ctx.version.is_empty() {
        *plan.configuration_mut().version_mut() = Some(ctx.version.to_string());
    }
    if let Some(config) = &block.config {
        expand_configuration(kind, config, plan.configuration_mut())?;
    }
    let template_topology = std::mem::take(plan.topology_mut());
    *plan.topology_mut() = reconcile_topology(kind, &block.topology, template_topology)?;

    if let Some(config) = &block.config {
        payload.expand_extras(config);
    }
    Ok(payload)
}

/// Read path for a satellite resource.
///
/// Stopped resources, resources without a current plan, and resources with no
/// topology element in use yield `None`.
pub fn flatten_satellite<P: SatellitePayload>(
    resource: &ResourceInfo<P::Plan>,
) -> Result<Option<ComponentBlock>, DeploymentError> {
    if resource.info.is_stopped() {
        return Ok(None);
    }
    let Some(plan) = resource.info.plan_info.current_plan() else {
        return Ok(None);
    };

    let topology = flatten_topology(P::KIND, plan.topology());
    if topology.is_empty() {
        return Ok(None);
    }

    let mut config = flatten_configuration(plan.configuration())?.unwrap_or_default();
    P::flatten_extras(plan, &mut config);

    let (http_endpoint, https_endpoint) = endpoints(resource.info.metadata.as_ref());
    Ok(Some(ComponentBlock {
        elasticsearch_cluster_ref_id: resource.elasticsearch_cluster_ref_id.clone(),
        ref_id: Some(resource.ref_id.clone()),
        resource_id: Some(resource_id(resource)),
        region: Some(resource.region.clone()),
        http_endpoint,
        https_endpoint,
        topology,
        config: Some(config).filter(|c| !c.is_empty()),
    }))
}

pub(crate) fn resource_id<P>(resource: &ResourceInfo<P>) -> String {
    if resource.info.cluster_id.is_empty() {
        resource.id.clone()
    } else {
        resource.info.cluster_id.clone()
    }
}

/// `http://host:port` and `https://host:port` from cluster metadata.
pub(crate) fn endpoints(metadata: Option<&ClusterMetadataInfo>) -> (Option<String>, Option<String>) {
    let Some(metadata) = metadata else {
        return (None, None);
    };
    let (Some(host), Some(ports)) = (metadata.endpoint.as_deref(), metadata.ports.as_ref()) else {
        return (None, None);
    };
    let http = (ports.http > 0).then(|| format!("http://{}:{}", host, ports.http));
    let https = (ports.https > 0).then(|| format!("https://{}:{}", host, ports.https));
    (http, https)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClusterMetadataPortInfo;

    #[test]
    fn test_endpoints() {
        let metadata = ClusterMetadataInfo {
            endpoint: Some("abc.us-east-1.aws.found.io".into()),
            ports: Some(ClusterMetadataPortInfo {
                http: 9200,
                https: 443,
            }),
            ..Default::default()
        };
        let (http, https) = endpoints(Some(&metadata));
        assert_eq!(http.as_deref(), Some("http://abc.us-east-1.aws.found.io:9200"));
        assert_eq!(https.as_deref(), Some("https://abc.us-east-1.aws.found.io:443"));
    }

    #[test]
    fn test_endpoints_without_ports() {
        let metadata = ClusterMetadataInfo {
            endpoint: Some("abc".into()),
            ..Default::default()
        };
        assert_eq!(endpoints(Some(&metadata)), (None, None));
        assert_eq!(endpoints(None), (None, None));
    }
}
