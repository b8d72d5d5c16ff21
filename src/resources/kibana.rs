//! Kibana reconciler.

use super::{expand_satellite, flatten_satellite, ExpandContext, SatellitePayload};
use crate::component::{ComponentConfiguration, ComponentKind, ComponentPayload, ComponentPlan};
use crate::error::DeploymentError;
use crate::models::{
    DeploymentResources, DeploymentTemplateInfo, KibanaClusterPlan, KibanaClusterTopologyElement,
    KibanaConfiguration, KibanaPayload, ResourceInfo, TopologySize, UserSettings,
};
use crate::plan::ComponentBlock;
use crate::topology::TopologyElement;

impl TopologyElement for KibanaClusterTopologyElement {
    fn identifier(&self) -> &str {
        &self.instance_configuration_id
    }

    fn instance_configuration_id(&self) -> Option<&str> {
        Some(&self.instance_configuration_id)
    }

    fn size(&self) -> Option<&TopologySize> {
        self.size.as_ref()
    }

    fn set_size(&mut self, size: TopologySize) {
        self.size = Some(size);
    }

    fn zone_count(&self) -> i32 {
        self.zone_count
    }

    fn set_zone_count(&mut self, zone_count: i32) {
        self.zone_count = zone_count;
    }
}

impl ComponentConfiguration for KibanaConfiguration {
    fn version_mut(&mut self) -> &mut Option<String> {
        &mut self.version
    }

    fn docker_image(&self) -> Option<&str> {
        self.docker_image.as_deref()
    }

    fn docker_image_mut(&mut self) -> &mut Option<String> {
        &mut self.docker_image
    }

    fn user_settings(&self) -> &UserSettings {
        &self.user_settings
    }

    fn user_settings_mut(&mut self) -> &mut UserSettings {
        &mut self.user_settings
    }
}

impl ComponentPlan for KibanaClusterPlan {
    type Element = KibanaClusterTopologyElement;
    type Configuration = KibanaConfiguration;

    fn configuration(&self) -> &KibanaConfiguration {
        &self.kibana
    }

    fn configuration_mut(&mut self) -> &mut KibanaConfiguration {
        &mut self.kibana
    }

    fn topology(&self) -> &[KibanaClusterTopologyElement] {
        &self.cluster_topology
    }

    fn topology_mut(&mut self) -> &mut Vec<KibanaClusterTopologyElement> {
        &mut self.cluster_topology
    }
}

impl ComponentPayload for KibanaPayload {
    const KIND: ComponentKind = ComponentKind::Kibana;
    type Plan = KibanaClusterPlan;

    fn from_resources(resources: &DeploymentResources) -> Option<&Self> {
        resources.kibana.first()
    }

    fn ref_id_mut(&mut self) -> &mut String {
        &mut self.ref_id
    }

    fn region_mut(&mut self) -> &mut String {
        &mut self.region
    }

    fn plan_mut(&mut self) -> &mut KibanaClusterPlan {
        &mut self.plan
    }
}

impl SatellitePayload for KibanaPayload {
    fn elasticsearch_cluster_ref_id_mut(&mut self) -> &mut String {
        &mut self.elasticsearch_cluster_ref_id
    }
}

/// Build the Kibana payload.
pub fn expand(
    block: &ComponentBlock,
    ctx: &ExpandContext<'_>,
    template: &DeploymentTemplateInfo,
) -> Result<KibanaPayload, DeploymentError> {
    expand_satellite(block, ctx, template)
}

/// Read back a Kibana resource.
pub fn flatten(
    resource: &ResourceInfo<KibanaClusterPlan>,
) -> Result<Option<ComponentBlock>, DeploymentError> {
    flatten_satellite::<KibanaPayload>(resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{ComponentConfig, TopologyRequest};
    use crate::testing::fixtures;
    use serde_json::json;

    fn ctx() -> ExpandContext<'static> {
        ExpandContext {
            region: "us-east-1",
            version: "8.4.3",
            elasticsearch_ref_id: "main-elasticsearch",
        }
    }

    #[test]
    fn test_expand_defaults() {
        let template = fixtures::io_optimized_template();
        let payload = expand(&ComponentBlock::default(), &ctx(), &template).unwrap();

        assert_eq!(payload.ref_id, "main-kibana");
        assert_eq!(payload.elasticsearch_cluster_ref_id, "main-elasticsearch");
        assert_eq!(payload.region, "us-east-1");
        assert_eq!(payload.plan.kibana.version.as_deref(), Some("8.4.3"));
        assert_eq!(payload.plan.cluster_topology.len(), 1);
        assert_eq!(
            payload.plan.cluster_topology[0].size,
            Some(TopologySize::memory(1024))
        );
        assert_eq!(payload.plan.cluster_topology[0].zone_count, 1);
    }

    #[test]
    fn test_expand_with_overrides() {
        let template = fixtures::io_optimized_template();
        let block = ComponentBlock {
            ref_id: Some("secondary-kibana".into()),
            elasticsearch_cluster_ref_id: Some("other-es".into()),
            topology: vec![TopologyRequest {
                size: Some("2g".into()),
                zone_count: Some(2),
                ..Default::default()
            }],
            config: Some(ComponentConfig {
                user_settings_json: Some(r#"{"server.maxPayload": 2097152}"#.into()),
                docker_image: Some("docker.elastic.co/kibana:8.4.3".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let payload = expand(&block, &ctx(), &template).unwrap();
        assert_eq!(payload.ref_id, "secondary-kibana");
        assert_eq!(payload.elasticsearch_cluster_ref_id, "other-es");

        let topology = &payload.plan.cluster_topology[0];
        assert_eq!(topology.instance_configuration_id, fixtures::KIBANA_IC);
        assert_eq!(topology.size, Some(TopologySize::memory(2048)));
        assert_eq!(topology.zone_count, 2);
        assert_eq!(
            payload.plan.kibana.user_settings.user_settings_json,
            Some(json!({"server.maxPayload": 2097152}))
        );
        assert_eq!(
            payload.plan.kibana.docker_image.as_deref(),
            Some("docker.elastic.co/kibana:8.4.3")
        );
    }

    #[test]
    fn test_flatten_round_trip() {
        let template = fixtures::io_optimized_template();
        let block = ComponentBlock {
            topology: vec![TopologyRequest {
                instance_configuration_id: Some(fixtures::KIBANA_IC.into()),
                size: Some("4g".into()),
                zone_count: Some(2),
                ..Default::default()
            }],
            ..Default::default()
        };
        let payload = expand(&block, &ctx(), &template).unwrap();
        let info = fixtures::resource_info(&payload.ref_id, &payload.region, payload.plan.clone());

        let flattened = flatten(&info).unwrap().unwrap();
        assert_eq!(flattened.ref_id.as_deref(), Some("main-kibana"));
        assert_eq!(flattened.topology.len(), 1);
        assert_eq!(flattened.topology[0].size.as_deref(), Some("4g"));
        assert_eq!(flattened.topology[0].zone_count, Some(2));
        assert!(flattened.config.is_none());
    }

    #[test]
    fn test_flatten_stopped_resource() {
        let mut info = fixtures::resource_info("main-kibana", "us-east-1", KibanaClusterPlan::default());
        info.info.status = "stopped".into();
        assert!(flatten(&info).unwrap().is_none());
    }
}
