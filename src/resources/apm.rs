//! APM reconciler.

use super::{expand_satellite, flatten_satellite, ExpandContext, SatellitePayload};
use crate::component::{ComponentConfiguration, ComponentKind, ComponentPayload, ComponentPlan};
use crate::error::DeploymentError;
use crate::models::{
    ApmConfiguration, ApmPayload, ApmPlan, ApmSystemSettings, ApmTopologyElement,
    DeploymentResources, DeploymentTemplateInfo, ResourceInfo, TopologySize, UserSettings,
};
use crate::plan::{ComponentBlock, ComponentConfig};
use crate::topology::TopologyElement;

impl TopologyElement for ApmTopologyElement {
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

impl ComponentConfiguration for ApmConfiguration {
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

impl ComponentPlan for ApmPlan {
    type Element = ApmTopologyElement;
    type Configuration = ApmConfiguration;

    fn configuration(&self) -> &ApmConfiguration {
        &self.apm
    }

    fn configuration_mut(&mut self) -> &mut ApmConfiguration {
        &mut self.apm
    }

    fn topology(&self) -> &[ApmTopologyElement] {
        &self.cluster_topology
    }

    fn topology_mut(&mut self) -> &mut Vec<ApmTopologyElement> {
        &mut self.cluster_topology
    }
}

impl ComponentPayload for ApmPayload {
    const KIND: ComponentKind = ComponentKind::Apm;
    type Plan = ApmPlan;

    fn from_resources(resources: &DeploymentResources) -> Option<&Self> {
        resources.apm.first()
    }

    fn ref_id_mut(&mut self) -> &mut String {
        &mut self.ref_id
    }

    fn region_mut(&mut self) -> &mut String {
        &mut self.region
    }

    fn plan_mut(&mut self) -> &mut ApmPlan {
        &mut self.plan
    }
}

impl SatellitePayload for ApmPayload {
    fn elasticsearch_cluster_ref_id_mut(&mut self) -> &mut String {
        &mut self.elasticsearch_cluster_ref_id
    }

    fn expand_extras(&mut self, config: &ComponentConfig) {
        if let Some(debug) = config.debug_enabled {
            self.plan
                .apm
                .system_settings
                .get_or_insert_with(ApmSystemSettings::default)
                .debug_enabled = Some(debug);
        }
    }

    fn flatten_extras(plan: &ApmPlan, config: &mut ComponentConfig) {
        config.debug_enabled = plan
            .apm
            .system_settings
            .as_ref()
            .and_then(|s| s.debug_enabled);
    }
}

/// Build the APM payload.
pub fn expand(
    block: &ComponentBlock,
    ctx: &ExpandContext<'_>,
    template: &DeploymentTemplateInfo,
) -> Result<ApmPayload, DeploymentError> {
    expand_satellite(block, ctx, template)
}

/// Read back an APM resource.
pub fn flatten(resource: &ResourceInfo<ApmPlan>) -> Result<Option<ComponentBlock>, DeploymentError> {
    flatten_satellite::<ApmPayload>(resource)
}
