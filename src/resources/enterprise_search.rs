//! Enterprise Search reconciler.
//!
//! Node type flags (`appserver`, `connector`, `worker`) come from the template
//! and pass through untouched.

use super::{expand_satellite, flatten_satellite, ExpandContext, SatellitePayload};
use crate::component::{ComponentConfiguration, ComponentKind, ComponentPayload, ComponentPlan};
use crate::error::DeploymentError;
use crate::models::{
    DeploymentResources, DeploymentTemplateInfo, EnterpriseSearchConfiguration,
    EnterpriseSearchPayload, EnterpriseSearchPlan, EnterpriseSearchTopologyElement, ResourceInfo,
    TopologySize, UserSettings,
};
use crate::plan::ComponentBlock;
use crate::topology::TopologyElement;

impl TopologyElement for EnterpriseSearchTopologyElement {
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

impl ComponentConfiguration for EnterpriseSearchConfiguration {
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

impl ComponentPlan for EnterpriseSearchPlan {
    type Element = EnterpriseSearchTopologyElement;
    type Configuration = EnterpriseSearchConfiguration;

    fn configuration(&self) -> &EnterpriseSearchConfiguration {
        &self.enterprise_search
    }

    fn configuration_mut(&mut self) -> &mut EnterpriseSearchConfiguration {
        &mut self.enterprise_search
    }

    fn topology(&self) -> &[EnterpriseSearchTopologyElement] {
        &self.cluster_topology
    }

    fn topology_mut(&mut self) -> &mut Vec<EnterpriseSearchTopologyElement> {
        &mut self.cluster_topology
    }
}

impl ComponentPayload for EnterpriseSearchPayload {
    const KIND: ComponentKind = ComponentKind::EnterpriseSearch;
    type Plan = EnterpriseSearchPlan;

    fn from_resources(resources: &DeploymentResources) -> Option<&Self> {
        resources.enterprise_search.first()
    }

    fn ref_id_mut(&mut self) -> &mut String {
        &mut self.ref_id
    }

    fn region_mut(&mut self) -> &mut String {
        &mut self.region
    }

    fn plan_mut(&mut self) -> &mut EnterpriseSearchPlan {
        &mut self.plan
    }
}

impl SatellitePayload for EnterpriseSearchPayload {
    fn elasticsearch_cluster_ref_id_mut(&mut self) -> &mut String {
        &mut self.elasticsearch_cluster_ref_id
    }
}

/// Build the Enterprise Search payload.
pub fn expand(
    block: &ComponentBlock,
    ctx: &ExpandContext<'_>,
    template: &DeploymentTemplateInfo,
) -> Result<EnterpriseSearchPayload, DeploymentError> {
    expand_satellite(block, ctx, template)
}

/// Read back an Enterprise Search resource.
pub fn flatten(
    resource: &ResourceInfo<EnterpriseSearchPlan>,
) -> Result<Option<ComponentBlock>, DeploymentError> {
    flatten_satellite::<EnterpriseSearchPayload>(resource)
}
