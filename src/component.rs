//! Component kinds and the traits tying them to their wire payloads.
//!
//! Every service a deployment can carry is one [`ComponentKind`]. Per-kind
//! constants (size floors, default ref ids, attribute names) live in a single
//! dispatch table here; the wire payload of each kind implements
//! [`ComponentPayload`] so the reconcilers can be written once.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DeploymentError;
use crate::models::{DeploymentResources, DeploymentTemplateInfo, UserSettings};
use crate::topology::TopologyElement;

/// Zone counts below this are raised to it.
pub const MINIMUM_ZONE_COUNT: i32 = 1;

/// A service kind that can be part of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// The Elasticsearch cluster. Mandatory.
    Elasticsearch,
    /// Kibana.
    Kibana,
    /// APM server.
    Apm,
    /// Enterprise Search.
    EnterpriseSearch,
    /// Integrations Server (APM + Fleet).
    IntegrationsServer,
}

impl ComponentKind {
    /// All kinds, in the order errors are reported.
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Elasticsearch,
        ComponentKind::Kibana,
        ComponentKind::Apm,
        ComponentKind::EnterpriseSearch,
        ComponentKind::IntegrationsServer,
    ];

    /// The attribute / resource name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Elasticsearch => "elasticsearch",
            Self::Kibana => "kibana",
            Self::Apm => "apm",
            Self::EnterpriseSearch => "enterprise_search",
            Self::IntegrationsServer => "integrations_server",
        }
    }

    /// Human readable product name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Elasticsearch => "Elasticsearch",
            Self::Kibana => "Kibana",
            Self::Apm => "APM",
            Self::EnterpriseSearch => "Enterprise Search",
            Self::IntegrationsServer => "Integrations Server",
        }
    }

    /// Size floor in megabytes applied to template topology elements.
    ///
    /// Elasticsearch has no floor: template tiers with a zero size are tiers
    /// the deployment does not use and must stay disabled.
    pub fn minimum_size(self) -> i32 {
        match self {
            Self::Elasticsearch => 0,
            Self::Kibana => 1024,
            Self::Apm => 512,
            Self::EnterpriseSearch => 2048,
            Self::IntegrationsServer => 1024,
        }
    }

    /// The `ref_id` used when the plan leaves it unset.
    pub fn default_ref_id(self) -> &'static str {
        match self {
            Self::Elasticsearch => "main-elasticsearch",
            Self::Kibana => "main-kibana",
            Self::Apm => "main-apm",
            Self::EnterpriseSearch => "main-enterprise_search",
            Self::IntegrationsServer => "main-integrations_server",
        }
    }

    /// The topology attribute that identifies a template element.
    pub fn identifier_field(self) -> &'static str {
        match self {
            Self::Elasticsearch => "id",
            _ => "instance_configuration_id",
        }
    }

    /// Whether the template offers a resource of this kind.
    pub fn is_offered_by(self, template: &DeploymentTemplateInfo) -> bool {
        let resources = template.resources();
        match self {
            Self::Elasticsearch => !resources.elasticsearch.is_empty(),
            Self::Kibana => !resources.kibana.is_empty(),
            Self::Apm => !resources.apm.is_empty(),
            Self::EnterpriseSearch => !resources.enterprise_search.is_empty(),
            Self::IntegrationsServer => !resources.integrations_server.is_empty(),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The versioned configuration object of a component's plan.
pub trait ComponentConfiguration {
    /// Stack version of the component.
    fn version_mut(&mut self) -> &mut Option<String>;
    /// Custom docker image, if any.
    fn docker_image(&self) -> Option<&str>;
    /// Mutable docker image.
    fn docker_image_mut(&mut self) -> &mut Option<String>;
    /// Free-form user settings.
    fn user_settings(&self) -> &UserSettings;
    /// Mutable free-form user settings.
    fn user_settings_mut(&mut self) -> &mut UserSettings;
}

/// The plan object of a component: one configuration and a topology list.
pub trait ComponentPlan {
    /// The topology element type.
    type Element: TopologyElement;
    /// The configuration type.
    type Configuration: ComponentConfiguration;

    /// Plan-level configuration.
    fn configuration(&self) -> &Self::Configuration;
    /// Mutable plan-level configuration.
    fn configuration_mut(&mut self) -> &mut Self::Configuration;
    /// Topology elements.
    fn topology(&self) -> &[Self::Element];
    /// Mutable topology elements.
    fn topology_mut(&mut self) -> &mut Vec<Self::Element>;
}

/// A component's create/update payload.
pub trait ComponentPayload: Clone {
    /// The kind this payload belongs to.
    const KIND: ComponentKind;
    /// The plan type carried by the payload.
    type Plan: ComponentPlan;

    /// The template's payload for this kind, if the template offers one.
    fn from_resources(resources: &DeploymentResources) -> Option<&Self>;
    /// Mutable `ref_id`.
    fn ref_id_mut(&mut self) -> &mut String;
    /// Mutable region.
    fn region_mut(&mut self) -> &mut String;
    /// Mutable plan.
    fn plan_mut(&mut self) -> &mut Self::Plan;
}

/// Look up the template's payload for `P::KIND`.
///
/// Returns an owned copy that the caller reconciles in place. Fails with
/// [`DeploymentError::ComponentNotInTemplate`] when the template offers no
/// such resource.
pub fn require_component<P: ComponentPayload>(
    template: &DeploymentTemplateInfo,
) -> Result<P, DeploymentError> {
    P::from_resources(template.resources())
        .cloned()
        .ok_or_else(|| DeploymentError::ComponentNotInTemplate {
            kind: P::KIND,
            template_id: template.id.clone(),
        })
}
