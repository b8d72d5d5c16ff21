//! The user-facing shape of a deployment.
//!
//! A [`DeploymentPlan`] is what the host framework hands over as planned or
//! prior state (JSON, deserialized with serde) and what the read path produces
//! for drift detection. Computed attributes are `Option`s that the read path
//! fills in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::component::ComponentKind;
use crate::topology::TopologyElement;

fn default_true() -> bool {
    true
}

/// A deployment as declared by the user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentPlan {
    /// Deployment id (computed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Deployment alias used in endpoint names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Stack version applied to every component.
    pub version: String,
    /// Region the deployment lives in.
    pub region: String,
    /// The deployment template the topology is matched against.
    pub deployment_template_id: String,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    /// Traffic filter ruleset ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traffic_filter: Vec<String>,
    /// Where logs and metrics are shipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityBlock>,
    /// The Elasticsearch resource. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch: Option<ElasticsearchBlock>,
    /// Kibana resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kibana: Option<ComponentBlock>,
    /// APM resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apm: Option<ComponentBlock>,
    /// Enterprise Search resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_search: Option<ComponentBlock>,
    /// Integrations Server resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrations_server: Option<ComponentBlock>,
}

impl DeploymentPlan {
    /// The satellite block of the given kind. `None` for Elasticsearch.
    pub fn satellite(&self, kind: ComponentKind) -> Option<&ComponentBlock> {
        match kind {
            ComponentKind::Elasticsearch => None,
            ComponentKind::Kibana => self.kibana.as_ref(),
            ComponentKind::Apm => self.apm.as_ref(),
            ComponentKind::EnterpriseSearch => self.enterprise_search.as_ref(),
            ComponentKind::IntegrationsServer => self.integrations_server.as_ref(),
        }
    }

    /// Mutable satellite block of the given kind. `None` for Elasticsearch.
    pub fn satellite_mut(&mut self, kind: ComponentKind) -> Option<&mut ComponentBlock> {
        match kind {
            ComponentKind::Elasticsearch => None,
            ComponentKind::Kibana => self.kibana.as_mut(),
            ComponentKind::Apm => self.apm.as_mut(),
            ComponentKind::EnterpriseSearch => self.enterprise_search.as_mut(),
            ComponentKind::IntegrationsServer => self.integrations_server.as_mut(),
        }
    }

    /// The Elasticsearch `ref_id` satellites attach to.
    pub fn elasticsearch_ref_id(&self) -> &str {
        self.elasticsearch
            .as_ref()
            .and_then(|es| es.ref_id.as_deref())
            .unwrap_or_else(|| ComponentKind::Elasticsearch.default_ref_id())
    }
}

/// One topology slot requested by the user.
///
/// When no identifier is given the slot is matched by position against the
/// template's topology. Reordering identifier-less blocks between applies
/// therefore silently moves sizes between tiers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopologyRequest {
    /// Elasticsearch tier id (`hot_content`, `warm`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Instance configuration id. Identifies non-Elasticsearch topology slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_configuration_id: Option<String>,
    /// Size such as `"2g"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// `memory` (default) or `storage`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_resource: Option<String>,
    /// Number of availability zones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_count: Option<i32>,
}

impl TopologyRequest {
    /// The identifier used to match this request for `kind`.
    pub fn identifier(&self, kind: ComponentKind) -> Option<&str> {
        let id = match kind {
            ComponentKind::Elasticsearch => self.id.as_deref(),
            _ => self.instance_configuration_id.as_deref(),
        };
        id.filter(|id| !id.is_empty())
    }

    /// Set the identifier used to match this request for `kind`.
    pub fn set_identifier(&mut self, kind: ComponentKind, id: String) {
        match kind {
            ComponentKind::Elasticsearch => self.id = Some(id),
            _ => self.instance_configuration_id = Some(id),
        }
    }

    /// Build the read-path entry for a wire element.
    ///
    /// Returns `None` for elements without a size or with a zero size: those
    /// are tiers the deployment does not use.
    pub fn from_element<T: TopologyElement>(kind: ComponentKind, element: &T) -> Option<Self> {
        let size = element.size().filter(|s| s.value > 0)?;
        let mut request = TopologyRequest {
            size: Some(crate::size::format_size(size.value)),
            size_resource: Some(size.resource.clone()),
            zone_count: Some(element.zone_count()),
            ..Default::default()
        };
        request.set_identifier(kind, element.identifier().to_string());
        if kind == ComponentKind::Elasticsearch {
            request.instance_configuration_id = element.instance_configuration_id().map(str::to_string);
        }
        Some(request)
    }
}

impl AsRef<TopologyRequest> for TopologyRequest {
    fn as_ref(&self) -> &TopologyRequest {
        self
    }
}

/// Configuration overrides of a component.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Custom docker image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,
    /// JSON-encoded user settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_json: Option<String>,
    /// JSON-encoded override settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_override_json: Option<String>,
    /// YAML user settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_yaml: Option<String>,
    /// YAML override settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_override_yaml: Option<String>,
    /// APM / Integrations Server debug logging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_enabled: Option<bool>,
    /// Elasticsearch built-in plugins.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<String>,
}

impl ComponentConfig {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A Kibana, APM, Enterprise Search or Integrations Server resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentBlock {
    /// Elasticsearch resource this component attaches to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch_cluster_ref_id: Option<String>,
    /// Reference id of this resource within the deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    /// Resource id (computed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    /// Region (computed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// HTTP endpoint (computed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_endpoint: Option<String>,
    /// HTTPS endpoint (computed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_endpoint: Option<String>,
    /// Topology overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topology: Vec<TopologyRequest>,
    /// Configuration overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ComponentConfig>,
}

/// Autoscaling limits of one Elasticsearch tier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopologyAutoscaling {
    /// Largest size the tier may grow to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<String>,
    /// Resource of `max_size`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size_resource: Option<String>,
    /// Smallest size the tier may shrink to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<String>,
    /// Resource of `min_size`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size_resource: Option<String>,
    /// JSON-encoded autoscaling policy override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_override_json: Option<String>,
}

/// One Elasticsearch tier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElasticsearchTopology {
    /// Identifier and sizing.
    #[serde(flatten)]
    pub topology: TopologyRequest,
    /// Node roles (computed from the template).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_roles: Vec<String>,
    /// Legacy data node flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type_data: Option<bool>,
    /// Legacy master node flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type_master: Option<bool>,
    /// Legacy ingest node flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type_ingest: Option<bool>,
    /// Legacy machine learning node flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type_ml: Option<bool>,
    /// Autoscaling limits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscaling: Option<TopologyAutoscaling>,
    /// Per-tier settings overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ComponentConfig>,
}

impl AsRef<TopologyRequest> for ElasticsearchTopology {
    fn as_ref(&self) -> &TopologyRequest {
        &self.topology
    }
}

/// Trust towards all clusters of another account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrustAccount {
    /// Account id.
    pub account_id: String,
    /// Trust every cluster of the account.
    #[serde(default)]
    pub trust_all: bool,
    /// Cluster ids to trust when `trust_all` is false.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trust_allowlist: Vec<String>,
}

/// Trust towards an external environment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrustExternal {
    /// Trust relationship id.
    pub relationship_id: String,
    /// Trust every cluster of the environment.
    #[serde(default)]
    pub trust_all: bool,
    /// Cluster ids to trust when `trust_all` is false.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trust_allowlist: Vec<String>,
}

/// Restore data from a snapshot of another cluster on creation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SnapshotSource {
    /// Cluster the snapshot is taken from.
    pub source_elasticsearch_cluster_id: String,
    /// Snapshot name; the latest successful snapshot when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_name: Option<String>,
}

/// How a plan change is rolled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStrategyKind {
    /// Let the API pick.
    Autodetect,
    /// Create new nodes, migrate, then remove old ones.
    GrowAndShrink,
    /// Grow and shrink one zone at a time.
    RollingGrowAndShrink,
    /// Restart every node at once.
    RollingAll,
}

/// The Elasticsearch resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElasticsearchBlock {
    /// Reference id of this resource within the deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    /// Resource id (computed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    /// Region (computed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Cloud id (computed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_id: Option<String>,
    /// HTTP endpoint (computed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_endpoint: Option<String>,
    /// HTTPS endpoint (computed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_endpoint: Option<String>,
    /// Enable autoscaling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscale: Option<bool>,
    /// Tier overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topology: Vec<ElasticsearchTopology>,
    /// Cluster-wide configuration overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ComponentConfig>,
    /// Account trust relationships.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trust_account: Vec<TrustAccount>,
    /// External trust relationships.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trust_external: Vec<TrustExternal>,
    /// Snapshot to restore on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_source: Option<SnapshotSource>,
    /// Rollout strategy for plan changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<PlanStrategyKind>,
}

/// Ship logs and/or metrics to a monitoring deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityBlock {
    /// Target deployment id, or `self`.
    pub deployment_id: String,
    /// Target Elasticsearch `ref_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    /// Ship logs.
    #[serde(default = "default_true")]
    pub logs: bool,
    /// Ship metrics.
    #[serde(default = "default_true")]
    pub metrics: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_minimal_plan() {
        let plan: DeploymentPlan = serde_json::from_value(json!({
            "version": "8.4.3",
            "region": "us-east-1",
            "deployment_template_id": "aws-io-optimized-v2",
            "elasticsearch": {}
        }))
        .unwrap();

        assert_eq!(plan.version, "8.4.3");
        assert!(plan.elasticsearch.is_some());
        assert!(plan.kibana.is_none());
        assert_eq!(plan.elasticsearch_ref_id(), "main-elasticsearch");
    }

    #[test]
    fn test_elasticsearch_topology_flattens_sizing() {
        let topology: ElasticsearchTopology = serde_json::from_value(json!({
            "id": "hot_content",
            "size": "8g",
            "zone_count": 2,
            "autoscaling": {"max_size": "64g"}
        }))
        .unwrap();

        assert_eq!(topology.topology.id.as_deref(), Some("hot_content"));
        assert_eq!(topology.topology.size.as_deref(), Some("8g"));
        assert_eq!(topology.topology.zone_count, Some(2));
        assert_eq!(
            topology.autoscaling.unwrap().max_size.as_deref(),
            Some("64g")
        );
    }

    #[test]
    fn test_identifier_per_kind() {
        let request = TopologyRequest {
            id: Some("hot_content".into()),
            instance_configuration_id: Some("aws.es.datahot.i3".into()),
            ..Default::default()
        };
        assert_eq!(request.identifier(ComponentKind::Elasticsearch), Some("hot_content"));
        assert_eq!(request.identifier(ComponentKind::Kibana), Some("aws.es.datahot.i3"));

        let blank = TopologyRequest {
            instance_configuration_id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(blank.identifier(ComponentKind::Apm), None);
    }

    #[test]
    fn test_observability_defaults_to_logs_and_metrics() {
        let block: ObservabilityBlock =
            serde_json::from_value(json!({"deployment_id": "self"})).unwrap();
        assert!(block.logs);
        assert!(block.metrics);
        assert!(block.ref_id.is_none());
    }

    #[test]
    fn test_strategy_names() {
        let strategy: PlanStrategyKind = serde_json::from_value(json!("rolling_all")).unwrap();
        assert_eq!(strategy, PlanStrategyKind::RollingAll);
    }

    #[test]
    fn test_satellite_lookup() {
        let mut plan = DeploymentPlan {
            apm: Some(ComponentBlock::default()),
            ..Default::default()
        };
        assert!(plan.satellite(ComponentKind::Apm).is_some());
        assert!(plan.satellite(ComponentKind::Kibana).is_none());
        assert!(plan.satellite(ComponentKind::Elasticsearch).is_none());
        plan.satellite_mut(ComponentKind::Apm).unwrap().ref_id = Some("x".into());
        assert_eq!(plan.apm.unwrap().ref_id.as_deref(), Some("x"));
    }
}
