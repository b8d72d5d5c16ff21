//! Wire model of the deployment API.
//!
//! These mirror the vendor's REST JSON bodies. Only the fields the deployment
//! resource reads or writes are modelled; unknown fields are ignored on input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn is_false(b: &bool) -> bool {
    !*b
}

/// A capacity value. `value` is in megabytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopologySize {
    pub value: i32,
    pub resource: String,
}

impl TopologySize {
    pub fn memory(value: i32) -> Self {
        Self {
            value,
            resource: crate::size::DEFAULT_SIZE_RESOURCE.to_string(),
        }
    }
}

/// Free-form settings shared by every component configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_json: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_override_json: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_yaml: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_settings_override_yaml: Option<String>,
}

impl UserSettings {
    pub fn is_empty(&self) -> bool {
        self.user_settings_json.is_none()
            && self.user_settings_override_json.is_none()
            && self.user_settings_yaml.is_none()
            && self.user_settings_override_yaml.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeploymentTemplateReference {
    pub id: String,
}

// ---------------------------------------------------------------------------
// Elasticsearch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElasticsearchConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,
    #[serde(flatten)]
    pub user_settings: UserSettings,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled_built_in_plugins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElasticsearchNodeType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingest: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElasticsearchClusterTopologyElement {
    /// Tier identifier such as `hot_content`.
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_configuration_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TopologySize>,
    #[serde(default)]
    pub zone_count: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<ElasticsearchNodeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscaling_max: Option<TopologySize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscaling_min: Option<TopologySize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscaling_policy_override_json: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch: Option<ElasticsearchConfiguration>,
}

/// Plan strategy. Exactly one field is set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanStrategy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autodetect: Option<EmptyObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grow_and_shrink: Option<EmptyObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_grow_and_shrink: Option<EmptyObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling: Option<RollingStrategyConfig>,
}

/// Serializes as `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmptyObject {}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RollingStrategyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RestoreSnapshotConfiguration {
    pub source_cluster_id: String,
    pub snapshot_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransientElasticsearchPlanConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<PlanStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_snapshot: Option<RestoreSnapshotConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElasticsearchClusterPlan {
    #[serde(default)]
    pub elasticsearch: ElasticsearchConfiguration,
    #[serde(default)]
    pub cluster_topology: Vec<ElasticsearchClusterTopologyElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_template: Option<DeploymentTemplateReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscaling_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transient: Option<TransientElasticsearchPlanConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountTrustRelationship {
    pub account_id: String,
    #[serde(default)]
    pub trust_all: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trust_allowlist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExternalTrustRelationship {
    pub trust_relationship_id: String,
    #[serde(default)]
    pub trust_all: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trust_allowlist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElasticsearchClusterTrustSettings {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<AccountTrustRelationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<ExternalTrustRelationship>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElasticsearchClusterSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust: Option<ElasticsearchClusterTrustSettings>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElasticsearchPayload {
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub region: String,
    pub plan: ElasticsearchClusterPlan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<ElasticsearchClusterSettings>,
}

// ---------------------------------------------------------------------------
// Kibana
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KibanaConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,
    #[serde(flatten)]
    pub user_settings: UserSettings,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KibanaClusterTopologyElement {
    #[serde(default)]
    pub instance_configuration_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TopologySize>,
    #[serde(default)]
    pub zone_count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kibana: Option<KibanaConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KibanaClusterPlan {
    #[serde(default)]
    pub kibana: KibanaConfiguration,
    #[serde(default)]
    pub cluster_topology: Vec<KibanaClusterTopologyElement>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KibanaPayload {
    #[serde(default)]
    pub elasticsearch_cluster_ref_id: String,
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub region: String,
    pub plan: KibanaClusterPlan,
}

// ---------------------------------------------------------------------------
// APM
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApmSystemSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApmConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_settings: Option<ApmSystemSettings>,
    #[serde(flatten)]
    pub user_settings: UserSettings,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApmTopologyElement {
    #[serde(default)]
    pub instance_configuration_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TopologySize>,
    #[serde(default)]
    pub zone_count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apm: Option<ApmConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApmPlan {
    #[serde(default)]
    pub apm: ApmConfiguration,
    #[serde(default)]
    pub cluster_topology: Vec<ApmTopologyElement>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApmPayload {
    #[serde(default)]
    pub elasticsearch_cluster_ref_id: String,
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub region: String,
    pub plan: ApmPlan,
}

// ---------------------------------------------------------------------------
// Enterprise Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnterpriseSearchConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,
    #[serde(flatten)]
    pub user_settings: UserSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnterpriseSearchNodeTypes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appserver: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnterpriseSearchTopologyElement {
    #[serde(default)]
    pub instance_configuration_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TopologySize>,
    #[serde(default)]
    pub zone_count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<EnterpriseSearchNodeTypes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_search: Option<EnterpriseSearchConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnterpriseSearchPlan {
    #[serde(default)]
    pub enterprise_search: EnterpriseSearchConfiguration,
    #[serde(default)]
    pub cluster_topology: Vec<EnterpriseSearchTopologyElement>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnterpriseSearchPayload {
    #[serde(default)]
    pub elasticsearch_cluster_ref_id: String,
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub region: String,
    pub plan: EnterpriseSearchPlan,
}

// ---------------------------------------------------------------------------
// Integrations Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntegrationsServerSystemSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IntegrationsServerConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_settings: Option<IntegrationsServerSystemSettings>,
    #[serde(flatten)]
    pub user_settings: UserSettings,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IntegrationsServerTopologyElement {
    #[serde(default)]
    pub instance_configuration_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TopologySize>,
    #[serde(default)]
    pub zone_count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrations_server: Option<IntegrationsServerConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IntegrationsServerPlan {
    #[serde(default)]
    pub integrations_server: IntegrationsServerConfiguration,
    #[serde(default)]
    pub cluster_topology: Vec<IntegrationsServerTopologyElement>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IntegrationsServerPayload {
    #[serde(default)]
    pub elasticsearch_cluster_ref_id: String,
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub region: String,
    pub plan: IntegrationsServerPlan,
}

// ---------------------------------------------------------------------------
// Deployment requests
// ---------------------------------------------------------------------------

/// Resources of a create or update request (and of a template).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentResources {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elasticsearch: Vec<ElasticsearchPayload>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kibana: Vec<KibanaPayload>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apm: Vec<ApmPayload>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enterprise_search: Vec<EnterpriseSearchPayload>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrations_server: Vec<IntegrationsServerPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetadataItem {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeploymentMetadata {
    #[serde(default)]
    pub tags: Vec<MetadataItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrafficFilterSettings {
    #[serde(default)]
    pub rulesets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObservabilityAbsoluteDeployment {
    pub deployment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeploymentObservabilityDestination {
    pub destination: ObservabilityAbsoluteDeployment,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeploymentObservabilitySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<DeploymentObservabilityDestination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<DeploymentObservabilityDestination>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeploymentCreateSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_filter_settings: Option<TrafficFilterSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observability: Option<DeploymentObservabilitySettings>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentCreateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub resources: DeploymentResources,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<DeploymentCreateSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DeploymentMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeploymentUpdateSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observability: Option<DeploymentObservabilitySettings>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub prune_orphans: bool,
    #[serde(default)]
    pub resources: DeploymentResources,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<DeploymentUpdateSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DeploymentMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeploymentCreateResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// A deployment template: which resources and topology elements exist, with
/// their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentTemplateInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub deployment_template: DeploymentCreateRequest,
}

impl DeploymentTemplateInfo {
    pub fn resources(&self) -> &DeploymentResources {
        &self.deployment_template.resources
    }
}

// ---------------------------------------------------------------------------
// Read model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClusterMetadataPortInfo {
    #[serde(default)]
    pub http: i32,
    #[serde(default)]
    pub https: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClusterMetadataInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<ClusterMetadataPortInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterPlanInfo<P> {
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub plan: Option<P>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterPlansInfo<P> {
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub current: Option<ClusterPlanInfo<P>>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub pending: Option<ClusterPlanInfo<P>>,
}

impl<P> ClusterPlansInfo<P> {
    pub fn current_plan(&self) -> Option<&P> {
        self.current.as_ref().and_then(|c| c.plan.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterInfo<P> {
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub healthy: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ClusterMetadataInfo>,
    pub plan_info: ClusterPlansInfo<P>,
    /// Only populated for Elasticsearch resources.
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub settings: Option<ElasticsearchClusterSettings>,
}

impl<P> ClusterInfo<P> {
    pub fn is_stopped(&self) -> bool {
        self.status == "stopped"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInfo<P> {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub region: String,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub elasticsearch_cluster_ref_id: Option<String>,
    pub info: ClusterInfo<P>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentResourcesInfo {
    #[serde(default)]
    pub elasticsearch: Vec<ResourceInfo<ElasticsearchClusterPlan>>,
    #[serde(default)]
    pub kibana: Vec<ResourceInfo<KibanaClusterPlan>>,
    #[serde(default)]
    pub apm: Vec<ResourceInfo<ApmPlan>>,
    #[serde(default)]
    pub enterprise_search: Vec<ResourceInfo<EnterpriseSearchPlan>>,
    #[serde(default)]
    pub integrations_server: Vec<ResourceInfo<IntegrationsServerPlan>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeploymentSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_filter_settings: Option<TrafficFilterSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observability: Option<DeploymentObservabilitySettings>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentGetResponse {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub healthy: bool,
    #[serde(default)]
    pub resources: DeploymentResourcesInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<DeploymentSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DeploymentMetadata>,
}
