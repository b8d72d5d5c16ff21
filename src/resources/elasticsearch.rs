//! Elasticsearch reconciler.
//!
//! Tiers are matched by their `id` (`hot_content`, `warm`, ...). On top of the
//! shared size and zone handling each tier carries node roles or legacy node
//! type flags, autoscaling limits and per-tier settings. The cluster itself
//! carries trust relationships, the autoscale switch, and transient plan
//! settings (rollout strategy, snapshot restore).

use tracing::debug;

use super::{endpoints, resource_id, ExpandContext};
use crate::component::{
    require_component, ComponentConfiguration, ComponentKind, ComponentPayload, ComponentPlan,
};
use crate::error::DeploymentError;
use crate::models::{
    AccountTrustRelationship, DeploymentResources, DeploymentTemplateInfo,
    DeploymentTemplateReference, ElasticsearchClusterPlan, ElasticsearchClusterSettings,
    ElasticsearchClusterTopologyElement, ElasticsearchClusterTrustSettings,
    ElasticsearchConfiguration, ElasticsearchNodeType, ElasticsearchPayload, EmptyObject,
    ExternalTrustRelationship, PlanStrategy, ResourceInfo, RestoreSnapshotConfiguration,
    RollingStrategyConfig, TopologySize, TransientElasticsearchPlanConfiguration, UserSettings,
};
use crate::plan::{
    ComponentConfig, ElasticsearchBlock, ElasticsearchTopology, PlanStrategyKind,
    TopologyAutoscaling, TopologyRequest, TrustAccount, TrustExternal,
};
use crate::settings::{
    expand_configuration, expand_user_settings, flatten_configuration, flatten_user_settings,
    parse_json_setting,
};
use crate::size::{format_size, parse_topology_size};
use crate::topology::{apply_defaults, reconcile_topology, TopologyElement};

/// Snapshot restored when a snapshot source names no snapshot.
pub const LATEST_SUCCESSFUL_SNAPSHOT: &str = "__latest_success__";

const KIND: ComponentKind = ComponentKind::Elasticsearch;

impl TopologyElement for ElasticsearchClusterTopologyElement {
    fn identifier(&self) -> &str {
        &self.id
    }

    fn instance_configuration_id(&self) -> Option<&str> {
        self.instance_configuration_id.as_deref()
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

impl ComponentConfiguration for ElasticsearchConfiguration {
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

impl ComponentPlan for ElasticsearchClusterPlan {
    type Element = ElasticsearchClusterTopologyElement;
    type Configuration = ElasticsearchConfiguration;

    fn configuration(&self) -> &ElasticsearchConfiguration {
        &self.elasticsearch
    }

    fn configuration_mut(&mut self) -> &mut ElasticsearchConfiguration {
        &mut self.elasticsearch
    }

    fn topology(&self) -> &[ElasticsearchClusterTopologyElement] {
        &self.cluster_topology
    }

    fn topology_mut(&mut self) -> &mut Vec<ElasticsearchClusterTopologyElement> {
        &mut self.cluster_topology
    }
}

impl ComponentPayload for ElasticsearchPayload {
    const KIND: ComponentKind = ComponentKind::Elasticsearch;
    type Plan = ElasticsearchClusterPlan;

    fn from_resources(resources: &DeploymentResources) -> Option<&Self> {
        resources.elasticsearch.first()
    }

    fn ref_id_mut(&mut self) -> &mut String {
        &mut self.ref_id
    }

    fn region_mut(&mut self) -> &mut String {
        &mut self.region
    }

    fn plan_mut(&mut self) -> &mut ElasticsearchClusterPlan {
        &mut self.plan
    }
}

/// Build the Elasticsearch payload from its block and the template.
pub fn expand(
    block: &ElasticsearchBlock,
    ctx: &ExpandContext<'_>,
    template: &DeploymentTemplateInfo,
) -> Result<ElasticsearchPayload, DeploymentError> {
    let mut payload: ElasticsearchPayload = require_component(template)?;

    payload.ref_id = block
        .ref_id
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| KIND.default_ref_id().to_string());
    payload.region = ctx.region.to_string();

    let plan = &mut payload.plan;
    plan.deployment_template = Some(DeploymentTemplateReference {
        id: template.id.clone(),
    });
    if !ctx.version.is_empty() {
        plan.elasticsearch.version = Some(ctx.version.to_string());
    }
    if let Some(config) = &block.config {
        expand_configuration(KIND, config, &mut plan.elasticsearch)?;
        if !config.plugins.is_empty() {
            plan.elasticsearch.enabled_built_in_plugins = config.plugins.clone();
        }
    }
    if let Some(autoscale) = block.autoscale {
        plan.autoscaling_enabled = Some(autoscale);
    }

    let template_topology = std::mem::take(&mut plan.cluster_topology);
    let defaulted = apply_defaults(KIND, template_topology.clone());
    let mut topology = reconcile_topology(KIND, &block.topology, template_topology)?;
    for (element, request) in topology.iter_mut().zip(&block.topology) {
        expand_tier(element, request)?;
    }
    // A tier missing from the payload is removed by the API, so tiers the
    // plan leaves out keep their template defaults.
    let unrequested: Vec<_> = defaulted
        .into_iter()
        .filter(|tier| !topology.iter().any(|t| t.identifier() == tier.identifier()))
        .collect();
    topology.extend(unrequested);
    for element in &mut topology {
        if !element.node_roles.is_empty() {
            element.node_type = None;
        }
    }
    plan.cluster_topology = topology;

    plan.transient = expand_transient(block);
    payload.settings = expand_trust(block);

    debug!(
        ref_id = %payload.ref_id,
        tiers = payload.plan.cluster_topology.len(),
        "expanded elasticsearch"
    );
    Ok(payload)
}

fn expand_tier(
    element: &mut ElasticsearchClusterTopologyElement,
    request: &ElasticsearchTopology,
) -> Result<(), DeploymentError> {
    if element.node_roles.is_empty() {
        let flags = [
            request.node_type_data,
            request.node_type_master,
            request.node_type_ingest,
            request.node_type_ml,
        ];
        if flags.iter().any(Option::is_some) {
            let node_type = element.node_type.get_or_insert_with(ElasticsearchNodeType::default);
            node_type.data = request.node_type_data.or(node_type.data);
            node_type.master = request.node_type_master.or(node_type.master);
            node_type.ingest = request.node_type_ingest.or(node_type.ingest);
            node_type.ml = request.node_type_ml.or(node_type.ml);
        }
    }

    if let Some(autoscaling) = &request.autoscaling {
        if let Some(max) = parse_topology_size(
            autoscaling.max_size.as_deref(),
            autoscaling.max_size_resource.as_deref(),
        )? {
            element.autoscaling_max = Some(max);
        }
        if let Some(min) = parse_topology_size(
            autoscaling.min_size.as_deref(),
            autoscaling.min_size_resource.as_deref(),
        )? {
            element.autoscaling_min = Some(min);
        }
        if let Some(raw) = &autoscaling.policy_override_json {
            if let Some(value) = parse_json_setting(KIND, "autoscaling.policy_override_json", raw)? {
                element.autoscaling_policy_override_json = Some(value);
            }
        }
    }

    if let Some(config) = request.config.as_ref().filter(|c| !c.is_empty()) {
        let tier = element
            .elasticsearch
            .get_or_insert_with(ElasticsearchConfiguration::default);
        expand_user_settings(KIND, config, &mut tier.user_settings)?;
    }
    Ok(())
}

fn expand_strategy(kind: PlanStrategyKind) -> PlanStrategy {
    match kind {
        PlanStrategyKind::Autodetect => PlanStrategy {
            autodetect: Some(EmptyObject {}),
            ..Default::default()
        },
        PlanStrategyKind::GrowAndShrink => PlanStrategy {
            grow_and_shrink: Some(EmptyObject {}),
            ..Default::default()
        },
        PlanStrategyKind::RollingGrowAndShrink => PlanStrategy {
            rolling_grow_and_shrink: Some(EmptyObject {}),
            ..Default::default()
        },
        PlanStrategyKind::RollingAll => PlanStrategy {
            rolling: Some(RollingStrategyConfig {
                group_by: Some("__all__".to_string()),
            }),
            ..Default::default()
        },
    }
}

fn expand_transient(block: &ElasticsearchBlock) -> Option<TransientElasticsearchPlanConfiguration> {
    let strategy = block.strategy.map(expand_strategy);
    let restore_snapshot = block
        .snapshot_source
        .as_ref()
        .map(|source| RestoreSnapshotConfiguration {
            source_cluster_id: source.source_elasticsearch_cluster_id.clone(),
            snapshot_name: source
                .snapshot_name
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| LATEST_SUCCESSFUL_SNAPSHOT.to_string()),
        });
    if strategy.is_none() && restore_snapshot.is_none() {
        return None;
    }
    Some(TransientElasticsearchPlanConfiguration {
        strategy,
        restore_snapshot,
    })
}

fn expand_trust(block: &ElasticsearchBlock) -> Option<ElasticsearchClusterSettings> {
    if block.trust_account.is_empty() && block.trust_external.is_empty() {
        return None;
    }
    let accounts = block
        .trust_account
        .iter()
        .map(|t| AccountTrustRelationship {
            account_id: t.account_id.clone(),
            trust_all: t.trust_all,
            trust_allowlist: t.trust_allowlist.clone(),
        })
        .collect();
    let external = block
        .trust_external
        .iter()
        .map(|t| ExternalTrustRelationship {
            trust_relationship_id: t.relationship_id.clone(),
            trust_all: t.trust_all,
            trust_allowlist: t.trust_allowlist.clone(),
        })
        .collect();
    Some(ElasticsearchClusterSettings {
        trust: Some(ElasticsearchClusterTrustSettings { accounts, external }),
    })
}

/// The template id the current plan was built from.
pub fn template_id(resource: &ResourceInfo<ElasticsearchClusterPlan>) -> Option<&str> {
    resource
        .info
        .plan_info
        .current_plan()
        .and_then(|p| p.deployment_template.as_ref())
        .map(|t| t.id.as_str())
        .filter(|id| !id.is_empty())
}

/// The stack version of the current plan.
pub fn version(resource: &ResourceInfo<ElasticsearchClusterPlan>) -> Option<&str> {
    resource
        .info
        .plan_info
        .current_plan()
        .and_then(|p| p.elasticsearch.version.as_deref())
}

/// Read back an Elasticsearch resource.
///
/// Stopped resources, resources without a current plan, and resources with
/// no tier in use yield `None`.
pub fn flatten(
    resource: &ResourceInfo<ElasticsearchClusterPlan>,
) -> Result<Option<ElasticsearchBlock>, DeploymentError> {
    if resource.info.is_stopped() {
        return Ok(None);
    }
    let Some(plan) = resource.info.plan_info.current_plan() else {
        return Ok(None);
    };

    let topology = plan
        .cluster_topology
        .iter()
        .filter_map(|e| flatten_tier(e).transpose())
        .collect::<Result<Vec<_>, _>>()?;
    if topology.is_empty() {
        return Ok(None);
    }

    let mut config = flatten_configuration(&plan.elasticsearch)?.unwrap_or_default();
    config.plugins = plan.elasticsearch.enabled_built_in_plugins.clone();

    let metadata = resource.info.metadata.as_ref();
    let (http_endpoint, https_endpoint) = endpoints(metadata);
    let trust = resource
        .info
        .settings
        .as_ref()
        .and_then(|s| s.trust.as_ref());

    Ok(Some(ElasticsearchBlock {
        ref_id: Some(resource.ref_id.clone()),
        resource_id: Some(resource_id(resource)),
        region: Some(resource.region.clone()),
        cloud_id: metadata.and_then(|m| m.cloud_id.clone()),
        http_endpoint,
        https_endpoint,
        autoscale: plan.autoscaling_enabled,
        topology,
        config: Some(config).filter(|c| !c.is_empty()),
        trust_account: trust.map(flatten_trust_accounts).unwrap_or_default(),
        trust_external: trust.map(flatten_trust_external).unwrap_or_default(),
        snapshot_source: None,
        strategy: None,
    }))
}

fn flatten_tier(
    element: &ElasticsearchClusterTopologyElement,
) -> Result<Option<ElasticsearchTopology>, DeploymentError> {
    let Some(topology) = TopologyRequest::from_element(KIND, element) else {
        return Ok(None);
    };

    let node_type = element.node_type.clone().unwrap_or_default();
    let autoscaling = TopologyAutoscaling {
        max_size: element.autoscaling_max.as_ref().map(|s| format_size(s.value)),
        max_size_resource: element.autoscaling_max.as_ref().map(|s| s.resource.clone()),
        min_size: element.autoscaling_min.as_ref().map(|s| format_size(s.value)),
        min_size_resource: element.autoscaling_min.as_ref().map(|s| s.resource.clone()),
        policy_override_json: element
            .autoscaling_policy_override_json
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?,
    };

    let config = match &element.elasticsearch {
        Some(tier) => {
            let mut config = ComponentConfig::default();
            flatten_user_settings(&tier.user_settings, &mut config)?;
            Some(config).filter(|c| !c.is_empty())
        },
        None => None,
    };

    Ok(Some(ElasticsearchTopology {
        topology,
        node_roles: element.node_roles.clone(),
        node_type_data: node_type.data,
        node_type_master: node_type.master,
        node_type_ingest: node_type.ingest,
        node_type_ml: node_type.ml,
        autoscaling: Some(autoscaling).filter(|a| *a != TopologyAutoscaling::default()),
        config,
    }))
}

fn flatten_trust_accounts(trust: &ElasticsearchClusterTrustSettings) -> Vec<TrustAccount> {
    trust
        .accounts
        .iter()
        .map(|a| TrustAccount {
            account_id: a.account_id.clone(),
            trust_all: a.trust_all,
            trust_allowlist: a.trust_allowlist.clone(),
        })
        .collect()
}

fn flatten_trust_external(trust: &ElasticsearchClusterTrustSettings) -> Vec<TrustExternal> {
    trust
        .external
        .iter()
        .map(|e| TrustExternal {
            relationship_id: e.trust_relationship_id.clone(),
            trust_all: e.trust_all,
            trust_allowlist: e.trust_allowlist.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::SnapshotSource;
    use crate::testing::fixtures;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ctx() -> ExpandContext<'static> {
        ExpandContext {
            region: "us-east-1",
            version: "8.4.3",
            elasticsearch_ref_id: "main-elasticsearch",
        }
    }

    fn tier(id: Option<&str>, size: Option<&str>, zones: Option<i32>) -> ElasticsearchTopology {
        ElasticsearchTopology {
            topology: TopologyRequest {
                id: id.map(str::to_string),
                size: size.map(str::to_string),
                zone_count: zones,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_single_tier_template_defaults() {
        let template = fixtures::template_with_tiers(vec![fixtures::tier(
            "hot_content",
            fixtures::HOT_IC,
            1024,
            0,
        )]);
        let payload = expand(&ElasticsearchBlock::default(), &ctx(), &template).unwrap();

        let topology = &payload.plan.cluster_topology;
        assert_eq!(topology.len(), 1);
        assert_eq!(topology[0].id, "hot_content");
        assert_eq!(topology[0].size, Some(TopologySize::memory(1024)));
        assert_eq!(topology[0].zone_count, 1);
    }

    #[test]
    fn test_expand_plan_level_fields() {
        let template = fixtures::io_optimized_template();
        let block = ElasticsearchBlock {
            autoscale: Some(true),
            config: Some(ComponentConfig {
                plugins: vec!["analysis-icu".into()],
                user_settings_yaml: Some("action.auto_create_index: false".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let payload = expand(&block, &ctx(), &template).unwrap();

        assert_eq!(payload.ref_id, "main-elasticsearch");
        assert_eq!(payload.region, "us-east-1");
        assert_eq!(
            payload.plan.deployment_template,
            Some(DeploymentTemplateReference {
                id: template.id.clone()
            })
        );
        assert_eq!(payload.plan.elasticsearch.version.as_deref(), Some("8.4.3"));
        assert_eq!(payload.plan.elasticsearch.enabled_built_in_plugins, vec!["analysis-icu"]);
        assert_eq!(payload.plan.autoscaling_enabled, Some(true));
        assert!(payload.plan.transient.is_none());
        assert!(payload.settings.is_none());
    }

    #[test]
    fn test_zero_sized_template_tiers_stay_disabled() {
        let template = fixtures::io_optimized_template();
        let payload = expand(&ElasticsearchBlock::default(), &ctx(), &template).unwrap();

        let warm = payload
            .plan
            .cluster_topology
            .iter()
            .find(|t| t.id == "warm")
            .unwrap();
        assert_eq!(warm.size, Some(TopologySize::memory(0)));
    }

    #[test]
    fn test_node_roles_drop_node_type() {
        let template = fixtures::io_optimized_template();
        let block = ElasticsearchBlock {
            topology: vec![ElasticsearchTopology {
                node_type_data: Some(false),
                ..tier(Some("hot_content"), Some("8g"), None)
            }],
            ..Default::default()
        };
        let payload = expand(&block, &ctx(), &template).unwrap();
        let hot = &payload.plan.cluster_topology[0];
        assert!(!hot.node_roles.is_empty());
        assert!(hot.node_type.is_none());
    }

    #[test]
    fn test_legacy_node_type_overrides() {
        let template = fixtures::legacy_template();
        let block = ElasticsearchBlock {
            topology: vec![ElasticsearchTopology {
                node_type_ml: Some(true),
                ..tier(Some("hot_content"), None, None)
            }],
            ..Default::default()
        };
        let payload = expand(&block, &ctx(), &template).unwrap();
        let hot = &payload.plan.cluster_topology[0];
        assert_eq!(
            hot.node_type,
            Some(ElasticsearchNodeType {
                data: Some(true),
                master: Some(true),
                ingest: Some(true),
                ml: Some(true),
            })
        );
    }

    #[test]
    fn test_positional_fallback() {
        let template = fixtures::io_optimized_template();
        let block = ElasticsearchBlock {
            topology: vec![tier(None, Some("4g"), None), tier(None, Some("2g"), Some(1))],
            ..Default::default()
        };
        let payload = expand(&block, &ctx(), &template).unwrap();
        let ids: Vec<_> = payload.plan.cluster_topology.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["hot_content", "warm", "master", "ml"]);
        assert_eq!(
            payload.plan.cluster_topology[1].size,
            Some(TopologySize::memory(2048))
        );
    }

    #[test]
    fn test_unrequested_tiers_keep_template_defaults() {
        let template = fixtures::template_with_tiers(vec![
            fixtures::tier("hot_content", fixtures::HOT_IC, 8192, 2),
            fixtures::tier("warm", fixtures::WARM_IC, 0, 2),
        ]);
        let block = ElasticsearchBlock {
            topology: vec![tier(Some("warm"), Some("4g"), None)],
            ..Default::default()
        };
        let payload = expand(&block, &ctx(), &template).unwrap();

        let tiers: Vec<_> = payload
            .plan
            .cluster_topology
            .iter()
            .map(|t| (t.id.as_str(), t.size.clone(), t.zone_count))
            .collect();
        assert_eq!(
            tiers,
            vec![
                ("warm", Some(TopologySize::memory(4096)), 2),
                ("hot_content", Some(TopologySize::memory(8192)), 2),
            ]
        );
    }

    #[test]
    fn test_unknown_tier() {
        let template = fixtures::io_optimized_template();
        let block = ElasticsearchBlock {
            topology: vec![tier(Some("frozen_solid"), Some("4g"), None)],
            ..Default::default()
        };
        let err = expand(&block, &ctx(), &template).unwrap_err();
        assert_eq!(
            err.to_string(),
            "elasticsearch topology: invalid id: \"frozen_solid\" doesn't match any of the deployment template instance configurations; use a different id or deployment template"
        );
    }

    #[test]
    fn test_autoscaling_and_tier_config() {
        let template = fixtures::io_optimized_template();
        let block = ElasticsearchBlock {
            topology: vec![ElasticsearchTopology {
                autoscaling: Some(TopologyAutoscaling {
                    max_size: Some("64g".into()),
                    policy_override_json: Some(r#"{"proactive_storage":{"forecast_window":"3 h"}}"#.into()),
                    ..Default::default()
                }),
                config: Some(ComponentConfig {
                    user_settings_json: Some(r#"{"indices.queries.cache.size":"20%"}"#.into()),
                    ..Default::default()
                }),
                ..tier(Some("hot_content"), Some("8g"), Some(2))
            }],
            ..Default::default()
        };
        let payload = expand(&block, &ctx(), &template).unwrap();
        let hot = &payload.plan.cluster_topology[0];
        assert_eq!(hot.autoscaling_max, Some(TopologySize::memory(65536)));
        assert_eq!(
            hot.autoscaling_policy_override_json,
            Some(json!({"proactive_storage": {"forecast_window": "3 h"}}))
        );
        assert_eq!(
            hot.elasticsearch.as_ref().unwrap().user_settings.user_settings_json,
            Some(json!({"indices.queries.cache.size": "20%"}))
        );
    }

    #[test]
    fn test_bad_autoscaling_size() {
        let template = fixtures::io_optimized_template();
        let block = ElasticsearchBlock {
            topology: vec![ElasticsearchTopology {
                autoscaling: Some(TopologyAutoscaling {
                    max_size: Some("64".into()),
                    ..Default::default()
                }),
                ..tier(Some("hot_content"), None, None)
            }],
            ..Default::default()
        };
        let err = expand(&block, &ctx(), &template).unwrap_err();
        assert!(matches!(err, DeploymentError::InvalidSizeFormat { size } if size == "64"));
    }

    #[test]
    fn test_transient_settings() {
        let template = fixtures::io_optimized_template();
        let block = ElasticsearchBlock {
            strategy: Some(PlanStrategyKind::RollingAll),
            snapshot_source: Some(SnapshotSource {
                source_elasticsearch_cluster_id: "0a592ab2c5baf0fa95c77ac62135782e".into(),
                snapshot_name: None,
            }),
            ..Default::default()
        };
        let payload = expand(&block, &ctx(), &template).unwrap();
        let transient = payload.plan.transient.unwrap();
        assert_eq!(
            serde_json::to_value(transient.strategy.unwrap()).unwrap(),
            json!({"rolling": {"group_by": "__all__"}})
        );
        assert_eq!(
            transient.restore_snapshot.unwrap().snapshot_name,
            LATEST_SUCCESSFUL_SNAPSHOT
        );
    }

    #[test]
    fn test_trust_round_trip() {
        let template = fixtures::io_optimized_template();
        let block = ElasticsearchBlock {
            trust_account: vec![TrustAccount {
                account_id: "ANID".into(),
                trust_all: true,
                trust_allowlist: vec![],
            }],
            trust_external: vec![TrustExternal {
                relationship_id: "external-id".into(),
                trust_all: false,
                trust_allowlist: vec!["abc".into()],
            }],
            ..Default::default()
        };
        let payload = expand(&block, &ctx(), &template).unwrap();
        let settings = payload.settings.clone().unwrap();

        let mut info = fixtures::resource_info(&payload.ref_id, &payload.region, payload.plan);
        info.info.settings = Some(settings);
        let flattened = flatten(&info).unwrap().unwrap();
        assert_eq!(flattened.trust_account, block.trust_account);
        assert_eq!(flattened.trust_external, block.trust_external);
    }

    #[test]
    fn test_flatten_skips_unused_tiers() {
        let template = fixtures::io_optimized_template();
        let block = ElasticsearchBlock {
            topology: vec![
                tier(Some("hot_content"), Some("8g"), Some(2)),
                tier(Some("warm"), Some("0g"), None),
            ],
            ..Default::default()
        };
        let payload = expand(&block, &ctx(), &template).unwrap();
        let info = fixtures::resource_info(&payload.ref_id, &payload.region, payload.plan);

        let flattened = flatten(&info).unwrap().unwrap();
        assert_eq!(flattened.topology.len(), 1);
        let hot = &flattened.topology[0];
        assert_eq!(hot.topology.id.as_deref(), Some("hot_content"));
        assert_eq!(
            hot.topology.instance_configuration_id.as_deref(),
            Some(fixtures::HOT_IC)
        );
        assert_eq!(hot.topology.size.as_deref(), Some("8g"));
        assert_eq!(hot.topology.zone_count, Some(2));
        assert_eq!(
            hot.autoscaling.as_ref().unwrap().max_size.as_deref(),
            Some("116g")
        );
        assert_eq!(template_id(&info), Some(template.id.as_str()));
        assert_eq!(version(&info), Some("8.4.3"));
    }

    #[test]
    fn test_flatten_stopped() {
        let mut info = fixtures::resource_info(
            "main-elasticsearch",
            "us-east-1",
            ElasticsearchClusterPlan::default(),
        );
        info.info.status = "stopped".into();
        assert!(flatten(&info).unwrap().is_none());
    }
}
