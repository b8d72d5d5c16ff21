//! Testing utilities for the deployment resource.
//!
//! [`MockDeploymentApi`] is an in-memory [`DeploymentApi`] so the resource
//! lifecycle can be exercised without a network. [`fixtures`] holds a
//! deployment template shaped like the vendor's I/O optimized one, and a plan
//! using every component.
//!
//! # Example
//!
//! ```
//! use ec_deployment_provider::config::ProviderConfig;
//! use ec_deployment_provider::resource::DeploymentResource;
//! use ec_deployment_provider::testing::{fixtures, MockDeploymentApi};
//!
//! # tokio_test::block_on(async {
//! let api = MockDeploymentApi::new().with_template(fixtures::io_optimized_template());
//! let resource = DeploymentResource::new(api, ProviderConfig::default());
//!
//! let planned = serde_json::to_value(fixtures::full_plan()).unwrap();
//! let state = resource.create(planned).await.unwrap();
//! assert_eq!(state["elasticsearch"]["ref_id"], "main-elasticsearch");
//! # });
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::error::DeploymentError;
use crate::models::{
    DeploymentCreateRequest, DeploymentCreateResponse, DeploymentCreateSettings,
    DeploymentGetResponse, DeploymentSettings, DeploymentTemplateInfo, DeploymentUpdateRequest,
    TrafficFilterSettings,
};
use crate::resource::DeploymentApi;
use crate::schema::Diagnostic;

#[derive(Debug, Default)]
struct MockState {
    templates: HashMap<String, DeploymentTemplateInfo>,
    deployments: HashMap<String, DeploymentGetResponse>,
    updates: Vec<DeploymentUpdateRequest>,
    pending_polls: u32,
    remaining_polls: HashMap<String, u32>,
    calls: Vec<String>,
    next_id: u32,
}

impl MockState {
    fn record(&mut self, call: String) {
        debug!(%call, "mock api call");
        self.calls.push(call);
    }

    fn start_plan(&mut self, id: &str) {
        let polls = self.pending_polls;
        self.remaining_polls.insert(id.to_string(), polls);
    }

    fn deployment_mut(&mut self, id: &str) -> Result<&mut DeploymentGetResponse, DeploymentError> {
        self.deployments
            .get_mut(id)
            .ok_or_else(|| DeploymentError::NotFound(id.to_string()))
    }
}

/// An in-memory deployment API.
///
/// Created deployments are stored as if every plan applied immediately.
/// Plans stay pending for a configurable number of polls. Shutting a
/// deployment down marks its resources stopped.
#[derive(Debug, Default)]
pub struct MockDeploymentApi {
    state: Mutex<MockState>,
}

impl MockDeploymentApi {
    /// Create an API without templates or deployments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `template` from [`DeploymentApi::get_template`].
    pub fn with_template(self, template: DeploymentTemplateInfo) -> Self {
        self.lock().templates.insert(template.id.clone(), template);
        self
    }

    /// Report every new plan as pending for `polls` polls.
    pub fn with_pending_polls(self, polls: u32) -> Self {
        self.lock().pending_polls = polls;
        self
    }

    /// Store a deployment as is.
    pub fn insert_deployment(&self, deployment: DeploymentGetResponse) {
        self.lock()
            .deployments
            .insert(deployment.id.clone(), deployment);
    }

    /// The stored deployment with `id`.
    pub fn deployment(&self, id: &str) -> Option<DeploymentGetResponse> {
        self.lock().deployments.get(id).cloned()
    }

    /// Every call made so far, in order, as `"<method> <args>"`.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Number of calls to `method`.
    pub fn call_count(&self, method: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.split(' ').next() == Some(method))
            .count()
    }

    /// The most recent update request.
    pub fn last_update(&self) -> Option<DeploymentUpdateRequest> {
        self.lock().updates.last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DeploymentApi for MockDeploymentApi {
    async fn get_template(
        &self,
        template_id: &str,
        region: &str,
    ) -> Result<DeploymentTemplateInfo, DeploymentError> {
        let mut state = self.lock();
        state.record(format!("get_template {} {}", template_id, region));
        state.templates.get(template_id).cloned().ok_or_else(|| {
            DeploymentError::Api(format!(
                "deployment template \"{}\" not found in region {}",
                template_id, region
            ))
        })
    }

    async fn create_deployment(
        &self,
        request: &DeploymentCreateRequest,
    ) -> Result<DeploymentCreateResponse, DeploymentError> {
        let mut state = self.lock();
        state.next_id += 1;
        let id = format!("{:032x}", state.next_id);
        state.record(format!("create_deployment {}", id));

        let deployment = fixtures::deployment_from_request(&id, request);
        let response = DeploymentCreateResponse {
            id: id.clone(),
            name: Some(deployment.name.clone()),
            alias: deployment.alias.clone(),
        };
        state.deployments.insert(id.clone(), deployment);
        state.start_plan(&id);
        Ok(response)
    }

    async fn update_deployment(
        &self,
        id: &str,
        request: &DeploymentUpdateRequest,
    ) -> Result<(), DeploymentError> {
        let mut state = self.lock();
        state.record(format!("update_deployment {}", id));
        let existing = state.deployment_mut(id)?;

        let traffic_filter_settings = existing
            .settings
            .as_ref()
            .and_then(|s| s.traffic_filter_settings.clone());
        let observability = request
            .settings
            .as_ref()
            .and_then(|s| s.observability.clone())
            .filter(|o| o.logging.is_some() || o.metrics.is_some());
        let as_create = DeploymentCreateRequest {
            name: request.name.clone(),
            alias: request.alias.clone(),
            resources: request.resources.clone(),
            settings: Some(DeploymentCreateSettings {
                traffic_filter_settings,
                observability,
            }),
            metadata: request.metadata.clone(),
        };
        *existing = fixtures::deployment_from_request(id, &as_create);

        state.updates.push(request.clone());
        state.start_plan(id);
        Ok(())
    }

    async fn get_deployment(&self, id: &str) -> Result<Option<DeploymentGetResponse>, DeploymentError> {
        let mut state = self.lock();
        state.record(format!("get_deployment {}", id));
        Ok(state.deployments.get(id).cloned())
    }

    async fn shutdown_deployment(&self, id: &str) -> Result<(), DeploymentError> {
        let mut state = self.lock();
        state.record(format!("shutdown_deployment {}", id));
        let deployment = state.deployment_mut(id)?;

        let resources = &mut deployment.resources;
        let stop = |status: &mut String| *status = "stopped".to_string();
        resources.elasticsearch.iter_mut().for_each(|r| stop(&mut r.info.status));
        resources.kibana.iter_mut().for_each(|r| stop(&mut r.info.status));
        resources.apm.iter_mut().for_each(|r| stop(&mut r.info.status));
        resources.enterprise_search.iter_mut().for_each(|r| stop(&mut r.info.status));
        resources.integrations_server.iter_mut().for_each(|r| stop(&mut r.info.status));
        Ok(())
    }

    async fn plan_pending(&self, id: &str) -> Result<bool, DeploymentError> {
        let mut state = self.lock();
        state.record(format!("plan_pending {}", id));
        match state.remaining_polls.get_mut(id) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Ok(true)
            },
            _ => Ok(false),
        }
    }

    async fn associate_traffic_filter(
        &self,
        ruleset_id: &str,
        deployment_id: &str,
    ) -> Result<(), DeploymentError> {
        let mut state = self.lock();
        state.record(format!("associate_traffic_filter {} {}", ruleset_id, deployment_id));
        let deployment = state.deployment_mut(deployment_id)?;
        let rulesets = &mut deployment
            .settings
            .get_or_insert_with(DeploymentSettings::default)
            .traffic_filter_settings
            .get_or_insert_with(TrafficFilterSettings::default)
            .rulesets;
        if !rulesets.iter().any(|r| r == ruleset_id) {
            rulesets.push(ruleset_id.to_string());
            rulesets.sort();
        }
        Ok(())
    }

    async fn disassociate_traffic_filter(
        &self,
        ruleset_id: &str,
        deployment_id: &str,
    ) -> Result<(), DeploymentError> {
        let mut state = self.lock();
        state.record(format!("disassociate_traffic_filter {} {}", ruleset_id, deployment_id));
        let deployment = state.deployment_mut(deployment_id)?;
        if let Some(filters) = deployment
            .settings
            .as_mut()
            .and_then(|s| s.traffic_filter_settings.as_mut())
        {
            filters.rulesets.retain(|r| r != ruleset_id);
        }
        Ok(())
    }
}

/// Fail unless every diagnostic is a warning.
///
/// # Panics
///
/// Panics listing the summaries of the error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let summaries: Vec<&str> = diagnostics
        .iter()
        .filter(|d| d.is_error())
        .map(|d| d.summary.as_str())
        .collect();
    assert!(summaries.is_empty(), "unexpected error diagnostics: {:?}", summaries);
}

/// Assert that diagnostics contain an error whose summary or detail contains
/// `substring`.
///
/// # Panics
///
/// Panics if no error diagnostic matches.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics.iter().any(|d| {
        d.is_error()
            && (d.summary.contains(substring)
                || d.detail.as_deref().is_some_and(|detail| detail.contains(substring)))
    });

    assert!(
        has_matching_error,
        "no error diagnostic mentions '{}' among {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| (&d.summary, &d.detail))
            .collect::<Vec<_>>()
    );
}

/// Deployment templates, plans and read responses for tests.
pub mod fixtures {
    use std::collections::BTreeMap;

    use crate::component::ComponentKind;
    use crate::models::{
        ApmPayload, ApmPlan, ApmTopologyElement, ClusterInfo, ClusterMetadataInfo,
        ClusterMetadataPortInfo, ClusterPlanInfo, ClusterPlansInfo, DeploymentCreateRequest,
        DeploymentGetResponse, DeploymentObservabilitySettings, DeploymentResources,
        DeploymentResourcesInfo, DeploymentSettings, DeploymentTemplateInfo,
        ElasticsearchClusterPlan, ElasticsearchClusterTopologyElement, ElasticsearchNodeType,
        ElasticsearchPayload, EnterpriseSearchNodeTypes, EnterpriseSearchPayload,
        EnterpriseSearchPlan, EnterpriseSearchTopologyElement, IntegrationsServerPayload,
        IntegrationsServerPlan, IntegrationsServerTopologyElement, KibanaClusterPlan,
        KibanaClusterTopologyElement, KibanaPayload, ResourceInfo, TopologySize,
    };
    use crate::observability::SELF_DEPLOYMENT;
    use crate::plan::{
        ComponentBlock, DeploymentPlan, ElasticsearchBlock, ElasticsearchTopology,
        ObservabilityBlock, TopologyRequest,
    };

    /// Id of the template returned by [`io_optimized_template`].
    pub const TEMPLATE_ID: &str = "aws-io-optimized-v2";
    /// Instance configuration of the hot tier.
    pub const HOT_IC: &str = "aws.es.datahot.i3";
    /// Instance configuration of the warm tier.
    pub const WARM_IC: &str = "aws.es.datawarm.d3";
    /// Instance configuration of dedicated masters.
    pub const MASTER_IC: &str = "aws.es.master.c5d";
    /// Instance configuration of machine learning nodes.
    pub const ML_IC: &str = "aws.es.ml.m5d";
    /// Kibana instance configuration.
    pub const KIBANA_IC: &str = "aws.kibana.c5d";
    /// APM instance configuration.
    pub const APM_IC: &str = "aws.apm.r5d";
    /// Enterprise Search instance configuration.
    pub const ENTERPRISE_SEARCH_IC: &str = "aws.enterprisesearch.m5d";
    /// Integrations Server instance configuration.
    pub const INTEGRATIONS_SERVER_IC: &str = "aws.integrationsserver.c5d";

    fn node_roles(tier_id: &str) -> Vec<String> {
        let roles: &[&str] = match tier_id {
            "hot_content" => &[
                "master",
                "ingest",
                "transform",
                "data_hot",
                "remote_cluster_client",
                "data_content",
            ],
            "warm" => &["data_warm", "remote_cluster_client"],
            "master" => &["master"],
            "ml" => &["ml", "remote_cluster_client"],
            _ => &[],
        };
        roles.iter().map(|r| r.to_string()).collect()
    }

    /// A template Elasticsearch tier with the node roles of `id`.
    pub fn tier(
        id: &str,
        instance_configuration_id: &str,
        size: i32,
        zone_count: i32,
    ) -> ElasticsearchClusterTopologyElement {
        ElasticsearchClusterTopologyElement {
            id: id.to_string(),
            instance_configuration_id: Some(instance_configuration_id.to_string()),
            size: Some(TopologySize::memory(size)),
            zone_count,
            node_roles: node_roles(id),
            ..Default::default()
        }
    }

    fn elasticsearch_payload(tiers: Vec<ElasticsearchClusterTopologyElement>) -> ElasticsearchPayload {
        ElasticsearchPayload {
            ref_id: "es-ref".into(),
            region: String::new(),
            plan: ElasticsearchClusterPlan {
                cluster_topology: tiers,
                ..Default::default()
            },
            settings: None,
        }
    }

    fn template(resources: DeploymentResources) -> DeploymentTemplateInfo {
        DeploymentTemplateInfo {
            id: TEMPLATE_ID.into(),
            name: "I/O Optimized".into(),
            description: None,
            deployment_template: DeploymentCreateRequest {
                resources,
                ..Default::default()
            },
        }
    }

    /// A template with only Elasticsearch, made of `tiers`.
    pub fn template_with_tiers(tiers: Vec<ElasticsearchClusterTopologyElement>) -> DeploymentTemplateInfo {
        template(DeploymentResources {
            elasticsearch: vec![elasticsearch_payload(tiers)],
            ..Default::default()
        })
    }

    /// A template shaped like the I/O optimized one.
    ///
    /// Only `hot_content` has a size; `warm`, `master` and `ml` are zero.
    /// APM and Enterprise Search ship without a size and rely on the floors.
    pub fn io_optimized_template() -> DeploymentTemplateInfo {
        let mut hot = tier("hot_content", HOT_IC, 8192, 2);
        hot.autoscaling_max = Some(TopologySize::memory(118784));

        let elasticsearch = elasticsearch_payload(vec![
            hot,
            tier("warm", WARM_IC, 0, 2),
            tier("master", MASTER_IC, 0, 3),
            tier("ml", ML_IC, 0, 1),
        ]);

        template(DeploymentResources {
            elasticsearch: vec![elasticsearch],
            kibana: vec![KibanaPayload {
                elasticsearch_cluster_ref_id: "es-ref".into(),
                ref_id: "kibana-ref".into(),
                region: String::new(),
                plan: KibanaClusterPlan {
                    cluster_topology: vec![KibanaClusterTopologyElement {
                        instance_configuration_id: KIBANA_IC.into(),
                        size: Some(TopologySize::memory(1024)),
                        zone_count: 1,
                        kibana: None,
                    }],
                    ..Default::default()
                },
            }],
            apm: vec![ApmPayload {
                elasticsearch_cluster_ref_id: "es-ref".into(),
                ref_id: "apm-ref".into(),
                region: String::new(),
                plan: ApmPlan {
                    cluster_topology: vec![ApmTopologyElement {
                        instance_configuration_id: APM_IC.into(),
                        size: Some(TopologySize::memory(0)),
                        zone_count: 1,
                        apm: None,
                    }],
                    ..Default::default()
                },
            }],
            enterprise_search: vec![EnterpriseSearchPayload {
                elasticsearch_cluster_ref_id: "es-ref".into(),
                ref_id: "enterprise_search-ref".into(),
                region: String::new(),
                plan: EnterpriseSearchPlan {
                    cluster_topology: vec![EnterpriseSearchTopologyElement {
                        instance_configuration_id: ENTERPRISE_SEARCH_IC.into(),
                        size: Some(TopologySize::memory(0)),
                        zone_count: 2,
                        node_type: Some(EnterpriseSearchNodeTypes {
                            appserver: Some(true),
                            connector: Some(true),
                            worker: Some(true),
                        }),
                        enterprise_search: None,
                    }],
                    ..Default::default()
                },
            }],
            integrations_server: vec![IntegrationsServerPayload {
                elasticsearch_cluster_ref_id: "es-ref".into(),
                ref_id: "integrations_server-ref".into(),
                region: String::new(),
                plan: IntegrationsServerPlan {
                    cluster_topology: vec![IntegrationsServerTopologyElement {
                        instance_configuration_id: INTEGRATIONS_SERVER_IC.into(),
                        size: Some(TopologySize::memory(1024)),
                        zone_count: 1,
                        integrations_server: None,
                    }],
                    ..Default::default()
                },
            }],
        })
    }

    /// [`io_optimized_template`] without the resources of `kinds`.
    pub fn template_without(kinds: &[ComponentKind]) -> DeploymentTemplateInfo {
        let mut template = io_optimized_template();
        let resources = &mut template.deployment_template.resources;
        for kind in kinds {
            match kind {
                ComponentKind::Elasticsearch => resources.elasticsearch.clear(),
                ComponentKind::Kibana => resources.kibana.clear(),
                ComponentKind::Apm => resources.apm.clear(),
                ComponentKind::EnterpriseSearch => resources.enterprise_search.clear(),
                ComponentKind::IntegrationsServer => resources.integrations_server.clear(),
            }
        }
        template
    }

    /// A pre node-roles template: one hot tier described by node types.
    pub fn legacy_template() -> DeploymentTemplateInfo {
        let hot = ElasticsearchClusterTopologyElement {
            node_roles: Vec::new(),
            node_type: Some(ElasticsearchNodeType {
                data: Some(true),
                master: Some(true),
                ingest: Some(true),
                ml: Some(false),
            }),
            ..tier("hot_content", HOT_IC, 4096, 1)
        };
        template_with_tiers(vec![hot])
    }

    /// A started resource whose current plan is `plan`.
    pub fn resource_info<P>(ref_id: &str, region: &str, plan: P) -> ResourceInfo<P> {
        ResourceInfo {
            id: String::new(),
            ref_id: ref_id.to_string(),
            region: region.to_string(),
            elasticsearch_cluster_ref_id: None,
            info: ClusterInfo {
                cluster_id: String::new(),
                cluster_name: String::new(),
                status: "started".into(),
                healthy: true,
                metadata: None,
                plan_info: ClusterPlansInfo {
                    current: Some(ClusterPlanInfo { plan: Some(plan) }),
                    pending: None,
                },
                settings: None,
            },
        }
    }

    /// A plan that uses every component and deployment-level setting.
    pub fn full_plan() -> DeploymentPlan {
        let sized = |size: &str| ComponentBlock {
            topology: vec![TopologyRequest {
                size: Some(size.to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };

        DeploymentPlan {
            name: Some("my-deployment".into()),
            version: "8.4.3".into(),
            region: "us-east-1".into(),
            deployment_template_id: TEMPLATE_ID.into(),
            tags: BTreeMap::from([("owner".to_string(), "search-team".to_string())]),
            traffic_filter: vec!["0.0.0.0/0".into()],
            observability: Some(ObservabilityBlock {
                deployment_id: SELF_DEPLOYMENT.into(),
                ref_id: None,
                logs: true,
                metrics: true,
            }),
            elasticsearch: Some(ElasticsearchBlock {
                topology: vec![ElasticsearchTopology {
                    topology: TopologyRequest {
                        id: Some("hot_content".into()),
                        size: Some("8g".into()),
                        zone_count: Some(2),
                        ..Default::default()
                    },
                    ..Default::default()
                }],
                ..Default::default()
            }),
            kibana: Some(sized("1g")),
            apm: Some(sized("0.5g")),
            enterprise_search: Some(ComponentBlock::default()),
            integrations_server: Some(ComponentBlock::default()),
            ..Default::default()
        }
    }

    fn deployed<P>(deployment_id: &str, ref_id: &str, region: &str, plan: P) -> ResourceInfo<P> {
        let mut info = resource_info(ref_id, region, plan);
        info.info.cluster_id = format!("{}-{}", ref_id, deployment_id);
        info.info.metadata = Some(ClusterMetadataInfo {
            endpoint: Some(format!("{}.{}.found.io", ref_id, region)),
            ports: Some(ClusterMetadataPortInfo {
                http: 9200,
                https: 443,
            }),
            ..Default::default()
        });
        info
    }

    fn attached<P>(
        deployment_id: &str,
        ref_id: &str,
        region: &str,
        elasticsearch_cluster_ref_id: &str,
        plan: P,
    ) -> ResourceInfo<P> {
        let mut info = deployed(deployment_id, ref_id, region, plan);
        info.elasticsearch_cluster_ref_id = Some(elasticsearch_cluster_ref_id.to_string());
        info
    }

    fn resolve_self(
        mut settings: DeploymentObservabilitySettings,
        deployment_id: &str,
    ) -> DeploymentObservabilitySettings {
        for destination in [settings.logging.as_mut(), settings.metrics.as_mut()]
            .into_iter()
            .flatten()
        {
            if destination.destination.deployment_id == SELF_DEPLOYMENT {
                destination.destination.deployment_id = deployment_id.to_string();
            }
        }
        settings
    }

    /// The read response of a deployment created from `request`, with every
    /// plan applied.
    pub fn deployment_from_request(id: &str, request: &DeploymentCreateRequest) -> DeploymentGetResponse {
        let resources = &request.resources;
        let elasticsearch = resources
            .elasticsearch
            .iter()
            .map(|p| {
                let mut info = deployed(id, &p.ref_id, &p.region, p.plan.clone());
                info.info.settings = p.settings.clone();
                if let Some(metadata) = info.info.metadata.as_mut() {
                    metadata.cloud_id = Some(format!("{}:{}", request.name.as_deref().unwrap_or(id), id));
                }
                info
            })
            .collect();

        DeploymentGetResponse {
            id: id.to_string(),
            name: request.name.clone().unwrap_or_default(),
            alias: request.alias.clone(),
            healthy: true,
            resources: DeploymentResourcesInfo {
                elasticsearch,
                kibana: resources
                    .kibana
                    .iter()
                    .map(|p| attached(id, &p.ref_id, &p.region, &p.elasticsearch_cluster_ref_id, p.plan.clone()))
                    .collect(),
                apm: resources
                    .apm
                    .iter()
                    .map(|p| attached(id, &p.ref_id, &p.region, &p.elasticsearch_cluster_ref_id, p.plan.clone()))
                    .collect(),
                enterprise_search: resources
                    .enterprise_search
                    .iter()
                    .map(|p| attached(id, &p.ref_id, &p.region, &p.elasticsearch_cluster_ref_id, p.plan.clone()))
                    .collect(),
                integrations_server: resources
                    .integrations_server
                    .iter()
                    .map(|p| attached(id, &p.ref_id, &p.region, &p.elasticsearch_cluster_ref_id, p.plan.clone()))
                    .collect(),
            },
            settings: request.settings.as_ref().map(|s| DeploymentSettings {
                traffic_filter_settings: s.traffic_filter_settings.clone(),
                observability: s.observability.clone().map(|o| resolve_self(o, id)),
            }),
            metadata: request.metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::build_create_request;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_mock_create_and_get() {
        let api = MockDeploymentApi::new().with_template(fixtures::io_optimized_template());
        let template = api.get_template(fixtures::TEMPLATE_ID, "us-east-1").await.unwrap();
        let request = build_create_request(&fixtures::full_plan(), &template).unwrap();

        let created = api.create_deployment(&request).await.unwrap();
        let deployment = api.get_deployment(&created.id).await.unwrap().unwrap();
        assert_eq!(deployment.name, "my-deployment");
        assert_eq!(deployment.resources.apm.len(), 1);
        assert_eq!(
            deployment.resources.kibana[0].elasticsearch_cluster_ref_id.as_deref(),
            Some("main-elasticsearch")
        );
        assert_eq!(api.call_count("create_deployment"), 1);
    }

    #[tokio::test]
    async fn test_mock_unknown_template() {
        let api = MockDeploymentApi::new();
        let err = api.get_template("missing", "us-east-1").await.unwrap_err();
        assert!(matches!(err, DeploymentError::Api(_)));
    }

    #[tokio::test]
    async fn test_mock_pending_polls() {
        let api = MockDeploymentApi::new().with_pending_polls(2);
        let created = api
            .create_deployment(&DeploymentCreateRequest::default())
            .await
            .unwrap();
        assert!(api.plan_pending(&created.id).await.unwrap());
        assert!(api.plan_pending(&created.id).await.unwrap());
        assert!(!api.plan_pending(&created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_mock_traffic_filters() {
        let api = MockDeploymentApi::new();
        let created = api
            .create_deployment(&DeploymentCreateRequest::default())
            .await
            .unwrap();
        api.associate_traffic_filter("tf-b", &created.id).await.unwrap();
        api.associate_traffic_filter("tf-a", &created.id).await.unwrap();
        api.associate_traffic_filter("tf-a", &created.id).await.unwrap();
        api.disassociate_traffic_filter("tf-b", &created.id).await.unwrap();

        let deployment = api.deployment(&created.id).unwrap();
        let rulesets = deployment.settings.unwrap().traffic_filter_settings.unwrap().rulesets;
        assert_eq!(rulesets, vec!["tf-a"]);

        let err = api.associate_traffic_filter("tf-a", "missing").await.unwrap_err();
        assert!(matches!(err, DeploymentError::NotFound(_)));
    }

    #[test]
    fn test_observability_self_is_resolved() {
        let template = fixtures::io_optimized_template();
        let request = build_create_request(&fixtures::full_plan(), &template).unwrap();
        let deployment = fixtures::deployment_from_request("abc", &request);
        let logging = deployment
            .settings
            .unwrap()
            .observability
            .unwrap()
            .logging
            .unwrap();
        assert_eq!(logging.destination.deployment_id, "abc");
    }

    #[test]
    fn test_assert_no_errors() {
        assert_no_errors(&[Diagnostic::warning("TLS verification disabled")]);
    }

    #[test]
    #[should_panic(expected = "unexpected error diagnostics")]
    fn test_assert_no_errors_fails() {
        assert_no_errors(&[Diagnostic::error("Missing credentials")]);
    }

    #[test]
    fn test_assert_error_contains() {
        let diagnostics = vec![Diagnostic::error("Invalid value for attribute 'region'")
            .with_detail("\"2gb\" does not match")];
        assert_error_contains(&diagnostics, "Invalid value");
        assert_error_contains(&diagnostics, "2gb");
    }

    #[test]
    #[should_panic(expected = "no error diagnostic mentions")]
    fn test_assert_error_contains_ignores_warnings() {
        let diagnostics = vec![Diagnostic::warning("TLS verification disabled")];
        assert_error_contains(&diagnostics, "TLS");
    }
}
