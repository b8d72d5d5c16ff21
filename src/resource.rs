//! The deployment resource lifecycle.
//!
//! [`DeploymentResource`] implements plan, create, read, update and delete
//! over JSON states, the way the host framework calls a resource. All API
//! traffic goes through the [`DeploymentApi`] trait; [`crate::testing`] has an
//! in-memory implementation.
//!
//! Create and update submit a request and then poll until the deployment has
//! no pending plan, bounded by [`ProviderConfig::timeout`].

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::ProviderConfig;
use crate::deployment::{build_create_request, build_update_request, flatten_deployment};
use crate::error::DeploymentError;
use crate::models::{
    DeploymentCreateRequest, DeploymentCreateResponse, DeploymentGetResponse,
    DeploymentTemplateInfo, DeploymentUpdateRequest,
};
use crate::modifiers::{apply_prior_state, requires_replace, TrafficFilterChanges};
use crate::plan::DeploymentPlan;
use crate::schema::{deployment_schema, Diagnostic, Schema};
use crate::validation::validate_plan;

/// The deployment API calls the resource needs.
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    /// Fetch a deployment template for `region`.
    async fn get_template(
        &self,
        template_id: &str,
        region: &str,
    ) -> Result<DeploymentTemplateInfo, DeploymentError>;

    /// Create a deployment.
    async fn create_deployment(
        &self,
        request: &DeploymentCreateRequest,
    ) -> Result<DeploymentCreateResponse, DeploymentError>;

    /// Update a deployment.
    async fn update_deployment(
        &self,
        id: &str,
        request: &DeploymentUpdateRequest,
    ) -> Result<(), DeploymentError>;

    /// Fetch a deployment. `None` when it does not exist.
    async fn get_deployment(&self, id: &str) -> Result<Option<DeploymentGetResponse>, DeploymentError>;

    /// Shut a deployment down.
    async fn shutdown_deployment(&self, id: &str) -> Result<(), DeploymentError>;

    /// Whether any resource of the deployment has a pending plan.
    async fn plan_pending(&self, id: &str) -> Result<bool, DeploymentError>;

    /// Associate a traffic filter ruleset with a deployment.
    async fn associate_traffic_filter(
        &self,
        ruleset_id: &str,
        deployment_id: &str,
    ) -> Result<(), DeploymentError>;

    /// Remove a traffic filter ruleset from a deployment.
    async fn disassociate_traffic_filter(
        &self,
        ruleset_id: &str,
        deployment_id: &str,
    ) -> Result<(), DeploymentError>;
}

/// A change to a single top-level attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// The attribute that changed.
    pub path: String,
    /// The value before the change (None if creating).
    pub before: Option<Value>,
    /// The value after the change (None if removed).
    pub after: Option<Value>,
}

impl AttributeChange {
    /// The attribute appears.
    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            before: None,
            after: Some(value),
        }
    }

    /// The attribute disappears.
    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            before: Some(value),
            after: None,
        }
    }

    /// The attribute's value differs.
    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self {
            path: path.into(),
            before: Some(before),
            after: Some(after),
        }
    }
}

/// What [`DeploymentResource::plan`] decided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The planned state.
    pub planned_state: Value,
    /// Top-level attributes that change.
    pub changes: Vec<AttributeChange>,
    /// Whether the deployment must be replaced.
    pub requires_replace: bool,
}

impl PlanResult {
    /// True when nothing changes.
    pub fn is_no_op(&self) -> bool {
        self.changes.is_empty()
    }
}

fn attribute_changes(prior: Option<&Value>, planned: &Value) -> Vec<AttributeChange> {
    let empty = serde_json::Map::new();
    let before = prior.and_then(Value::as_object).unwrap_or(&empty);
    let after = planned.as_object().unwrap_or(&empty);

    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    keys.into_iter()
        .filter_map(|key| match (before.get(key), after.get(key)) {
            (None, Some(v)) => Some(AttributeChange::added(key.as_str(), v.clone())),
            (Some(v), None) => Some(AttributeChange::removed(key.as_str(), v.clone())),
            (Some(b), Some(a)) if b != a => {
                Some(AttributeChange::modified(key.as_str(), b.clone(), a.clone()))
            },
            _ => None,
        })
        .collect()
}

fn parse_plan(state: Value) -> Result<DeploymentPlan, DeploymentError> {
    Ok(serde_json::from_value(state)?)
}

fn deployment_id(plan: &DeploymentPlan) -> Result<&str, DeploymentError> {
    plan.id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DeploymentError::Validation("state has no deployment id".to_string()))
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), DeploymentError> {
    let errors: Vec<String> = diagnostics
        .into_iter()
        .filter(Diagnostic::is_error)
        .map(|d| match (d.attribute, d.detail) {
            (Some(attribute), Some(detail)) => format!("{}: {}", attribute, detail),
            (Some(attribute), None) => format!("{}: {}", attribute, d.summary),
            (None, Some(detail)) => format!("{}: {}", d.summary, detail),
            (None, None) => d.summary,
        })
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DeploymentError::Validation(errors.join("; ")))
    }
}

/// Keep attributes the API does not report back.
fn carry_transient(from: &DeploymentPlan, into: &mut DeploymentPlan) {
    if let (Some(from), Some(into)) = (&from.elasticsearch, &mut into.elasticsearch) {
        into.strategy = from.strategy;
        into.snapshot_source.clone_from(&from.snapshot_source);
    }
}

/// The deployment resource.
pub struct DeploymentResource<A> {
    api: A,
    config: ProviderConfig,
}

impl<A: DeploymentApi> DeploymentResource<A> {
    /// Create the resource on top of `api`.
    pub fn new(api: A, config: ProviderConfig) -> Self {
        Self { api, config }
    }

    /// The underlying API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// The provider configuration in use.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Schema of the resource.
    pub fn schema(&self) -> Schema {
        deployment_schema()
    }

    /// Validate a configuration without contacting the API.
    pub fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        validate_plan(config)
    }

    /// Plan a create (`prior_state` is `None`) or an update.
    ///
    /// The planned state has unset computed attributes filled from prior state.
    /// The plan is reconciled against the deployment template so topology and
    /// settings errors surface before apply.
    #[instrument(skip_all)]
    pub async fn plan(
        &self,
        prior_state: Option<Value>,
        proposed_state: Value,
    ) -> Result<PlanResult, DeploymentError> {
        check_diagnostics(validate_plan(&proposed_state))?;

        let prior = prior_state.clone().map(parse_plan).transpose()?;
        let mut planned = parse_plan(proposed_state)?;
        apply_prior_state(prior.as_ref(), &mut planned);
        let requires_replace = prior
            .as_ref()
            .is_some_and(|prior| requires_replace(prior, &planned));

        let template = self
            .api
            .get_template(&planned.deployment_template_id, &planned.region)
            .await?;
        build_create_request(&planned, &template)?;

        let planned_state = serde_json::to_value(&planned)?;
        let changes = attribute_changes(prior_state.as_ref(), &planned_state);
        debug!(changes = changes.len(), requires_replace, "planned deployment");
        Ok(PlanResult {
            planned_state,
            changes,
            requires_replace,
        })
    }

    /// Create the deployment and return its state once the plan finished.
    #[instrument(skip_all)]
    pub async fn create(&self, planned_state: Value) -> Result<Value, DeploymentError> {
        let plan = parse_plan(planned_state)?;
        let template = self
            .api
            .get_template(&plan.deployment_template_id, &plan.region)
            .await?;
        let request = build_create_request(&plan, &template)?;

        let created = self.api.create_deployment(&request).await?;
        info!(deployment_id = %created.id, template = %template.id, "created deployment");
        self.wait_for_plan(&created.id).await?;

        self.read_deployment(&created.id, &plan)
            .await?
            .ok_or(DeploymentError::NotFound(created.id))
    }

    /// Read the deployment. `None` when it no longer exists.
    #[instrument(skip_all)]
    pub async fn read(&self, current_state: Value) -> Result<Option<Value>, DeploymentError> {
        let current = parse_plan(current_state)?;
        let id = deployment_id(&current)?;
        self.read_deployment(id, &current).await
    }

    /// Update the deployment and return its state once the plan finished.
    #[instrument(skip_all)]
    pub async fn update(&self, prior_state: Value, planned_state: Value) -> Result<Value, DeploymentError> {
        let prior = parse_plan(prior_state)?;
        let mut plan = parse_plan(planned_state)?;
        let id = deployment_id(&prior)?.to_string();
        plan.id = Some(id.clone());

        let template = self
            .api
            .get_template(&plan.deployment_template_id, &plan.region)
            .await?;
        let request = build_update_request(&plan, &template)?;
        self.api.update_deployment(&id, &request).await?;
        info!(deployment_id = %id, template = %template.id, "updated deployment");

        let changes = TrafficFilterChanges::between(&prior.traffic_filter, &plan.traffic_filter);
        for ruleset in &changes.add {
            debug!(deployment_id = %id, ruleset = %ruleset, "associating traffic filter");
            self.api.associate_traffic_filter(ruleset, &id).await?;
        }
        for ruleset in &changes.remove {
            debug!(deployment_id = %id, ruleset = %ruleset, "removing traffic filter");
            self.api.disassociate_traffic_filter(ruleset, &id).await?;
        }

        self.wait_for_plan(&id).await?;
        self.read_deployment(&id, &plan)
            .await?
            .ok_or(DeploymentError::NotFound(id))
    }

    /// Shut the deployment down. A deployment that is already gone is not an
    /// error.
    #[instrument(skip_all)]
    pub async fn delete(&self, current_state: Value) -> Result<(), DeploymentError> {
        let current = parse_plan(current_state)?;
        let id = deployment_id(&current)?;
        match self.api.shutdown_deployment(id).await {
            Ok(()) => {
                info!(deployment_id = %id, "shut down deployment");
                Ok(())
            },
            Err(DeploymentError::NotFound(_)) => {
                warn!(deployment_id = %id, "deployment already gone");
                Ok(())
            },
            Err(err) => Err(err),
        }
    }

    async fn read_deployment(
        &self,
        id: &str,
        previous: &DeploymentPlan,
    ) -> Result<Option<Value>, DeploymentError> {
        let Some(response) = self.api.get_deployment(id).await? else {
            warn!(deployment_id = %id, "deployment not found, removing from state");
            return Ok(None);
        };

        let mut plan = flatten_deployment(&response)?;
        if plan.elasticsearch.is_none() {
            warn!(deployment_id = %id, "deployment has no running Elasticsearch resource, removing from state");
            return Ok(None);
        }
        carry_transient(previous, &mut plan);
        Ok(Some(serde_json::to_value(&plan)?))
    }

    /// Poll until the deployment has no pending plan.
    #[instrument(skip(self))]
    async fn wait_for_plan(&self, id: &str) -> Result<(), DeploymentError> {
        let poll = async {
            let mut polls = 0u32;
            loop {
                if !self.api.plan_pending(id).await? {
                    debug!(polls, "plan finished");
                    return Ok::<(), DeploymentError>(());
                }
                polls += 1;
                tokio::time::sleep(self.config.poll_interval).await;
            }
        };

        tokio::time::timeout(self.config.timeout, poll)
            .await
            .map_err(|_| {
                DeploymentError::Timeout(format!(
                    "deployment {} still has a pending plan after {:?}",
                    id, self.config.timeout
                ))
            })?
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::plan::{ComponentBlock, PlanStrategyKind, TopologyRequest};
    use crate::testing::{fixtures, MockDeploymentApi};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn config() -> ProviderConfig {
        ProviderConfig {
            api_key: Some("test-key".into()),
            poll_interval: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    fn resource(api: MockDeploymentApi) -> DeploymentResource<MockDeploymentApi> {
        DeploymentResource::new(api.with_template(fixtures::io_optimized_template()), config())
    }

    fn planned() -> Value {
        serde_json::to_value(fixtures::full_plan()).unwrap()
    }

    #[tokio::test]
    async fn test_plan_create() {
        let resource = resource(MockDeploymentApi::new());
        let plan = assert_ok!(resource.plan(None, planned()).await);

        assert!(!plan.requires_replace);
        assert!(!plan.is_no_op());
        let paths: Vec<_> = plan.changes.iter().map(|c| c.path.as_str()).collect();
        assert!(paths.contains(&"elasticsearch"));
        assert!(paths.contains(&"observability"));
        assert!(plan.changes.iter().all(|c| c.before.is_none()));
    }

    #[tokio::test]
    async fn test_plan_rejects_invalid_configuration() {
        let resource = resource(MockDeploymentApi::new());
        let mut proposed = planned();
        proposed["kibana"]["topology"][0]["size"] = json!("2gb");

        let err = assert_err!(resource.plan(None, proposed).await);
        assert!(matches!(&err, DeploymentError::Validation(msg) if msg.contains("kibana.topology.0.size")));
        assert_eq!(resource.api().call_count("get_template"), 0);
    }

    #[tokio::test]
    async fn test_plan_reports_template_mismatches() {
        let resource = resource(MockDeploymentApi::new());
        let mut plan = fixtures::full_plan();
        plan.apm = Some(ComponentBlock {
            topology: vec![TopologyRequest {
                instance_configuration_id: Some("bogus-id".into()),
                ..Default::default()
            }],
            ..Default::default()
        });

        let err = assert_err!(resource.plan(None, serde_json::to_value(plan).unwrap()).await);
        match err {
            DeploymentError::Components(errors) => assert_eq!(errors.paths(), vec!["apm"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_plan_update_carries_computed_and_detects_replace() {
        let resource = resource(MockDeploymentApi::new());
        let state = resource.create(planned()).await.unwrap();

        let plan = resource.plan(Some(state.clone()), planned()).await.unwrap();
        assert!(!plan.requires_replace);
        assert_eq!(plan.planned_state["id"], state["id"]);
        assert_eq!(
            plan.planned_state["elasticsearch"]["resource_id"],
            state["elasticsearch"]["resource_id"]
        );

        let mut moved = planned();
        moved["region"] = json!("eu-west-1");
        let plan = resource.plan(Some(state), moved).await.unwrap();
        assert!(plan.requires_replace);
        assert!(plan.changes.iter().any(|c| c.path == "region"));
    }

    #[tokio::test]
    async fn test_create_reads_back_state() {
        let resource = resource(MockDeploymentApi::new());
        let state = resource.create(planned()).await.unwrap();

        assert!(state["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert_eq!(state["deployment_template_id"], fixtures::TEMPLATE_ID);
        assert_eq!(state["elasticsearch"]["topology"][0]["size"], "8g");
        assert!(state["elasticsearch"]["https_endpoint"]
            .as_str()
            .is_some_and(|e| e.starts_with("https://")));
        assert_eq!(state["kibana"]["elasticsearch_cluster_ref_id"], "main-elasticsearch");
        assert_eq!(state["apm"]["topology"][0]["size"], "0.5g");
        assert_eq!(state["observability"]["deployment_id"], "self");
        assert_eq!(state["tags"]["owner"], "search-team");
    }

    #[tokio::test]
    async fn test_create_waits_for_pending_plan() {
        let resource = resource(MockDeploymentApi::new().with_pending_polls(3));
        resource.create(planned()).await.unwrap();
        assert_eq!(resource.api().call_count("plan_pending"), 4);
    }

    #[tokio::test]
    async fn test_create_times_out() {
        let api = MockDeploymentApi::new()
            .with_template(fixtures::io_optimized_template())
            .with_pending_polls(u32::MAX);
        let resource = DeploymentResource::new(
            api,
            ProviderConfig {
                timeout: Duration::from_millis(20),
                ..config()
            },
        );
        let err = assert_err!(resource.create(planned()).await);
        assert!(matches!(err, DeploymentError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_create_keeps_transient_attributes() {
        let resource = resource(MockDeploymentApi::new());
        let mut proposed = planned();
        proposed["elasticsearch"]["strategy"] = json!("rolling_all");

        let state = resource.create(proposed).await.unwrap();
        let read: DeploymentPlan = serde_json::from_value(state).unwrap();
        assert_eq!(
            read.elasticsearch.unwrap().strategy,
            Some(PlanStrategyKind::RollingAll)
        );
    }

    #[tokio::test]
    async fn test_update_traffic_filters_and_removed_components() {
        let resource = resource(MockDeploymentApi::new());
        let state = resource.create(planned()).await.unwrap();
        let id = state["id"].as_str().unwrap().to_string();

        let mut proposed = planned();
        proposed["traffic_filter"] = json!(["tf-1"]);
        proposed.as_object_mut().unwrap().remove("apm");
        let plan = resource.plan(Some(state.clone()), proposed).await.unwrap();
        let updated = resource.update(state, plan.planned_state).await.unwrap();

        let calls = resource.api().calls();
        assert!(calls.contains(&format!("associate_traffic_filter tf-1 {}", id)));
        assert!(calls.contains(&format!("disassociate_traffic_filter 0.0.0.0/0 {}", id)));

        let update = resource.api().last_update().unwrap();
        assert!(update.prune_orphans);
        assert!(update.resources.apm.is_empty());

        assert_eq!(updated["id"], json!(id));
        assert_eq!(updated["traffic_filter"], json!(["tf-1"]));
        assert!(updated.get("apm").is_none());
    }

    #[tokio::test]
    async fn test_update_without_id() {
        let resource = resource(MockDeploymentApi::new());
        let err = assert_err!(resource.update(planned(), planned()).await);
        assert!(matches!(err, DeploymentError::Validation(_)));
    }

    #[tokio::test]
    async fn test_read_missing_deployment() {
        let resource = resource(MockDeploymentApi::new());
        let mut state = planned();
        state["id"] = json!("does-not-exist");
        assert_eq!(resource.read(state).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_then_read() {
        let resource = resource(MockDeploymentApi::new());
        let state = resource.create(planned()).await.unwrap();

        assert_ok!(resource.delete(state.clone()).await);
        assert_eq!(resource.read(state.clone()).await.unwrap(), None);

        let mut gone = state;
        gone["id"] = json!("does-not-exist");
        assert_ok!(resource.delete(gone).await);
    }

    #[test]
    fn test_attribute_changes() {
        let prior = json!({"name": "a", "region": "us-east-1", "alias": "x"});
        let planned = json!({"name": "b", "region": "us-east-1", "version": "8.4.3"});
        let changes = attribute_changes(Some(&prior), &planned);
        assert_eq!(
            changes,
            vec![
                AttributeChange::removed("alias", json!("x")),
                AttributeChange::modified("name", json!("a"), json!("b")),
                AttributeChange::added("version", json!("8.4.3")),
            ]
        );
    }
}
