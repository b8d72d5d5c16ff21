//! Plan pre-processing against prior state.
//!
//! Computed attributes (ids, endpoints) and sizing the user left unset are
//! unknown in a fresh plan. Carrying them over from prior state keeps the plan
//! from showing spurious changes, but only while the deployment template stays
//! the same: a different template has different tiers and defaults.

use std::collections::BTreeSet;

use tracing::debug;

use crate::component::ComponentKind;
use crate::plan::{ComponentBlock, DeploymentPlan, ElasticsearchBlock, TopologyRequest};

fn fill<T: Clone>(target: &mut Option<T>, prior: &Option<T>) {
    if target.is_none() {
        target.clone_from(prior);
    }
}

fn fill_topology<'a, I>(kind: ComponentKind, planned: I, prior: &[&TopologyRequest])
where
    I: IntoIterator<Item = &'a mut TopologyRequest>,
{
    for request in planned {
        let Some(id) = request.identifier(kind) else {
            continue;
        };
        let Some(previous) = prior.iter().find(|p| p.identifier(kind) == Some(id)) else {
            continue;
        };
        fill(&mut request.size, &previous.size);
        fill(&mut request.size_resource, &previous.size_resource);
        fill(&mut request.zone_count, &previous.zone_count);
    }
}

fn carry_elasticsearch(planned: &mut ElasticsearchBlock, prior: &ElasticsearchBlock) {
    fill(&mut planned.ref_id, &prior.ref_id);
    fill(&mut planned.resource_id, &prior.resource_id);
    fill(&mut planned.region, &prior.region);
    fill(&mut planned.cloud_id, &prior.cloud_id);
    fill(&mut planned.http_endpoint, &prior.http_endpoint);
    fill(&mut planned.https_endpoint, &prior.https_endpoint);

    let prior_topology: Vec<_> = prior.topology.iter().map(|t| &t.topology).collect();
    fill_topology(
        ComponentKind::Elasticsearch,
        planned.topology.iter_mut().map(|t| &mut t.topology),
        &prior_topology,
    );
}

fn carry_component(kind: ComponentKind, planned: &mut ComponentBlock, prior: &ComponentBlock) {
    fill(&mut planned.ref_id, &prior.ref_id);
    fill(&mut planned.elasticsearch_cluster_ref_id, &prior.elasticsearch_cluster_ref_id);
    fill(&mut planned.resource_id, &prior.resource_id);
    fill(&mut planned.region, &prior.region);
    fill(&mut planned.http_endpoint, &prior.http_endpoint);
    fill(&mut planned.https_endpoint, &prior.https_endpoint);

    let prior_topology: Vec<_> = prior.topology.iter().collect();
    fill_topology(kind, planned.topology.iter_mut(), &prior_topology);
}

/// Fill unset attributes of `planned` from `prior`.
///
/// Does nothing when there is no prior state or when the deployment template
/// changed.
pub fn apply_prior_state(prior: Option<&DeploymentPlan>, planned: &mut DeploymentPlan) {
    let Some(prior) = prior else {
        return;
    };
    if prior.deployment_template_id != planned.deployment_template_id {
        debug!(
            from = %prior.deployment_template_id,
            to = %planned.deployment_template_id,
            "deployment template changed, not carrying prior state"
        );
        return;
    }

    fill(&mut planned.id, &prior.id);
    if let (Some(planned_es), Some(prior_es)) = (&mut planned.elasticsearch, &prior.elasticsearch) {
        carry_elasticsearch(planned_es, prior_es);
    }
    for kind in ComponentKind::ALL {
        let Some(prior_block) = prior.satellite(kind) else {
            continue;
        };
        if let Some(planned_block) = planned.satellite_mut(kind) {
            carry_component(kind, planned_block, prior_block);
        }
    }
}

/// Whether moving from `prior` to `planned` needs a new deployment.
pub fn requires_replace(prior: &DeploymentPlan, planned: &DeploymentPlan) -> bool {
    !prior.region.is_empty() && prior.region != planned.region
}

/// Traffic filter rulesets to associate and disassociate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrafficFilterChanges {
    /// Rulesets to associate, sorted.
    pub add: Vec<String>,
    /// Rulesets to disassociate, sorted.
    pub remove: Vec<String>,
}

impl TrafficFilterChanges {
    /// The changes needed to go from `prior` to `planned`.
    pub fn between(prior: &[String], planned: &[String]) -> Self {
        let prior: BTreeSet<&String> = prior.iter().collect();
        let planned: BTreeSet<&String> = planned.iter().collect();
        Self {
            add: planned.difference(&prior).map(|s| s.to_string()).collect(),
            remove: prior.difference(&planned).map(|s| s.to_string()).collect(),
        }
    }

    /// True when nothing changes.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}
