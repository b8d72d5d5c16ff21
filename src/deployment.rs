//! Aggregate request builder and read path.
//!
//! [`build_create_request`] and [`build_update_request`] reconcile every
//! section of a [`DeploymentPlan`] against the deployment template. Sections
//! are independent: one failing component does not stop the others from being
//! checked, and every failure is reported in one [`ComponentErrors`], ordered
//! elasticsearch, kibana, apm, enterprise_search, integrations_server,
//! observability.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::component::ComponentKind;
use crate::error::{ComponentErrors, DeploymentError};
use crate::models::{
    DeploymentCreateRequest, DeploymentCreateSettings, DeploymentGetResponse, DeploymentMetadata,
    DeploymentObservabilitySettings, DeploymentResources, DeploymentTemplateInfo,
    DeploymentUpdateRequest, DeploymentUpdateSettings, MetadataItem, TrafficFilterSettings,
};
use crate::observability;
use crate::plan::DeploymentPlan;
use crate::resources::{
    apm, elasticsearch, enterprise_search, expand_satellite, integrations_server, kibana,
    ExpandContext, SatellitePayload,
};

/// Attribute path of the observability section.
pub const OBSERVABILITY_PATH: &str = "observability";

fn expand_section<P: SatellitePayload>(
    plan: &DeploymentPlan,
    ctx: &ExpandContext<'_>,
    template: &DeploymentTemplateInfo,
    errors: &mut ComponentErrors,
) -> Vec<P> {
    let Some(block) = plan.satellite(P::KIND) else {
        return Vec::new();
    };
    errors
        .collect(P::KIND.name(), expand_satellite(block, ctx, template))
        .into_iter()
        .collect()
}

fn build_resources(
    plan: &DeploymentPlan,
    template: &DeploymentTemplateInfo,
    errors: &mut ComponentErrors,
) -> DeploymentResources {
    let ctx = ExpandContext {
        region: &plan.region,
        version: &plan.version,
        elasticsearch_ref_id: plan.elasticsearch_ref_id(),
    };

    let elasticsearch = match &plan.elasticsearch {
        Some(block) => errors
            .collect(
                ComponentKind::Elasticsearch.name(),
                elasticsearch::expand(block, &ctx, template),
            )
            .into_iter()
            .collect(),
        None => {
            errors.push(
                ComponentKind::Elasticsearch.name(),
                DeploymentError::MissingElasticsearch,
            );
            Vec::new()
        },
    };

    DeploymentResources {
        elasticsearch,
        kibana: expand_section(plan, &ctx, template, errors),
        apm: expand_section(plan, &ctx, template, errors),
        enterprise_search: expand_section(plan, &ctx, template, errors),
        integrations_server: expand_section(plan, &ctx, template, errors),
    }
}

fn build_observability(
    plan: &DeploymentPlan,
    errors: &mut ComponentErrors,
) -> Option<DeploymentObservabilitySettings> {
    let block = plan.observability.as_ref()?;
    errors
        .collect(
            OBSERVABILITY_PATH,
            observability::expand(block, plan.elasticsearch_ref_id()),
        )
        .flatten()
}

fn expand_tags(tags: &BTreeMap<String, String>) -> Option<DeploymentMetadata> {
    if tags.is_empty() {
        return None;
    }
    Some(DeploymentMetadata {
        tags: tags
            .iter()
            .map(|(key, value)| MetadataItem {
                key: key.clone(),
                value: value.clone(),
            })
            .collect(),
    })
}

/// Build the create request for `plan`.
pub fn build_create_request(
    plan: &DeploymentPlan,
    template: &DeploymentTemplateInfo,
) -> Result<DeploymentCreateRequest, ComponentErrors> {
    let mut errors = ComponentErrors::new();
    let resources = build_resources(plan, template, &mut errors);
    let observability = build_observability(plan, &mut errors);

    let traffic_filter_settings = (!plan.traffic_filter.is_empty()).then(|| TrafficFilterSettings {
        rulesets: plan.traffic_filter.clone(),
    });
    let settings = (traffic_filter_settings.is_some() || observability.is_some()).then(|| {
        DeploymentCreateSettings {
            traffic_filter_settings,
            observability,
        }
    });

    let request = DeploymentCreateRequest {
        name: plan.name.clone(),
        alias: plan.alias.clone(),
        resources,
        settings,
        metadata: expand_tags(&plan.tags),
    };
    if errors.is_empty() {
        debug!(template = %template.id, "built create request");
    }
    errors.into_result(request)
}

/// Build the update request for `plan`.
///
/// Orphaned resources are pruned so a removed block removes the resource.
/// Traffic filters are not part of the body; they are managed through
/// association calls.
pub fn build_update_request(
    plan: &DeploymentPlan,
    template: &DeploymentTemplateInfo,
) -> Result<DeploymentUpdateRequest, ComponentErrors> {
    let mut errors = ComponentErrors::new();
    let resources = build_resources(plan, template, &mut errors);
    let observability = build_observability(plan, &mut errors);

    let request = DeploymentUpdateRequest {
        name: plan.name.clone(),
        alias: plan.alias.clone(),
        prune_orphans: true,
        resources,
        // An explicit empty object clears observability on the API side.
        settings: Some(DeploymentUpdateSettings {
            observability: Some(observability.unwrap_or_default()),
        }),
        metadata: Some(expand_tags(&plan.tags).unwrap_or_default()),
    };
    if errors.is_empty() {
        debug!(template = %template.id, "built update request");
    }
    errors.into_result(request)
}

/// Read path: the plan shape of a deployment as the API reports it.
pub fn flatten_deployment(response: &DeploymentGetResponse) -> Result<DeploymentPlan, DeploymentError> {
    let resources = &response.resources;
    let es_resource = resources.elasticsearch.first();

    let mut plan = DeploymentPlan {
        id: Some(response.id.clone()),
        name: Some(response.name.clone()).filter(|n| !n.is_empty()),
        alias: response.alias.clone().filter(|a| !a.is_empty()),
        ..Default::default()
    };

    if let Some(resource) = es_resource {
        plan.region = resource.region.clone();
        plan.deployment_template_id = elasticsearch::template_id(resource)
            .unwrap_or_default()
            .to_string();
        plan.version = elasticsearch::version(resource).unwrap_or_default().to_string();
        plan.elasticsearch = elasticsearch::flatten(resource)?;
    }

    plan.kibana = resources.kibana.first().map(kibana::flatten).transpose()?.flatten();
    plan.apm = resources.apm.first().map(apm::flatten).transpose()?.flatten();
    plan.enterprise_search = resources
        .enterprise_search
        .first()
        .map(enterprise_search::flatten)
        .transpose()?
        .flatten();
    plan.integrations_server = resources
        .integrations_server
        .first()
        .map(integrations_server::flatten)
        .transpose()?
        .flatten();

    if let Some(metadata) = &response.metadata {
        plan.tags = metadata
            .tags
            .iter()
            .map(|t| (t.key.clone(), t.value.clone()))
            .collect();
    }
    if let Some(settings) = &response.settings {
        plan.traffic_filter = settings
            .traffic_filter_settings
            .as_ref()
            .map(|t| t.rulesets.clone())
            .unwrap_or_default();
        plan.observability =
            observability::flatten(settings.observability.as_ref(), &response.id);
    }

    info!(deployment_id = %response.id, "read deployment");
    Ok(plan)
}
