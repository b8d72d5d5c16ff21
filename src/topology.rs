//! Topology reconciliation.
//!
//! Turns a user's (possibly partial) list of [`TopologyRequest`]s plus the
//! deployment template's topology into the list submitted to the API:
//!
//! 1. every template element is defaulted ([`apply_defaults`]);
//! 2. each request resolves an identifier, explicitly or by position;
//! 3. the identifier is matched against the defaulted template
//!    ([`match_topology`]) and the request's size and zone count override the
//!    matched element.
//!
//! Output order follows the request order, not the template order.

use tracing::{debug, warn};

use crate::component::{ComponentKind, MINIMUM_ZONE_COUNT};
use crate::error::DeploymentError;
use crate::models::TopologySize;
use crate::plan::TopologyRequest;
use crate::size::parse_topology_size;

/// Sizing accessors shared by every component's wire topology element.
pub trait TopologyElement: Clone {
    /// The identifier requests are matched against.
    fn identifier(&self) -> &str;
    /// The instance configuration backing this element.
    fn instance_configuration_id(&self) -> Option<&str>;
    /// Current size.
    fn size(&self) -> Option<&TopologySize>;
    /// Replace the size.
    fn set_size(&mut self, size: TopologySize);
    /// Current zone count.
    fn zone_count(&self) -> i32;
    /// Replace the zone count.
    fn set_zone_count(&mut self, zone_count: i32);
}

/// Raise sizes and zone counts below the floors of `kind`.
///
/// Idempotent. Elements without a size get the floor in `memory` when the
/// floor is non-zero.
pub fn apply_defaults<T: TopologyElement>(kind: ComponentKind, mut elements: Vec<T>) -> Vec<T> {
    let floor = kind.minimum_size();
    for element in &mut elements {
        match element.size() {
            Some(size) if size.value < floor => {
                let resource = size.resource.clone();
                element.set_size(TopologySize {
                    value: floor,
                    resource,
                });
            },
            None if floor > 0 => element.set_size(TopologySize::memory(floor)),
            _ => {},
        }
        if element.zone_count() < MINIMUM_ZONE_COUNT {
            element.set_zone_count(MINIMUM_ZONE_COUNT);
        }
    }
    elements
}

/// Find the element whose identifier equals `id`.
pub fn match_topology<'a, T: TopologyElement>(
    kind: ComponentKind,
    id: &str,
    elements: &'a [T],
) -> Result<&'a T, DeploymentError> {
    elements
        .iter()
        .find(|e| e.identifier() == id)
        .ok_or_else(|| DeploymentError::TopologyElementNotFound {
            component: kind,
            field: kind.identifier_field(),
            id: id.to_string(),
        })
}

/// The identifier a request resolves to.
///
/// Explicit identifiers win. Otherwise the identifier of the defaulted
/// template element at the same index is used; past the end of the template
/// the result is empty and will fail to match.
pub fn resolve_identifier<'a, T: TopologyElement>(
    kind: ComponentKind,
    request: &'a TopologyRequest,
    index: usize,
    defaulted: &'a [T],
) -> &'a str {
    request
        .identifier(kind)
        .or_else(|| defaulted.get(index).map(|e| e.identifier()))
        .unwrap_or_default()
}

/// Reconcile `requests` against `template` for `kind`.
///
/// Fails on the first request that does not match or whose size does not
/// parse.
pub fn reconcile_topology<R, T>(
    kind: ComponentKind,
    requests: &[R],
    template: Vec<T>,
) -> Result<Vec<T>, DeploymentError>
where
    R: AsRef<TopologyRequest>,
    T: TopologyElement,
{
    let defaulted = apply_defaults(kind, template);
    if requests.is_empty() {
        debug!(component = %kind, elements = defaulted.len(), "using template topology");
        return Ok(defaulted);
    }

    let floor = kind.minimum_size();
    let mut reconciled = Vec::with_capacity(requests.len());
    for (index, request) in requests.iter().enumerate() {
        let request = request.as_ref();
        let id = resolve_identifier(kind, request, index, &defaulted);
        let mut element = match_topology(kind, id, &defaulted)?.clone();

        if let Some(mut size) =
            parse_topology_size(request.size.as_deref(), request.size_resource.as_deref())?
        {
            if size.value < floor {
                warn!(
                    component = %kind,
                    id,
                    requested = size.value,
                    floor,
                    "requested size below minimum, raising"
                );
                size.value = floor;
            }
            element.set_size(size);
        }

        if let Some(zones) = request.zone_count.filter(|z| *z > 0) {
            element.set_zone_count(zones);
        }

        reconciled.push(element);
    }

    debug!(component = %kind, elements = reconciled.len(), "reconciled topology");
    Ok(reconciled)
}

/// Read path: one request per element that is in use.
pub fn flatten_topology<T: TopologyElement>(kind: ComponentKind, elements: &[T]) -> Vec<TopologyRequest> {
    elements
        .iter()
        .filter_map(|e| TopologyRequest::from_element(kind, e))
        .collect()
}
