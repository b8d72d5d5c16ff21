//! Topology size parsing and formatting.
//!
//! Users write sizes in gigabytes (`"2g"`, `"0.5g"`); the wire format carries
//! megabytes.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::DeploymentError;
use crate::models::TopologySize;

/// The size resource used when none is given.
pub const DEFAULT_SIZE_RESOURCE: &str = "memory";

/// Size resources the API understands.
pub const SIZE_RESOURCES: &[&str] = &["memory", "storage"];

/// Pattern a size string must match.
pub const SIZE_PATTERN: &str = r"^\d+(\.\d+)?g$";

static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SIZE_PATTERN).expect("size pattern is a valid regex"));

/// [`SIZE_PATTERN`], compiled once.
pub fn size_regex() -> &'static Regex {
    &SIZE_RE
}

/// Parse a gigabyte size string into megabytes.
///
/// ```
/// use ec_deployment_provider::size::parse_size;
///
/// assert_eq!(parse_size("2g").unwrap(), 2048);
/// assert_eq!(parse_size("0.5g").unwrap(), 512);
/// assert!(parse_size("2gb").is_err());
/// ```
pub fn parse_size(text: &str) -> Result<i32, DeploymentError> {
    let invalid = || DeploymentError::InvalidSizeFormat {
        size: text.to_string(),
    };

    if !SIZE_RE.is_match(text) {
        return Err(invalid());
    }

    let gigabytes: f64 = text
        .trim_end_matches('g')
        .parse()
        .map_err(|_| invalid())?;
    let megabytes = (gigabytes * 1024.0).round();
    if megabytes > f64::from(i32::MAX) {
        return Err(invalid());
    }
    Ok(megabytes as i32)
}

/// Parse an optional size plus resource into a wire [`TopologySize`].
///
/// An absent or empty size means "no override" and yields `Ok(None)`. The
/// resource defaults to [`DEFAULT_SIZE_RESOURCE`].
pub fn parse_topology_size(
    size: Option<&str>,
    resource: Option<&str>,
) -> Result<Option<TopologySize>, DeploymentError> {
    let size = match size {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(None),
    };

    let resource = match resource {
        Some(r) if !r.is_empty() => r,
        _ => DEFAULT_SIZE_RESOURCE,
    };

    Ok(Some(TopologySize {
        value: parse_size(size)?,
        resource: resource.to_string(),
    }))
}

/// Format megabytes as a gigabyte size string, without trailing zeros.
///
/// ```
/// use ec_deployment_provider::size::format_size;
///
/// assert_eq!(format_size(2048), "2g");
/// assert_eq!(format_size(512), "0.5g");
/// ```
pub fn format_size(megabytes: i32) -> String {
    format!("{}g", f64::from(megabytes) / 1024.0)
}
