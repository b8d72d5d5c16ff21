//! Schema of the deployment resource.
//!
//! The schema describes the shape of the plan JSON the host framework hands
//! over: attribute types, which attributes are required, optional or computed,
//! nested blocks and their cardinality, and value constraints. It drives
//! [`crate::validation`] and is returned to the host by
//! [`crate::resource::DeploymentResource::schema`].

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::component::ComponentKind;
use crate::size::{size_regex, SIZE_RESOURCES};

/// Value type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// Text.
    String,
    /// Whole number; zone counts are the only one so far.
    Int64,
    /// `true` or `false`.
    Bool,
    /// Homogeneous list, such as `traffic_filter`.
    List(Box<AttributeType>),
    /// String-keyed map, such as `tags`.
    Map(Box<AttributeType>),
}

impl AttributeType {
    /// `List` of `element_type`.
    pub fn list(element_type: AttributeType) -> Self {
        Self::List(Box::new(element_type))
    }

    /// `Map` of `element_type`.
    pub fn map(element_type: AttributeType) -> Self {
        Self::Map(Box::new(element_type))
    }
}

/// Who sets an attribute: the user, the provider, or either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    /// Must be present in the plan.
    pub required: bool,
    /// May be present in the plan.
    pub optional: bool,
    /// Filled in from the API. Without `optional` the user may not set it.
    pub computed: bool,
    /// Credentials; hosts redact these.
    pub sensitive: bool,
}

impl AttributeFlags {
    /// Set by the user, always.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }

    /// Set by the user, or left out.
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Default::default()
        }
    }

    /// Set only from API responses.
    pub fn computed() -> Self {
        Self {
            computed: true,
            ..Default::default()
        }
    }

    /// Set by the user, or from API responses when left out.
    pub fn optional_computed() -> Self {
        Self {
            optional: true,
            computed: true,
            ..Default::default()
        }
    }
}

/// A compiled regular expression, serialized as its source text.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile `pattern`.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    /// The source text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether `text` matches.
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self(regex)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Self::new(&source).map_err(serde::de::Error::custom)
    }
}

/// A constraint on the value of a string or integer attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// The string must match a regular expression.
    Pattern(Pattern),
    /// The string must be one of the listed values.
    OneOf(Vec<String>),
    /// The integer must lie in `min..=max`.
    Range {
        /// Smallest allowed value.
        min: i64,
        /// Largest allowed value.
        max: i64,
    },
    /// The string must be a JSON document.
    Json,
}

impl Constraint {
    /// Create a [`Constraint::OneOf`] from string slices.
    pub fn one_of(values: &[&str]) -> Self {
        Self::OneOf(values.iter().map(|v| v.to_string()).collect())
    }
}

/// One attribute of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Value type.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Who sets the value.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// Shown to users by the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// A change replaces the deployment instead of updating it.
    #[serde(default)]
    pub force_new: bool,
    /// Checked by [`crate::validation`] once the type matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,
}

impl Attribute {
    /// An attribute without description or constraint.
    pub fn new(attr_type: AttributeType, flags: AttributeFlags) -> Self {
        Self {
            attr_type,
            flags,
            description: None,
            force_new: false,
            constraint: None,
        }
    }

    /// Required string.
    pub fn required_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::required())
    }

    /// Optional string.
    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::optional())
    }

    /// Read-only string reported by the API.
    pub fn computed_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::computed())
    }

    /// Optional string the provider fills in when unset.
    pub fn optional_computed_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::optional_computed())
    }

    /// Optional integer.
    pub fn optional_int64() -> Self {
        Self::new(AttributeType::Int64, AttributeFlags::optional())
    }

    /// Optional boolean.
    pub fn optional_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::optional())
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Changing the value replaces the deployment.
    pub fn with_force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Constrain the value.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Flag the value as a credential.
    pub fn sensitive(mut self) -> Self {
        self.flags.sensitive = true;
        self
    }
}

/// How often a nested block may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockNestingMode {
    /// One object, or nothing.
    #[default]
    Single,
    /// An ordered array of objects, such as `topology`.
    List,
}

/// Attributes and nested blocks of one JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    /// Attributes keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Attribute>,
    /// Nested blocks keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub blocks: BTreeMap<String, NestedBlock>,
    /// Shown to users by the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Block {
    /// An empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Add a nested block.
    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.blocks.insert(name.into(), block);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A [`Block`] placed under a parent, with its cardinality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedBlock {
    /// The nested object.
    #[serde(flatten)]
    pub block: Block,
    /// Single object or list.
    #[serde(default)]
    pub nesting_mode: BlockNestingMode,
    /// Fewest occurrences; 1 on a single block makes it required.
    #[serde(default)]
    pub min_items: u32,
    /// Most occurrences; 0 means no limit.
    #[serde(default)]
    pub max_items: u32,
}

impl NestedBlock {
    /// At most one object.
    pub fn single(block: Block) -> Self {
        Self {
            block,
            nesting_mode: BlockNestingMode::Single,
            min_items: 0,
            max_items: 1,
        }
    }

    /// Any number of objects.
    pub fn list(block: Block) -> Self {
        Self {
            block,
            nesting_mode: BlockNestingMode::List,
            min_items: 0,
            max_items: 0,
        }
    }

    /// Require at least `min` objects.
    pub fn with_min_items(mut self, min: u32) -> Self {
        self.min_items = min;
        self
    }
}

/// A versioned root block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Bumped when the state layout changes.
    #[serde(default)]
    pub version: u64,
    /// The nested object.
    #[serde(flatten)]
    pub block: Block,
}

impl Schema {
    /// An empty version 0 schema.
    pub fn v0() -> Self {
        Self {
            version: 0,
            block: Block::new(),
        }
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.block = self.block.with_attribute(name, attr);
        self
    }

    /// Add a nested block.
    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.block = self.block.with_block(name, block);
        self
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::v0()
    }
}

/// Whether a diagnostic fails the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Fails the operation.
    Error,
    /// Shown, but the operation continues.
    Warning,
}

/// A problem reported back to the host, optionally pinned to an attribute
/// path such as `elasticsearch.topology.0.size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: DiagnosticSeverity,
    /// One line.
    pub summary: String,
    /// Longer explanation, often the offending value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Dotted path of the offending attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    fn with_severity(severity: DiagnosticSeverity, summary: impl Into<String>) -> Self {
        Self {
            severity,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// A diagnostic that fails the operation.
    pub fn error(summary: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Error, summary)
    }

    /// A diagnostic the host shows without failing.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Warning, summary)
    }

    /// Attach a longer explanation.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Pin the diagnostic to an attribute path.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// True for error diagnostics.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

/// Elasticsearch rollout strategies accepted by `elasticsearch.strategy`.
pub const STRATEGIES: &[&str] = &[
    "autodetect",
    "grow_and_shrink",
    "rolling_grow_and_shrink",
    "rolling_all",
];

fn size_attribute(description: &str) -> Attribute {
    Attribute::optional_computed_string()
        .with_description(description)
        .with_constraint(Constraint::Pattern(Pattern::from(size_regex().clone())))
}

fn size_resource_attribute() -> Attribute {
    Attribute::optional_computed_string()
        .with_description("Type of resource the size is given in")
        .with_constraint(Constraint::one_of(SIZE_RESOURCES))
}

fn json_attribute(description: &str) -> Attribute {
    Attribute::optional_string()
        .with_description(description)
        .with_constraint(Constraint::Json)
}

fn config_block(kind: ComponentKind) -> NestedBlock {
    let mut block = Block::new()
        .with_description(format!("{} settings overrides", kind.display_name()))
        .with_attribute("docker_image", Attribute::optional_string())
        .with_attribute("user_settings_json", json_attribute("JSON user settings"))
        .with_attribute(
            "user_settings_override_json",
            json_attribute("JSON override settings"),
        )
        .with_attribute("user_settings_yaml", Attribute::optional_string())
        .with_attribute("user_settings_override_yaml", Attribute::optional_string());
    match kind {
        ComponentKind::Elasticsearch => {
            block = block.with_attribute(
                "plugins",
                Attribute::new(
                    AttributeType::list(AttributeType::String),
                    AttributeFlags::optional(),
                )
                .with_description("Built-in plugins to enable"),
            );
        },
        ComponentKind::Apm | ComponentKind::IntegrationsServer => {
            block = block.with_attribute(
                "debug_enabled",
                Attribute::optional_bool().with_description("Enable debug logging"),
            );
        },
        _ => {},
    }
    NestedBlock::single(block)
}

fn topology_block(kind: ComponentKind) -> Block {
    Block::new()
        .with_attribute(
            kind.identifier_field(),
            Attribute::optional_computed_string()
                .with_description("Template element this entry overrides"),
        )
        .with_attribute("size", size_attribute("Size per zone, such as \"2g\""))
        .with_attribute("size_resource", size_resource_attribute())
        .with_attribute(
            "zone_count",
            Attribute::optional_int64()
                .with_description("Number of availability zones")
                .with_constraint(Constraint::Range { min: 1, max: 3 }),
        )
}

fn endpoint_attributes(block: Block) -> Block {
    block
        .with_attribute("resource_id", Attribute::computed_string())
        .with_attribute("region", Attribute::computed_string())
        .with_attribute("http_endpoint", Attribute::computed_string())
        .with_attribute("https_endpoint", Attribute::computed_string())
}

fn elasticsearch_block() -> NestedBlock {
    let kind = ComponentKind::Elasticsearch;
    let autoscaling = Block::new()
        .with_attribute("max_size", size_attribute("Largest size the tier may grow to"))
        .with_attribute("max_size_resource", size_resource_attribute())
        .with_attribute("min_size", size_attribute("Smallest size the tier may shrink to"))
        .with_attribute("min_size_resource", size_resource_attribute())
        .with_attribute(
            "policy_override_json",
            json_attribute("Autoscaling policy override"),
        );
    let topology = topology_block(kind)
        .with_attribute(
            "instance_configuration_id",
            Attribute::computed_string(),
        )
        .with_attribute(
            "node_roles",
            Attribute::new(
                AttributeType::list(AttributeType::String),
                AttributeFlags::computed(),
            ),
        )
        .with_attribute("node_type_data", Attribute::optional_bool())
        .with_attribute("node_type_master", Attribute::optional_bool())
        .with_attribute("node_type_ingest", Attribute::optional_bool())
        .with_attribute("node_type_ml", Attribute::optional_bool())
        .with_block("autoscaling", NestedBlock::single(autoscaling))
        .with_block("config", config_block(kind));
    let trust_account = Block::new()
        .with_attribute("account_id", Attribute::required_string())
        .with_attribute("trust_all", Attribute::optional_bool())
        .with_attribute(
            "trust_allowlist",
            Attribute::new(
                AttributeType::list(AttributeType::String),
                AttributeFlags::optional(),
            ),
        );
    let trust_external = Block::new()
        .with_attribute("relationship_id", Attribute::required_string())
        .with_attribute("trust_all", Attribute::optional_bool())
        .with_attribute(
            "trust_allowlist",
            Attribute::new(
                AttributeType::list(AttributeType::String),
                AttributeFlags::optional(),
            ),
        );
    let snapshot_source = Block::new()
        .with_attribute("source_elasticsearch_cluster_id", Attribute::required_string())
        .with_attribute("snapshot_name", Attribute::optional_string());

    let block = endpoint_attributes(Block::new())
        .with_description("The Elasticsearch resource")
        .with_attribute("ref_id", Attribute::optional_computed_string())
        .with_attribute("cloud_id", Attribute::computed_string())
        .with_attribute("autoscale", Attribute::optional_bool())
        .with_attribute(
            "strategy",
            Attribute::optional_string()
                .with_description("How plan changes are rolled out")
                .with_constraint(Constraint::one_of(STRATEGIES)),
        )
        .with_block("topology", NestedBlock::list(topology))
        .with_block("config", config_block(kind))
        .with_block("trust_account", NestedBlock::list(trust_account))
        .with_block("trust_external", NestedBlock::list(trust_external))
        .with_block("snapshot_source", NestedBlock::single(snapshot_source));
    NestedBlock::single(block).with_min_items(1)
}

fn satellite_block(kind: ComponentKind) -> NestedBlock {
    let block = endpoint_attributes(Block::new())
        .with_description(format!("The {} resource", kind.display_name()))
        .with_attribute("ref_id", Attribute::optional_computed_string())
        .with_attribute(
            "elasticsearch_cluster_ref_id",
            Attribute::optional_computed_string(),
        )
        .with_block("topology", NestedBlock::list(topology_block(kind)))
        .with_block("config", config_block(kind));
    NestedBlock::single(block)
}

/// The schema of the deployment resource.
pub fn deployment_schema() -> Schema {
    let observability = Block::new()
        .with_attribute("deployment_id", Attribute::required_string())
        .with_attribute("ref_id", Attribute::optional_computed_string())
        .with_attribute("logs", Attribute::optional_bool())
        .with_attribute("metrics", Attribute::optional_bool());

    let mut schema = Schema::v0()
        .with_attribute("id", Attribute::computed_string())
        .with_attribute("name", Attribute::optional_string())
        .with_attribute("alias", Attribute::optional_computed_string())
        .with_attribute(
            "version",
            Attribute::required_string().with_description("Stack version"),
        )
        .with_attribute(
            "region",
            Attribute::required_string()
                .with_description("Region of the deployment")
                .with_force_new(),
        )
        .with_attribute(
            "deployment_template_id",
            Attribute::required_string().with_description("Deployment template to match against"),
        )
        .with_attribute(
            "tags",
            Attribute::new(
                AttributeType::map(AttributeType::String),
                AttributeFlags::optional(),
            ),
        )
        .with_attribute(
            "traffic_filter",
            Attribute::new(
                AttributeType::list(AttributeType::String),
                AttributeFlags::optional(),
            ),
        )
        .with_block("observability", NestedBlock::single(observability))
        .with_block(ComponentKind::Elasticsearch.name(), elasticsearch_block());
    for kind in &ComponentKind::ALL[1..] {
        schema = schema.with_block(kind.name(), satellite_block(*kind));
    }
    schema
}

/// The schema of the provider block.
pub fn provider_schema() -> Schema {
    Schema::v0()
        .with_attribute(
            "endpoint",
            Attribute::optional_string().with_description("API endpoint"),
        )
        .with_attribute("apikey", Attribute::optional_string().sensitive())
        .with_attribute("username", Attribute::optional_string())
        .with_attribute("password", Attribute::optional_string().sensitive())
        .with_attribute("insecure", Attribute::optional_bool())
        .with_attribute(
            "timeout",
            Attribute::optional_string().with_description("Such as \"40m\" or \"90s\""),
        )
        .with_attribute("poll_interval", Attribute::optional_string())
        .with_attribute("verbose", Attribute::optional_bool())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::SIZE_PATTERN;

    #[test]
    fn test_computed_attributes_are_not_user_settable() {
        let schema = deployment_schema();
        let es = &schema.block.blocks["elasticsearch"].block;
        assert_eq!(es.attributes["cloud_id"].flags, AttributeFlags::computed());
        assert_eq!(es.attributes["ref_id"].flags, AttributeFlags::optional_computed());

        let topology = &es.blocks["topology"].block;
        assert!(!topology.attributes["instance_configuration_id"].flags.optional);
        assert!(topology.attributes["size"].flags.optional);
    }

    #[test]
    fn test_topology_constraints() {
        let schema = deployment_schema();
        let topology = &schema.block.blocks["kibana"].block.blocks["topology"].block;
        match &topology.attributes["size"].constraint {
            Some(Constraint::Pattern(pattern)) => assert_eq!(pattern.as_str(), SIZE_PATTERN),
            other => panic!("unexpected constraint: {other:?}"),
        }
        assert_eq!(
            topology.attributes["size_resource"].constraint,
            Some(Constraint::one_of(&["memory", "storage"]))
        );
        assert_eq!(
            topology.attributes["zone_count"].attr_type,
            AttributeType::Int64
        );
    }

    #[test]
    fn test_pattern_serializes_as_source() {
        let constraint = Constraint::Pattern(Pattern::new(r"^\d+g$").unwrap());
        let value = serde_json::to_value(&constraint).unwrap();
        assert_eq!(value, serde_json::json!({"pattern": r"^\d+g$"}));

        let back: Constraint = serde_json::from_value(value).unwrap();
        assert_eq!(back, constraint);
        assert!(serde_json::from_value::<Constraint>(serde_json::json!({"pattern": "("})).is_err());
    }

    #[test]
    fn test_provider_schema_marks_credentials_sensitive() {
        let schema = provider_schema();
        let attributes = &schema.block.attributes;
        assert!(attributes["apikey"].flags.sensitive);
        assert!(attributes["password"].flags.sensitive);
        assert!(!attributes["username"].flags.sensitive);
        assert!(schema.block.blocks.is_empty());
    }

    #[test]
    fn test_diagnostic() {
        let warning = Diagnostic::warning("Size raised to minimum")
            .with_detail("kibana requires at least 1g")
            .with_attribute("kibana.topology.0.size");

        assert!(!warning.is_error());
        assert_eq!(warning.attribute.as_deref(), Some("kibana.topology.0.size"));
        assert!(Diagnostic::error("Missing credentials").is_error());
    }

    #[test]
    fn test_deployment_schema_shape() {
        let schema = deployment_schema();
        let attributes = &schema.block.attributes;
        assert!(attributes["region"].force_new);
        assert!(attributes["id"].flags.computed);

        let es = &schema.block.blocks["elasticsearch"];
        assert_eq!(es.min_items, 1);
        assert_eq!(es.block.blocks["topology"].nesting_mode, BlockNestingMode::List);
        assert!(es.block.blocks["topology"].block.attributes.contains_key("id"));

        let apm = &schema.block.blocks["apm"];
        assert_eq!(apm.min_items, 0);
        assert!(apm.block.blocks["topology"]
            .block
            .attributes
            .contains_key("instance_configuration_id"));
        assert!(apm.block.blocks["config"]
            .block
            .attributes
            .contains_key("debug_enabled"));
        assert!(!schema.block.blocks["kibana"].block.blocks["config"]
            .block
            .attributes
            .contains_key("debug_enabled"));
    }

    #[test]
    fn test_schema_serializes() {
        let value = serde_json::to_value(deployment_schema()).unwrap();
        assert_eq!(value["version"], 0);
        assert_eq!(value["attributes"]["version"]["type"], "string");
        assert_eq!(
            value["blocks"]["elasticsearch"]["blocks"]["topology"]["attributes"]["zone_count"]
                ["constraint"]["range"]["max"],
            3
        );
    }
}
