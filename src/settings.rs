//! Merging of config blocks into wire configuration objects.
//!
//! Every field is overwrite-if-present. JSON blobs are parsed so the API
//! receives objects, and `{}` counts as absent in both directions.

use serde_json::Value;

use crate::component::{ComponentConfiguration, ComponentKind};
use crate::error::DeploymentError;
use crate::models::UserSettings;
use crate::plan::ComponentConfig;

fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Parse a JSON settings blob. Empty text and `{}` yield `None`.
pub fn parse_json_setting(
    kind: ComponentKind,
    field: &'static str,
    raw: &str,
) -> Result<Option<Value>, DeploymentError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(raw).map_err(|source| DeploymentError::SettingsParse {
        component: kind,
        field,
        source,
    })?;
    Ok(Some(value).filter(|v| !is_empty_json(v)))
}

fn non_empty(text: &Option<String>) -> Option<String> {
    text.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Apply the settings fields of `config` onto `settings`.
pub fn expand_user_settings(
    kind: ComponentKind,
    config: &ComponentConfig,
    settings: &mut UserSettings,
) -> Result<(), DeploymentError> {
    if let Some(raw) = &config.user_settings_json {
        if let Some(value) = parse_json_setting(kind, "user_settings_json", raw)? {
            settings.user_settings_json = Some(value);
        }
    }
    if let Some(raw) = &config.user_settings_override_json {
        if let Some(value) = parse_json_setting(kind, "user_settings_override_json", raw)? {
            settings.user_settings_override_json = Some(value);
        }
    }
    if let Some(yaml) = non_empty(&config.user_settings_yaml) {
        settings.user_settings_yaml = Some(yaml);
    }
    if let Some(yaml) = non_empty(&config.user_settings_override_yaml) {
        settings.user_settings_override_yaml = Some(yaml);
    }
    Ok(())
}

/// Apply docker image and settings of `config` onto a wire configuration.
pub fn expand_configuration<C: ComponentConfiguration>(
    kind: ComponentKind,
    config: &ComponentConfig,
    target: &mut C,
) -> Result<(), DeploymentError> {
    if let Some(image) = non_empty(&config.docker_image) {
        *target.docker_image_mut() = Some(image);
    }
    expand_user_settings(kind, config, target.user_settings_mut())
}

/// Read path: the settings of a wire configuration as config fields.
pub fn flatten_user_settings(
    settings: &UserSettings,
    config: &mut ComponentConfig,
) -> Result<(), DeploymentError> {
    if let Some(value) = settings.user_settings_json.as_ref().filter(|v| !is_empty_json(v)) {
        config.user_settings_json = Some(serde_json::to_string(value)?);
    }
    if let Some(value) = settings
        .user_settings_override_json
        .as_ref()
        .filter(|v| !is_empty_json(v))
    {
        config.user_settings_override_json = Some(serde_json::to_string(value)?);
    }
    config.user_settings_yaml = non_empty(&settings.user_settings_yaml);
    config.user_settings_override_yaml = non_empty(&settings.user_settings_override_yaml);
    Ok(())
}

/// Read path: a config block for a wire configuration, `None` when empty.
pub fn flatten_configuration<C: ComponentConfiguration>(
    source: &C,
) -> Result<Option<ComponentConfig>, DeploymentError> {
    let mut config = ComponentConfig {
        docker_image: source.docker_image().filter(|s| !s.is_empty()).map(str::to_string),
        ..Default::default()
    };
    flatten_user_settings(source.user_settings(), &mut config)?;
    Ok(Some(config).filter(|c| !c.is_empty()))
}
