//! Site configuration: the protected resources, their primary passwords and
//! the extra passwords an administrator configured for each.
//!
//! String values of the form `$ENV{VAR_NAME}` are replaced with the variable's
//! value after parsing, so passwords need not live in the file itself.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use log::warn;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::credentials::extras::{validate_extras, ExtrasDiagnostic, ExtrasValue};
use crate::credentials::resource::Resource;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(String),
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("environment variable {0} is required but missing")]
    MissingEnvVar(String),
    #[error("unknown resource: {0}")]
    UnknownResource(String),
}

#[derive(Debug, Deserialize)]
struct RawResource {
    password: Option<String>,
    #[serde(rename = "extraPasswords", default)]
    extra_passwords: ExtrasValue,
}

#[derive(Debug, Deserialize)]
struct RawSiteConfig {
    #[serde(rename = "siteUrl")]
    site_url: String,
    #[serde(default)]
    resources: BTreeMap<String, RawResource>,
}

#[derive(Debug)]
pub struct SiteConfig {
    pub site_url: String,
    resources: BTreeMap<String, Resource>,
}

impl SiteConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let mut value: Value =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(format!("{e}")))?;
        resolve_env_placeholders(&mut value)?;
        let raw: RawSiteConfig =
            serde_json::from_value(value).map_err(|e| ConfigError::Parse(format!("{e}")))?;

        let resources = raw
            .resources
            .into_iter()
            .map(|(id, entry)| {
                let resource = Resource::new(id.clone(), entry.password).with_extras(entry.extra_passwords);
                (id, resource)
            })
            .collect();

        Ok(SiteConfig {
            site_url: raw.site_url,
            resources,
        })
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn require(&self, id: &str) -> Result<&Resource, ConfigError> {
        self.resource(id)
            .ok_or_else(|| ConfigError::UnknownResource(id.to_string()))
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Configuration problems per resource, in resource id order.
    pub fn diagnostics(&self) -> Vec<(&str, ExtrasDiagnostic)> {
        let mut out = Vec::new();
        for resource in self.resources() {
            if !resource.is_protected() && resource.extras != ExtrasValue::Absent {
                warn!("resource {} has extra passwords but no primary password; they are never checked", resource.id);
            }
            out.extend(
                validate_extras(&resource.extras)
                    .into_iter()
                    .map(|diagnostic| (resource.id.as_str(), diagnostic)),
            );
        }
        out
    }
}

/// Loads the JSON configuration file and warns about extra passwords that can
/// never match.
pub fn load_config(path: impl AsRef<Path>) -> Result<SiteConfig, ConfigError> {
    let raw_json = fs::read_to_string(&path).map_err(|e| ConfigError::Io(format!("{e}")))?;
    let config = SiteConfig::from_json_str(&raw_json)?;
    for (id, diagnostic) in config.diagnostics() {
        warn!("resource {}: {}", id, diagnostic);
    }
    Ok(config)
}

fn resolve_env_placeholders(value: &mut Value) -> Result<(), ConfigError> {
    match value {
        Value::String(text) => {
            if let Some(var) = extract_env_placeholder(text) {
                let replacement =
                    env::var(&var).map_err(|_| ConfigError::MissingEnvVar(var.clone()))?;
                *text = replacement;
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                resolve_env_placeholders(item)?;
            }
        }
        Value::Object(map) => {
            for val in map.values_mut() {
                resolve_env_placeholders(val)?;
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}

fn extract_env_placeholder(text: &str) -> Option<String> {
    let inner = text.strip_prefix("$ENV{")?.strip_suffix('}')?;
    (!inner.is_empty()).then(|| inner.to_string())
}

#[cfg(test)]
mod tests {
    use super::{load_config, resolve_env_placeholders, ConfigError, SiteConfig};
    use crate::credentials::extras::{ExtrasDiagnostic, ExtrasValue};
    use serde_json::json;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_resources_from_file() {
        let payload = json!({
            "siteUrl": "https://example.test",
            "resources": {
                "about": {
                    "password": "primary",
                    "extraPasswords": ["alpha", {"label": "press", "password": " beta "}]
                },
                "open": {}
            }
        });

        let file = NamedTempFile::new().expect("temp file");
        fs::write(file.path(), serde_json::to_vec(&payload).unwrap()).unwrap();

        let config = load_config(file.path()).expect("config should load");
        assert_eq!(config.site_url, "https://example.test");

        let about = config.require("about").expect("about is configured");
        assert_eq!(about.primary(), Some("primary"));
        assert_eq!(about.extras.candidates(), vec!["alpha", "beta"]);

        let open = config.resource("open").expect("open is configured");
        assert!(!open.is_protected());
        assert_eq!(open.extras, ExtrasValue::Absent);
        assert_eq!(config.resources().count(), 2);
    }

    #[test]
    fn expands_env_placeholders() {
        std::env::set_var("POSTPASS_TEST_EXTRA", "from-env");
        let config = SiteConfig::from_json_str(
            r#"{
                "siteUrl": "https://example.test",
                "resources": { "a": { "password": "p", "extraPasswords": ["$ENV{POSTPASS_TEST_EXTRA}"] } }
            }"#,
        )
        .expect("config should parse");
        assert_eq!(config.require("a").unwrap().extras.candidates(), vec!["from-env"]);
    }

    #[test]
    fn rejects_missing_env() {
        std::env::remove_var("POSTPASS_MISSING_SECRET");
        let mut value = json!({"password": "$ENV{POSTPASS_MISSING_SECRET}"});
        let err = resolve_env_placeholders(&mut value).unwrap_err();
        match err {
            ConfigError::MissingEnvVar(name) => assert_eq!(name, "POSTPASS_MISSING_SECRET"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn reports_parse_and_lookup_failures() {
        assert!(matches!(SiteConfig::from_json_str("{"), Err(ConfigError::Parse(_))));
        assert!(matches!(SiteConfig::from_json_str(r#"{"resources": {}}"#), Err(ConfigError::Parse(_))));

        let config = SiteConfig::from_json_str(r#"{"siteUrl": "s"}"#).unwrap();
        let err = config.require("nope").unwrap_err();
        assert_eq!(err.to_string(), "unknown resource: nope");
        assert!(matches!(load_config("/nonexistent/postpass.json"), Err(ConfigError::Io(_))));
    }

    #[test]
    fn collects_diagnostics_per_resource() {
        let config = SiteConfig::from_json_str(
            r#"{
                "siteUrl": "s",
                "resources": {
                    "a": { "password": "p", "extraPasswords": "not-a-list" },
                    "b": { "password": "p", "extraPasswords": ["ok", "", {"label": "x"}] }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.diagnostics(),
            vec![
                ("a", ExtrasDiagnostic::NotAList),
                ("b", ExtrasDiagnostic::BlankEntry { index: 1 }),
                ("b", ExtrasDiagnostic::InvalidEntry { index: 2 }),
            ]
        );
    }
}
