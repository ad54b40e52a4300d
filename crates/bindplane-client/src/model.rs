//! Wire model for the BindPlane v1 API.
//!
//! Resources and configurations are treated as pass-through documents: the
//! client only names the few fields it needs and keeps everything else
//! verbatim so that a round trip through this crate never drops data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A declarative resource definition submitted via `apply`.
///
/// The client does not interpret resource semantics; the document is
/// serialized exactly as supplied.
pub type Resource = Map<String, Value>;

/// Request body for `POST /apply`.
#[derive(Debug, Serialize)]
pub(crate) struct ApplyPayload<'a> {
    pub resources: &'a [Resource],
}

/// Response body for `POST /apply`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApplyResponse {
    #[serde(default)]
    pub updates: Vec<ResourceStatus>,
}

/// Result of applying a single resource, as reported by the control plane.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceStatus {
    /// Every field returned by the server, kept verbatim.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ResourceStatus {
    /// Name of the applied resource.
    ///
    /// Looks at a top-level `name` first, then at `resource.metadata.name`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.fields
            .get("name")
            .and_then(Value::as_str)
            .or_else(|| {
                self.fields
                    .get("resource")
                    .and_then(|r| r.get("metadata"))
                    .and_then(|m| m.get("name"))
                    .and_then(Value::as_str)
            })
    }

    /// Outcome reported for the resource (e.g. `created`, `unchanged`).
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.fields.get("status").and_then(Value::as_str)
    }

    /// Optional explanation accompanying an invalid or failed update.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.fields.get("reason").and_then(Value::as_str)
    }
}

/// A named configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Configuration name
    #[serde(default)]
    pub name: String,
    /// Remaining fields, kept verbatim
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Configuration {
    /// Create an otherwise empty configuration with the given name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Map::new(),
        }
    }
}

/// Response envelope shared by the configuration and rollout status endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConfigurationResponse {
    #[serde(default)]
    pub configuration: Configuration,
    #[serde(default)]
    pub raw: String,
}

/// Rollout tuning options. Always sent empty.
#[derive(Debug, Default, Serialize)]
pub(crate) struct RolloutOptions {}

/// Request body for `POST /rollouts/{name}/start`.
#[derive(Debug, Default, Serialize)]
pub(crate) struct StartRolloutPayload {
    pub options: RolloutOptions,
}

/// Version information reported by the control plane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Release tag
    #[serde(default)]
    pub tag: String,
    /// Source commit
    #[serde(default)]
    pub commit: String,
    /// Build date
    #[serde(default)]
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_rollout_payload_has_empty_options() {
        let body = serde_json::to_value(StartRolloutPayload::default()).unwrap();
        assert_eq!(body, json!({"options": {}}));
    }

    #[test]
    fn apply_payload_wraps_resources() {
        let resource: Resource = json!({"kind": "Destination", "metadata": {"name": "d1"}})
            .as_object()
            .cloned()
            .unwrap();
        let resources = vec![resource];
        let body = serde_json::to_value(ApplyPayload {
            resources: &resources,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"resources": [{"kind": "Destination", "metadata": {"name": "d1"}}]})
        );
    }

    #[test]
    fn resource_status_keeps_unknown_fields() {
        let status: ResourceStatus =
            serde_json::from_value(json!({"name": "d1", "status": "ok", "extra": [1, 2]}))
                .unwrap();
        assert_eq!(status.name(), Some("d1"));
        assert_eq!(status.status(), Some("ok"));
        assert_eq!(status.reason(), None);
        assert_eq!(status.fields.get("extra"), Some(&json!([1, 2])));
    }

    #[test]
    fn resource_status_name_from_metadata() {
        let status: ResourceStatus = serde_json::from_value(json!({
            "resource": {"kind": "Source", "metadata": {"name": "s1"}},
            "status": "invalid",
            "reason": "missing type"
        }))
        .unwrap();
        assert_eq!(status.name(), Some("s1"));
        assert_eq!(status.reason(), Some("missing type"));
    }

    #[test]
    fn configuration_response_defaults() {
        let response: ConfigurationResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.configuration, Configuration::default());
        assert!(response.raw.is_empty());
    }

    #[test]
    fn configuration_keeps_extra_fields() {
        let config: Configuration =
            serde_json::from_value(json!({"name": "prod", "spec": {"selector": "env=prod"}}))
                .unwrap();
        assert_eq!(config.name, "prod");
        assert_eq!(config.fields.get("spec"), Some(&json!({"selector": "env=prod"})));
    }

    #[test]
    fn version_ignores_unknown_fields() {
        let version: Version =
            serde_json::from_value(json!({"tag": "v1.40.0", "commit": "abc", "other": 1}))
                .unwrap();
        assert_eq!(version.tag, "v1.40.0");
        assert_eq!(version.commit, "abc");
        assert!(version.date.is_empty());
    }
}
