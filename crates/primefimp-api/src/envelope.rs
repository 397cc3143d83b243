// ── Bus envelopes ──
//
// The three message shapes the core exchanges with the transport:
// outbound `Request`s, correlated `Response`s and unsolicited
// `NotifyEvent`s. Topic addressing and outer framing belong to the
// transport; these are the payloads inside.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::component::{Command, ComponentId, ComponentType};
use crate::error::Error;

// ── Request ─────────────────────────────────────────────────────────

/// Command sent to the hub. `request_id` is echoed back in the reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub cmd: Command,
    pub component: Option<ComponentType>,
    #[serde(default)]
    pub param: RequestParam,
    #[serde(deserialize_with = "request_id_from_wire")]
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ComponentId>,
}

impl Request {
    pub fn new(
        cmd: Command,
        component: Option<ComponentType>,
        param: RequestParam,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            cmd,
            component,
            param,
            request_id: request_id.into(),
            id: None,
        }
    }
}

/// Parameters of a [`Request`].
///
/// `id` and `components` cover the common lookups; anything else a
/// `set`/`edit`/`add` needs goes into `extra`, which is flattened into
/// the same JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParam {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ComponentId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentType>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestParam {
    pub fn with_id(id: impl Into<ComponentId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn with_components(components: impl IntoIterator<Item = ComponentType>) -> Self {
        Self {
            components: components.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Add a free-form parameter.
    pub fn insert(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

// ── Response ────────────────────────────────────────────────────────

/// Reply to a [`Request`], matched by `request_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub cmd: Command,
    /// Free-form on the wire (`null` for aggregate fetches).
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub param: Value,
    #[serde(deserialize_with = "request_id_from_wire")]
    pub request_id: String,
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub errors: Option<Value>,
}

fn default_success() -> bool {
    true
}

impl Response {
    /// Successful reply carrying `param`.
    pub fn ok(cmd: Command, request_id: impl Into<String>, param: Value) -> Self {
        Self {
            cmd,
            component: None,
            param,
            request_id: request_id.into(),
            success: true,
            errors: None,
        }
    }

    /// Failed reply carrying an error detail.
    pub fn failed(cmd: Command, request_id: impl Into<String>, errors: Value) -> Self {
        Self {
            cmd,
            component: None,
            param: Value::Null,
            request_id: request_id.into(),
            success: false,
            errors: Some(errors),
        }
    }

    /// `true` when the hub flagged the request as failed.
    pub fn is_error(&self) -> bool {
        !self.success || self.errors.as_ref().is_some_and(has_content)
    }

    /// Human-readable error detail, if any.
    pub fn error_detail(&self) -> Option<String> {
        if !self.is_error() {
            return None;
        }
        match &self.errors {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(v) if has_content(v) => Some(v.to_string()),
            _ => Some("request failed without error detail".into()),
        }
    }
}

fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::String(s) => !s.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

// ── NotifyEvent ─────────────────────────────────────────────────────

/// Change notification pushed by the hub independent of any request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyEvent {
    pub cmd: Command,
    pub component: ComponentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ComponentId>,
    #[serde(default)]
    pub param: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Value>,
}

impl NotifyEvent {
    pub fn new(cmd: Command, component: ComponentType) -> Self {
        Self {
            cmd,
            component,
            id: None,
            param: Value::Null,
            changes: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_param(mut self, param: Value) -> Self {
        self.param = param;
        self
    }

    /// Decode a notification body as received from the bus.
    pub fn from_json(value: Value) -> Result<Self, Error> {
        Ok(serde_json::from_value(value)?)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Request ids are strings when we generate them, but some hub firmware
/// echoes them back as numbers.
fn request_id_from_wire<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "requestId must be a string or number, got {other}"
        ))),
    }
}
