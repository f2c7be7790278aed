//! JSON payloads exchanged with the native client.
//!
//! Every object carries its type name in `"@type"`. Requests may carry an
//! `"@extra"` value which the library echoes back on the matching response.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NativeError, TdError, TdResult};

/// Type name of error responses.
pub const ERROR_TYPE: &str = "error";

/// Client request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(rename = "@type")]
    pub type_name: String,
    #[serde(rename = "@extra", default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Request {
    /// Create a request of the given type with no fields.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            extra: None,
            fields: Map::new(),
        }
    }

    /// `getOption` for a named option.
    pub fn get_option(name: impl Into<String>) -> Self {
        Self::new("getOption").with_field("name", name.into())
    }

    /// Add a field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Tag the request with a correlation value.
    pub fn with_extra(mut self, extra: impl Into<Value>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    /// Serialize to the wire form.
    pub fn to_json(&self) -> TdResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Response or update produced by the native client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "@type")]
    pub type_name: String,
    #[serde(rename = "@extra", default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Response {
    /// Parse a response from its wire form.
    pub fn from_json(json: &str) -> TdResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether this is an error object.
    pub fn is_error(&self) -> bool {
        self.type_name == ERROR_TYPE
    }

    /// Get a field by name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Turn an error object into `TdError::Native`, pass anything else through.
    pub fn into_result(self) -> TdResult<Self> {
        if !self.is_error() {
            return Ok(self);
        }
        let native: NativeError = serde_json::from_value(Value::Object(self.fields))?;
        Err(native.into())
    }
}

/// Value of a library option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Empty,
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Empty => Ok(()),
        }
    }
}

impl TryFrom<Response> for OptionValue {
    type Error = TdError;

    fn try_from(response: Response) -> TdResult<Self> {
        let response = response.into_result()?;
        let value = response.field("value");

        match (response.type_name.as_str(), value) {
            ("optionValueEmpty", _) => Ok(Self::Empty),
            ("optionValueBoolean", Some(Value::Bool(b))) => Ok(Self::Boolean(*b)),
            // 64-bit integers travel as strings.
            ("optionValueInteger", Some(Value::String(s))) => s
                .parse()
                .map(Self::Integer)
                .map_err(|e| TdError::RequestExecution(format!("bad integer option {:?}: {}", s, e))),
            ("optionValueInteger", Some(Value::Number(n))) => n
                .as_i64()
                .map(Self::Integer)
                .ok_or_else(|| TdError::RequestExecution(format!("bad integer option {}", n))),
            (_, Some(Value::String(s))) => Ok(Self::String(s.clone())),
            (_, Some(Value::Bool(b))) => Ok(Self::Boolean(*b)),
            (_, Some(Value::Number(n))) => n
                .as_i64()
                .map(Self::Integer)
                .ok_or_else(|| TdError::RequestExecution(format!("bad integer option {}", n))),
            (type_name, _) => Err(TdError::RequestExecution(format!(
                "unexpected option response `{}`",
                type_name
            ))),
        }
    }
}
