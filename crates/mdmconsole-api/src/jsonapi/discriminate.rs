// ── Response discrimination ──
//
// The single place where payload shape is inspected. Everything
// downstream (reducers, CLI) matches on `Document` / `Failure` instead
// of poking at raw JSON. Plain-JSON endpoints share the channel: their
// bare objects are wrapped into a detail document here.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::document::{DetailResponse, ErrorResponse, ListResponse, ResourceId, ResourceObject};
use crate::Error;

/// A classified success-channel payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    /// `data` is an array.
    List(ListResponse),
    /// `data` is a single resource object.
    Detail(DetailResponse),
    /// Non-empty `errors` array. Still an error when delivered with a
    /// success status.
    Errors(ErrorResponse),
    /// Bodiless 2xx (e.g. `204 No Content` after a relationship edit).
    /// Produced by [`decode_response`], never by [`discriminate`].
    NoContent,
}

impl Document {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Errors(_))
    }

    /// Short shape name for logs.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Detail(_) => "detail",
            Self::Errors(_) => "errors",
            Self::NoContent => "no-content",
        }
    }
}

/// Why an operation ended on its FAILURE branch.
///
/// Decided once by [`decode_response`]; downstream code never
/// re-infers it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Failure {
    /// Network-level failure or a non-2xx status without an error document.
    #[error("transport failure{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Transport { status: Option<u16>, message: String },

    /// Error document delivered with an error status.
    #[error("server rejected the request (HTTP {status}): {}", .errors.summary())]
    Protocol { status: u16, errors: ErrorResponse },

    /// Body that is not a JSON-API document of either shape.
    #[error("undecodable response: {message}")]
    Decode { message: String, body: String },
}

impl Failure {
    /// Structured server errors, when there are any.
    pub fn error_detail(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Protocol { errors, .. } => Some(errors),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::Protocol { status, .. } => Some(*status),
            Self::Decode { .. } => None,
        }
    }
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        match err {
            Error::Decode { message, body } => Self::Decode { message, body },
            Error::Transport(ref e) => Self::Transport {
                status: e.status().map(|s| s.as_u16()),
                message: err.to_string(),
            },
            other => Self::Transport {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

/// Classify a decoded payload as list, detail or error document.
///
/// A non-empty `errors` array wins over `data`. A payload with neither
/// shape (including `"data": null`) is a contract violation and yields
/// [`Error::Decode`] rather than a guessed branch.
pub fn discriminate(payload: &Value) -> Result<Document, Error> {
    let Value::Object(members) = payload else {
        return Err(Error::decode(
            "payload is not a JSON object",
            payload.to_string(),
        ));
    };

    if members
        .get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| !errors.is_empty())
    {
        return decode_as(payload).map(Document::Errors);
    }

    match members.get("data") {
        Some(Value::Array(_)) => decode_as(payload).map(Document::List),
        Some(Value::Object(_)) => decode_as(payload).map(Document::Detail),
        Some(Value::Null) => Err(Error::decode(
            "`data` is null; expected a resource object or array",
            payload.to_string(),
        )),
        Some(other) => Err(Error::decode(
            format!("`data` must be an object or array, got {}", json_kind(other)),
            payload.to_string(),
        )),
        None => Err(Error::decode(
            "payload has neither `data` nor a non-empty `errors` array",
            payload.to_string(),
        )),
    }
}

/// Classify a payload from a plain-JSON endpoint.
///
/// JSON-API documents and non-empty `errors` arrays are accepted as-is.
/// A bare object becomes the attributes of a [`Document::Detail`] typed
/// `resource_type`, identified by `id` or else by its own `id` member.
pub fn discriminate_plain(
    payload: &Value,
    resource_type: &str,
    id: Option<&ResourceId>,
) -> Result<Document, Error> {
    let Value::Object(members) = payload else {
        return Err(Error::decode(
            "plain JSON payload is not an object",
            payload.to_string(),
        ));
    };

    let has_errors = members
        .get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| !errors.is_empty());
    if has_errors || members.contains_key("data") {
        return discriminate(payload);
    }

    let id = match id {
        Some(id) => id.clone(),
        None => match members.get("id") {
            Some(Value::String(s)) => ResourceId::new(s.clone()),
            Some(Value::Number(n)) => ResourceId::new(n.to_string()),
            _ => {
                return Err(Error::decode(
                    "plain JSON payload carries no `id`",
                    payload.to_string(),
                ));
            }
        },
    };

    let mut attributes = members.clone();
    attributes.remove("id");
    let data = ResourceObject {
        attributes,
        ..ResourceObject::new(id, resource_type)
    };
    Ok(Document::Detail(DetailResponse {
        data,
        included: Vec::new(),
        links: None,
        meta: None,
    }))
}

/// Turn a raw HTTP status + body into exactly one terminal outcome.
///
/// - 2xx with a document: `Ok`, error documents included (the reducer
///   routes those to its error branch);
/// - 2xx with an empty body: `Ok(Document::NoContent)`;
/// - non-2xx with an error document: [`Failure::Protocol`];
/// - non-2xx otherwise: [`Failure::Transport`] carrying the status;
/// - anything undecodable on a 2xx: [`Failure::Decode`].
pub fn decode_response(status: u16, body: &str) -> Result<Document, Failure> {
    decode_with(status, body, discriminate)
}

/// [`decode_response`] for plain-JSON endpoints; see [`discriminate_plain`].
pub fn decode_plain_response(
    status: u16,
    body: &str,
    resource_type: &str,
    id: Option<&ResourceId>,
) -> Result<Document, Failure> {
    decode_with(status, body, |value| {
        discriminate_plain(value, resource_type, id)
    })
}

fn decode_with(
    status: u16,
    body: &str,
    classify: impl FnOnce(&Value) -> Result<Document, Error>,
) -> Result<Document, Failure> {
    let success = (200..300).contains(&status);

    if body.trim().is_empty() {
        return if success {
            Ok(Document::NoContent)
        } else {
            Err(Failure::Transport {
                status: Some(status),
                message: "empty response body".into(),
            })
        };
    }

    let parsed: Result<Value, _> = serde_json::from_str(body);
    let classified = parsed
        .map_err(|e| Error::decode(format!("invalid JSON: {e}"), body))
        .and_then(|value| classify(&value));

    match (success, classified) {
        (true, Ok(document)) => Ok(document),
        (true, Err(err)) => Err(Failure::from(err)),
        (false, Ok(Document::Errors(errors))) => Err(Failure::Protocol { status, errors }),
        (false, Ok(_) | Err(_)) => Err(Failure::Transport {
            status: Some(status),
            message: preview(body),
        }),
    }
}

fn decode_as<T: DeserializeOwned>(payload: &Value) -> Result<T, Error> {
    T::deserialize(payload).map_err(|e| Error::decode(e.to_string(), payload.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn preview(body: &str) -> String {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_owned()
}
