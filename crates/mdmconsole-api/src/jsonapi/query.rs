// ── Index query parameters ──
//
// Page, filter and sort encoding for JSON-API index endpoints.
// Keys are the fixed JSON-API keys and go out verbatim; values are
// form-urlencoded. Each filter is one JSON object per `filter` entry.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;

use crate::Error;

/// Page size applied when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

const PAGE_NUMBER_KEY: &str = "page[number]";
const PAGE_SIZE_KEY: &str = "page[size]";
const FILTER_KEY: &str = "filter";
const SORT_KEY: &str = "sort";

// ── Filter operators ─────────────────────────────────────────────────

/// Filter operators accepted by the server's filtering layer.
///
/// The set is closed: anything else is rejected while parsing, so an
/// unsupported operator can never reach the encoder.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::VariantArray,
)]
pub enum FilterOp {
    #[serde(rename = "eq")]
    #[strum(serialize = "eq")]
    Eq,
    #[serde(rename = "ne")]
    #[strum(serialize = "ne")]
    Ne,
    #[serde(rename = "gt")]
    #[strum(serialize = "gt")]
    Gt,
    #[serde(rename = "ge")]
    #[strum(serialize = "ge")]
    Ge,
    #[serde(rename = "lt")]
    #[strum(serialize = "lt")]
    Lt,
    #[serde(rename = "le")]
    #[strum(serialize = "le")]
    Le,
    #[serde(rename = "in_")]
    #[strum(serialize = "in_")]
    In,
    #[serde(rename = "notin_")]
    #[strum(serialize = "notin_")]
    NotIn,
    #[serde(rename = "like")]
    #[strum(serialize = "like")]
    Like,
    #[serde(rename = "ilike")]
    #[strum(serialize = "ilike")]
    Ilike,
    #[serde(rename = "notlike")]
    #[strum(serialize = "notlike")]
    NotLike,
    #[serde(rename = "startswith")]
    #[strum(serialize = "startswith")]
    StartsWith,
    #[serde(rename = "endswith")]
    #[strum(serialize = "endswith")]
    EndsWith,
    #[serde(rename = "match")]
    #[strum(serialize = "match")]
    Match,
    #[serde(rename = "has")]
    #[strum(serialize = "has")]
    Has,
    #[serde(rename = "any")]
    #[strum(serialize = "any")]
    Any,
    #[serde(rename = "between")]
    #[strum(serialize = "between")]
    Between,
    #[serde(rename = "is_")]
    #[strum(serialize = "is_")]
    Is,
    #[serde(rename = "isnot")]
    #[strum(serialize = "isnot")]
    IsNot,
}

impl FilterOp {
    /// Parse an operator name, rejecting anything outside the supported set.
    pub fn parse(name: &str) -> Result<Self, Error> {
        Self::from_str(name).map_err(|_| Error::UnsupportedOperator(name.to_owned()))
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

// ── Filters ──────────────────────────────────────────────────────────

/// One filter entry: `{name, op, val?, field?}`.
///
/// `val` is omitted for unary operators; `field` targets a column of a
/// related resource for `has`/`any`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub op: FilterOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Filter {
    pub fn new(name: impl Into<String>, op: FilterOp) -> Self {
        Self {
            name: name.into(),
            op,
            val: None,
            field: None,
        }
    }

    #[must_use]
    pub fn with_val(mut self, val: impl Into<Value>) -> Self {
        self.val = Some(val.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Parse the compact `name:op[:val]` form used on the command line.
    ///
    /// Everything after the second `:` is the value, so values may
    /// themselves contain colons. A value that parses as JSON is sent as
    /// that JSON (`[1,2]`, `42`, `true`, `null`); anything else is sent as
    /// a string. Quote a value (`"42"`) to force a string.
    pub fn parse_spec(spec: &str) -> Result<Self, Error> {
        let mut parts = spec.splitn(3, ':');
        let name = parts.next().unwrap_or_default();
        let Some(op) = parts.next() else {
            return Err(Error::InvalidQuery {
                message: format!("filter '{spec}' must look like name:op[:value]"),
            });
        };
        if name.is_empty() {
            return Err(Error::InvalidQuery {
                message: format!("filter '{spec}' has an empty name"),
            });
        }

        let filter = Self::new(name, FilterOp::parse(op)?);
        Ok(match parts.next() {
            Some(val) => filter.with_val(
                serde_json::from_str::<Value>(val).unwrap_or_else(|_| Value::from(val)),
            ),
            None => filter,
        })
    }
}

// ── Query parameters ─────────────────────────────────────────────────

/// 1-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    pub number: u32,
    pub size: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Page, filters and sort for one index request. Built per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParameters {
    pub page: PageParams,
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Sort fields in priority order; a leading `-` sorts descending.
    #[serde(default)]
    pub sort: Vec<String>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page(mut self, number: u32) -> Self {
        self.page.number = number;
        self
    }

    #[must_use]
    pub fn page_size(mut self, size: u32) -> Self {
        self.page.size = size;
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn sort(mut self, field: impl Into<String>) -> Self {
        self.sort.push(field.into());
        self
    }

    /// Encode into `key=value` fragments, in the order page number,
    /// page size, filters, sort.
    pub fn encode(&self) -> Result<Vec<String>, Error> {
        if self.page.number == 0 {
            return Err(Error::InvalidQuery {
                message: "page numbers start at 1".into(),
            });
        }
        if self.page.size == 0 {
            return Err(Error::InvalidQuery {
                message: "page size must be at least 1".into(),
            });
        }
        if let Some(bad) = self
            .sort
            .iter()
            .find(|f| f.trim_start_matches('-').is_empty())
        {
            return Err(Error::InvalidQuery {
                message: format!("invalid sort field '{bad}'"),
            });
        }

        let mut fragments = Vec::with_capacity(2 + self.filters.len() + 1);
        fragments.push(format!("{PAGE_NUMBER_KEY}={}", self.page.number));
        fragments.push(format!("{PAGE_SIZE_KEY}={}", self.page.size));

        for filter in &self.filters {
            let json = serde_json::to_string(filter)?;
            fragments.push(format!("{FILTER_KEY}={}", encode_component(&json)));
        }

        if !self.sort.is_empty() {
            fragments.push(format!("{SORT_KEY}={}", encode_component(&self.sort.join(","))));
        }

        Ok(fragments)
    }

    /// Encoded fragments joined with `&`.
    pub fn to_query_string(&self) -> Result<String, Error> {
        Ok(self.encode()?.join("&"))
    }

    /// Parse a query string the way the server does.
    ///
    /// Missing page keys fall back to the defaults; unknown keys are
    /// ignored. A leading `?` is allowed.
    pub fn decode(query: &str) -> Result<Self, Error> {
        let mut params = Self::default();

        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match &*key {
                PAGE_NUMBER_KEY => params.page.number = parse_page_value(&key, &value)?,
                PAGE_SIZE_KEY => params.page.size = parse_page_value(&key, &value)?,
                FILTER_KEY => {
                    let filter: Filter =
                        serde_json::from_str(&value).map_err(|e| Error::InvalidQuery {
                            message: format!("malformed filter {value:?}: {e}"),
                        })?;
                    params.filters.push(filter);
                }
                SORT_KEY => params.sort.extend(
                    value
                        .split(',')
                        .filter(|f| !f.is_empty())
                        .map(str::to_owned),
                ),
                _ => {}
            }
        }

        Ok(params)
    }
}

fn parse_page_value(key: &str, value: &str) -> Result<u32, Error> {
    value.parse().map_err(|_| Error::InvalidQuery {
        message: format!("{key} must be a positive integer, got {value:?}"),
    })
}

fn encode_component(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
