//! Core data types for the phonebook request model.
//!
//! This module defines the vocabulary the rest of the crate speaks:
//! [`Method`], the [`DataMap`] used for every payload and option mapping,
//! the static-or-computed [`Defaults`] carried by each node, and the
//! construction inputs ([`BookSpec`], [`ChapterSpec`], [`RouteSpec`])
//! consumed by the tree-building operations.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Payload and option mappings are plain JSON objects.
///
/// Keys are merged shallowly across the ancestor chain; values are passed
/// through to the transport without interpretation.
pub type DataMap = serde_json::Map<String, serde_json::Value>;

/// An HTTP method a phonebook request can carry.
///
/// Serialises as the uppercase wire string (e.g. `"GET"`). The `DELETE`
/// convenience wrapper on [`Phonebook`](crate::Phonebook) is named `destroy`
/// to keep the verb usable as an identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// Formats the method as its uppercase wire string (e.g. `"GET"`).
impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// Parses a [`Method`] from its uppercase wire string.
///
/// Returns `Err` with a descriptive message if the string is not recognised.
impl std::str::FromStr for Method {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(format!(
                "unknown method {:?}; expected one of: GET, POST, PUT, DELETE",
                s
            )),
        }
    }
}

/// Default data or options carried by a node or route.
///
/// Either a fixed mapping, or a producer invoked every time the value is
/// needed. The computed form is resolved at merge time and never cached, so
/// a producer can return different fields on successive requests (session
/// tokens, timestamps, and the like).
#[derive(Clone)]
pub enum Defaults {
    /// A fixed mapping, merged as-is.
    Static(DataMap),
    /// A zero-argument producer; its return value is merged like a static
    /// mapping. Re-invoked on every request.
    Computed(Rc<dyn Fn() -> DataMap>),
}

impl Defaults {
    /// Wrap a producer closure as a computed default.
    pub fn computed(producer: impl Fn() -> DataMap + 'static) -> Self {
        Defaults::Computed(Rc::new(producer))
    }

    /// Resolve to a concrete mapping, invoking the producer if computed.
    pub fn resolve(&self) -> DataMap {
        match self {
            Defaults::Static(map) => map.clone(),
            Defaults::Computed(producer) => producer(),
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults::Static(DataMap::new())
    }
}

impl From<DataMap> for Defaults {
    fn from(map: DataMap) -> Self {
        Defaults::Static(map)
    }
}

impl fmt::Debug for Defaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Defaults::Static(map) => f.debug_tuple("Static").field(map).finish(),
            Defaults::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Deserialises the static form only — a JSON object. Computed defaults can
/// only be attached programmatically.
impl<'de> Deserialize<'de> for Defaults {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        DataMap::deserialize(deserializer).map(Defaults::Static)
    }
}

/// Configuration for a root node, consumed by [`Phonebook::open`](crate::Phonebook::open).
///
/// Every field is optional; an all-default spec opens an empty, non-RESTful
/// book rooted at the empty URL.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookSpec {
    /// Relative URL fragment contributed by the root.
    pub url: String,
    /// Default request data, weakest in the merge order.
    pub data: Defaults,
    /// Default transport options, weakest in the merge order.
    pub options: Defaults,
    /// Enable REST-style URL conventions: nested `{id}` placeholder
    /// segments, method-conditional payload encoding, and trailing-slash
    /// trimming. Inherited by every chapter.
    pub restful: bool,
}

/// Configuration for a chapter, consumed by
/// [`Phonebook::add_chapter`](crate::Phonebook::add_chapter).
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterSpec {
    /// The key the chapter is installed under. Must not collide with any
    /// existing chapter or route on the parent node.
    pub name: String,
    /// Relative URL fragment contributed by the chapter.
    #[serde(default)]
    pub url: String,
    /// Default request data layered over the ancestors' defaults.
    #[serde(default)]
    pub data: Defaults,
    /// Default transport options layered over the ancestors' defaults.
    #[serde(default)]
    pub options: Defaults,
}

impl ChapterSpec {
    /// A chapter spec with only a name and URL fragment.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        ChapterSpec {
            name: name.into(),
            url: url.into(),
            data: Defaults::default(),
            options: Defaults::default(),
        }
    }
}

/// Configuration for a named route, consumed by
/// [`Phonebook::define`](crate::Phonebook::define).
#[derive(Debug, Clone, Deserialize)]
pub struct RouteSpec {
    /// The key the route is invoked by. Must not collide with any existing
    /// chapter or route on the node.
    pub name: String,
    /// URL fragment appended to the owning node's composed URL.
    #[serde(default)]
    pub url: String,
    /// The HTTP method every invocation of this route uses.
    pub method: Method,
    /// Default request data layered between the node's defaults and the
    /// call-time overrides.
    #[serde(default)]
    pub data: Defaults,
    /// Default transport options, layered the same way as `data`.
    #[serde(default)]
    pub options: Defaults,
}

impl RouteSpec {
    /// A route spec with only a name, URL fragment, and method.
    pub fn new(name: impl Into<String>, url: impl Into<String>, method: Method) -> Self {
        RouteSpec {
            name: name.into(),
            url: url.into(),
            method,
            data: Defaults::default(),
            options: Defaults::default(),
        }
    }
}

// --- tests -------------------------------------------------------------------
