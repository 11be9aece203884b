//! Declarative book definitions.
//!
//! A [`BookDef`] describes a whole phonebook as data — the root spec plus
//! arbitrarily nested chapters and routes — and deserialises from JSON.
//! [`BookDef::open_with`] builds the live tree through the same public
//! construction API callers use by hand, so a definition file can never
//! express a tree the API would reject.
//!
//! ```json
//! {
//!     "url": "/api",
//!     "restful": true,
//!     "data": { "token": "t" },
//!     "chapters": {
//!         "users": {
//!             "url": "/users",
//!             "routes": {
//!                 "recent": { "url": "/recent", "method": "GET" }
//!             }
//!         }
//!     }
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::book::Phonebook;
use crate::error::BookError;
use crate::transport::Transport;
use crate::types::{BookSpec, ChapterSpec, Defaults, Method, RouteSpec};

/// A whole phonebook described as data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookDef {
    /// Relative URL fragment contributed by the root.
    pub url: String,
    /// Root default data (static form only).
    pub data: Defaults,
    /// Root default options (static form only).
    pub options: Defaults,
    /// Enable REST-style URL conventions for the whole tree.
    pub restful: bool,
    /// Nested chapters, keyed by name.
    pub chapters: BTreeMap<String, ChapterDef>,
    /// Routes on the root node, keyed by name.
    pub routes: BTreeMap<String, RouteDef>,
}

/// One chapter in a [`BookDef`], itself possibly carrying chapters and routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChapterDef {
    /// Relative URL fragment contributed by the chapter.
    pub url: String,
    /// Chapter default data.
    pub data: Defaults,
    /// Chapter default options.
    pub options: Defaults,
    /// Nested chapters, keyed by name.
    pub chapters: BTreeMap<String, ChapterDef>,
    /// Routes on this chapter, keyed by name.
    pub routes: BTreeMap<String, RouteDef>,
}

/// One route in a [`BookDef`].
#[derive(Debug, Clone, Deserialize)]
pub struct RouteDef {
    /// URL fragment appended to the owning node's composed URL.
    #[serde(default)]
    pub url: String,
    /// The HTTP method the route dispatches with.
    pub method: Method,
    /// Route default data.
    #[serde(default)]
    pub data: Defaults,
    /// Route default options.
    #[serde(default)]
    pub options: Defaults,
}

impl BookDef {
    /// Build the live tree this definition describes, backed by `transport`.
    ///
    /// Fails with [`BookError::NameTaken`] when a name is used by both a
    /// chapter and a route on the same node.
    pub fn open_with<T: Transport>(&self, transport: T) -> Result<Phonebook<T>, BookError> {
        let book = Phonebook::open(
            BookSpec {
                url: self.url.clone(),
                data: self.data.clone(),
                options: self.options.clone(),
                restful: self.restful,
            },
            transport,
        );
        install(&book, &self.chapters, &self.routes)?;
        Ok(book)
    }
}

fn install<T: Transport>(
    node: &Phonebook<T>,
    chapters: &BTreeMap<String, ChapterDef>,
    routes: &BTreeMap<String, RouteDef>,
) -> Result<(), BookError> {
    for (name, def) in routes {
        node.define(RouteSpec {
            name: name.clone(),
            url: def.url.clone(),
            method: def.method,
            data: def.data.clone(),
            options: def.options.clone(),
        })?;
    }
    for (name, def) in chapters {
        let chapter = node.add_chapter(ChapterSpec {
            name: name.clone(),
            url: def.url.clone(),
            data: def.data.clone(),
            options: def.options.clone(),
        })?;
        install(&chapter, &def.chapters, &def.routes)?;
    }
    Ok(())
}

// --- tests -------------------------------------------------------------------
