//! Declarative builder for hierarchical HTTP request definitions.
//!
//! A phonebook is a tree of named **chapters** (`api.users.posts`), each
//! contributing a URL fragment, default request data, and default transport
//! options. Requests issued at any node — via the builtin method wrappers or
//! **routes** installed with [`Phonebook::define`] — compute their final URL,
//! payload, and options by merging the whole ancestor chain, root-weakest,
//! with call-time overrides winning field by field.
//!
//! The crate computes *what* request to make, never how to execute it: the
//! actual HTTP call is delegated to an injected [`Transport`]
//! (`phonebook-http` ships a blocking `reqwest` implementation; the in-tree
//! [`RecordingTransport`] backs tests and dry runs).
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | [`Method`], [`DataMap`], [`Defaults`], and the construction specs |
//! | [`book`] | The [`Phonebook`] tree: chapters, routes, merge, and dispatch |
//! | [`transport`] | The [`Transport`] seam, [`RequestConfig`], [`RecordingTransport`] |
//! | [`def`] | [`BookDef`]: whole books described as JSON |
//! | [`render`] | Plain-text rendering of trees and computed requests |
//!
//! # Quick start
//!
//! ```rust
//! use phonebook::{BookSpec, ChapterSpec, DataMap, Phonebook, RecordingTransport, RouteSpec, Method};
//!
//! let book = Phonebook::open(
//!     BookSpec { url: "/api".into(), restful: true, ..BookSpec::default() },
//!     RecordingTransport::new(),
//! );
//! let users = book.add_chapter(ChapterSpec::new("users", "/users"))?;
//! users.define(RouteSpec::new("recent", "/recent", Method::Get))?;
//!
//! // GET /api/users/42/recent
//! let mut data = DataMap::new();
//! data.insert("id".into(), serde_json::json!(42));
//! let request = users.call("recent", data, DataMap::new())?;
//! assert_eq!(request.url, "/api/users/42/recent");
//! # Ok::<(), phonebook::BookError>(())
//! ```

pub mod book;
pub mod def;
pub mod error;
pub mod render;
pub mod transport;
pub mod types;
mod url;

pub use book::{Phonebook, RouteEntry};
pub use def::{BookDef, ChapterDef, RouteDef};
pub use error::BookError;
pub use transport::{Payload, RecordingTransport, RequestConfig, Transport};
pub use types::{BookSpec, ChapterSpec, DataMap, Defaults, Method, RouteSpec};
