//! The phonebook tree: chapters, routes, and request computation.
//!
//! A [`Phonebook`] is a cheap-to-clone handle onto one node of a tree.
//! Parents own their chapters through a name→node map; each chapter holds a
//! weak back-reference for chain traversal, so the tree never forms an
//! ownership cycle. Construction mutates a node in place; everything on the
//! request path (merging, URL composition) is pure and allocates fresh
//! values per call.
//!
//! Merge order is strictly root→leaf: ancestor defaults are weakest, a
//! node's own defaults come next, a route's defaults after that, and the
//! call-time overrides always win, field by field (shallow merge).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::BookError;
use crate::transport::{Payload, RequestConfig, Transport};
use crate::types::{BookSpec, ChapterSpec, DataMap, Defaults, Method, RouteSpec};
use crate::url;

/// One node of a phonebook tree — the root, or a chapter of another node.
///
/// Handles are reference-counted: cloning a `Phonebook` or fetching one via
/// [`chapter`](Phonebook::chapter) aliases the same node. The whole tree
/// lives as long as the root handle plus any chapter handles still held.
pub struct Phonebook<T: Transport> {
    node: Rc<NodeInner<T>>,
}

struct NodeInner<T: Transport> {
    url: String,
    data: Defaults,
    options: Defaults,
    restful: bool,
    /// The key this node was attached under; `None` at the root.
    name: Option<String>,
    parent: Weak<NodeInner<T>>,
    chapters: RefCell<BTreeMap<String, Rc<NodeInner<T>>>>,
    routes: RefCell<BTreeMap<String, Route>>,
    transport: Rc<T>,
}

/// A named operation installed by [`Phonebook::define`].
#[derive(Clone)]
struct Route {
    method: Method,
    url: String,
    data: Defaults,
    options: Defaults,
}

/// A route's public description, as listed by [`Phonebook::routes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// The name the route is invoked by.
    pub name: String,
    /// The HTTP method the route dispatches with.
    pub method: Method,
    /// The route's own URL fragment, relative to its owning node.
    pub url: String,
}

/// Which of the two per-node default mappings a merge walks.
#[derive(Clone, Copy)]
enum Field {
    Data,
    Options,
}

impl<T: Transport> Phonebook<T> {
    /// Open a new root phonebook backed by `transport`.
    pub fn open(spec: BookSpec, transport: T) -> Self {
        Phonebook {
            node: Rc::new(NodeInner {
                url: spec.url,
                data: spec.data,
                options: spec.options,
                restful: spec.restful,
                name: None,
                parent: Weak::new(),
                chapters: RefCell::new(BTreeMap::new()),
                routes: RefCell::new(BTreeMap::new()),
                transport: Rc::new(transport),
            }),
        }
    }

    /// Install a new chapter under this node and return its handle.
    ///
    /// The chapter inherits this node's RESTful flag. Fails with
    /// [`BookError::NameTaken`] — and performs no mutation — if the name is
    /// already used by a chapter or route here.
    pub fn add_chapter(&self, spec: ChapterSpec) -> Result<Phonebook<T>, BookError> {
        if self.node.taken(&spec.name) {
            return Err(BookError::NameTaken(spec.name));
        }
        let child = Rc::new(NodeInner {
            url: spec.url,
            data: spec.data,
            options: spec.options,
            restful: self.node.restful,
            name: Some(spec.name.clone()),
            parent: Rc::downgrade(&self.node),
            chapters: RefCell::new(BTreeMap::new()),
            routes: RefCell::new(BTreeMap::new()),
            transport: Rc::clone(&self.node.transport),
        });
        self.node
            .chapters
            .borrow_mut()
            .insert(spec.name, Rc::clone(&child));
        Ok(Phonebook { node: child })
    }

    /// Install a named route on this node.
    ///
    /// Shares the collision contract of [`add_chapter`](Phonebook::add_chapter):
    /// chapters and routes occupy one namespace, and an installed name is
    /// never overwritten.
    pub fn define(&self, spec: RouteSpec) -> Result<(), BookError> {
        if self.node.taken(&spec.name) {
            return Err(BookError::NameTaken(spec.name));
        }
        self.node.routes.borrow_mut().insert(
            spec.name,
            Route {
                method: spec.method,
                url: spec.url,
                data: spec.data,
                options: spec.options,
            },
        );
        Ok(())
    }

    /// Look up a chapter previously installed with [`add_chapter`](Phonebook::add_chapter).
    pub fn chapter(&self, name: &str) -> Option<Phonebook<T>> {
        self.node
            .chapters
            .borrow()
            .get(name)
            .map(|node| Phonebook {
                node: Rc::clone(node),
            })
    }

    /// Invoke a route previously installed with [`define`](Phonebook::define).
    ///
    /// The route's own defaults sit between this node's defaults and the
    /// call-time overrides in the merge order.
    pub fn call(&self, name: &str, data: DataMap, options: DataMap) -> Result<T::Handle, BookError> {
        let route = self
            .node
            .routes
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| BookError::UnknownRoute(name.to_string()))?;
        let data = extend(route.data.resolve(), data);
        let options = extend(route.options.resolve(), options);
        Ok(self.request(route.method, &route.url, data, options))
    }

    /// Compute and dispatch a request from this node.
    ///
    /// `url` is a fragment relative to this node's composed URL; `data` and
    /// `options` override every default on the ancestor chain, field by
    /// field. Returns the transport's handle untouched.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        data: DataMap,
        options: DataMap,
    ) -> T::Handle {
        let data = extend(self.node.merged(Field::Data), data);
        let options = extend(self.node.merged(Field::Options), options);
        let url = self.request_url(url, &data);
        let payload = if self.node.restful {
            match method {
                Method::Get => Payload::Query(data),
                _ => Payload::Json(data),
            }
        } else {
            Payload::Fields(data)
        };
        self.node.transport.perform(RequestConfig {
            method,
            url,
            options,
            payload,
        })
    }

    /// `GET` from this node. Canonical argument order is `(url, data, options)`.
    pub fn get(&self, url: &str, data: DataMap, options: DataMap) -> T::Handle {
        self.request(Method::Get, url, data, options)
    }

    /// `POST` to this node.
    pub fn post(&self, url: &str, data: DataMap, options: DataMap) -> T::Handle {
        self.request(Method::Post, url, data, options)
    }

    /// `PUT` to this node.
    pub fn put(&self, url: &str, data: DataMap, options: DataMap) -> T::Handle {
        self.request(Method::Put, url, data, options)
    }

    /// `DELETE` from this node.
    pub fn destroy(&self, url: &str, data: DataMap, options: DataMap) -> T::Handle {
        self.request(Method::Delete, url, data, options)
    }

    /// The composed relative URL template for this node (placeholders
    /// unfilled), root fragment first.
    pub fn url(&self) -> String {
        self.node.resolve_url()
    }

    /// The URL template a fragment would request from this node, before
    /// placeholder substitution.
    pub fn template(&self, fragment: &str) -> String {
        url::collapse_once(&format!("{}{}", self.node.resolve_url(), fragment))
    }

    /// Whether RESTful URL conventions apply to this node.
    pub fn restful(&self) -> bool {
        self.node.restful
    }

    /// The key this node was attached under; `None` at the root.
    pub fn name(&self) -> Option<String> {
        self.node.name.clone()
    }

    /// This node's chapters, in name order.
    pub fn chapters(&self) -> Vec<(String, Phonebook<T>)> {
        self.node
            .chapters
            .borrow()
            .iter()
            .map(|(name, node)| {
                (
                    name.clone(),
                    Phonebook {
                        node: Rc::clone(node),
                    },
                )
            })
            .collect()
    }

    /// This node's routes, in name order.
    pub fn routes(&self) -> Vec<RouteEntry> {
        self.node
            .routes
            .borrow()
            .iter()
            .map(|(name, route)| RouteEntry {
                name: name.clone(),
                method: route.method,
                url: route.url.clone(),
            })
            .collect()
    }

    // Compose the final request URL: node template + fragment, then the
    // RESTful request-time normalisation (fill, collapse once, trim once).
    fn request_url(&self, fragment: &str, data: &DataMap) -> String {
        let mut full = self.node.resolve_url();
        full.push_str(fragment);
        if self.node.restful {
            let filled = url::fill_placeholders(&full, data);
            url::trim_trailing_separator(url::collapse_once(&filled))
        } else {
            url::collapse_once(&full)
        }
    }
}

impl<T: Transport> Clone for Phonebook<T> {
    fn clone(&self) -> Self {
        Phonebook {
            node: Rc::clone(&self.node),
        }
    }
}

impl<T: Transport> fmt::Debug for Phonebook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phonebook")
            .field("name", &self.node.name)
            .field("url", &self.node.url)
            .field("restful", &self.node.restful)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> NodeInner<T> {
    fn is_root(&self) -> bool {
        self.parent.upgrade().is_none()
    }

    fn taken(&self, name: &str) -> bool {
        self.chapters.borrow().contains_key(name) || self.routes.borrow().contains_key(name)
    }

    fn defaults(&self, field: Field) -> &Defaults {
        match field {
            Field::Data => &self.data,
            Field::Options => &self.options,
        }
    }

    /// Ancestor-accumulated defaults for one field kind, root-weakest.
    /// Pure: resolves computed defaults afresh and builds a new map.
    fn merged(&self, field: Field) -> DataMap {
        let mut map = match self.parent.upgrade() {
            Some(parent) => parent.merged(field),
            None => DataMap::new(),
        };
        for (key, value) in self.defaults(field).resolve() {
            map.insert(key, value);
        }
        map
    }

    /// Root→leaf concatenation of fragments, separator runs collapsed at
    /// each level. RESTful mode inserts the expected resource-identifier
    /// placeholder for every nested node: `{id}` directly under the root,
    /// `{<name>Id}` deeper down.
    fn resolve_url(&self) -> String {
        let parent = self.parent.upgrade();
        let mut prefix = parent
            .as_ref()
            .map(|p| p.resolve_url())
            .unwrap_or_default();
        prefix.push_str(&self.url);
        let mut prefix = url::collapse_separators(&prefix);
        if self.restful {
            if let Some(parent) = parent {
                if parent.is_root() {
                    prefix.push_str("/{id}");
                } else if let Some(name) = &self.name {
                    prefix.push_str(&format!("/{{{name}Id}}"));
                }
            }
        }
        prefix
    }
}

fn extend(mut base: DataMap, overlay: DataMap) -> DataMap {
    for (key, value) in overlay {
        base.insert(key, value);
    }
    base
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RecordingTransport;
    use serde_json::{json, Value};
    use std::cell::Cell;
    use std::rc::Rc;

    fn map(pairs: &[(&str, Value)]) -> DataMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn open(url: &str) -> Phonebook<RecordingTransport> {
        Phonebook::open(
            BookSpec {
                url: url.into(),
                ..BookSpec::default()
            },
            RecordingTransport::new(),
        )
    }

    #[test]
    fn chapters_are_reachable_after_install() {
        let book = open("/api");
        let users = book.add_chapter(ChapterSpec::new("users", "/users")).unwrap();
        assert_eq!(users.name().as_deref(), Some("users"));
        assert_eq!(book.chapter("users").unwrap().url(), "/api/users");
        assert!(book.chapter("ghosts").is_none());
    }

    #[test]
    fn adding_a_chapter_twice_fails_without_mutation() {
        let book = open("/api");
        book.add_chapter(ChapterSpec::new("users", "/users")).unwrap();
        let err = book
            .add_chapter(ChapterSpec::new("users", "/other"))
            .unwrap_err();
        assert_eq!(err, BookError::NameTaken("users".into()));
        // First installation survives untouched.
        assert_eq!(book.chapter("users").unwrap().url(), "/api/users");
    }

    #[test]
    fn defining_a_route_twice_fails() {
        let book = open("/api");
        assert!(book
            .define(RouteSpec::new("search", "/search", Method::Get))
            .is_ok());
        assert_eq!(
            book.define(RouteSpec::new("search", "/search", Method::Get)),
            Err(BookError::NameTaken("search".into()))
        );
    }

    #[test]
    fn chapters_and_routes_share_a_namespace() {
        let book = open("/api");
        book.add_chapter(ChapterSpec::new("users", "/users")).unwrap();
        assert_eq!(
            book.define(RouteSpec::new("users", "/users", Method::Get)),
            Err(BookError::NameTaken("users".into()))
        );

        book.define(RouteSpec::new("search", "/search", Method::Get))
            .unwrap();
        assert!(matches!(
            book.add_chapter(ChapterSpec::new("search", "/s")),
            Err(BookError::NameTaken(_))
        ));
    }

    #[test]
    fn unknown_route_is_an_error() {
        let book = open("/api");
        assert_eq!(
            book.call("nope", DataMap::new(), DataMap::new()).unwrap_err(),
            BookError::UnknownRoute("nope".into())
        );
    }

    #[test]
    fn method_wrappers_set_the_method() {
        let book = open("/api");
        assert_eq!(
            book.get("/r", DataMap::new(), DataMap::new()).method,
            Method::Get
        );
        assert_eq!(
            book.post("/r", DataMap::new(), DataMap::new()).method,
            Method::Post
        );
        assert_eq!(
            book.put("/r", DataMap::new(), DataMap::new()).method,
            Method::Put
        );
        assert_eq!(
            book.destroy("/r", DataMap::new(), DataMap::new()).method,
            Method::Delete
        );
    }

    #[test]
    fn merge_precedence_child_wins_then_call_wins() {
        let book = Phonebook::open(
            BookSpec {
                data: map(&[("a", json!(1)), ("shared", json!("r"))]).into(),
                ..BookSpec::default()
            },
            RecordingTransport::new(),
        );
        let child = book
            .add_chapter(ChapterSpec {
                data: map(&[("b", json!(2)), ("shared", json!("c"))]).into(),
                ..ChapterSpec::new("child", "/child")
            })
            .unwrap();

        let merged = child.get("", DataMap::new(), DataMap::new());
        assert_eq!(
            merged.payload.data(),
            &map(&[("a", json!(1)), ("b", json!(2)), ("shared", json!("c"))])
        );

        let overridden = child.get("", map(&[("shared", json!("x"))]), DataMap::new());
        assert_eq!(
            overridden.payload.data(),
            &map(&[("a", json!(1)), ("b", json!(2)), ("shared", json!("x"))])
        );
    }

    #[test]
    fn route_defaults_sit_between_node_and_call() {
        let book = Phonebook::open(
            BookSpec {
                data: map(&[("shared", json!("book"))]).into(),
                ..BookSpec::default()
            },
            RecordingTransport::new(),
        );
        book.define(RouteSpec {
            data: map(&[("shared", json!("route")), ("own", json!(true))]).into(),
            ..RouteSpec::new("custom", "/custom", Method::Post)
        })
        .unwrap();

        let plain = book.call("custom", DataMap::new(), DataMap::new()).unwrap();
        assert_eq!(plain.payload.data().get("shared"), Some(&json!("route")));
        assert_eq!(plain.payload.data().get("own"), Some(&json!(true)));

        let called = book
            .call("custom", map(&[("shared", json!("called"))]), DataMap::new())
            .unwrap();
        assert_eq!(called.payload.data().get("shared"), Some(&json!("called")));
    }

    #[test]
    fn options_merge_like_data() {
        let book = Phonebook::open(
            BookSpec {
                options: map(&[("book", json!("set")), ("shared", json!("book"))]).into(),
                ..BookSpec::default()
            },
            RecordingTransport::new(),
        );
        let users = book
            .add_chapter(ChapterSpec {
                options: map(&[("chapter", json!("set")), ("shared", json!("chapter"))]).into(),
                ..ChapterSpec::new("users", "/users")
            })
            .unwrap();

        let request = users.get("", DataMap::new(), map(&[("shared", json!("called"))]));
        assert_eq!(request.options.get("book"), Some(&json!("set")));
        assert_eq!(request.options.get("chapter"), Some(&json!("set")));
        assert_eq!(request.options.get("shared"), Some(&json!("called")));
    }

    #[test]
    fn computed_defaults_are_reinvoked_per_request() {
        let calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&calls);
        let book = Phonebook::open(
            BookSpec {
                data: Defaults::computed(move || {
                    counter.set(counter.get() + 1);
                    let mut m = DataMap::new();
                    m.insert("x".into(), json!("computed"));
                    m
                }),
                ..BookSpec::default()
            },
            RecordingTransport::new(),
        );

        for _ in 0..2 {
            let request = book.get("", DataMap::new(), DataMap::new());
            assert_eq!(request.payload.data().get("x"), Some(&json!("computed")));
        }
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn url_concatenation_collapses_separators() {
        let book = open("/1/");
        let chapter = book.add_chapter(ChapterSpec::new("c", "/2/")).unwrap();
        chapter
            .define(RouteSpec::new("r", "/3", Method::Get))
            .unwrap();

        let request = chapter.call("r", DataMap::new(), DataMap::new()).unwrap();
        assert_eq!(request.url, "/1/2/3");
    }

    #[test]
    fn non_restful_urls_pass_through_untouched() {
        let book = open("/api");
        let request = book.get("/users/{userId}/", map(&[("userId", json!(42))]), DataMap::new());
        // No substitution, no trailing-slash trim outside RESTful mode.
        assert_eq!(request.url, "/api/users/{userId}/");
        assert!(matches!(request.payload, Payload::Fields(_)));
    }

    #[test]
    fn restful_nested_chapters_gain_id_placeholders() {
        let book = Phonebook::open(
            BookSpec {
                url: "/api".into(),
                restful: true,
                ..BookSpec::default()
            },
            RecordingTransport::new(),
        );
        let users = book.add_chapter(ChapterSpec::new("users", "/users")).unwrap();
        let posts = users.add_chapter(ChapterSpec::new("posts", "/posts")).unwrap();

        assert_eq!(users.url(), "/api/users/{id}");
        assert_eq!(posts.url(), "/api/users/{id}/posts/{postsId}");
        assert!(posts.restful());
    }

    #[test]
    fn restful_request_fills_ids_from_merged_data() {
        let book = Phonebook::open(
            BookSpec {
                url: "/api".into(),
                restful: true,
                ..BookSpec::default()
            },
            RecordingTransport::new(),
        );
        let users = book.add_chapter(ChapterSpec::new("users", "/users")).unwrap();
        let posts = users.add_chapter(ChapterSpec::new("posts", "/posts")).unwrap();

        let item = posts.get(
            "",
            map(&[("id", json!(42)), ("postsId", json!(7))]),
            DataMap::new(),
        );
        assert_eq!(item.url, "/api/users/42/posts/7");

        // Missing identifiers collapse away, leaving the collection URL.
        let collection = users.get("", DataMap::new(), DataMap::new());
        assert_eq!(collection.url, "/api/users");
    }

    #[test]
    fn restful_encoding_is_method_conditional() {
        let book = Phonebook::open(
            BookSpec {
                url: "/api".into(),
                restful: true,
                ..BookSpec::default()
            },
            RecordingTransport::new(),
        );
        let get = book.get("/u", map(&[("q", json!("x"))]), DataMap::new());
        assert!(matches!(get.payload, Payload::Query(_)));

        let post = book.post("/u", map(&[("q", json!("x"))]), DataMap::new());
        assert!(matches!(post.payload, Payload::Json(_)));
    }

    #[test]
    fn repeated_requests_are_identical() {
        let book = Phonebook::open(
            BookSpec {
                url: "/api".into(),
                data: map(&[("token", json!("t"))]).into(),
                restful: true,
                ..BookSpec::default()
            },
            RecordingTransport::new(),
        );
        let users = book.add_chapter(ChapterSpec::new("users", "/users")).unwrap();

        let first = users.get("/recent", map(&[("id", json!(1))]), DataMap::new());
        let second = users.get("/recent", map(&[("id", json!(1))]), DataMap::new());
        assert_eq!(first, second);
        assert_eq!(users.url(), users.url());
    }
}
