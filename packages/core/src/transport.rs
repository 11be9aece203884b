//! The transport seam between the phonebook core and an HTTP client.
//!
//! The core computes *what* request to make — method, composed URL, merged
//! options, encoded payload — and hands the result to a [`Transport`]. How
//! the request is executed (or whether it is executed at all) is entirely
//! the transport's business; the core never awaits, retries, or inspects
//! the returned handle.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`RecordingTransport`] | Tests, dry runs — hands every request back |
//! | `phonebook_http::HttpTransport` | Real requests over a blocking `reqwest` client |

use std::cell::RefCell;

use crate::types::{DataMap, Method};

/// A fully computed request, ready for a transport to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    /// The HTTP method.
    pub method: Method,
    /// The composed relative URL (no scheme or host — the transport owns
    /// the base).
    pub url: String,
    /// Merged transport options. Interpretation is transport-defined;
    /// unrecognised entries are ignored, not rejected.
    pub options: DataMap,
    /// The merged request data together with its chosen encoding.
    pub payload: Payload,
}

/// The merged request data, tagged with how the transport should encode it.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Key/value pairs destined for the query string (RESTful `GET`).
    Query(DataMap),
    /// A JSON-encoded request body (RESTful non-`GET`).
    Json(DataMap),
    /// Transport-defined passthrough encoding (non-RESTful mode).
    Fields(DataMap),
}

impl Payload {
    /// The merged data mapping, regardless of encoding.
    pub fn data(&self) -> &DataMap {
        match self {
            Payload::Query(data) | Payload::Json(data) | Payload::Fields(data) => data,
        }
    }
}

/// The injected HTTP collaborator a phonebook tree delegates to.
///
/// `Handle` is opaque to the core: a blocking transport may return a
/// completed response, an async one a future or join handle, a test
/// transport the [`RequestConfig`] itself.
pub trait Transport {
    /// Whatever represents the in-flight or completed call.
    type Handle;

    /// Issue the computed request.
    fn perform(&self, request: RequestConfig) -> Self::Handle;
}

/// A transport that performs nothing and hands each computed request back
/// as its handle, keeping a log of everything it saw.
///
/// This is the test double for the whole crate (and the `dial` CLI's
/// dry-run backend): assertions read the returned [`RequestConfig`] or
/// replay the log.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    log: RefCell<Vec<RequestConfig>>,
}

impl RecordingTransport {
    /// Create an empty recording transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request performed so far, oldest first.
    pub fn requests(&self) -> Vec<RequestConfig> {
        self.log.borrow().clone()
    }

    /// The most recent request, if any.
    pub fn last(&self) -> Option<RequestConfig> {
        self.log.borrow().last().cloned()
    }
}

impl Transport for RecordingTransport {
    type Handle = RequestConfig;

    fn perform(&self, request: RequestConfig) -> RequestConfig {
        self.log.borrow_mut().push(request.clone());
        request
    }
}

// --- tests -------------------------------------------------------------------
