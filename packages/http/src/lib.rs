//! Blocking [`Transport`] implementation backed by [`reqwest`].
//!
//! [`HttpTransport`] joins the relative URLs a phonebook computes onto a
//! fixed base URL, encodes the payload according to its [`Payload`] variant,
//! and maps options onto the outgoing request:
//!
//! - `timeout_ms` (number) — per-request timeout in milliseconds;
//! - any other scalar option — a request header of the same name.
//!
//! Non-scalar option values, and header names `reqwest` rejects, are
//! silently skipped: the phonebook core defers validation downstream, and
//! this transport keeps that policy rather than failing a request over an
//! option it cannot express.
//!
//! ```rust,no_run
//! use phonebook::{BookSpec, ChapterSpec, DataMap, Phonebook};
//! use phonebook_http::HttpTransport;
//!
//! let book = Phonebook::open(
//!     BookSpec { url: "/v1".into(), restful: true, ..BookSpec::default() },
//!     HttpTransport::new("https://api.example.com"),
//! );
//! let users = book.add_chapter(ChapterSpec::new("users", "/users")).unwrap();
//!
//! // GET https://api.example.com/v1/users
//! let response = users.get("", DataMap::new(), DataMap::new()).unwrap();
//! println!("{}", response.status());
//! ```

use std::time::Duration;

use phonebook::{Method, Payload, RequestConfig, Transport};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::Value;

/// A blocking HTTP transport with a fixed base URL.
///
/// The handle is the completed call: `reqwest`'s blocking client sends the
/// request inside [`Transport::perform`] and the result comes back directly.
/// Status codes are not interpreted — a `404` is a successful `Ok` response,
/// exactly as the underlying client reports it.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: String,
}

impl HttpTransport {
    /// Create a transport sending to `base` with a default client.
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base)
    }

    /// Create a transport with a pre-configured client (pooling, proxies,
    /// default headers).
    pub fn with_client(client: Client, base: impl Into<String>) -> Self {
        HttpTransport {
            client,
            base: base.into(),
        }
    }

    // Translate a computed request into a reqwest builder.
    fn build(&self, request: &RequestConfig) -> RequestBuilder {
        let url = join(&self.base, &request.url);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        builder = match &request.payload {
            Payload::Query(data) => builder.query(&scalar_pairs(data)),
            Payload::Json(data) => builder.json(data),
            Payload::Fields(data) => builder.form(&scalar_pairs(data)),
        };

        for (key, value) in &request.options {
            if key == "timeout_ms" {
                if let Some(ms) = value.as_u64() {
                    builder = builder.timeout(Duration::from_millis(ms));
                }
                continue;
            }
            if let Some(text) = scalar_text(value) {
                if let (Ok(name), Ok(value)) = (
                    HeaderName::try_from(key.as_str()),
                    HeaderValue::try_from(text),
                ) {
                    builder = builder.header(name, value);
                }
            }
        }

        builder
    }
}

impl Transport for HttpTransport {
    type Handle = reqwest::Result<Response>;

    fn perform(&self, request: RequestConfig) -> Self::Handle {
        self.build(&request).send()
    }
}

// --- helpers -----------------------------------------------------------------

fn join(base: &str, relative: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}

/// Scalar key/value pairs for query strings and form bodies. Nested values
/// have no single obvious wire shape, so they are skipped.
fn scalar_pairs(data: &phonebook::DataMap) -> Vec<(String, String)> {
    data.iter()
        .filter_map(|(key, value)| scalar_text(value).map(|text| (key.clone(), text)))
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

// --- tests -------------------------------------------------------------------
