//! Plain-text rendering of phonebook trees and computed requests.
//!
//! The output is stable plain text suitable for terminals and logs — the
//! `dial` CLI prints it for `show` and dry-run `call`. It is descriptive,
//! not canonical: URL templates are shown with their placeholders unfilled.

use crate::book::Phonebook;
use crate::transport::{Payload, RequestConfig, Transport};
use crate::types::Method;

/// Render a book's chapters and routes as a dotted-path listing.
///
/// ```text
/// Phonebook  /api  restful
/// ────────────────────────
///
/// CHAPTERS (2)
///   users        /api/users/{id}
///   users.posts  /api/users/{id}/posts/{postsId}
///
/// ROUTES (1)
///   users.recent  GET  /api/users/{id}/recent
/// ```
pub fn render_book<T: Transport>(book: &Phonebook<T>) -> String {
    let mut chapters: Vec<(String, String)> = Vec::new();
    let mut routes: Vec<(String, Method, String)> = Vec::new();
    collect(book, "", &mut chapters, &mut routes);

    let root = match book.url().as_str() {
        "" => "/".to_string(),
        url => url.to_string(),
    };
    let header = if book.restful() {
        format!("Phonebook  {}  restful", root)
    } else {
        format!("Phonebook  {}", root)
    };
    let rule = "─".repeat(header.chars().count());
    let mut out = format!("{}\n{}\n", header, rule);

    if !chapters.is_empty() {
        let width = chapters.iter().map(|(path, _)| path.len()).max().unwrap_or(0);
        out.push('\n');
        out.push_str(&format!("CHAPTERS ({})\n", chapters.len()));
        for (path, url) in &chapters {
            out.push_str(&format!("  {:<width$}  {}\n", path, url));
        }
    }

    if !routes.is_empty() {
        let width = routes.iter().map(|(path, _, _)| path.len()).max().unwrap_or(0);
        out.push('\n');
        out.push_str(&format!("ROUTES ({})\n", routes.len()));
        for (path, method, url) in &routes {
            out.push_str(&format!("  {:<width$}  {:<6}  {}\n", path, method.to_string(), url));
        }
    }

    out
}

/// Render a computed request for a dry run.
///
/// ```text
/// POST /api/users/42/posts
/// Options:
///   timeout_ms: 1000
/// Body (json):
///   title: "hello"
/// ```
pub fn render_request(request: &RequestConfig) -> String {
    let mut out = format!("{} {}\n", request.method, request.url);

    if !request.options.is_empty() {
        out.push_str("Options:\n");
        for (key, value) in &request.options {
            out.push_str(&format!("  {}: {}\n", key, value));
        }
    }

    let (label, data) = match &request.payload {
        Payload::Query(data) => ("Query", data),
        Payload::Json(data) => ("Body (json)", data),
        Payload::Fields(data) => ("Data", data),
    };
    if !data.is_empty() {
        out.push_str(&format!("{}:\n", label));
        for (key, value) in data {
            out.push_str(&format!("  {}: {}\n", key, value));
        }
    }

    out
}

// Depth-first walk accumulating dotted paths for chapters and routes.
fn collect<T: Transport>(
    node: &Phonebook<T>,
    prefix: &str,
    chapters: &mut Vec<(String, String)>,
    routes: &mut Vec<(String, Method, String)>,
) {
    for entry in node.routes() {
        routes.push((
            join_path(prefix, &entry.name),
            entry.method,
            node.template(&entry.url),
        ));
    }
    for (name, chapter) in node.chapters() {
        let path = join_path(prefix, &name);
        chapters.push((path.clone(), chapter.url()));
        collect(&chapter, &path, chapters, routes);
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

// --- tests -------------------------------------------------------------------
