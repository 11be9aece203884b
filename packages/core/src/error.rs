use thiserror::Error;

/// Errors returned by tree construction and route dispatch.
///
/// Name collisions are the only failure mode construction has: a phonebook
/// never overwrites an accessor that was already installed, whether it came
/// from a chapter or a route, because doing so would make later dispatch
/// ambiguous. Nothing else is validated — malformed URLs, payloads, and
/// option values flow through to the transport untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookError {
    /// The name is already taken by a chapter or route on this node.
    #[error("name {0:?} is already taken on this phonebook")]
    NameTaken(String),

    /// No route with this name has been defined on this node.
    #[error("no route named {0:?} on this phonebook")]
    UnknownRoute(String),
}
