//! Access-control hook invoked on every request
//!
//! The framework implements no authentication itself; it calls a predicate
//! supplied at build time and turns a `false` into a 401. The predicate sees
//! the verb, the resource kind, and — when the request targets one — the
//! resource id and relation name.

use axum::http::Method;

/// What a request is trying to touch, as seen by the access policy
#[derive(Debug, Clone)]
pub struct AccessRequest<'a> {
    /// HTTP verb of the request
    pub method: &'a Method,

    /// Resource kind named in the path
    pub kind: &'a str,

    /// Resource id, when the path carries one
    pub id: Option<i64>,

    /// Relation or association name, when the path carries one
    pub relation: Option<&'a str>,
}

/// Per-request access predicate.
///
/// Returning `false` rejects the request with 401 before any store access.
pub trait AccessPolicy: Send + Sync {
    fn allow(&self, request: &AccessRequest<'_>) -> bool;
}

/// Default policy that permits everything
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn allow(&self, _request: &AccessRequest<'_>) -> bool {
        true
    }
}

/// Adapter turning a plain predicate into an `AccessPolicy`
pub struct PolicyFn<F>(pub F);

impl<F> AccessPolicy for PolicyFn<F>
where
    F: Fn(&AccessRequest<'_>) -> bool + Send + Sync,
{
    fn allow(&self, request: &AccessRequest<'_>) -> bool {
        (self.0)(request)
    }
}
