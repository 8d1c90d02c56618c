//! Resolution of the effective response-wrapping TTL.

use std::time::Duration;

use lockbox_logical::Response;

/// Combine the requested and backend-declared wrap TTLs.
///
/// Zero on either side means "no opinion". When both sides ask for
/// wrapping, the shorter TTL wins. Returns `None` when neither side asks.
pub fn resolve_wrap_ttl(requested: Duration, declared: Duration) -> Option<Duration> {
    match (requested.is_zero(), declared.is_zero()) {
        (true, true) => None,
        (false, true) => Some(requested),
        (true, false) => Some(declared),
        (false, false) => Some(requested.min(declared)),
    }
}

/// Stamp the effective wrap TTL onto a backend's response.
///
/// A missing response stays missing unless wrapping applies, in which case
/// an empty response is created to carry the wrap metadata.
pub fn apply_wrapping(requested: Duration, response: Option<Response>) -> Option<Response> {
    let declared = response
        .as_ref()
        .map(Response::declared_wrap_ttl)
        .unwrap_or_default();

    let Some(ttl) = resolve_wrap_ttl(requested, declared) else {
        return response;
    };

    let mut response = response.unwrap_or_default();
    response.wrap_info.get_or_insert_with(Default::default).ttl = ttl;
    Some(response)
}
