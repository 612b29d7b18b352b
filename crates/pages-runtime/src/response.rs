/// Response post-processing applied to every handler result
use crate::Response;
use axum::body::Body;
use axum::http::{header, StatusCode};

/// Statuses that must not carry a body (fetch "null body status")
pub const NULL_BODY_STATUSES: [StatusCode; 4] = [
    StatusCode::SWITCHING_PROTOCOLS,
    StatusCode::NO_CONTENT,
    StatusCode::RESET_CONTENT,
    StatusCode::NOT_MODIFIED,
];

pub fn is_null_body_status(status: StatusCode) -> bool {
    NULL_BODY_STATUSES.contains(&status)
}

/// Drops the body of a null-body-status response, keeping status and headers
pub fn strip_null_body(response: Response) -> Response {
    if !is_null_body_status(response.status()) {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::empty())
}
