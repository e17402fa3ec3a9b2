//! pb-api/src/middleware.rs
//!
//! Request logging, CORS, response security headers and member identification.

use std::future::{ready, Ready};

use actix_cors::Cors;
use actix_web::dev::Payload;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{FromRequest, HttpRequest};
use pb_core::MemberId;

use crate::error::ApiError;

/// Set by the authentication gateway in front of the board.
pub const MEMBER_HEADER: &str = "X-Member-Id";

// remote-ip "request-line" status-code response-size "referrer" "user-agent"
pub fn standard_middleware() -> Logger {
    Logger::default()
}

/// `allowed_origins` is a comma separated list, or `*` for any origin.
pub fn cors_policy(allowed_origins: &str) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allow_any_header()
        .max_age(3600);

    if allowed_origins.trim() == "*" {
        return cors.allow_any_origin();
    }
    allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
        .add(("Content-Security-Policy", "default-src 'none'"))
}

/// The authenticated member making the request.
///
/// Use `Option<Member>` for endpoints that also serve anonymous viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member(pub MemberId);

impl FromRequest for Member {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let member = req
            .headers()
            .get(MEMBER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<MemberId>().ok())
            .map(Member)
            .ok_or(ApiError::Unauthenticated);
        ready(member)
    }
}
