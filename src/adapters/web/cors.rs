//! CORS layer built from `server.cors_origins`.
//!
//! Origin patterns:
//! - `"*"` allows every origin
//! - `"*.example.com"` suffix match
//! - `"http://localhost:*"` prefix match
//! - anything else is an exact match

use crate::utils::error::{RasterError, Result};
use axum::http::{header::HeaderValue, request::Parts, Method};
use regex::Regex;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync + 'static>;

const PREFLIGHT_MAX_AGE_SECS: u64 = 3600;

pub fn build_cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let wildcard = |pattern: &str| {
        Regex::new(pattern).map_err(|e| RasterError::ConfigError {
            message: format!("invalid CORS pattern matcher: {}", e),
        })
    };
    let suffix_pattern = wildcard(r"^\*[^*]+$")?;
    let prefix_pattern = wildcard(r"^[^*]+\*$")?;

    let checks: Vec<Predicate> = allowed_origins
        .iter()
        .map(|pattern| -> Predicate {
            if pattern == "*" {
                Box::new(|_: &str| true)
            } else if suffix_pattern.is_match(pattern) {
                let suffix = pattern[1..].to_string();
                Box::new(move |origin: &str| origin.ends_with(&suffix))
            } else if prefix_pattern.is_match(pattern) {
                let prefix = pattern[..pattern.len() - 1].to_string();
                Box::new(move |origin: &str| origin.starts_with(&prefix))
            } else {
                let exact = pattern.clone();
                Box::new(move |origin: &str| origin == exact)
            }
        })
        .collect();

    tracing::debug!("🌐 CORS allowed origins: {:?}", allowed_origins);

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _req: &Parts| {
                let origin = origin.to_str().unwrap_or("");
                checks.iter().any(|check| check(origin))
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(Duration::from_secs(PREFLIGHT_MAX_AGE_SECS)))
}
