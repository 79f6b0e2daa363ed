use crate::api::{ApiError, AppState};
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::net::{IpAddr, SocketAddr};
use tracing::warn;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Reject clients whose address isn't in `allowed_hosts`.
///
/// Does nothing when the allow-list is empty.
pub async fn restrict_hosts(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let allowed = &state.config.allowed_hosts;
    if allowed.is_empty() {
        return next.run(request).await;
    }

    match client_ip(&request) {
        Some(ip) if allowed.contains(&ip) => next.run(request).await,
        other => {
            let host = other.map_or_else(|| "unknown".to_string(), |ip| ip.to_string());
            warn!("Denied request to {} from {}", request.uri().path(), host);
            ApiError::Forbidden(host).into_response()
        }
    }
}

/// First `X-Forwarded-For` entry when behind a proxy, else the socket peer
pub fn client_ip(request: &Request) -> Option<IpAddr> {
    if let Some(forwarded) = request.headers().get(FORWARDED_FOR) {
        return forwarded
            .to_str()
            .ok()?
            .split(',')
            .next()?
            .trim()
            .parse()
            .ok();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}
