//! Fixed-window request rate limiting.
//!
//! Counters live in a [`DashMap`] keyed per client IP (proxy headers
//! first, then the socket peer address), so limits apply per caller
//! rather than globally. Responses carry the conventional
//! `X-RateLimit-*` headers. Expired windows are swept by a periodic
//! [`RateLimiter::cleanup_expired`] task.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::AppConfig;

/// Numeric strings are always valid header values; fall back to "0"
/// rather than panic if that ever stops being true.
fn num_to_header_value<T: ToString>(n: T) -> HeaderValue {
    HeaderValue::from_str(&n.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0"))
}

#[derive(Debug, Clone)]
struct WindowEntry {
    count: u32,
    window_start: Instant,
}

impl WindowEntry {
    fn new() -> Self {
        Self {
            count: 0,
            window_start: Instant::now(),
        }
    }

    /// Counts one request against the window, rolling the window over
    /// first if it has expired. Returns the updated count.
    fn record(&mut self, window: Duration) -> u32 {
        let now = Instant::now();
        if now.duration_since(self.window_start) >= window {
            self.count = 0;
            self.window_start = now;
        }
        self.count += 1;
        self.count
    }

    fn time_until_reset(&self, window: Duration) -> Duration {
        let elapsed = self.window_start.elapsed();
        if elapsed >= window {
            Duration::from_secs(0)
        } else {
            window - elapsed
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_window: u32,
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 100,
            window_duration: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            requests_per_window: config.rate_limit_requests_per_window,
            window_duration: Duration::from_secs(config.rate_limit_window_seconds),
        }
    }
}

#[derive(Debug)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

/// In-memory fixed-window limiter shared across handlers via `Arc`.
#[derive(Clone)]
pub struct RateLimiter {
    entries: Arc<DashMap<String, WindowEntry>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            config,
        }
    }

    pub fn check(&self, key: &str) -> RateLimitResult {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(WindowEntry::new);

        let count = entry.record(self.config.window_duration);
        let allowed = count <= self.config.requests_per_window;
        RateLimitResult {
            allowed,
            limit: self.config.requests_per_window,
            remaining: self.config.requests_per_window.saturating_sub(count),
            reset_after: entry.time_until_reset(self.config.window_duration),
        }
    }

    /// Drops entries whose window has fully elapsed. Intended to run
    /// from a periodic background task.
    pub fn cleanup_expired(&self) {
        let window = self.config.window_duration;
        self.entries
            .retain(|_, entry| entry.window_start.elapsed() < window);
    }
}

fn extract_key(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(ip) = forwarded_str.split(',').next() {
                return format!("ip:{}", ip.trim());
            }
        }
    }

    if let Some(real_ip) = request.headers().get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return format!("ip:{}", ip_str);
        }
    }

    // Directly-connected clients; requires the server to be built with
    // into_make_service_with_connect_info.
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return format!("ip:{}", addr.ip());
    }

    "ip:unknown".to_string()
}

/// Middleware enforcing the limiter. Attach with
/// `axum::middleware::from_fn_with_state(limiter, rate_limit_middleware)`.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = extract_key(&request);
    let result = limiter.check(&key);

    if !result.allowed {
        warn!(%key, "rate limit exceeded");
        let mut response = Response::new(axum::body::Body::from(
            r#"{"error":{"code":"RATE_LIMITED","message":"Too many requests"}}"#,
        ));
        *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert("X-RateLimit-Limit", num_to_header_value(result.limit));
        headers.insert("X-RateLimit-Remaining", num_to_header_value(0));
        headers.insert(
            "X-RateLimit-Reset",
            num_to_header_value(result.reset_after.as_secs()),
        );
        return response;
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", num_to_header_value(result.limit));
    headers.insert("X-RateLimit-Remaining", num_to_header_value(result.remaining));
    headers.insert(
        "X-RateLimit-Reset",
        num_to_header_value(result.reset_after.as_secs()),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            requests_per_window: limit,
            window_duration: Duration::from_secs(window_secs),
        })
    }

    #[test]
    fn allows_up_to_the_limit() {
        let limiter = limiter(3, 60);
        for _ in 0..3 {
            assert!(limiter.check("user:a").allowed);
        }
        let result = limiter.check("user:a");
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = limiter(1, 60);
        assert!(limiter.check("user:a").allowed);
        assert!(limiter.check("user:b").allowed);
        assert!(!limiter.check("user:a").allowed);
    }

    #[test]
    fn remaining_counts_down() {
        let limiter = limiter(5, 60);
        assert_eq!(limiter.check("ip:1.2.3.4").remaining, 4);
        assert_eq!(limiter.check("ip:1.2.3.4").remaining, 3);
    }

    #[test]
    fn cleanup_keeps_active_windows() {
        let limiter = limiter(5, 60);
        limiter.check("ip:10.0.0.7");
        limiter.cleanup_expired();
        assert_eq!(limiter.check("ip:10.0.0.7").remaining, 3);
    }

    #[test]
    fn cleanup_drops_expired_windows() {
        let limiter = limiter(5, 0);
        limiter.check("ip:10.0.0.8");
        limiter.cleanup_expired();
        assert!(limiter.entries.is_empty());
    }

    #[test]
    fn key_prefers_proxy_headers_then_peer_address() {
        let mut request = Request::new(axum::body::Body::empty());
        assert_eq!(extract_key(&request), "ip:unknown");

        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 50_000))));
        assert_eq!(extract_key(&request), "ip:10.0.0.1");

        request.headers_mut().insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(extract_key(&request), "ip:203.0.113.9");
    }
}
