/*!
 * # Rate Limiting Module
 *
 * Fixed-window request limiter applied as a tower layer:
 *
 * - Global limits keyed per client IP
 * - Per-user limits once a request carries a valid bearer token
 * - Path-prefix policies (the `/auth` endpoints get a stricter window to slow
 *   down brute-force attempts)
 * - Standard `X-RateLimit-*` headers and a JSON 429 body
 *
 * State lives in-process (`DashMap`); a multi-instance deployment gets
 * per-instance windows.
 */

use axum::http::{header, Response, StatusCode};
use axum::{body::Body, extract::Request};
use dashmap::DashMap;
use metrics::counter;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::warn;

use crate::auth::{AuthService, AuthUser};

/// Convert a number to a HeaderValue. Numeric strings are always valid ASCII
/// header values.
fn num_to_header_value<T: ToString>(n: T) -> http::HeaderValue {
    http::HeaderValue::from_str(&n.to_string())
        .unwrap_or_else(|_| http::HeaderValue::from_static("0"))
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Rate limit exceeded")]
    LimitExceeded,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

impl RateLimitEntry {
    fn new() -> Self {
        Self {
            count: 1,
            window_start: Instant::now(),
        }
    }

    fn increment(&mut self, window_duration: Duration) {
        let now = Instant::now();

        // Reset if window has expired
        if now.duration_since(self.window_start) >= window_duration {
            self.count = 1;
            self.window_start = now;
        } else {
            self.count += 1;
        }
    }

    fn is_allowed(&self, limit: u32, window_duration: Duration) -> bool {
        let now = Instant::now();

        if now.duration_since(self.window_start) >= window_duration {
            return true;
        }

        self.count <= limit
    }

    fn time_until_reset(&self, window_duration: Duration) -> Duration {
        let elapsed = Instant::now().duration_since(self.window_start);
        window_duration.saturating_sub(elapsed)
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_window: u32,
    pub window_duration: Duration,
    pub enable_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 100,
            window_duration: Duration::from_secs(900),
            enable_headers: true,
        }
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    entries: Arc<DashMap<String, RateLimitEntry>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Same shared counters under a different effective policy.
    fn with_config(&self, config: RateLimitConfig) -> Self {
        Self {
            entries: self.entries.clone(),
            config,
        }
    }

    pub fn check_rate_limit(&self, key: &str) -> RateLimitResult {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(RateLimitEntry::new);

        if !entry.is_allowed(
            self.config.requests_per_window,
            self.config.window_duration,
        ) {
            return RateLimitResult {
                allowed: false,
                limit: self.config.requests_per_window,
                remaining: 0,
                reset_time: entry.time_until_reset(self.config.window_duration),
            };
        }

        entry.increment(self.config.window_duration);
        RateLimitResult {
            allowed: true,
            limit: self.config.requests_per_window,
            remaining: self
                .config
                .requests_per_window
                .saturating_sub(entry.count),
            reset_time: entry.time_until_reset(self.config.window_duration),
        }
    }

    /// Drop entries whose window has fully elapsed.
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.entries
            .retain(|_, entry| now.duration_since(entry.window_start) < self.config.window_duration);
    }
}

#[derive(Debug)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: Duration,
}

#[derive(Clone, Debug)]
pub struct PathPolicy {
    pub prefix: String,
    pub requests_per_window: u32,
    pub window_duration: Duration,
}

#[derive(Debug, Error)]
pub enum PolicyParseError {
    #[error("policy entry '{0}' must look like prefix:limit:window_secs")]
    Malformed(String),
}

/// Parse one `prefix:limit:window_secs` entry.
pub fn parse_path_policy(spec: &str) -> Result<PathPolicy, PolicyParseError> {
    let mut parts = spec.rsplitn(3, ':');
    let window = parts.next();
    let limit = parts.next();
    let prefix = parts.next();

    let (Some(prefix), Some(limit), Some(window)) = (prefix, limit, window) else {
        return Err(PolicyParseError::Malformed(spec.to_string()));
    };

    let requests_per_window = limit
        .trim()
        .parse::<u32>()
        .map_err(|_| PolicyParseError::Malformed(spec.to_string()))?;
    let window_secs = window
        .trim()
        .parse::<u64>()
        .map_err(|_| PolicyParseError::Malformed(spec.to_string()))?;

    if prefix.trim().is_empty() || requests_per_window == 0 || window_secs == 0 {
        return Err(PolicyParseError::Malformed(spec.to_string()));
    }

    Ok(PathPolicy {
        prefix: prefix.trim().to_string(),
        requests_per_window,
        window_duration: Duration::from_secs(window_secs),
    })
}

/// Parse a comma-separated policy list, collecting warnings for entries that
/// do not parse instead of failing startup.
pub fn parse_path_policies(policies_str: &str) -> (Vec<PathPolicy>, Vec<String>) {
    let mut policies = Vec::new();
    let mut warnings = Vec::new();

    for spec in policies_str.split(',') {
        let spec = spec.trim();
        if spec.is_empty() {
            continue;
        }
        match parse_path_policy(spec) {
            Ok(policy) => policies.push(policy),
            Err(err) => warnings.push(err.to_string()),
        }
    }

    (policies, warnings)
}

/// Rate limit key for a request: the authenticated user when available,
/// otherwise the client IP.
fn extract_key(request: &Request, auth_service: Option<&Arc<AuthService>>) -> String {
    if let Some(auth_user) = request.extensions().get::<AuthUser>() {
        return format!("user:{}", auth_user.user_id);
    }

    if let Some(service) = auth_service {
        if let Some(raw) = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(token) = raw.strip_prefix("Bearer ").map(str::trim) {
                if let Ok(claims) = service.validate_token(token) {
                    return format!("user:{}", claims.sub);
                }
            }
        }
    }

    extract_ip_key(request)
}

fn extract_ip_key(request: &Request) -> String {
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

    "ip:unknown".to_string()
}

// Layer implementation for tower
#[derive(Clone)]
pub struct RateLimitLayer {
    rate_limiter: RateLimiter,
    path_policies: Arc<Vec<PathPolicy>>,
    auth_service: Option<Arc<AuthService>>,
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            rate_limiter: RateLimiter::new(config),
            path_policies: Arc::new(Vec::new()),
            auth_service: None,
        }
    }

    pub fn with_policies(mut self, policies: Vec<PathPolicy>) -> Self {
        self.path_policies = Arc::new(policies);
        self
    }

    pub fn with_auth_service(mut self, auth_service: Arc<AuthService>) -> Self {
        self.auth_service = Some(auth_service);
        self
    }
}

impl<S> tower::Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            rate_limiter: self.rate_limiter.clone(),
            path_policies: self.path_policies.clone(),
            auth_service: self.auth_service.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    rate_limiter: RateLimiter,
    path_policies: Arc<Vec<PathPolicy>>,
    auth_service: Option<Arc<AuthService>>,
}

impl<S> tower::Service<Request> for RateLimitService<S>
where
    S: tower::Service<Request, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let rate_limiter = self.rate_limiter.clone();
        let mut inner = self.inner.clone();
        let policies = self.path_policies.clone();
        let auth_service = self.auth_service.clone();

        Box::pin(async move {
            // Health and docs endpoints must stay reachable
            let path = request.uri().path().to_string();
            if path == "/" || path.starts_with("/health") || path.starts_with("/docs") {
                return inner.call(request).await;
            }

            let key = extract_key(&request, auth_service.as_ref());

            // Path policies override the global window
            let mut effective = rate_limiter.config.clone();
            for policy in policies.iter() {
                if path.starts_with(&policy.prefix) {
                    effective.requests_per_window = policy.requests_per_window;
                    effective.window_duration = policy.window_duration;
                    break;
                }
            }

            let limiter = rate_limiter.with_config(effective);
            let result = limiter.check_rate_limit(&key);

            if !result.allowed {
                warn!("Rate limit exceeded for key: {}", key);
                let key_type = if key.starts_with("user:") { "user" } else { "ip" };
                counter!(
                    "rate_limit_denied_total",
                    1,
                    "key_type" => key_type.to_string(),
                );

                let body = serde_json::json!({
                    "status": "error",
                    "message": "Too many requests from this IP, please try again later.",
                    "retryAfter": result.reset_time.as_secs(),
                });
                let mut response = Response::new(Body::from(body.to_string()));
                *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    http::HeaderValue::from_static("application/json"),
                );

                if limiter.config.enable_headers {
                    let headers = response.headers_mut();
                    headers.insert("X-RateLimit-Limit", num_to_header_value(result.limit));
                    headers.insert("X-RateLimit-Remaining", num_to_header_value(0));
                    headers.insert(
                        "X-RateLimit-Reset",
                        num_to_header_value(result.reset_time.as_secs()),
                    );
                }

                return Ok(response);
            }

            let mut response = inner.call(request).await?;

            if limiter.config.enable_headers {
                let headers = response.headers_mut();
                headers.insert("X-RateLimit-Limit", num_to_header_value(result.limit));
                headers.insert(
                    "X-RateLimit-Remaining",
                    num_to_header_value(result.remaining),
                );
                headers.insert(
                    "X-RateLimit-Reset",
                    num_to_header_value(result.reset_time.as_secs()),
                );
            }

            Ok(response)
        })
    }
}
