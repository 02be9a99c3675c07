use axum::{
    body::Body,
    http::{header, HeaderValue, Request, Response},
    middleware::Next,
};

/// HTTP caching directives applied to successful image responses.
///
/// Builds plain `Cache-Control` directives rather than anything
/// CDN-specific, since the core doesn't assume any particular edge network
/// in front of it — requests are addressed by their full
/// region/size/rotation/quality/format tuple, which is already a natural
/// cache buster.
#[derive(Clone, Debug)]
pub struct ResponseCacheConfig {
    pub max_age: u32,
    pub public: bool,
    pub immutable: bool,
}

impl Default for ResponseCacheConfig {
    fn default() -> Self {
        Self { max_age: 31_536_000, public: true, immutable: true }
    }
}

impl ResponseCacheConfig {
    pub fn cache_control_value(&self) -> String {
        let mut parts = vec![if self.public { "public" } else { "private" }.to_string()];
        parts.push(format!("max-age={}", self.max_age));
        if self.immutable {
            parts.push("immutable".to_string());
        }
        parts.join(", ")
    }
}

pub async fn cache_control_middleware(req: Request<Body>, next: Next) -> Response<Body> {
    let mut response = next.run(req).await;

    if response.status().is_success() {
        let config = ResponseCacheConfig::default();
        if let Ok(value) = HeaderValue::from_str(&config.cache_control_value()) {
            response.headers_mut().insert(header::CACHE_CONTROL, value);
        }
        response
            .headers_mut()
            .insert(header::VARY, HeaderValue::from_static("Accept-Encoding"));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_public_immutable_year_long() {
        let value = ResponseCacheConfig::default().cache_control_value();
        assert!(value.contains("public"));
        assert!(value.contains("max-age=31536000"));
        assert!(value.contains("immutable"));
    }

    #[test]
    fn private_non_immutable_omits_those_directives() {
        let config = ResponseCacheConfig { max_age: 60, public: false, immutable: false };
        let value = config.cache_control_value();
        assert_eq!(value, "private, max-age=60");
    }
}
