//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Login and registration submissions are limited per client IP.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor for the client IP.
///
/// Keys on the socket peer unless `trust_proxy_headers` is set, in which case
/// `X-Forwarded-For` and then `X-Real-IP` win over the peer. Those headers are
/// client controlled unless a reverse proxy overwrites them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy_headers: bool,
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        client_ip(req, self.trust_proxy_headers).ok_or(GovernorError::UnableToExtractKey)
    }
}

fn client_ip<T>(req: &Request<T>, trust_proxy_headers: bool) -> Option<IpAddr> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    if !trust_proxy_headers {
        return peer;
    }

    let headers = req.headers();

    // First IP in the X-Forwarded-For chain
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };

    forwarded.or_else(real_ip).or(peer)
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// See [`ClientIpKeyExtractor`] for how `trust_proxy_headers` picks the IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor {
            trust_proxy_headers,
        })
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tower_governor::key_extractor::KeyExtractor;

    fn from_peer(req: &mut Request<()>, peer: [u8; 4]) {
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((peer, 4000))));
    }

    #[test]
    fn test_spoofed_forwarded_for_keys_on_peer() {
        let mut req = Request::builder()
            .header("x-forwarded-for", "198.51.100.77")
            .header("x-real-ip", "198.51.100.78")
            .body(())
            .unwrap();
        from_peer(&mut req, [203, 0, 113, 9]);

        let extractor = ClientIpKeyExtractor::default();
        assert_eq!(
            extractor.extract(&req).unwrap(),
            "203.0.113.9".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_rotating_forwarded_for_shares_one_key() {
        let keys: Vec<IpAddr> = (1..=3u8)
            .map(|n| {
                let mut req = Request::builder()
                    .header("x-forwarded-for", format!("198.51.100.{n}"))
                    .body(())
                    .unwrap();
                from_peer(&mut req, [203, 0, 113, 9]);
                client_ip(&req, false).unwrap()
            })
            .collect();
        assert!(keys.iter().all(|k| Some(k) == keys.first()));
    }

    #[test]
    fn test_trusted_forwarded_for_first_hop() {
        let mut req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "198.51.100.2")
            .body(())
            .unwrap();
        from_peer(&mut req, [10, 0, 0, 1]);
        assert_eq!(client_ip(&req, true), Some("203.0.113.7".parse().unwrap()));
    }

    #[test]
    fn test_trusted_real_ip_then_peer() {
        let req = Request::builder()
            .header("x-real-ip", "198.51.100.2")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&req, true), Some("198.51.100.2".parse().unwrap()));

        let mut req = Request::builder().body(()).unwrap();
        from_peer(&mut req, [127, 0, 0, 1]);
        assert_eq!(client_ip(&req, true), Some("127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_no_source() {
        let req = Request::builder()
            .header("x-forwarded-for", "198.51.100.77")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&req, false), None);
        assert!(ClientIpKeyExtractor::default().extract(&req).is_err());
    }
}
