//! Client address and user agent.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, header};

use crate::state::AppState;

/// Where a request came from.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Resolve the client IP.
///
/// `X-Forwarded-For` is honoured only when the server sits behind a trusted
/// proxy, and then only its last entry: that is the address the proxy itself
/// appended. Earlier entries come from the client. Without trust the socket
/// peer address is used.
pub fn client_ip(
    headers: &HeaderMap,
    extensions: &Extensions,
    trust_forwarded_for: bool,
) -> Option<String> {
    if trust_forwarded_for {
        let forwarded = headers
            .get_all("x-forwarded-for")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .last();
        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

impl FromRequestParts<AppState> for ClientInfo {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip = client_ip(
            &parts.headers,
            &parts.extensions,
            state.config.server.trust_forwarded_for,
        );
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(Self { ip, user_agent })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_forwarded_for_requires_trust() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 2], 4000))));

        assert_eq!(
            client_ip(&headers, &extensions, true).as_deref(),
            Some("10.0.0.1")
        );
        assert_eq!(
            client_ip(&headers, &extensions, false).as_deref(),
            Some("10.0.0.2")
        );
        assert_eq!(client_ip(&headers, &Extensions::new(), false), None);
    }

    #[test]
    fn test_forwarded_for_ignores_client_supplied_entries() {
        let extensions = Extensions::new();
        let resolved: Vec<Option<String>> = ["1.1.1.1", "2.2.2.2", "3.3.3.3"]
            .into_iter()
            .map(|spoof| {
                let mut headers = HeaderMap::new();
                let value = format!("{spoof}, 198.51.100.7");
                headers.insert("x-forwarded-for", HeaderValue::from_str(&value).unwrap());
                client_ip(&headers, &extensions, true)
            })
            .collect();

        assert!(resolved.iter().all(|ip| ip.as_deref() == Some("198.51.100.7")));
    }

    #[test]
    fn test_forwarded_for_across_repeated_headers() {
        let mut headers = HeaderMap::new();
        headers.append("x-forwarded-for", HeaderValue::from_static("6.6.6.6"));
        headers.append("x-forwarded-for", HeaderValue::from_static("198.51.100.7"));

        assert_eq!(
            client_ip(&headers, &Extensions::new(), true).as_deref(),
            Some("198.51.100.7")
        );
    }
}
