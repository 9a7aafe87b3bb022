use axum::http::{header, HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

const NOSNIFF: &str = "nosniff";
const DENY: &str = "DENY";
const XSS_BLOCK: &str = "1; mode=block";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
const CSP_API_VALUE: &str = "default-src 'none'; frame-ancestors 'none'";
const REFERRER_POLICY_VALUE: &str = "strict-origin-when-cross-origin";
const PERMISSIONS_POLICY_VALUE: &str = "geolocation=(), microphone=(), camera=()";

/// Response header layers for the API. HSTS is only sent in production,
/// where the service sits behind HTTPS.
pub fn create_security_headers(include_hsts: bool) -> Vec<SetResponseHeaderLayer<HeaderValue>> {
    let mut headers = vec![
        (header::X_CONTENT_TYPE_OPTIONS, NOSNIFF),
        (header::X_FRAME_OPTIONS, DENY),
        (header::X_XSS_PROTECTION, XSS_BLOCK),
        (header::CONTENT_SECURITY_POLICY, CSP_API_VALUE),
        (header::REFERRER_POLICY, REFERRER_POLICY_VALUE),
        (PERMISSIONS_POLICY, PERMISSIONS_POLICY_VALUE),
    ];

    if include_hsts {
        tracing::info!("Security: HSTS header enabled (production mode)");
        headers.push((header::STRICT_TRANSPORT_SECURITY, HSTS_VALUE));
    } else {
        tracing::info!("Security: HSTS header disabled (development mode)");
    }

    headers
        .into_iter()
        .map(|(name, value)| {
            SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsts_only_in_production() {
        assert_eq!(create_security_headers(false).len(), 6);
        assert_eq!(create_security_headers(true).len(), 7);
    }
}
