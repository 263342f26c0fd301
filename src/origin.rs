use axum::http::HeaderValue;

// Allow-list of origin prefixes, read-only after startup
pub struct OriginPolicy {
    allowed: Vec<String>,
    fallback: HeaderValue, // canonical origin echoed when no caller origin validated
}

impl OriginPolicy {
    // Create from comma-separated prefixes; the first entry is the canonical origin
    pub fn new(origins: &str) -> Self {
        let allowed: Vec<String> = origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if allowed.is_empty() {
            panic!("At least one allowed origin required");
        }
        let fallback =
            HeaderValue::from_str(&allowed[0]).expect("canonical origin is not a valid header value");

        Self { allowed, fallback }
    }

    fn matches(&self, value: &str) -> bool {
        // prefix match so origins with paths (referers) still qualify
        self.allowed.iter().any(|prefix| value.starts_with(prefix.as_str()))
    }

    // Origin header wins; Referer is only consulted when Origin is absent
    pub fn is_allowed(&self, origin: Option<&str>, referer: Option<&str>) -> bool {
        match (origin, referer) {
            (Some(origin), _) => self.matches(origin),
            (None, Some(referer)) => self.matches(referer),
            (None, None) => false,
        }
    }

    // Value for Access-Control-Allow-Origin: echo the caller's Origin only
    // when it validates, otherwise the canonical fallback
    pub fn cors_origin(&self, origin: Option<&str>) -> HeaderValue {
        origin
            .filter(|o| self.matches(o))
            .and_then(|o| HeaderValue::from_str(o).ok())
            .unwrap_or_else(|| self.fallback.clone())
    }
}
