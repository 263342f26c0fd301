use crate::origin::OriginPolicy;
use crate::rate_limit::RateLimiter;

// app's shared state
pub struct AppState {
    pub client: reqwest::Client,
    pub api_url: String, // upstream base URL
    pub model: String,   // model injected into every upstream request
    pub api_key: Option<String>, // server-side credential, never sent to clients
    pub origins: OriginPolicy,
    pub rate_limiter: RateLimiter,
}
