use chat_proxy::config::Args;
use chat_proxy::origin::OriginPolicy;
use chat_proxy::rate_limit::RateLimiter;
use chat_proxy::state::AppState;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // parse cli arguments
    let args = Args::parse();

    // credential comes from the environment only, never argv
    let api_key = std::env::var("API_KEY").ok().filter(|key| !key.is_empty());
    if api_key.is_none() {
        eprintln!("Warning: API_KEY is not set, chat requests will be rejected");
    }

    // creating shared state
    let state = Arc::new(AppState {
        client: reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10)) // bounded connect, unbounded stream read
            .build()
            .unwrap(),
        api_url: args.api_url.clone(),
        model: args.model.clone(),
        api_key,
        origins: OriginPolicy::new(&args.allowed_origins),
        rate_limiter: RateLimiter::new(args.rate_limit, Duration::from_secs(args.rate_window)),
    });

    let app = chat_proxy::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    println!("Proxy running on http://localhost:{}", args.port);
    println!("Forwarding to {}", args.api_url);
    println!("Model: {}", args.model);
    println!(
        "Rate limit: {} requests per {} seconds",
        args.rate_limit, args.rate_window
    );
    println!("Allowed origins: {}", args.allowed_origins);

    axum::serve(listener, app).await.unwrap();
}
