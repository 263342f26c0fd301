use clap::Parser;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "chat-proxy")]
#[command(about = "Secure key-holding proxy for chat completion APIs")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8787)]
    pub port: u16,

    // Upstream chat completion API base URL
    #[arg(long, default_value = "https://integrate.api.nvidia.com/v1")]
    pub api_url: String,

    // Model identifier injected into every upstream request
    #[arg(long, default_value = "nvidia/llama-3.3-nemotron-super-49b-v1.5")]
    pub model: String,

    // Allowed origin prefixes (comma-separated)
    // The first entry is the canonical origin echoed when no caller origin validated
    #[arg(
        long,
        default_value = "https://systemprompt.me,https://www.systemprompt.me,http://localhost:8080,http://localhost:3000,http://127.0.0.1:8080,http://127.0.0.1:3000"
    )]
    pub allowed_origins: String,

    // Rate limit max requests per window
    #[arg(long, default_value_t = 10)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,
}
