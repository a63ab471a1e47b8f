use std::time::Duration;

use mentorhub_ai::gemini::DEFAULT_GEMINI_MODEL;
use mentorhub_core::booking::DEFAULT_PAYMENT_DELAY;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub booking: BookingConfig,
    pub ai: AiConfig,
}

/// Timings of the booking wizard.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Simulated payment round trip.
    pub payment_delay: Duration,
    /// How long a closed wizard lingers before its draft is discarded.
    pub close_reset_delay: Duration,
    /// Drafts untouched for this long are swept.
    pub idle_ttl: Duration,
}

impl BookingConfig {
    /// How often the idle sweeper runs. Never longer than a minute.
    pub fn sweep_interval(&self) -> Duration {
        self.idle_ttl.min(Duration::from_secs(60))
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            payment_delay: DEFAULT_PAYMENT_DELAY,
            close_reset_delay: Duration::from_millis(300),
            idle_ttl: Duration::from_secs(30 * 60),
        }
    }
}

/// Hosted model settings for task review.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// `None` disables the review backend; submissions get failure outcomes.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `3000`                     |
    /// | `CORS_ORIGINS`             | `http://localhost:9002`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                       |
    /// | `BOOKING_PAYMENT_DELAY_MS` | `1500`                     |
    /// | `BOOKING_CLOSE_RESET_MS`   | `300`                      |
    /// | `BOOKING_IDLE_TTL_SECS`    | `1800`                     |
    /// | `GEMINI_API_KEY`           | unset                      |
    /// | `GEMINI_MODEL`             | `gemini-2.5-flash`         |
    /// | `GEMINI_TIMEOUT_SECS`      | `60`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:9002".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let payment_delay_ms: u64 = std::env::var("BOOKING_PAYMENT_DELAY_MS")
            .unwrap_or_else(|_| "1500".into())
            .parse()
            .expect("BOOKING_PAYMENT_DELAY_MS must be a valid u64");

        let close_reset_ms: u64 = std::env::var("BOOKING_CLOSE_RESET_MS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("BOOKING_CLOSE_RESET_MS must be a valid u64");

        let idle_ttl_secs: u64 = std::env::var("BOOKING_IDLE_TTL_SECS")
            .unwrap_or_else(|_| "1800".into())
            .parse()
            .expect("BOOKING_IDLE_TTL_SECS must be a valid u64");

        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into());

        let ai_timeout_secs: u64 = std::env::var("GEMINI_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("GEMINI_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            booking: BookingConfig {
                payment_delay: Duration::from_millis(payment_delay_ms),
                close_reset_delay: Duration::from_millis(close_reset_ms),
                idle_ttl: Duration::from_secs(idle_ttl_secs),
            },
            ai: AiConfig {
                api_key,
                model,
                timeout: Duration::from_secs(ai_timeout_secs),
            },
        }
    }
}
