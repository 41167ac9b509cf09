/// Deepest search a request may ask for.
pub const MAX_AI_DEPTH: u32 = 6;

/// Server configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server listen port.
    pub port: u16,
    /// Server bind host.
    pub host: String,
    /// Search depth for hints when the request does not name one.
    pub ai_depth: u32,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        AppConfig {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8082),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            ai_depth: std::env::var("CHESS_AI_DEPTH")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .map(|d| d.clamp(1, MAX_AI_DEPTH))
                .unwrap_or(3),
        }
    }

    /// Socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Depth to search with: the requested one clamped to 1..=6, or the default.
    pub fn search_depth(&self, requested: Option<u32>) -> u32 {
        requested
            .map(|d| d.clamp(1, MAX_AI_DEPTH))
            .unwrap_or(self.ai_depth)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: 8082,
            host: "0.0.0.0".to_string(),
            ai_depth: 3,
        }
    }
}
