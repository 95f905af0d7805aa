use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub session_ttl_days: i64,
    pub verification_ttl_hours: i64,
    pub reset_ttl_hours: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Mail API endpoint; when unset, outbound email is logged instead of sent.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from_address: String,
    /// Public base URL embedded in verification and reset links.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    /// Upper bound on submitted code accepted by the review endpoint.
    pub max_code_bytes: usize,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub static_dir: String,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub ai: AiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into());
        let auth = AuthConfig {
            secret: std::env::var("APP_SECRET_KEY")?,
            issuer: std::env::var("TOKEN_ISSUER").unwrap_or_else(|_| "codecoach".into()),
            audience: std::env::var("TOKEN_AUDIENCE").unwrap_or_else(|_| "codecoach-users".into()),
            session_ttl_days: std::env::var("SESSION_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
            verification_ttl_hours: std::env::var("VERIFICATION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
            reset_ttl_hours: std::env::var("RESET_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };
        let mail = MailConfig {
            api_url: std::env::var("MAIL_API_URL").ok(),
            api_key: std::env::var("MAIL_API_KEY").ok(),
            from_address: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@codecoach.dev".into()),
            base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
        };
        let ai = AiConfig {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".into()),
            max_code_bytes: std::env::var("AI_MAX_CODE_BYTES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(64 * 1024),
            request_timeout_secs: std::env::var("AI_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        };
        Ok(Self {
            database_url,
            static_dir,
            auth,
            mail,
            ai,
        })
    }
}
