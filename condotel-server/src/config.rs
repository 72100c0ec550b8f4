//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Payment provider REST API base
    pub payos_api_base: String,
    /// Payment provider client id
    pub payos_client_id: String,
    /// Payment provider API key
    pub payos_api_key: String,
    /// Shared secret for request signing and webhook verification
    pub payos_checksum_key: String,
    /// Public base URL the provider redirects back to after checkout
    pub public_base_url: String,
    /// Frontend page shown after a processed payment (success or failure)
    pub payment_result_url: String,
    /// JWT secret for customer/admin authentication
    pub jwt_secret: String,
    /// SES sender email address
    pub ses_from_email: String,
    /// Days to hold a completed stay before the host payout is released
    pub payout_holdback_days: i64,
    /// Hours between automatic payout sweeps
    pub payout_sweep_hours: u64,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            payos_api_base: std::env::var("PAYOS_API_BASE")
                .unwrap_or_else(|_| "https://api-merchant.payos.vn".into()),
            payos_client_id: Self::require_secret("PAYOS_CLIENT_ID", &environment)?,
            payos_api_key: Self::require_secret("PAYOS_API_KEY", &environment)?,
            payos_checksum_key: Self::require_secret("PAYOS_CHECKSUM_KEY", &environment)?,
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            payment_result_url: std::env::var("PAYMENT_RESULT_URL")
                .unwrap_or_else(|_| "http://localhost:3000/payment/result".into()),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            ses_from_email: std::env::var("SES_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@condotel.example".into()),
            payout_holdback_days: std::env::var("PAYOUT_HOLDBACK_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            payout_sweep_hours: std::env::var("PAYOUT_SWEEP_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            environment,
        })
    }
}
