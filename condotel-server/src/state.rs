//! Application state for condotel-server

use aws_sdk_sesv2::Client as SesClient;
use shared::models::StatusAliases;
use sqlx::PgPool;

use crate::config::Config;
use crate::payos::PayosConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Payment provider credentials and endpoints
    pub payos: PayosConfig,
    /// AWS SES client for sending notification emails
    pub ses: SesClient,
    /// SES sender email address
    pub ses_from_email: String,
    /// Public base URL for provider return/cancel redirects
    pub public_base_url: String,
    /// Frontend page shown after a processed payment
    pub payment_result_url: String,
    /// JWT secret for customer/admin authentication
    pub jwt_secret: String,
    /// Legacy/localized status alias table
    pub status_aliases: StatusAliases,
    /// Days to hold a completed stay before releasing the host payout
    pub payout_holdback_days: i64,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let ses = SesClient::new(&aws_config);

        Ok(Self {
            pool,
            payos: PayosConfig {
                api_base: config.payos_api_base.clone(),
                client_id: config.payos_client_id.clone(),
                api_key: config.payos_api_key.clone(),
                checksum_key: config.payos_checksum_key.clone(),
            },
            ses,
            ses_from_email: config.ses_from_email.clone(),
            public_base_url: config.public_base_url.clone(),
            payment_result_url: config.payment_result_url.clone(),
            jwt_secret: config.jwt_secret.clone(),
            status_aliases: StatusAliases::default_set(),
            payout_holdback_days: config.payout_holdback_days,
        })
    }
}
