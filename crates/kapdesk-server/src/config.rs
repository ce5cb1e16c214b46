//! Server configuration from environment variables.

use kapdesk_core::status::TransitionPolicy;
use kapdesk_db::DbConfig;

/// Runtime configuration, read once at startup. Every variable has a
/// local-development default.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db: DbConfig,
    /// Listen address (`KAPDESK_LISTEN_ADDR`, default `127.0.0.1:3000`).
    pub listen_addr: String,
    /// Status transition enforcement (`KAPDESK_STRICT_TRANSITIONS`).
    pub transition_policy: TransitionPolicy,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let db_defaults = DbConfig::default();
        let db = DbConfig {
            url: env_or("KAPDESK_DB_URL", &db_defaults.url),
            namespace: env_or("KAPDESK_DB_NS", &db_defaults.namespace),
            database: env_or("KAPDESK_DB_NAME", &db_defaults.database),
            username: env_or("KAPDESK_DB_USER", &db_defaults.username),
            password: env_or("KAPDESK_DB_PASS", &db_defaults.password),
        };

        let transition_policy = match env_or("KAPDESK_STRICT_TRANSITIONS", "false").as_str() {
            "1" | "true" => TransitionPolicy::Strict,
            _ => TransitionPolicy::Permissive,
        };

        Self {
            db,
            listen_addr: env_or("KAPDESK_LISTEN_ADDR", "127.0.0.1:3000"),
            transition_policy,
        }
    }
}
