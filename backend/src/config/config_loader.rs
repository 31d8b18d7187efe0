use anyhow::{Context, Result};

use super::config_model::{BackendServer, Database, DotEnvyConfig, Stripe, Supabase};

const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_STRIPE_CURRENCY: &str = "eur";
const DEFAULT_STRIPE_CONNECT_COUNTRY: &str = "FR";

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?
            .parse()
            .context("SERVER_PORT_BACKEND must be a port number")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT must be a number of MiB")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT must be a number of seconds")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: match optional("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive number")?,
            None => DEFAULT_DATABASE_MAX_CONNECTIONS,
        },
    };

    let supabase = Supabase {
        jwt_secret: required("SUPABASE_JWT_SECRET")?,
    };

    let stripe = Stripe {
        secret_key: required("STRIPE_SECRET_KEY")?,
        webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
        currency: optional("STRIPE_CURRENCY")
            .map(|currency| currency.to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_STRIPE_CURRENCY.to_string()),
        connect_country: optional("STRIPE_CONNECT_COUNTRY")
            .map(|country| country.to_ascii_uppercase())
            .unwrap_or_else(|| DEFAULT_STRIPE_CONNECT_COUNTRY.to_string()),
    };

    let app_url = required("APP_URL")?.trim_end_matches('/').to_string();

    Ok(DotEnvyConfig {
        backend_server,
        database,
        supabase,
        stripe,
        app_url,
    })
}

pub fn get_supabase_jwt_secret() -> Result<String> {
    dotenvy::dotenv().ok();

    required("SUPABASE_JWT_SECRET")
}
