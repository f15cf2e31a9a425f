use crate::error::{
    BadEnvVarSnafu, InvalidOriginSnafu, ParseNumberSnafu, RosterError, RosterResult,
    UnknownStoreBackendSnafu,
};
use axum::http::{HeaderValue, Method, header};
use dotenvy::var;
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use std::{env::VarError, sync::Arc};
use tower_http::cors::{Any, CorsLayer};

pub const DEFAULT_SERVER_IP: &str = "127.0.0.1:8000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 15;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    store_config: StoreConfig,
    server_config: Arc<ServerConfig>,
}

#[derive(Clone, Debug)]
pub enum StoreConfig {
    Postgres(Arc<DbConfig>),
    Memory,
}

#[derive(Debug)]
pub struct DbConfig {
    url: SecretString,
    max_connections: u32,
}

#[derive(Debug)]
pub struct ServerConfig {
    bind_address: String,
    ///`None` allows any origin
    allowed_origins: Option<Vec<HeaderValue>>,
}

///wraps whatever we read variables from - the process env outside of tests
struct Env<F>(F);

impl<F: Fn(&'static str) -> Result<String, dotenvy::Error>> Env<F> {
    fn required(&self, name: &'static str) -> RosterResult<String> {
        (self.0)(name).context(BadEnvVarSnafu { name })
    }

    fn optional(&self, name: &'static str) -> RosterResult<Option<String>> {
        match (self.0)(name) {
            Ok(value) => Ok(Some(value)),
            Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
            Err(source) => Err(RosterError::BadEnvVar { source, name }),
        }
    }
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        Self::from_lookup(|name| var(name))
    }

    pub fn from_lookup(
        lookup: impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> RosterResult<Self> {
        let env = Env(lookup);

        let store_config = match env.optional("ROSTER_STORE")?.as_deref() {
            None | Some("postgres") => StoreConfig::Postgres(Arc::new(DbConfig::from_env(&env)?)),
            Some("memory") => StoreConfig::Memory,
            Some(found) => return UnknownStoreBackendSnafu { found }.fail(),
        };

        Ok(Self {
            store_config,
            server_config: Arc::new(ServerConfig::from_env(&env)?),
        })
    }

    pub const fn store_config(&self) -> &StoreConfig {
        &self.store_config
    }

    pub fn server_config(&self) -> Arc<ServerConfig> {
        self.server_config.clone()
    }
}

impl DbConfig {
    pub const fn new(url: SecretString, max_connections: u32) -> Self {
        Self {
            url,
            max_connections,
        }
    }

    fn from_env<F: Fn(&'static str) -> Result<String, dotenvy::Error>>(
        env: &Env<F>,
    ) -> RosterResult<Self> {
        let url = match env.optional("DATABASE_URL")? {
            Some(url) => SecretString::from(url),
            None => {
                let password = SecretString::from(env.required("DB_PASSWORD")?);
                let port: u16 = env
                    .required("DB_PORT")?
                    .parse()
                    .context(ParseNumberSnafu { name: "DB_PORT" })?;

                SecretString::from(format!(
                    "postgres://{}:{}@{}:{}/{}",
                    env.required("DB_USER")?,
                    password.expose_secret(),
                    env.required("DB_PATH")?,
                    port,
                    env.required("DB_NAME")?,
                ))
            }
        };

        let max_connections = match env.optional("ROSTER_MAX_CONNECTIONS")? {
            Some(raw) => raw.parse().context(ParseNumberSnafu {
                name: "ROSTER_MAX_CONNECTIONS",
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self::new(url, max_connections))
    }

    pub const fn url(&self) -> &SecretString {
        &self.url
    }

    pub const fn max_connections(&self) -> u32 {
        self.max_connections
    }
}

impl ServerConfig {
    fn from_env<F: Fn(&'static str) -> Result<String, dotenvy::Error>>(
        env: &Env<F>,
    ) -> RosterResult<Self> {
        let bind_address = env
            .optional("ROSTER_SERVER_IP")?
            .unwrap_or_else(|| DEFAULT_SERVER_IP.to_string());

        let allowed_origins = env
            .optional("ROSTER_ALLOWED_ORIGINS")?
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(|origin| {
                        HeaderValue::from_str(origin).context(InvalidOriginSnafu { origin })
                    })
                    .collect::<RosterResult<Vec<_>>>()
            })
            .transpose()?;

        Ok(Self {
            bind_address,
            allowed_origins,
        })
    }

    pub fn bind_address(&self) -> &str {
        &self.bind_address
    }

    pub fn cors_layer(&self) -> CorsLayer {
        match &self.allowed_origins {
            Some(origins) => CorsLayer::new()
                .allow_origin(origins.clone())
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
            None => CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        }
    }
}
