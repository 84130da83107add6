use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, File};
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::{
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions,
};

#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub http_server: HttpServerSettings,
    pub database: DatabaseSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

/// Timeouts are expressed in seconds.
#[derive(serde::Deserialize, Clone)]
pub struct HttpServerSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub idle_timeout: u64,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    // secrecy protects secret information and prevents them to be exposed (eg: via logs)
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub name: String,
    pub ssl_mode: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_connections: u32,
    /// Seconds an idle connection is kept in the pool before being closed.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub idle_timeout: u64,
    pub migrate_on_startup: bool,
}

impl Settings {
    pub fn get_address(&self) -> String {
        format!(
            "{}:{}",
            self.application.get_host(),
            self.application.get_port()
        )
    }

    pub fn get_db_options(&self) -> Result<PgConnectOptions, ConfigError> {
        self.database.get_db_options()
    }

    pub fn get_request_timeout(&self) -> Duration {
        Duration::from_secs(self.http_server.timeout)
    }

    pub fn get_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.http_server.idle_timeout)
    }

    pub fn set_db_name(&mut self, db_name: String) {
        self.database.set_name(db_name)
    }

    pub fn set_app_port(&mut self, port: u16) {
        self.application.port = port;
    }
}

impl DatabaseSettings {
    pub fn get_db_options(&self) -> Result<PgConnectOptions, ConfigError> {
        let ssl_mode: PgSslMode = self.ssl_mode.parse().map_err(|_| {
            ConfigError::Message(format!("{} is not a supported ssl mode", self.ssl_mode))
        })?;

        let mut db_options = self
            .get_db_options_without_name(ssl_mode)
            .database(&self.name);

        db_options.log_statements(log::LevelFilter::Trace);

        Ok(db_options)
    }

    /// Options for the server-level connection used to create databases.
    pub fn get_server_options(&self) -> Result<PgConnectOptions, ConfigError> {
        let ssl_mode: PgSslMode = self.ssl_mode.parse().map_err(|_| {
            ConfigError::Message(format!("{} is not a supported ssl mode", self.ssl_mode))
        })?;

        Ok(self.get_db_options_without_name(ssl_mode))
    }

    fn get_db_options_without_name(&self, ssl_mode: PgSslMode) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .password(self.password.expose_secret())
            .username(&self.username)
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn get_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout)
    }

    pub fn set_name(&mut self, new_db_name: String) {
        self.name = new_db_name
    }
}

impl ApplicationSettings {
    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_host(&self) -> String {
        self.host.clone()
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

/// Loads settings from `CONFIG_PATH` when it is set, otherwise from
/// `config/base.yaml` merged with `config/<APP_ENVIRONMENT>.yaml`.
/// `APP_`-prefixed environment variables override both.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let builder = match std::env::var("CONFIG_PATH") {
        Ok(config_path) if !config_path.is_empty() => {
            tracing::info!("Loading configuration from {}", config_path);

            Config::builder().add_source(File::from(PathBuf::from(config_path)).required(true))
        }
        _ => {
            let root_path = std::env::current_dir().map_err(|err| {
                ConfigError::Message(format!("Failed to determine the current directory: {}", err))
            })?;
            let config_directory = root_path.join("config");
            // Uses development environment by default
            let environment: Environment = std::env::var("APP_ENVIRONMENT")
                .unwrap_or_else(|_| "development".into())
                .try_into()
                .map_err(ConfigError::Message)?;

            tracing::info!("Application environment = {:?}", environment);

            // It merges the base configuration file with the one from the specific environment (development or production)
            Config::builder()
                .add_source(File::from(config_directory.join("base")).required(true))
                .add_source(File::from(config_directory.join(environment.as_str())).required(true))
        }
    };

    let settings = builder
        // Merge settings from environment variables with a prefix of APP and "__" separator
        // E.g APP_DATABASE__PORT would set Settings.database.port
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?;

    // Try to convert the value from the configuration file into a Settings type
    settings.try_deserialize()
}
