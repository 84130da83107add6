use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use config::ConfigError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{DatabaseSettings, Settings};
use crate::routes::{
    handle_create_subscription, handle_delete_subscription, handle_get_subscription,
    handle_get_total_cost, handle_list_subscriptions, handle_update_subscription, health_check,
    json_error_handler, ApiDoc, OPENAPI_JSON_PATH,
};
use crate::service::SubscriptionService;
use crate::store::{PostgresSubscriptionStore, SubscriptionStore};

#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to run database migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Failed to start the HTTP server: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Application {
    pub port: u16,
    pub server: Server,
    db_pool: Option<PgPool>,
}

impl Application {
    /// Wires the Postgres store, the operations layer and the HTTP server.
    pub async fn build(config: Settings) -> Result<Self, StartupError> {
        let db_pool = get_connection_db_pool(&config.database)?;

        if config.database.migrate_on_startup {
            sqlx::migrate!("./migrations").run(&db_pool).await?;
            tracing::info!("Database migrations applied");
        }

        let store = Arc::new(PostgresSubscriptionStore::new(db_pool.clone()));
        let mut application = Self::build_with_store(config, store)?;
        application.db_pool = Some(db_pool);

        Ok(application)
    }

    pub fn build_with_store(
        config: Settings,
        store: Arc<dyn SubscriptionStore>,
    ) -> Result<Self, StartupError> {
        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();
        let service = SubscriptionService::new(store, Some(config.get_request_timeout()));
        let server = run(
            listener,
            service,
            config.get_request_timeout(),
            config.get_idle_timeout(),
        )?;

        tracing::info!("Server listening on {}:{}", config.application.host, port);

        Ok(Self {
            port,
            server,
            db_pool: None,
        })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    /// Resolves once the server has stopped (SIGINT/SIGTERM trigger a graceful
    /// shutdown), then releases the database pool.
    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        let result = self.server.await;

        if let Some(db_pool) = self.db_pool {
            db_pool.close().await;
        }

        tracing::info!("Server exited");

        result
    }
}

pub fn run(
    listener: TcpListener,
    service: SubscriptionService,
    request_timeout: Duration,
    idle_timeout: Duration,
) -> Result<Server, std::io::Error> {
    let service = web::Data::new(service);
    let openapi = ApiDoc::openapi();

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/health_check", web::get().to(health_check))
            .route("/subscriptions", web::post().to(handle_create_subscription))
            .route("/subscriptions", web::get().to(handle_list_subscriptions))
            // Must be registered before "/subscriptions/{id}"
            .route("/subscriptions/total", web::get().to(handle_get_total_cost))
            .route("/subscriptions/{id}", web::get().to(handle_get_subscription))
            .route("/subscriptions/{id}", web::put().to(handle_update_subscription))
            .route(
                "/subscriptions/{id}",
                web::delete().to(handle_delete_subscription),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url(OPENAPI_JSON_PATH, openapi.clone()),
            )
            .app_data(service.clone())
    })
    .keep_alive(idle_timeout)
    .client_request_timeout(request_timeout)
    .client_disconnect_timeout(request_timeout)
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> Result<PgPool, ConfigError> {
    Ok(PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .max_connections(config.max_connections)
        .idle_timeout(config.get_idle_timeout())
        .connect_lazy_with(config.get_db_options()?))
}
