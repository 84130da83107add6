use subscription_aggregator::config::get_configuration;
use subscription_aggregator::startup::{Application, StartupError};
use subscription_aggregator::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // A missing .env file is fine: variables may come from the real environment
    dotenvy::dotenv().ok();

    let subscriber = get_subscriber(
        String::from("subscription_aggregator"),
        String::from("info"),
    );
    init_subscriber(subscriber);

    let config = get_configuration()?;
    let application = Application::build(config).await?;

    application.run_until_stop().await?;

    Ok(())
}
