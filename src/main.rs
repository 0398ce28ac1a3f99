use campaign_mirror::config::get_configuration;
use campaign_mirror::startup::Application;
use campaign_mirror::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber(String::from("campaign_mirror"), String::from("info"));

    init_subscriber(subscriber);

    let config = get_configuration().expect("Missing configuration file.");
    let application = Application::build(config.clone()).await?;

    tracing::info!(
        "Server listening on {}:{}",
        config.application.get_host(),
        application.get_port()
    );

    application.run_until_stop().await
}
