use registration_intake::configuration::get_configuration;
use registration_intake::startup::Application;
use registration_intake::telemetry::{default_filter_level, get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    //Panic if we can't read configuration
    let configuration = get_configuration().expect("Failed to read configuration.");

    let subscriber = get_subscriber(
        "registration_intake".into(),
        default_filter_level(configuration.application.debug),
        std::io::stdout,
    );
    init_subscriber(subscriber);

    let application = Application::build(configuration).await?;
    tracing::info!(port = application.port(), "Serving the registration form");
    application.run_until_stopped().await?;
    Ok(())
}
