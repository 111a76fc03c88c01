use anyhow::Context;
use integrai::{
    config::initialize_config, logging::init_logger, transport::HttpChatTransport, ui::run_ui,
    App,
};
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = initialize_config().context("Failed to load configuration")?;
    let _logger = init_logger(&config).context("Failed to start logging")?;
    info!("Using chat backend {} with model {}", config.api_url, config.model);

    let transport = Arc::new(HttpChatTransport::from_config(&config));
    let app = App::new(&config, transport);
    run_ui(app).await
}
