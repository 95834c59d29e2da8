use dotenv::dotenv;
use iced::{Application, Settings};
use log::info;

use documate::app::{App, Flags};
use documate::Config;

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    info!("Using document service at {}", config.api_base_url);

    let flags = Flags::from_config(&config)?;
    App::run(Settings::with_flags(flags))?;
    Ok(())
}
