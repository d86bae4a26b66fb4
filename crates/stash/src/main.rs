use std::sync::Arc;

use stash_core::{config::Config, logging::Logger};

#[tokio::main]
async fn main() -> Result<(), stash_core::Error> {
    stash_core::logging::init()?;
    stash_core::logging::install_panic_hook();

    let log = Arc::new(Logger::default());

    // A bad environment is the only fatal error; nothing has started yet.
    let cfg = Arc::new(Config::load().inspect_err(|e| log.error(e))?);

    stash_telegram::router::run_webhook(cfg, log)
        .await
        .map_err(|e| stash_core::Error::Platform(format!("telegram bot failed: {e}")))?;

    Ok(())
}
