use std::{net::SocketAddr, sync::Arc};

use reqwest::Url;
use teloxide::{
    dispatching::Dispatcher, dptree, error_handlers::LoggingErrorHandler, prelude::*,
    update_listeners::webhooks,
};
use tower_http::services::ServeDir;

use stash_core::{
    actions::ActionRouter,
    archive::ArchiveService,
    config::Config,
    download::{DownloadPipeline, HttpFetcher},
    filename::random_token,
    logging::Logger,
    messaging::port::MessagingPort,
};

use crate::{handlers, TelegramFileSource, TelegramMessenger};

/// Path prefix under which stored files are served.
pub const FILES_ROUTE: &str = "/files";

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub log: Arc<Logger>,
    pub messenger: Arc<dyn MessagingPort>,
    pub archive: Arc<ArchiveService>,
    pub actions: Arc<ActionRouter>,
}

impl AppState {
    pub fn new(cfg: Arc<Config>, log: Arc<Logger>, bot: Bot) -> Self {
        let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
        let pipeline = DownloadPipeline::new(
            Arc::new(TelegramFileSource::new(bot)),
            Arc::new(HttpFetcher::default()),
            cfg.save_path.clone(),
        );

        Self {
            archive: Arc::new(ArchiveService::new(
                cfg.clone(),
                pipeline,
                messenger.clone(),
                log.clone(),
            )),
            actions: Arc::new(ActionRouter::new(
                cfg.save_path.clone(),
                messenger.clone(),
                log.clone(),
            )),
            cfg,
            log,
            messenger,
        }
    }
}

/// Unguessable webhook path, regenerated on every start.
pub fn webhook_path() -> String {
    format!("/webhook{}", random_token())
}

pub fn webhook_url(domain: &str, path: &str) -> anyhow::Result<Url> {
    Ok(format!("{domain}{path}").parse::<Url>()?)
}

/// Register the webhook, serve it next to `/files`, and dispatch updates
/// until ctrl-c.
pub async fn run_webhook(cfg: Arc<Config>, log: Arc<Logger>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        log.info(format!("stash started: @{}", me.username()));
    }
    log.info(format!("Saving files to {}", cfg.save_path.display()));
    log.info(format!("Enabled chats: {}", cfg.enable_groups.len()));

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let url = webhook_url(&cfg.domain, &webhook_path())?;
    log.debug(format!("webhook url: {url}"));

    let (listener, stop_flag, webhook_app) =
        webhooks::axum_to_router(bot.clone(), webhooks::Options::new(addr, url)).await?;

    let app = webhook_app.nest_service(FILES_ROUTE, ServeDir::new(&cfg.save_path));
    let server = axum::Server::try_bind(&addr)?.serve(app.into_make_service());
    log.info(format!("Listening on {}", server.local_addr()));

    let server_log = log.clone();
    tokio::spawn(async move {
        if let Err(e) = server.with_graceful_shutdown(stop_flag).await {
            server_log.error(format!("http server failed: {e}"));
        }
    });

    let state = Arc::new(AppState::new(cfg, log.clone(), bot.clone()));

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|_| async {})
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log.info("stash stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use stash_core::callback::is_stored_name;

    use super::*;

    #[test]
    fn webhook_path_has_nine_hex_digits() {
        let path = webhook_path();
        let token = path.strip_prefix("/webhook").unwrap();
        assert_eq!(token.len(), 9);
        assert!(is_stored_name(&format!("{token}.x")));
    }

    #[test]
    fn webhook_url_joins_domain_and_path() {
        let url = webhook_url("https://stash.example.com", "/webhook1a2b3c4d5").unwrap();
        assert_eq!(url.as_str(), "https://stash.example.com/webhook1a2b3c4d5");
        assert_eq!(url.path(), "/webhook1a2b3c4d5");
        assert!(webhook_url("not a url", "/webhook1").is_err());
    }
}
