use chrono::Local;
use color_eyre::eyre::{eyre, Result, WrapErr};
use crossterm::event::{self, Event};
use mindlog::app::App;
use mindlog::tasks::TaskContext;
use mindlog::ui::UI;
use mindlog::{Config, CredentialProvider, DiaryService, StaticToken, TokenStore};
use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.data_dir)
        .wrap_err_with(|| format!("creating {}", config.data_dir.display()))?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter)?)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!("Failed to install logger: {}", e))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::load()?;
    init_tracing(&config)?;
    info!(base_url = %config.base_url, "starting mindlog");

    let store = Arc::new(TokenStore::open(config.storage_path())?);

    let mut args = std::env::args().skip(1);
    if let Some(command) = args.next() {
        match command.as_str() {
            "login" => {
                let token = args.next().ok_or_else(|| eyre!("usage: mindlog login <token>"))?;
                store.store_token(token.trim())?;
                println!("Token saved to {}", store.path().display());
            }
            "logout" => {
                store.clear_token()?;
                println!("Token removed from {}", store.path().display());
            }
            other => return Err(eyre!("unknown command {other:?}; expected login or logout")),
        }
        return Ok(());
    }

    let credentials: Arc<dyn CredentialProvider> = match &config.token {
        Some(token) => Arc::new(StaticToken::new(token.clone())),
        None => store.clone(),
    };
    let logout_store = config.token.is_none().then_some(store);
    let service = DiaryService::from_config(&config, credentials)?;

    let (events, mut results) = mpsc::unbounded_channel();
    let tasks = TaskContext {
        service,
        store: logout_store,
        events,
    };

    let mut app = App::new(Local::now().date_naive());
    let mut ui = UI::new()?;
    tasks.dispatch_all(app.start());

    while app.running {
        ui.display(&app)?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                tasks.dispatch_all(app.handle_key(key));
            }
        }

        while let Ok(result) = results.try_recv() {
            tasks.dispatch_all(app.apply(result));
        }
    }

    info!("shutting down");
    Ok(())
}
