use std::{
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
};

use ago_type::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigOverrides, ConfigStore, FileConfigStore},
    quote::{FixedQuoteProvider, QuotableClient, Quote, QuoteProvider},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, QuoteFetcher, Runner},
    ui,
};
use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "AGO_TYPE_LOG";

/// type random quotes as fast as you can
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A typing-speed game: fetches a random quotation, colours each character as you type it and reports your words per minute once the quote matches exactly."
)]
pub struct Cli {
    /// longest quote to request, in characters
    #[clap(short = 'm', long)]
    max_length: Option<usize>,

    /// request quotes of any length
    #[clap(long, conflicts_with = "max_length")]
    no_max_length: bool,

    /// quote service endpoint (quotable-compatible /random)
    #[clap(short = 'e', long)]
    endpoint: Option<String>,

    /// request timeout in seconds
    #[clap(short = 't', long)]
    timeout: Option<u64>,

    /// custom prompt to type instead of fetching quotes
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// read settings from this file instead of the default location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// write the effective settings to the config file and continue
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            max_length: self.max_length,
            no_max_length: self.no_max_length,
            endpoint: self.endpoint.clone(),
            request_timeout_secs: self.timeout,
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    fn quote_provider(&self, config: &Config) -> anyhow::Result<Arc<dyn QuoteProvider>> {
        if let Some(prompt) = self.prompt.as_deref().filter(|p| !p.is_empty()) {
            return Ok(Arc::new(FixedQuoteProvider::new(Quote::new(prompt, None))));
        }

        let client = QuotableClient::new(config.endpoint.clone(), config.request_timeout())
            .context("failed to build the quote client")?;
        Ok(Arc::new(client))
    }
}

fn init_logging() -> anyhow::Result<()> {
    let dir = AppDirs::log_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(&dir, "ago-type.log");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(appender)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(e) = init_logging() {
        eprintln!("warning: logging disabled: {e:#}");
    }

    let store = cli.config_store();
    let mut config = store.load();
    config.apply(&cli.overrides());
    if cli.save_config {
        store
            .save(&config)
            .with_context(|| format!("failed to save config to {}", store.path().display()))?;
    }
    tracing::info!(?config, custom_prompt = cli.prompt.is_some(), "starting");

    let provider = cli.quote_provider(&config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, provider, &config);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "exiting on error");
    }
    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    provider: Arc<dyn QuoteProvider>,
    config: &Config,
) -> anyhow::Result<()> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(config.tick_rate()),
    );
    let fetcher = QuoteFetcher::new(provider, config.quote_request(), runner.sender());
    let mut app = App::new(fetcher);
    app.request_quote();

    let mut needs_draw = true;
    loop {
        if needs_draw {
            terminal.draw(|f| ui::draw(&mut app, f))?;
        }

        let event = runner.step();
        needs_draw = match event {
            // ticks only matter while the live timer is running
            AppEvent::Tick => app
                .session
                .as_ref()
                .is_some_and(|s| s.has_started() && !s.is_completed()),
            _ => true,
        };

        if app.handle_event(event) == Control::Quit {
            break;
        }
    }

    Ok(())
}
