use anyhow::{Context, Result, bail};
use arboard::Clipboard;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Read};
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, warn};
use transit_core::{
    ApiProvider, AppError, Config, SettingsStore, Task, Transit,
    bridge::{BackgroundService, ChannelMessenger, Message, TabId},
    geometry::{Rect, Size, Viewport},
    init, logging, positioner,
    settings::JsonFileStore,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Override the stored provider (gemini or openai)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Override the stored model
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Override the stored endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Settings file to use instead of the default location
    #[arg(long, global = true)]
    settings: Option<std::path::PathBuf>,

    /// Verbose logging on stderr
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate text with the configured prompt
    Translate(RequestArgs),
    /// Correct the grammar of text
    Correct(RequestArgs),
    /// Inspect or change the stored settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Compute where a floating element would be placed
    Place(PlaceArgs),
    /// Answer bridge messages read line by line from stdin
    Serve {
        /// Tab id stamped on incoming messages
        #[arg(long, default_value_t = 0)]
        tab: TabId,
    },
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Text to send; read from stdin when omitted
    #[arg(trailing_var_arg = true)]
    text: Vec<String>,

    /// Copy the result to clipboard automatically
    #[arg(short, long, default_value_t = false)]
    copy: bool,

    /// Use the Gemini bulk streaming endpoint
    #[arg(long, default_value_t = false)]
    stream: bool,

    /// Give up after this many seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print the effective settings (API key masked)
    Show,
    /// Update stored fields
    Set {
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Print the settings file location
    Path,
}

#[derive(Args, Debug)]
struct PlaceArgs {
    #[arg(long)]
    x: f64,
    #[arg(long)]
    y: f64,
    #[arg(long)]
    width: f64,
    #[arg(long)]
    height: f64,
    #[arg(long, default_value_t = 1280.0)]
    viewport_width: f64,
    #[arg(long, default_value_t = 800.0)]
    viewport_height: f64,
    #[arg(long, default_value_t = 0.0)]
    scroll_x: f64,
    #[arg(long, default_value_t = 0.0)]
    scroll_y: f64,
    #[arg(long, default_value_t = 300.0)]
    element_width: f64,
    #[arg(long, default_value_t = 80.0)]
    element_height: f64,
    #[arg(long, default_value_t = positioner::DEFAULT_PADDING)]
    padding: f64,
    /// Use the icon placement rules
    #[arg(long, default_value_t = false)]
    icon: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup
    init();
    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli)?;
    logging::init(cli.debug || config.debug);

    let store = match config.settings_path.clone() {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::at_default_location().context("Failed to locate settings file")?,
    };
    debug!("Using settings at {}", store.path().display());

    match cli.command {
        Command::Translate(args) => run_request(store, config, args, Task::Translate).await,
        Command::Correct(args) => run_request(store, config, args, Task::Correct).await,
        Command::Settings { action } => run_settings(store, config, action).await,
        Command::Place(args) => run_place(&args),
        Command::Serve { tab } => run_serve(store, config, tab).await,
    }
}

fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(name) = &cli.provider {
        config.api_provider = Some(parse_provider(name)?);
    }
    if let Some(model) = &cli.model {
        config.model_name = Some(model.clone());
    }
    if let Some(endpoint) = &cli.endpoint {
        config.api_endpoint = Some(endpoint.clone());
    }
    if let Some(path) = &cli.settings {
        config.settings_path = Some(path.clone());
    }
    Ok(())
}

fn parse_provider(name: &str) -> Result<ApiProvider> {
    match ApiProvider::parse(name) {
        Some(provider) => Ok(provider),
        None => bail!("Unknown provider '{}', expected 'gemini' or 'openai'", name),
    }
}

async fn run_request(store: JsonFileStore, config: Config, args: RequestArgs, task: Task) -> Result<()> {
    let text = read_input(&args.text)?;
    if text.trim().is_empty() {
        bail!("No text provided for translation.");
    }

    let transit = Transit::with_config(store, config).context("Failed to create provider client")?;
    let settings = transit.settings().await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.green} {msg}")?,
    );
    spinner.set_message(format!("Asking {} ({})...", settings.api_provider.label(), settings.ai_model));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let request = async {
        if args.stream {
            transit.translate_streaming(&text, task).await
        } else {
            transit.translate(&text, task).await
        }
    };
    let result = match args.timeout {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), request)
            .await
            .unwrap_or(Err(AppError::Timeout(secs))),
        None => request.await,
    };

    spinner.finish_and_clear();

    let response = result?;
    println!("{}", response);

    // Copy to clipboard if requested
    if args.copy {
        match Clipboard::new() {
            Ok(mut clipboard) => match clipboard.set_text(response) {
                Ok(()) => eprintln!("(Copied to clipboard)"),
                Err(e) => warn!("Failed to copy to clipboard: {}", e),
            },
            Err(e) => warn!("Could not access clipboard: {}", e),
        }
    }
    Ok(())
}

fn read_input(words: &[String]) -> Result<String> {
    if !words.is_empty() {
        return Ok(words.join(" "));
    }
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read text from stdin")?;
    Ok(input.trim_end().to_string())
}

async fn run_settings(store: JsonFileStore, config: Config, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show => {
            let settings = config.apply(store.read().await?);
            println!("Provider: {}", settings.api_provider.label());
            println!("API Key:  {}", settings.masked_api_key());
            println!("Endpoint: {}", settings.api_endpoint);
            println!("Model:    {}", settings.ai_model);
            println!("Prompt:   {}", settings.custom_prompt);
        }
        SettingsAction::Set {
            provider,
            api_key,
            endpoint,
            model,
            prompt,
        } => {
            let mut settings = store.read().await?;
            if let Some(name) = provider {
                let provider = parse_provider(&name)?;
                if provider != settings.api_provider {
                    settings.api_endpoint = provider.default_endpoint().to_string();
                    settings.ai_model = provider.default_model().to_string();
                }
                settings.api_provider = provider;
            }
            if let Some(key) = api_key {
                settings.api_key = key;
            }
            if let Some(endpoint) = endpoint {
                settings.api_endpoint = endpoint;
            }
            if let Some(model) = model {
                settings.ai_model = model;
            }
            if let Some(prompt) = prompt {
                settings.custom_prompt = prompt;
            }
            store
                .write(&settings)
                .await
                .with_context(|| format!("Failed to write {}", store.path().display()))?;
            println!("Settings saved successfully!");
        }
        SettingsAction::Path => println!("{}", store.path().display()),
    }
    Ok(())
}

fn run_place(args: &PlaceArgs) -> Result<()> {
    let anchor = Rect::from_xywh(args.x, args.y, args.width, args.height);
    let viewport = Viewport::new(args.viewport_width, args.viewport_height).scrolled(args.scroll_x, args.scroll_y);
    let element = Size::new(args.element_width, args.element_height);

    let placement = if args.icon {
        positioner::place_icon(&anchor, element, &viewport, args.padding)
    } else {
        positioner::place(&anchor, element, &viewport, args.padding)
    };
    println!("{}", serde_json::to_string(&placement)?);
    Ok(())
}

/// Plays the background context for one tab: every stdin line is a
/// request message, every display message and ack goes to stdout.
async fn run_serve(store: JsonFileStore, config: Config, tab: TabId) -> Result<()> {
    let transit = Transit::with_config(store, config).context("Failed to create provider client")?;
    let service = BackgroundService::new(transit, ChannelMessenger::new());
    let mut inbox = service.messenger().register(tab);

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let message = match Message::from_json(&line) {
            Ok(message) => message,
            Err(e) => {
                warn!("Skipping malformed message: {}", e);
                continue;
            }
        };

        let ack = service.handle(message, tab).await;
        loop {
            match inbox.try_recv() {
                Ok(reply) => println!("{}", reply.to_json()?),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        println!("{}", serde_json::to_string(&ack)?);
    }
    Ok(())
}
