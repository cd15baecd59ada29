//! services/api/src/bin/wordpocket.rs
//!
//! The terminal shell. Each invocation restores the stored session, applies one
//! action and prints the resulting screen.

use async_openai::{config::OpenAIConfig, Client as OpenAiClient};
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use word_pocket_core::domain::{LengthPreference, TextType, DEFAULT_LANGUAGE};
use word_pocket_core::generation::LlmTextGenerator;
use word_pocket_core::ports::{DictionaryService, LanguageModelService, TextGenerationService};
use word_pocket_core::word_bag::WordBag;
use wordpocket_lib::{
    adapters::{
        FileKeyValueStore, FreeDictionaryAdapter, LlmDictionaryAdapter, LocalStorageAdapter,
        OpenAiChatAdapter, ProxyTextGenerator,
    },
    config::{ClientConfig, DictionaryProvider, GenerationMode},
    error::ApiError,
    shell::{views, AppView, GenerateOptions, NewWord, Shell, ShellError, WordBagAnimation},
};

/// How often the orb is redrawn while `bag` runs. The simulation itself ticks faster.
const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "wordpocket", version, about = "Collect words and practise them in generated texts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the landing page, or the dashboard when logged in.
    Home,
    /// Log in with any email address. Passwords are accepted and ignored.
    Login {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    Logout,
    Dashboard,
    /// List the word bag.
    Words,
    /// Add a word. A missing definition is looked up in the dictionary.
    Add {
        word: String,
        #[arg(long, short)]
        language: Option<String>,
        #[arg(long, short)]
        definition: Option<String>,
        #[arg(long, short)]
        example: Option<String>,
    },
    /// Show one word by id, id prefix or spelling.
    Word { reference: String },
    /// Remove a word by id, id prefix or spelling.
    Remove { reference: String },
    /// Animate the word bag.
    Bag {
        #[arg(long, default_value_t = 5)]
        seconds: u64,
        /// Slow every word down as if the pointer rested on the orb.
        #[arg(long)]
        hover: bool,
        /// Open the word under this point (0-100 on both axes) once the animation ends.
        #[arg(long, num_args = 2, value_names = ["X", "Y"])]
        pick: Option<Vec<f64>>,
    },
    /// Generate a text. Without --words or --all, shows the configuration screen.
    Generate {
        #[arg(long, num_args = 1..)]
        words: Vec<String>,
        /// Use every word in the bag.
        #[arg(long)]
        all: bool,
        /// Paragraph, Dialog or Short Story.
        #[arg(long, default_value = "Paragraph")]
        format: String,
        #[arg(long, default_value = DEFAULT_LANGUAGE)]
        language: String,
        /// short, medium or long.
        #[arg(long, default_value = "medium")]
        length: String,
    },
    /// List generated texts.
    Texts,
    /// Read a generated text with its highlighted words.
    Show { reference: String },
    DeleteText { reference: String },
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = ClientConfig::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    let cli = Cli::parse();

    // --- 2. Wire the Adapters ---
    let mut shell = build_shell(&config)?;
    shell.restore()?;
    debug!(view = ?shell.state().view, "Session restored");

    // --- 3. Apply the Command ---
    match run(&mut shell, cli.command.unwrap_or(Command::Home)).await {
        Ok(()) => {}
        Err(ApiError::Shell(e @ ShellError::NotLoggedIn)) => {
            eprintln!("{e}. Run `wordpocket login <email>`.");
            std::process::exit(1);
        }
        Err(ApiError::Shell(ShellError::Port(e))) => return Err(e.into()),
        Err(ApiError::Shell(e)) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Err(e) => return Err(e),
    }

    println!("{}", views::render(shell.state()));
    Ok(())
}

fn build_shell(config: &ClientConfig) -> Result<Shell, ApiError> {
    let http = reqwest::Client::builder()
        .build()
        .map_err(|e| ApiError::Internal(format!("Failed to create HTTP client: {}", e)))?;

    let storage = Arc::new(LocalStorageAdapter::new(FileKeyValueStore::open(
        config.storage_dir.clone(),
    )?));

    let openai_model = || -> Result<Arc<dyn LanguageModelService>, ApiError> {
        let key = config.openai_api_key.clone().ok_or_else(|| {
            ApiError::Internal("OPENAI_API_KEY is required for this mode".to_string())
        })?;
        let client = OpenAiClient::with_config(OpenAIConfig::new().with_api_key(key));
        Ok(Arc::new(OpenAiChatAdapter::new(client, config.direct_model.clone())))
    };

    let dictionary: Arc<dyn DictionaryService> = match config.dictionary_provider {
        DictionaryProvider::Free => Arc::new(FreeDictionaryAdapter::new(
            http.clone(),
            config.dictionary_api_base.clone(),
        )),
        DictionaryProvider::Llm => Arc::new(LlmDictionaryAdapter::new(openai_model()?)),
    };

    let generator: Arc<dyn TextGenerationService> = match config.generation_mode {
        GenerationMode::Proxy => {
            info!(proxy = %config.proxy_url, "Generating through the proxy");
            Arc::new(ProxyTextGenerator::new(http, config.proxy_url.clone()))
        }
        GenerationMode::Direct => {
            info!(model = %config.direct_model, "Generating directly");
            Arc::new(LlmTextGenerator::new(openai_model()?))
        }
    };

    Ok(Shell::new(storage, dictionary, generator))
}

async fn run(shell: &mut Shell, command: Command) -> Result<(), ApiError> {
    match command {
        Command::Home => {
            if shell.state().user.is_some() {
                shell.navigate(AppView::Dashboard)?;
            }
        }
        Command::Login { email, password: _ } => {
            let user = shell.login(&email)?;
            println!("Welcome, {}!", user.name);
        }
        Command::Logout => shell.logout()?,
        Command::Dashboard => shell.navigate(AppView::Dashboard)?,
        Command::Words => shell.navigate(AppView::WordBag)?,
        Command::Add {
            word,
            language,
            definition,
            example,
        } => {
            shell.navigate(AppView::WordBag)?;
            let added = shell
                .add_word(NewWord {
                    word,
                    language,
                    translation: definition,
                    example_sentence: example,
                })
                .await?;
            match added {
                Some(word) => println!("Added \"{}\" to your bag.", word.word),
                None => println!("Nothing to add."),
            }
        }
        Command::Word { reference } => {
            let id = resolve_word(shell, &reference)?;
            shell.open_word(id)?;
        }
        Command::Remove { reference } => {
            let id = resolve_word(shell, &reference)?;
            shell.navigate(AppView::WordBag)?;
            shell.delete_word(id)?;
            println!("Removed \"{}\".", reference);
        }
        Command::Bag {
            seconds,
            hover,
            pick,
        } => {
            shell.navigate(AppView::WordBag)?;
            animate_bag(shell, seconds, hover, pick).await?;
        }
        Command::Generate {
            words,
            all,
            format,
            language,
            length,
        } => {
            shell.navigate(AppView::Generate)?;
            if words.is_empty() && !all {
                return Ok(());
            }
            let selected_word_ids = if all {
                shell.state().words.iter().map(|w| w.id).collect()
            } else {
                words
                    .iter()
                    .map(|r| resolve_word(shell, r))
                    .collect::<Result<Vec<_>, _>>()?
            };
            let length = LengthPreference::parse(&length).ok_or_else(|| {
                ShellError::InvalidInput(format!("'{}' is not one of short, medium, long", length))
            })?;
            println!("Generating...");
            shell
                .generate(GenerateOptions {
                    text_type: TextType::from_label(&format),
                    language,
                    length,
                    selected_word_ids,
                })
                .await?;
        }
        Command::Texts => shell.navigate(AppView::MyTexts)?,
        Command::Show { reference } => {
            let id = resolve_text(shell, &reference)?;
            shell.open_text(id)?;
        }
        Command::DeleteText { reference } => {
            let id = resolve_text(shell, &reference)?;
            shell.navigate(AppView::MyTexts)?;
            shell.delete_text(id)?;
            println!("Deleted text.");
        }
    }
    Ok(())
}

fn resolve_word(shell: &Shell, reference: &str) -> Result<uuid::Uuid, ShellError> {
    if shell.state().user.is_none() {
        return Err(ShellError::NotLoggedIn);
    }
    shell
        .find_word(reference)
        .ok_or_else(|| ShellError::WordNotFound(reference.to_string()))
}

fn resolve_text(shell: &Shell, reference: &str) -> Result<uuid::Uuid, ShellError> {
    if shell.state().user.is_none() {
        return Err(ShellError::NotLoggedIn);
    }
    shell
        .find_text(reference)
        .ok_or_else(|| ShellError::TextNotFound(reference.to_string()))
}

async fn animate_bag(
    shell: &mut Shell,
    seconds: u64,
    hover: bool,
    pick: Option<Vec<f64>>,
) -> Result<(), ApiError> {
    if shell.state().words.is_empty() {
        return Ok(());
    }

    let bag = WordBag::new(&shell.state().words, &mut StdRng::from_entropy());
    let view_token = CancellationToken::new();
    let animation = WordBagAnimation::start(
        bag,
        wordpocket_lib::shell::animation::DEFAULT_FRAME_INTERVAL,
        &view_token,
    );
    animation.set_hovering(hover);

    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);
    let mut redraw = tokio::time::interval(REDRAW_INTERVAL);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
            _ = redraw.tick() => {
                let frame = animation.latest();
                // Clear the screen and home the cursor before each frame.
                print!("\x1b[2J\x1b[H");
                println!("{}", views::render_orb(&frame.particles, frame.overflow));
            }
        }
    }

    let picked = match pick.as_deref() {
        Some([x, y]) => animation.pick(*x, *y),
        _ => None,
    };
    view_token.cancel();
    animation.stop().await;

    if let Some(id) = picked {
        shell.open_word(id)?;
    }
    Ok(())
}
