use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use airy_voice::console::{BellAlert, ConsoleSynthesizer, SilentRecognizer};
use airy_voice::session::Panel;
use airy_voice::{
    Assistant, AssistantHandle, AssistantRuntime, Classifier, ClassifyContext, Collaborators,
    Config, HttpLlmClient, LlmClient, OfflineLlmClient, RecipeCatalog, RecognizerEvent,
    UserAction, WakeWordDetector,
};

/// AIry - Hands-free voice assistant for cooking
#[derive(Parser)]
#[command(name = "airy", version, about)]
struct Cli {
    /// Config file (defaults to ~/.config/airy/config.toml)
    #[arg(short, long, env = "AIRY_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drive the assistant from the terminal
    Repl {
        /// Recipe to open from the catalog
        #[arg(short, long)]
        recipe: Option<String>,

        /// Pause per spoken character in milliseconds
        #[arg(long, default_value = "0")]
        pace_ms: u64,
    },
    /// Classify one utterance and print the intent as JSON
    Classify {
        /// Utterance text
        text: String,

        /// Current step description
        #[arg(long)]
        step: Option<String>,

        /// Treat the timer confirmation dialog as open
        #[arg(long)]
        timer_dialog: bool,

        /// Treat the video player as open
        #[arg(long)]
        video: bool,
    },
    /// Extract a timer duration from text
    Duration {
        /// Text such as "3分30秒"
        text: String,
    },
    /// List recipes in the catalog
    Recipes,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,airy_voice=info",
        1 => "info,airy_voice=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Command::Repl { recipe, pace_ms } => repl(&config, recipe.as_deref(), pace_ms).await,
        Command::Classify {
            text,
            step,
            timer_dialog,
            video,
        } => classify(&config, &text, step.as_deref(), timer_dialog, video),
        Command::Duration { text } => {
            match airy_voice::extract_seconds(&text) {
                Some(seconds) => println!("{seconds}"),
                None => println!("no duration"),
            }
            Ok(())
        }
        Command::Recipes => {
            let catalog = load_catalog(&config)?;
            for recipe in catalog.iter() {
                println!("{}\t{}\t{} steps", recipe.id, recipe.title, recipe.steps.len());
            }
            Ok(())
        }
    }
}

fn classify(
    config: &Config,
    text: &str,
    step: Option<&str>,
    timer_dialog: bool,
    video: bool,
) -> anyhow::Result<()> {
    let mut classifier = Classifier::new(WakeWordDetector::from_config(&config.wake)?);
    let intent = classifier.classify(
        text,
        &ClassifyContext {
            current_step: step,
            timer_dialog_open: timer_dialog,
            video_modal_open: video,
        },
    );

    println!("{}", serde_json::to_string_pretty(&intent)?);
    Ok(())
}

fn load_catalog(config: &Config) -> anyhow::Result<RecipeCatalog> {
    let Some(path) = &config.recipes_path else {
        anyhow::bail!("no recipe catalog configured (set AIRY_RECIPES or `recipes` in config.toml)");
    };
    Ok(RecipeCatalog::load(path)?)
}

async fn repl(config: &Config, recipe: Option<&str>, pace_ms: u64) -> anyhow::Result<()> {
    let mut assistant = Assistant::new(config)?;

    if let Some(id) = recipe {
        let catalog = load_catalog(config)?;
        let recipe = catalog
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("recipe not found: {id}"))?;
        assistant.handle(airy_voice::AssistantEvent::Action(UserAction::SelectRecipe(recipe)));
    }

    let llm: Arc<dyn LlmClient> = match &config.llm.endpoint {
        Some(endpoint) => Arc::new(HttpLlmClient::new(endpoint.clone(), config.llm.timeout)?),
        None => {
            tracing::warn!("no LLM endpoint configured, questions will not be answered");
            Arc::new(OfflineLlmClient)
        }
    };

    let synthesizer = if pace_ms == 0 {
        ConsoleSynthesizer::new()
    } else {
        ConsoleSynthesizer::paced(Duration::from_millis(pace_ms))
    };

    let collaborators = Collaborators {
        recognizer: Arc::new(SilentRecognizer),
        synthesizer: Arc::new(synthesizer),
        llm,
        alert: Arc::new(BellAlert),
    };

    let (runtime, handle) = AssistantRuntime::new(assistant, collaborators, config);
    let task = tokio::spawn(runtime.run());

    println!("AIry ready. Type an utterance, or :help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !dispatch_line(&handle, line.trim()) {
                    break;
                }
            }
        }
    }

    handle.shutdown();
    let assistant = task.await?;
    tracing::info!(
        messages = assistant.session().conversation_history().len(),
        "session ended"
    );
    Ok(())
}

/// Apply one REPL line; returns `false` to quit
fn dispatch_line(handle: &AssistantHandle, line: &str) -> bool {
    if line.is_empty() {
        return true;
    }

    let Some(command) = line.strip_prefix(':') else {
        handle.submit_text(line);
        return true;
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let action = match (name, args.as_slice()) {
        ("quit" | "q", _) => return false,
        ("help", _) => {
            print_help();
            return true;
        }
        ("state", _) => {
            match serde_json::to_string_pretty(&handle.snapshot()) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("failed to render state: {e}"),
            }
            return true;
        }
        ("hear", words) => {
            handle.recognizer_event(RecognizerEvent::Result(words.join(" ")));
            return true;
        }
        ("listen", _) => UserAction::StartListening,
        ("mute", _) => UserAction::StopListening,
        ("next", _) => UserAction::NextStep,
        ("prev", _) => UserAction::PreviousStep,
        ("step", [n]) => match n.parse::<usize>() {
            Ok(n) if n > 0 => UserAction::GoToStep(n - 1),
            _ => {
                eprintln!("usage: :step <number>");
                return true;
            }
        },
        ("ingredients", _) => UserAction::ShowPanel(Panel::Ingredients),
        ("steps", _) => UserAction::ShowPanel(Panel::Steps),
        ("timer", [minutes, seconds]) => UserAction::SubmitManualTimer {
            minutes: (*minutes).to_string(),
            seconds: (*seconds).to_string(),
        },
        ("start", _) => UserAction::StartTimer,
        ("pause", _) => UserAction::PauseTimer,
        ("reset", _) => UserAction::ResetTimer,
        ("silence", _) => UserAction::StopAlert,
        ("close", _) => UserAction::CloseVideo,
        ("dismiss", _) => UserAction::DismissResponse,
        ("restart", _) => UserAction::ResetSession,
        _ => {
            eprintln!("unknown command :{command} (try :help)");
            return true;
        }
    };

    handle.action(action);
    true
}

fn print_help() {
    println!("Plain text is classified immediately, as if spoken and settled.");
    println!("  :hear <text>       feed a partial transcript through the debounce");
    println!("  :listen / :mute    start or stop hands-free listening");
    println!("  :next / :prev      move between steps");
    println!("  :step <n>          jump to step n");
    println!("  :ingredients       show the ingredient list");
    println!("  :steps             show the step list");
    println!("  :timer <m> <s>     stage a timer manually");
    println!("  :start :pause :reset   control the timer");
    println!("  :silence           stop the finish alert");
    println!("  :close             close the video player");
    println!("  :dismiss           dismiss the last response");
    println!("  :restart           reset the session");
    println!("  :state             print the assistant state");
    println!("  :quit              exit");
}
