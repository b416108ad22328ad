//! barge entry point
//!
//! Pipeline events are read from stdin, one JSON object per line; effects
//! are written to stdout the same way. Logs go to stderr.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use barge_agent::{DialogueController, DialogueEffect};
use barge_cli::{apply_event, build_controller, parse_event, CliError};
use barge_config::{load_settings, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Priority: env vars > config/{env} > config/default > defaults
    let env = std::env::var("BARGE_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized
            eprintln!("Failed to load configuration: {}", e);
            return Err(CliError::from(e).into());
        },
    };

    init_tracing(&settings);

    tracing::info!("Starting barge v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_env = env.as_deref().unwrap_or("default"),
        knowledge_dir = %settings.rag.knowledge_dir,
        "Configuration loaded"
    );

    let mut controller = build_controller(&settings).await.map_err(CliError::from)?;
    run(&mut controller).await?;

    tracing::info!("Input closed, shutting down");
    Ok(())
}

/// Event loop: stdin events in, effects out, until EOF
async fn run(controller: &mut DialogueController) -> Result<(), CliError> {
    let mut effects = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_event(&line) {
                    Ok(Some(event)) => {
                        if let Some(decision) = apply_event(controller, event) {
                            tracing::debug!(decision = decision.as_str(), "Turn handled");
                        }
                    },
                    Ok(None) => {},
                    Err(e) => tracing::warn!(error = %e, line = %line, "Skipping malformed event"),
                }
            }
            effect = effects.recv() => match effect {
                Ok(effect) => write_effect(&mut stdout, &effect).await?,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Effect consumer lagged");
                },
                Err(RecvError::Closed) => break,
            },
        }
    }

    if let Some(outcome) = controller.wait_current().await {
        tracing::info!(outcome = ?outcome, "Final task finished");
    }
    controller.shutdown();

    loop {
        match effects.try_recv() {
            Ok(effect) => write_effect(&mut stdout, &effect).await?,
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Effect consumer lagged");
            },
            Err(_) => break,
        }
    }

    Ok(())
}

async fn write_effect(stdout: &mut Stdout, effect: &DialogueEffect) -> Result<(), CliError> {
    let mut line = serde_json::to_string(effect).map_err(std::io::Error::from)?;
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

/// Initialize tracing on stderr so stdout stays machine-readable
fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("barge={}", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };
    subscriber.with(fmt_layer).init();
}
