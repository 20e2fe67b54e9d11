//! Care Assistant - terminal host
//!
//! Stands in for the assistant widget: renders the conversation on stdout and
//! turns typed commands into engine calls.

use care_assistant::session::{state::RATING_PROMPT, Message, Phase, Sender, WidgetUpdate};
use care_assistant::{EngineConfig, RuntimeError, WidgetHandle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "commands: open | close | <number> (pick option) | rate <1-5> | help | quit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Open,
    Close,
    Pick(usize),
    Rate(u8),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let first = words.next()?;
    let command = match first.to_ascii_lowercase().as_str() {
        "open" => Command::Open,
        "close" => Command::Close,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "rate" => Command::Rate(words.next()?.parse().ok()?),
        number => Command::Pick(number.parse().ok()?),
    };
    if words.next().is_some() {
        return None;
    }
    Some(command)
}

fn render_message(message: &Message) {
    match message.sender {
        Sender::User => println!("you> {}", message.text),
        Sender::Bot => {
            println!("bot> {}", message.text);
            for (i, option) in message.options.iter().enumerate() {
                match &option.icon {
                    Some(icon) => println!("  {}. {icon} {}", i + 1, option.label),
                    None => println!("  {}. {}", i + 1, option.label),
                }
            }
        }
    }
}

fn render(update: &WidgetUpdate, json: bool) {
    if json {
        match serde_json::to_string(update) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "Failed to encode update"),
        }
        return;
    }

    match update {
        WidgetUpdate::Opened { log, .. } | WidgetUpdate::Reset { log, .. } => {
            println!("--- new conversation ---");
            log.iter().for_each(render_message);
        }
        WidgetUpdate::Message { message } => render_message(message),
        WidgetUpdate::StateChange {
            phase: Phase::RatingPending,
            ..
        } => println!("{RATING_PROMPT} (rate 1-5)"),
        WidgetUpdate::StateChange {
            phase: Phase::Typing { .. },
            ..
        } => println!("bot is typing..."),
        WidgetUpdate::StateChange { .. } => {}
        WidgetUpdate::Closed => println!("--- assistant closed ---"),
    }
}

/// Pick the n-th (1-based) option currently on screen
async fn pick(handle: &WidgetHandle, n: usize) -> Result<(), RuntimeError> {
    let state = handle.snapshot();
    let Some(session) = state.session() else {
        println!("(assistant is closed, type `open`)");
        return Ok(());
    };
    let Some(option) = n.checked_sub(1).and_then(|i| session.available_options().get(i)) else {
        println!("(no option {n} right now)");
        return Ok(());
    };
    handle
        .select_option_at(&session.current_step, &option.id, &option.label)
        .await
}

async fn dispatch(handle: &WidgetHandle, command: Command) -> Result<(), RuntimeError> {
    match command {
        Command::Open => handle.open().await.map(|_| ()),
        Command::Close => handle.close().await,
        Command::Pick(n) => pick(handle, n).await,
        Command::Rate(stars) => handle.submit_rating(stars).await,
        Command::Help => {
            println!("{HELP}");
            Ok(())
        }
        Command::Quit => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout only carries the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "care_assistant=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let config = EngineConfig::from_env();
    let json = std::env::var("CARE_ASSISTANT_JSON").is_ok_and(|v| v == "1" || v == "true");

    let handle = care_assistant::spawn(config);
    let mut updates = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    handle.open().await?;

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(update) => render(&update, json),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Renderer fell behind");
                }
                Err(RecvError::Closed) => break,
            },

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(Command::Quit) => break,
                    Some(command) => match dispatch(&handle, command).await {
                        Ok(()) => {}
                        Err(RuntimeError::Rejected(e)) => println!("({e})"),
                        Err(e) => return Err(e.into()),
                    },
                    None => println!("(unrecognised command; {HELP})"),
                }
            }
        }
    }

    handle.close().await?;
    Ok(())
}
