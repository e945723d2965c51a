mod demo;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coordinator_core::{config::load_settings, mailbox, MailboxError};
use shared::{
    domain::{PresentType, Sender},
    protocol::Message,
};

use crate::demo::{Demo, Snapshot};

#[derive(Parser, Debug)]
struct Cli {
    /// Settings file; `wayfinder.toml` in the working directory is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk the onboarding flow from welcome to home and print each step.
    Walkthrough,
    /// Deliver a JSON array of messages to the onboarding flow.
    Run { script: PathBuf },
}

fn print(snapshot: &Snapshot) -> Result<()> {
    println!("{}", serde_json::to_string(snapshot)?);
    Ok(())
}

fn event(name: &str) -> Message {
    Message::custom(name, Sender::External, serde_json::Value::Null)
}

fn walkthrough(demo: &mut Demo) -> Result<()> {
    demo.send(Message::trigger_flow(false, PresentType::Present))?;
    print(&demo.snapshot("start"))?;

    let steps = [
        ("continue", event("continue")),
        ("back", Message::Back(Sender::External)),
        ("continue", event("continue")),
        ("sign_in", event("sign_in")),
        ("open_settings", event("open_settings")),
        ("open_account", event("open_account")),
        ("close_settings", event("close_settings")),
        ("finish", event("finish")),
    ];
    for (step, message) in steps {
        demo.send(message)?;
        print(&demo.snapshot(step))?;
    }
    Ok(())
}

fn run_script(demo: &mut Demo, script: &Path, capacity: usize) -> Result<()> {
    let raw = fs::read_to_string(script)
        .with_context(|| format!("failed to read script '{}'", script.display()))?;
    let messages: Vec<Message> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse script '{}'", script.display()))?;

    let (tx, inbox) = mailbox(capacity);
    let target = demo.flow();
    for (index, message) in messages.into_iter().enumerate() {
        let kind = message.kind();
        match tx.post(target, message.clone()) {
            Ok(()) => {}
            Err(MailboxError::Full { .. }) => {
                let delivered = inbox.drain(demo.tree_mut())?;
                print(&demo.snapshot(format!("drained {delivered}")))?;
                tx.post(target, message)?;
            }
            Err(err) => return Err(err.into()),
        }
        tracing::debug!(index, message = kind, "script message queued");
    }

    let delivered = inbox.drain(demo.tree_mut())?;
    print(&demo.snapshot(format!("drained {delivered}")))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let mut demo = Demo::new(&settings)?;
    demo.show()?;

    match cli.command {
        Command::Walkthrough => walkthrough(&mut demo)?,
        Command::Run { script } => run_script(&mut demo, &script, settings.mailbox_capacity)?,
    }

    Ok(())
}
