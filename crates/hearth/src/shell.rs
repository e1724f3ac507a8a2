// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hearth shell` command implementation.
//!
//! Launches an interactive REPL with a colored prompt, streamed replies,
//! and readline history. One conversation per invocation; `/agent` and
//! `/chat` switch the mode, `/do <action_id>` resolves a follow-up action.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use hearth_actions::{ActionContext, ActionResolution};
use hearth_core::types::{ConversationMode, Identity, TextChunk, TurnOutcome, TurnRequest};
use hearth_core::{HearthError, TurnStore};

use crate::App;

/// Runs the interactive REPL.
pub async fn run(app: App) -> Result<(), HearthError> {
    let conversation_id = format!("shell-{}", uuid::Uuid::new_v4());
    let mut mode = ConversationMode::Agent;

    let mut editor = DefaultEditor::new()
        .map_err(|e| HearthError::Internal(format!("readline init failed: {e}")))?;

    println!(
        "{} conversation {} ({} mode, /help for commands)",
        "hearth".bold().yellow(),
        conversation_id.dimmed(),
        mode
    );

    loop {
        let prompt = format!("{} ", "you>".bold().cyan());
        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(&line);

                match line.as_str() {
                    "/quit" | "/exit" => break,
                    "/help" => {
                        print_help();
                        continue;
                    }
                    "/agent" => {
                        mode = ConversationMode::Agent;
                        println!("switched to {} mode", "agent".bold());
                        continue;
                    }
                    "/chat" => {
                        mode = ConversationMode::Chat;
                        println!("switched to {} mode", "chat".bold());
                        continue;
                    }
                    _ => {}
                }

                if let Some(action_id) = line.strip_prefix("/do ") {
                    resolve_action(&app, &conversation_id, action_id.trim()).await;
                    continue;
                }

                process_line(&app, &conversation_id, &line, mode).await;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }

    app.store.close().await?;
    println!("bye");
    Ok(())
}

fn print_help() {
    println!("  /agent          enable multimodal enrichment");
    println!("  /chat           text-only replies");
    println!("  /do <action_id> resolve a suggested action (e.g. /do export_pdf)");
    println!("  /quit           exit");
}

/// Send one turn and stream the reply to stdout.
async fn process_line(app: &App, conversation_id: &str, text: &str, mode: ConversationMode) {
    let (chunk_tx, mut chunk_rx) = mpsc::channel::<TextChunk>(64);

    let printer = tokio::spawn(async move {
        use std::io::Write;
        while let Some(chunk) = chunk_rx.recv().await {
            print!("{}", chunk.text);
            let _ = std::io::stdout().flush();
        }
        println!();
    });

    let request = TurnRequest {
        conversation_id: conversation_id.to_string(),
        identity: Identity::Anonymous,
        text: text.to_string(),
        attachments: vec![],
        mode,
    };

    let result = app
        .pipeline
        .process_turn_streaming(request, Some(chunk_tx), CancellationToken::new())
        .await;
    let _ = printer.await;

    match result {
        Ok(outcome) => print_outcome(&outcome),
        Err(e) => eprintln!("{} {e}", "error:".bold().red()),
    }
}

fn print_outcome(outcome: &TurnOutcome) {
    if outcome.degraded {
        println!("{}", "(degraded reply)".dimmed());
    }
    for attachment in &outcome.attachments {
        println!("  {} {}", "attachment:".dimmed(), attachment.storage_ref);
    }
    if !outcome.suggested_actions.is_empty() {
        let chips: Vec<String> = outcome
            .suggested_actions
            .iter()
            .map(|a| format!("{} ({})", a.label, a.id.dimmed()))
            .collect();
        println!("  {} {}", "try:".dimmed(), chips.join(" | "));
    }
    for question in &outcome.suggested_questions {
        println!("  {} {}", "ask:".dimmed(), question.text);
    }
}

/// Resolve a follow-up action against the accumulated conversation state.
async fn resolve_action(app: &App, conversation_id: &str, action_id: &str) {
    debug!(action_id, "resolving action from shell");

    let conversation = match app.store.get_conversation(conversation_id).await {
        Ok(Some(conversation)) => conversation,
        Ok(None) => {
            eprintln!("{} say something first -- no conversation yet", "error:".bold().red());
            return;
        }
        Err(e) => {
            eprintln!("{} {e}", "error:".bold().red());
            return;
        }
    };
    let messages = match app.store.get_messages(conversation_id, Some(50)).await {
        Ok(messages) => messages,
        Err(e) => {
            eprintln!("{} {e}", "error:".bold().red());
            return;
        }
    };

    let ctx = ActionContext {
        conversation,
        messages,
    };
    match app.resolver.resolve(action_id, &ctx).await {
        Ok(ActionResolution::Completed { summary, artifact }) => {
            println!("{summary}");
            if let Some(artifact) = artifact {
                println!("  {} {artifact}", "result:".dimmed());
            }
        }
        Ok(ActionResolution::NeedsInput { prompt }) => {
            println!("{prompt}");
        }
        Err(e) => eprintln!("{} {e}", "error:".bold().red()),
    }
}
