//! Interactive chat command.

use super::run_preflight;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::history::History;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
///
/// The conversation lives here, on the client side: each turn hands the
/// history to the engine and keeps the extended copy it returns.
pub async fn run_chat(settings: Settings) -> Result<()> {
    run_preflight(Operation::Respond, &settings)?;

    let orchestrator = Orchestrator::new(settings)?;
    let mut history = History::new();

    println!("\n{}", style("Coursebot Chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask about our courses, or 'exit' to quit. Use 'clear' to reset conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            history = History::new();
            Output::info("Conversation history cleared.");
            continue;
        }

        match orchestrator.respond(input, history.clone()).await {
            Ok(reply) => {
                println!("\n{} {}\n", style("Coursebot:").cyan().bold(), reply.answer);
                history = reply.history;
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
