//! Interactive question session.

use super::open_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::probe::Operation;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// What a line of chat input asks for.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Empty,
    Quit,
    Stats,
    Videos,
    Question(&'a str),
}

fn parse_input(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    match line.to_lowercase().as_str() {
        "" => ChatInput::Empty,
        "quit" | "exit" | "q" => ChatInput::Quit,
        "stats" => ChatInput::Stats,
        "videos" => ChatInput::Videos,
        _ => ChatInput::Question(line),
    }
}

/// Run the interactive chat command.
pub async fn run_chat(settings: Settings) -> Result<()> {
    let orchestrator = open_orchestrator(settings, Operation::Ask)?;

    println!("\n{}", style("vidqa chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask about your videos. Commands: 'stats', 'videos', 'exit'.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Quit => {
                Output::info("Goodbye!");
                break;
            }
            ChatInput::Stats => print_stats(&orchestrator).await,
            ChatInput::Videos => print_videos(&orchestrator).await,
            ChatInput::Question(question) => {
                let spinner = Output::spinner("Thinking...");
                let answer = orchestrator.ask_question(question, None).await;
                spinner.finish_and_clear();
                println!("\n{} {}\n", style("vidqa:").cyan().bold(), answer);
            }
        }
    }

    Ok(())
}

async fn print_stats(orchestrator: &Orchestrator) {
    match orchestrator.stats().await {
        Ok(stats) => {
            Output::kv("Videos", &stats.total_videos.to_string());
            Output::kv("Chunks", &stats.total_chunks.to_string());
        }
        Err(e) => Output::error(&format!("Failed to read stats: {}", e)),
    }
}

async fn print_videos(orchestrator: &Orchestrator) {
    let videos = orchestrator.list_videos().await;
    if videos.is_empty() {
        Output::info("No videos indexed yet.");
    }
    for video in &videos {
        Output::video_info(video);
    }
}
