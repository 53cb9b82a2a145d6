//! CLI output formatting utilities.

use crate::rag::short_timestamp;
use crate::vector_store::{SearchHit, VideoRecord};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Characters of passage text shown in source listings.
const PREVIEW_CHARS: usize = 200;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one indexed video.
    pub fn video_info(video: &VideoRecord) {
        println!(
            "  {} {} ({}, {} chunks, {})",
            style("*").cyan(),
            style(&video.title).bold(),
            style(&video.video_id).dim(),
            video.chunk_count,
            format_duration(video.duration)
        );
        println!(
            "    {} {}  {}",
            style(&video.uploader).dim(),
            style(&video.upload_date).dim(),
            style(&video.url).dim()
        );
    }

    /// Print a retrieved passage, numbered from 1.
    pub fn source(position: usize, hit: &SearchHit) {
        let meta = &hit.metadata;
        let at = meta
            .start_time
            .map(|t| format!(" @ {}", style(short_timestamp(t)).cyan()))
            .unwrap_or_default();

        println!(
            "\n{} {}{} (similarity: {:.3})",
            style(format!("{}.", position)).green(),
            style(&meta.video_title).bold(),
            at,
            hit.similarity
        );
        println!("   {}", content_preview(&hit.document, PREVIEW_CHARS));
        if !meta.video_url.is_empty() {
            println!("   {}", style(&meta.video_url).dim());
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Format duration in seconds to a human-readable string.
fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
