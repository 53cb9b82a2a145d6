//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{EmbeddingProvider, GeneratorKind, Settings};
use crate::openai::API_KEY_VAR;
use crate::probe::Capabilities;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    message: String,
    hint: Option<String>,
}

#[derive(Debug, PartialEq)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("vidqa doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let caps = Capabilities::detect();
    let sections = [
        ("External Tools", vec![check_yt_dlp(&caps)]),
        ("API Configuration", check_api_key(settings, &caps)),
        ("Storage", check_storage(settings)),
        ("Configuration", vec![check_config_file()]),
    ];

    let mut errors = 0;
    let mut warnings = 0;
    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
            match check.status {
                CheckStatus::Error => errors += 1,
                CheckStatus::Warning => warnings += 1,
                CheckStatus::Ok => {}
            }
        }
        println!();
    }

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using vidqa.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! vidqa is ready to use.");
    }

    Ok(())
}

fn check_yt_dlp(caps: &Capabilities) -> CheckResult {
    match &caps.yt_dlp {
        Some(version) => CheckResult::ok("yt-dlp", &truncate(version, 50)),
        None => CheckResult::error("yt-dlp", "not found", install_hint_ytdlp()),
    }
}

fn check_api_key(settings: &Settings, caps: &Capabilities) -> Vec<CheckResult> {
    let hint = format!("Set with: export {}='sk-...'", API_KEY_VAR);
    let mut results = Vec::new();

    let embeddings = match settings.embedding.provider {
        EmbeddingProvider::Hash => {
            CheckResult::ok("Embeddings", "local feature hashing, no key needed")
        }
        EmbeddingProvider::OpenAI if caps.api_key => CheckResult::ok(
            "Embeddings",
            &format!("{} ({} configured)", settings.embedding.model, API_KEY_VAR),
        ),
        EmbeddingProvider::OpenAI => CheckResult::error(
            "Embeddings",
            &format!("{} not set", API_KEY_VAR),
            &hint,
        ),
    };
    results.push(embeddings);

    let answers = match settings.rag.generator {
        GeneratorKind::Fallback => CheckResult::ok("Answers", "rule-based fallback"),
        GeneratorKind::Llm if caps.api_key => {
            CheckResult::ok("Answers", &format!("language model ({})", settings.rag.model))
        }
        GeneratorKind::Llm => CheckResult::warning(
            "Answers",
            "no API key, answers will use the rule-based fallback",
            &hint,
        ),
    };
    results.push(answers);

    results
}

fn check_storage(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        results.push(CheckResult::ok("Data directory", &data_dir.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        ));
    }

    let cache_dir = settings.transcripts_dir();
    let cached = std::fs::read_dir(&cache_dir)
        .map(|entries| entries.filter_map(|e| e.ok()).count())
        .unwrap_or(0);
    results.push(CheckResult::ok(
        "Transcript cache",
        &format!("{} ({} cached)", cache_dir.display(), cached),
    ));

    match settings.vector_store.provider.as_str() {
        "memory" => results.push(CheckResult::warning(
            "Vector store",
            "in-memory, nothing is persisted",
            "Set vector_store.provider = \"sqlite\" to keep the index",
        )),
        "sqlite" => {
            let db_path = settings.sqlite_path();
            if db_path.exists() {
                let size = std::fs::metadata(&db_path)
                    .map(|m| format_size(m.len()))
                    .unwrap_or_else(|_| "unknown size".to_string());
                results.push(CheckResult::ok(
                    "Vector store",
                    &format!("{} ({})", db_path.display(), size),
                ));
            } else {
                results.push(CheckResult::warning(
                    "Vector store",
                    &format!("{} (not created yet)", db_path.display()),
                    "Database will be created when the first video is added",
                ));
            }
        }
        other => results.push(CheckResult::error(
            "Vector store",
            &format!("unknown provider '{}'", other),
            "Supported providers: sqlite, memory",
        )),
    }

    results
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: vidqa config init",
        )
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}
