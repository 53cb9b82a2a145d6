//! Prompt context formatting.

use super::ContextPassage;

/// Format seconds as `m:ss`.
pub fn short_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format passages for a prompt, numbered from 1.
pub fn format_context(passages: &[ContextPassage]) -> String {
    if passages.is_empty() {
        return "No relevant context found.".to_string();
    }

    passages
        .iter()
        .enumerate()
        .map(|(i, passage)| {
            let meta = &passage.metadata;
            let at = meta
                .start_time
                .map(|t| format!(" (at {})", short_timestamp(t)))
                .unwrap_or_default();
            format!(
                "Source {}: {} by {}{}\nContent: {}\n",
                i + 1,
                meta.video_title,
                meta.uploader,
                at,
                passage.document
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::tests::metadata;

    #[test]
    fn test_short_timestamp() {
        assert_eq!(short_timestamp(0.0), "0:00");
        assert_eq!(short_timestamp(65.9), "1:05");
        assert_eq!(short_timestamp(3725.0), "62:05");
    }

    #[test]
    fn test_format_context() {
        let mut timed = metadata("v", 0);
        timed.start_time = Some(125.0);
        let passages = vec![
            ContextPassage {
                document: "First passage.".to_string(),
                metadata: timed,
                similarity: 0.9,
            },
            ContextPassage {
                document: "Second passage.".to_string(),
                metadata: metadata("w", 2),
                similarity: 0.5,
            },
        ];

        assert_eq!(
            format_context(&passages),
            "Source 1: Title of v by Uploader (at 2:05)\nContent: First passage.\n\n\
             Source 2: Title of w by Uploader\nContent: Second passage.\n"
        );
        assert_eq!(format_context(&[]), "No relevant context found.");
    }
}
