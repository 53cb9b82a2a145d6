//! Rule-based answers built from the passages themselves.

use super::{AnswerGenerator, ContextPassage};
use async_trait::async_trait;

const PREVIEW_CHARS: usize = 200;

/// Summarize the passages: which videos they come from, the opening
/// sentences of the best ones, and the question.
pub fn fallback_answer(question: &str, context: &[ContextPassage]) -> String {
    if context.is_empty() {
        return "I don't have enough information to answer your question. \
                Please make sure you've added video transcripts to the knowledge base."
            .to_string();
    }

    let mut videos: Vec<&str> = Vec::new();
    let mut snippets: Vec<&str> = Vec::new();
    for passage in context {
        let title = passage.metadata.video_title.as_str();
        if !videos.contains(&title) {
            videos.push(title);
        }
        snippets.extend(passage.document.split('.').take(2));
    }

    let joined = snippets.into_iter().take(3).collect::<Vec<_>>().join(". ");
    let preview: String = joined.chars().take(PREVIEW_CHARS).collect();

    format!(
        "Based on the video transcripts from: {}\n\n\
         Here's relevant content I found: {}...\n\n\
         I found this information related to your question: \"{}\". \
         For a fuller answer, configure a language model.",
        videos.join(", "),
        preview,
        question
    )
}

/// Generator that always answers with [`fallback_answer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackAnswerGenerator;

#[async_trait]
impl AnswerGenerator for FallbackAnswerGenerator {
    async fn generate(&self, question: &str, context: &[ContextPassage]) -> String {
        fallback_answer(question, context)
    }

    fn name(&self) -> &str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::tests::metadata;

    fn passage(video_id: &str, document: &str) -> ContextPassage {
        ContextPassage {
            document: document.to_string(),
            metadata: metadata(video_id, 0),
            similarity: 0.8,
        }
    }

    #[test]
    fn test_fallback_lists_videos_once_in_rank_order() {
        let context = vec![
            passage("b", "Bees dance. They share routes. Third sentence."),
            passage("a", "Ants march. In lines."),
            passage("b", "More bees."),
        ];
        let answer = fallback_answer("How do insects navigate?", &context);

        assert!(answer.starts_with("Based on the video transcripts from: Title of b, Title of a\n"));
        assert!(answer.contains("Here's relevant content I found: Bees dance.  They share routes. Ants march..."));
        assert!(answer.contains("\"How do insects navigate?\""));
    }

    #[test]
    fn test_preview_is_capped() {
        let long = "x".repeat(500);
        let answer = fallback_answer("q", &[passage("v", &long)]);
        let preview = answer
            .split("Here's relevant content I found: ")
            .nth(1)
            .and_then(|rest| rest.split("...").next())
            .unwrap();
        assert_eq!(preview.chars().count(), 200);
    }

    #[tokio::test]
    async fn test_generator_without_context() {
        let answer = FallbackAnswerGenerator.generate("q", &[]).await;
        assert!(answer.starts_with("I don't have enough information"));
    }
}
