//! Retrieval-augmented answering: embed the question, pull nearby chunks from
//! the vector store, and hand them to the generation client as context.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::genai::{EmbedTask, EmbeddingClient, GenerationClient};
use crate::types::ScoredChunk;
use crate::vector::VectorStore;

const ANSWER_LIMIT: usize = 10;
const SEARCH_LIMIT: usize = 5;

pub const NO_INFO_ANSWER: &str = "I couldn't find any relevant information in the documents.";

/// Result of answering a question.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub answer: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

/// The single best semantic-search hit.
#[derive(Debug, Clone, Serialize)]
pub struct BestMatch {
    pub score: f32,
    pub text: String,
    pub page: u32,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// A flashcard, or the raw model output when it was not the JSON we asked for.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FlashcardOutcome {
    Card(Flashcard),
    Unparseable { error: String, raw: String },
}

fn citation(chunk: &ScoredChunk) -> String {
    format!("{} (Page {})", chunk.payload.filename, chunk.payload.page)
}

fn build_prompt(context: &str, question: &str) -> String {
    format!("Context: {context}\n\nQuestion: {question}\nAnswer:")
}

fn flashcard_prompt(context: &str) -> String {
    format!(
        "You are an educational AI. Based strictly on the context below, create a flashcard.\n\
         Return ONLY valid JSON in this format: {{ \"question\": \"...\", \"answer\": \"...\" }}\n\
         Do not add Markdown formatting like ```json.\n\n\
         Context:\n{context}"
    )
}

/// Strips markdown code fences the model sometimes wraps JSON in.
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Answers a question from ingested documents.
///
/// Returns the fixed no-information answer without calling the generation
/// client when retrieval comes back empty.
pub async fn answer_question(
    embedder: &dyn EmbeddingClient,
    vectors: &dyn VectorStore,
    generator: &dyn GenerationClient,
    question: &str,
) -> Result<AnswerOutcome> {
    let query_vector = embedder.embed(question, EmbedTask::Query).await?;
    let hits = vectors.search(&query_vector, ANSWER_LIMIT).await?;

    if hits.is_empty() {
        return Ok(AnswerOutcome {
            answer: NO_INFO_ANSWER.to_string(),
            sources: Vec::new(),
        });
    }

    let mut sources: Vec<String> = hits.iter().map(citation).collect();
    sources.sort();
    sources.dedup();

    let context: Vec<&str> = hits.iter().map(|h| h.payload.text.as_str()).collect();
    let prompt = build_prompt(&context.join("\n"), question);

    let answer = generator.generate(&prompt).await?;

    Ok(AnswerOutcome { answer, sources })
}

/// Returns the single best match for a query, or None when nothing is stored.
pub async fn search_documents(
    embedder: &dyn EmbeddingClient,
    vectors: &dyn VectorStore,
    query: &str,
) -> Result<Option<BestMatch>> {
    let query_vector = embedder.embed(query, EmbedTask::Query).await?;
    let hits = vectors.search(&query_vector, SEARCH_LIMIT).await?;

    Ok(hits.into_iter().next().map(|best| BestMatch {
        score: best.score,
        text: best.payload.text,
        page: best.payload.page,
        filename: best.payload.filename,
    }))
}

/// Generates a question/answer flashcard from the best match for a topic.
///
/// Returns `Ok(None)` when nothing relevant is stored. A model response that
/// fails to parse as JSON becomes [`FlashcardOutcome::Unparseable`] instead of
/// an error, so callers can surface the raw text.
pub async fn create_flashcard(
    embedder: &dyn EmbeddingClient,
    vectors: &dyn VectorStore,
    generator: &dyn GenerationClient,
    topic: &str,
) -> Result<Option<(BestMatch, FlashcardOutcome)>> {
    let Some(best) = search_documents(embedder, vectors, topic).await? else {
        return Ok(None);
    };

    let raw = generator.generate(&flashcard_prompt(&best.text)).await?;
    let cleaned = strip_code_fences(&raw);

    let outcome = match serde_json::from_str::<Flashcard>(&cleaned) {
        Ok(card) => FlashcardOutcome::Card(card),
        Err(e) => FlashcardOutcome::Unparseable {
            error: format!("Failed to parse AI response: {e}"),
            raw: cleaned,
        },
    };

    Ok(Some((best, outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkPayload;

    fn chunk(text: &str, filename: &str, page: u32) -> ScoredChunk {
        ScoredChunk {
            score: 0.9,
            payload: ChunkPayload {
                text: text.to_string(),
                filename: filename.to_string(),
                page,
            },
        }
    }

    #[test]
    fn test_prompt_shape() {
        let prompt = build_prompt("some context", "a question?");
        assert_eq!(prompt, "Context: some context\n\nQuestion: a question?\nAnswer:");
    }

    #[test]
    fn test_citation_format() {
        let c = citation(&chunk("x", "notes.pdf", 4));
        assert_eq!(c, "notes.pdf (Page 4)");
    }

    #[test]
    fn test_strip_code_fences() {
        let raw = "```json\n{\"question\": \"q\", \"answer\": \"a\"}\n```";
        let cleaned = strip_code_fences(raw);
        let card: Flashcard = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(card.question, "q");
        assert_eq!(card.answer, "a");
    }

    #[test]
    fn test_strip_code_fences_plain_text() {
        assert_eq!(strip_code_fences("  plain  "), "plain");
    }

    #[test]
    fn test_citations_deduped() {
        let hits = vec![
            chunk("a", "notes.pdf", 1),
            chunk("b", "notes.pdf", 1),
            chunk("c", "other.pdf", 2),
        ];
        let mut sources: Vec<String> = hits.iter().map(citation).collect();
        sources.sort();
        sources.dedup();
        assert_eq!(sources, vec!["notes.pdf (Page 1)", "other.pdf (Page 2)"]);
    }
}
