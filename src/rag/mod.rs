mod answer;
mod ingest;

pub use answer::{
    AnswerOutcome, BestMatch, Flashcard, FlashcardOutcome, NO_INFO_ANSWER, answer_question,
    create_flashcard, search_documents,
};
pub use ingest::{chunk_id, ingest_pdf};
