use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use quill::auth::{PasswordHasher, TokenSigner};
use quill::error::{Error, Result};
use quill::genai::{EmbedTask, EmbeddingClient, GenerationClient};
use quill::server::{AppState, create_router};
use quill::store::{SqliteStore, Store};
use quill::vector::MemoryStore;

/// Deterministic fake embedder: the vector is a pure function of the text, so
/// ingesting the same page twice produces the same point.
pub struct FakeEmbedder;

#[async_trait]
impl EmbeddingClient for FakeEmbedder {
    async fn embed(&self, text: &str, _task: EmbedTask) -> Result<Vec<f32>> {
        let bytes = text.as_bytes();
        let sum: u32 = bytes.iter().map(|&b| b as u32).sum();
        let len = bytes.len() as f32;
        let first = bytes.first().copied().unwrap_or(0) as f32;
        Ok(vec![1.0, (sum % 97) as f32 / 97.0, len.ln_1p(), first / 255.0])
    }
}

/// Embedder that fails for any text containing `fail_on` and otherwise
/// behaves like [`FakeEmbedder`], for exercising the per-page drop and
/// rate-limit abort rules during ingestion.
pub struct FailingEmbedder {
    pub fail_on: String,
    pub rate_limited: bool,
}

#[async_trait]
impl EmbeddingClient for FailingEmbedder {
    async fn embed(&self, text: &str, task: EmbedTask) -> Result<Vec<f32>> {
        if text.contains(&self.fail_on) {
            return Err(if self.rate_limited {
                Error::RateLimitExceeded(5)
            } else {
                Error::Upstream("embedding backend rejected input".to_string())
            });
        }
        FakeEmbedder.embed(text, task).await
    }
}

/// Fake generator returning a canned answer and counting calls, so tests can
/// assert that empty retrieval never reaches generation.
pub struct FakeGenerator {
    pub reply: String,
    pub calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for FakeGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

pub struct TestApp {
    pub router: axum::Router,
    pub vectors: Arc<MemoryStore>,
    pub generator: Arc<FakeGenerator>,
    _temp_dir: TempDir,
}

pub fn test_app(generator_reply: &str) -> TestApp {
    test_app_with_embedder(generator_reply, Arc::new(FakeEmbedder))
}

pub fn test_app_with_embedder(
    generator_reply: &str,
    embedder: Arc<dyn EmbeddingClient>,
) -> TestApp {
    let temp_dir = TempDir::new().expect("create temp dir");
    let store = SqliteStore::new(temp_dir.path().join("quill.db")).expect("open db");
    store.initialize().expect("initialize schema");

    let vectors = Arc::new(MemoryStore::new());
    let generator = Arc::new(FakeGenerator::new(generator_reply));

    let state = Arc::new(AppState {
        store: Arc::new(store),
        vectors: vectors.clone(),
        embedder,
        generator: generator.clone(),
        tokens: TokenSigner::new("test-secret"),
        passwords: PasswordHasher::new(),
    });

    TestApp {
        router: create_router(state),
        vectors,
        generator,
        _temp_dir: temp_dir,
    }
}

/// Builds a PDF where each entry in `pages` becomes one page of text.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("serialize pdf");
    buf
}

/// Encodes a single-file multipart/form-data body.
pub fn multipart_body(boundary: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
