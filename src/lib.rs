//! # Quill
//!
//! A blog API with bearer-token auth plus a PDF question-answering backend,
//! usable both as a standalone binary and as a library.
//!
//! The blog half persists users and posts in SQLite; the RAG half ingests
//! PDFs page by page into a vector store and answers questions by retrieving
//! nearby chunks and forwarding them as context to a hosted generation API.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quill::server::{AppState, create_router};
//! use quill::store::SqliteStore;
//!
//! let store = SqliteStore::new("./data/quill.db").unwrap();
//! store.initialize().unwrap();
//! // Build vector store and genai clients, then:
//! // let router = create_router(Arc::new(AppState { ... }));
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod genai;
pub mod rag;
pub mod server;
pub mod store;
pub mod types;
pub mod vector;
