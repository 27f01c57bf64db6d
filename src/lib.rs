#![deny(missing_docs)]

//! Core library for the legal document summarizer.

/// HTTP routing and upload handlers.
pub mod api;
/// Chat-completion client abstraction and the Azure OpenAI adapter.
pub mod completion;
/// Environment-driven configuration management.
pub mod config;
/// Plain-text extraction from PDF, DOCX, and TXT documents.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Pipeline counters.
pub mod metrics;
/// Model response normalization into the canonical summary shape.
pub mod normalize;
/// Per-document and batch summarization orchestration.
pub mod pipeline;
/// Prompt construction and input truncation.
pub mod prompt;
/// Markdown and JSON report rendering.
pub mod render;
/// Summary data model and per-document result types.
pub mod summary;
