use serde::Serialize;
use thiserror::Error;

/// Heading discovered while rendering, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    pub id: String,
}

/// Result of rendering one Markdown document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutput {
    /// Sanitised HTML with `id` attributes on every heading.
    pub html: String,
    /// Text content with Markdown syntax and code blocks removed.
    pub plain_text: String,
    pub excerpt: String,
    pub word_count: usize,
    /// Minutes, rounded up.
    pub reading_time: usize,
    /// Image sources in document order.
    pub images: Vec<String>,
    pub headings: Vec<Heading>,
}

/// Text statistics for a post body, computed without producing HTML.
///
/// Shares its word counting with [`RenderOutput`], so listing cards and the post page agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSummary {
    pub excerpt: String,
    pub word_count: usize,
    pub reading_time: usize,
}

#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("markdown formatting failed: {message}")]
    Markdown { message: String },
    #[error("document processing failed: {message}")]
    Document { message: String },
}
