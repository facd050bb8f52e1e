//! Markdown rendering for post bodies and the editor preview.
//!
//! Rendering is pure: Markdown in, sanitised HTML plus derived text statistics out. The same
//! pipeline backs the public post page and the admin live preview, so what editors see is what
//! readers get.

mod config;
mod types;

use std::{cell::RefCell, collections::VecDeque, rc::Rc, sync::Arc};

use comrak::{
    Arena, format_html,
    nodes::{AstNode, NodeValue},
    parse_document,
};
use lol_html::{RewriteStrSettings, element, rewrite_str};
use once_cell::sync::Lazy;

use crate::domain::posts::{reading_time_minutes, truncate_at_word, word_count};
use crate::domain::slug::AnchorSlugger;

pub use types::{Heading, RenderError, RenderOutput, TextSummary};

/// Length of generated excerpts, in characters.
pub const EXCERPT_CHARS: usize = 200;

/// Comrak parser and Ammonia sanitiser configured once for the whole process.
pub struct MarkdownRenderer {
    options: comrak::Options<'static>,
    sanitizer: ammonia::Builder<'static>,
}

impl MarkdownRenderer {
    fn new() -> Self {
        Self {
            options: config::default_options(),
            sanitizer: config::build_sanitizer(),
        }
    }

    pub fn render(&self, markdown: &str) -> Result<RenderOutput, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &self.options);

        let headings = collect_headings(root);
        let images = collect_images(root);
        let plain_text = collect_plain_text(root);

        let mut html = String::new();
        format_html(root, &self.options, &mut html).map_err(|err| RenderError::Markdown {
            message: err.to_string(),
        })?;

        let html = self.sanitizer.clean(&html).to_string();
        let html = assign_heading_ids(&html, &headings)?;

        let summary = summarize_text(&plain_text, EXCERPT_CHARS);
        Ok(RenderOutput {
            html,
            excerpt: summary.excerpt,
            word_count: summary.word_count,
            reading_time: summary.reading_time,
            plain_text,
            images,
            headings,
        })
    }

    /// Excerpt and reading time of `markdown`. The excerpt is cut at the last whole word within
    /// `max` characters; `max == 0` keeps everything.
    pub fn summarize(&self, markdown: &str, max: usize) -> TextSummary {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &self.options);
        summarize_text(&collect_plain_text(root), max)
    }
}

fn summarize_text(plain_text: &str, max: usize) -> TextSummary {
    let words = word_count(plain_text);
    TextSummary {
        excerpt: truncate_at_word(plain_text, max),
        word_count: words,
        reading_time: reading_time_minutes(words),
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

static RENDERER: Lazy<Arc<MarkdownRenderer>> = Lazy::new(|| Arc::new(MarkdownRenderer::new()));

/// Access the shared renderer, initialised on first use.
pub fn render_service() -> Arc<MarkdownRenderer> {
    Arc::clone(&RENDERER)
}

pub fn summarize_markdown(markdown: &str, max: usize) -> TextSummary {
    RENDERER.summarize(markdown, max)
}

fn collect_headings<'a>(root: &'a AstNode<'a>) -> Vec<Heading> {
    let mut slugger = AnchorSlugger::new();
    let mut headings = Vec::new();

    for node in root.descendants() {
        let level = match &node.data.borrow().value {
            NodeValue::Heading(heading) => heading.level,
            _ => continue,
        };
        let text = collect_inline_text(node);
        let id = slugger
            .anchor_for(&text)
            .unwrap_or_else(|_| format!("section-{}", headings.len() + 1));
        headings.push(Heading { level, text, id });
    }

    headings
}

fn collect_images<'a>(root: &'a AstNode<'a>) -> Vec<String> {
    root.descendants()
        .filter_map(|node| match &node.data.borrow().value {
            NodeValue::Image(link) => Some(link.url.to_string()),
            _ => None,
        })
        .collect()
}

fn collect_plain_text<'a>(root: &'a AstNode<'a>) -> String {
    fn walk<'a>(node: &'a AstNode<'a>, buffer: &mut String) {
        let block = {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::CodeBlock(_) | NodeValue::HtmlBlock(_) => {
                    return;
                }
                NodeValue::Text(text) => {
                    buffer.push_str(text);
                    false
                }
                NodeValue::Code(code) => {
                    buffer.push_str(&code.literal);
                    false
                }
                NodeValue::SoftBreak | NodeValue::LineBreak => {
                    buffer.push(' ');
                    false
                }
                value => value.block(),
            }
        };

        for child in node.children() {
            walk(child, buffer);
        }
        if block {
            buffer.push('\n');
        }
    }

    let mut buffer = String::new();
    walk(root, &mut buffer);
    buffer.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_inline_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for descendant in node.descendants().skip(1) {
        match &descendant.data.borrow().value {
            NodeValue::Text(value) => text.push_str(value),
            NodeValue::Code(code) => text.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Give each `<h1>`…`<h6>` the anchor id of the matching entry in `headings`, in document order.
fn assign_heading_ids(html: &str, headings: &[Heading]) -> Result<String, RenderError> {
    if headings.is_empty() {
        return Ok(html.to_string());
    }

    let ids = Rc::new(RefCell::new(
        headings
            .iter()
            .map(|heading| heading.id.clone())
            .collect::<VecDeque<_>>(),
    ));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("h1, h2, h3, h4, h5, h6", {
                let ids = Rc::clone(&ids);
                move |el| {
                    if let Some(id) = ids.borrow_mut().pop_front() {
                        el.set_attribute("id", &id)?;
                    }
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| RenderError::Document {
        message: err.to_string(),
    })
}
