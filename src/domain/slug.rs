//! Slug helpers for post URLs and heading anchors.
//!
//! Editor suggestions use the plain ASCII rule in [`slugify_title`]. When a title has no ASCII
//! letters at all (for example “基础教程”), [`suggest_slug`] falls back to [`derive_slug`], which
//! transliterates Chinese through `pinyin` before handing the text to the `slug` crate.

use std::collections::HashMap;

use pinyin::{Pinyin, ToPinyin};
use slug::slugify;
use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("cannot derive a slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("no free slug left for `{base}`")]
    Exhausted { base: String },
}

/// Lowercase the title, collapse every run of characters outside `[a-z0-9]` into one `-`, and
/// strip dashes from both ends.
pub fn slugify_title(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Slug offered by the editor for a title: the ASCII rule first, transliteration when that yields
/// nothing. Returns an empty string for titles that cannot produce a slug.
pub fn suggest_slug(title: &str) -> String {
    let plain = slugify_title(title);
    if !plain.is_empty() {
        return plain;
    }
    derive_slug(title).unwrap_or_default()
}

/// Derive a slug with transliteration of Chinese characters.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(transliterate(input));
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Find a slug for `input` that `is_free` accepts, trying `base`, `base-2`, `base-3`, …
pub fn generate_unique_slug<F>(input: &str, mut is_free: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> bool,
{
    let base = match slugify_title(input) {
        plain if !plain.is_empty() => plain,
        _ => derive_slug(input)?,
    };

    if is_free(&base) {
        return Ok(base);
    }

    (2..=MAX_SUFFIX_ATTEMPTS + 1)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| is_free(candidate))
        .ok_or(SlugError::Exhausted { base })
}

/// Hands out heading anchors for one document, suffixing repeats (`intro`, `intro-2`, …).
#[derive(Default, Debug)]
pub struct AnchorSlugger {
    seen: HashMap<String, usize>,
}

impl AnchorSlugger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor_for(&mut self, heading: &str) -> Result<String, SlugError> {
        let base = derive_slug(heading)?;
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;

        Ok(match *count {
            1 => base,
            n => format!("{base}-{n}"),
        })
    }
}

fn transliterate(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for ch in input.chars() {
        if ch.is_ascii() {
            output.push(ch);
            continue;
        }

        match ch.to_pinyin() {
            Some(py) => push_syllable(&mut output, py),
            None if ch.is_whitespace() => output.push(' '),
            None => output.push(ch),
        }
    }

    output
}

fn push_syllable(buffer: &mut String, pinyin: Pinyin) {
    if !buffer.is_empty() && !buffer.ends_with(' ') {
        buffer.push(' ');
    }
    buffer.push_str(pinyin.plain());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_title_collapses_separators() {
        assert_eq!(slugify_title("  Hello, World!  "), "hello-world");
        assert_eq!(slugify_title("Rust 2024: What's New?"), "rust-2024-what-s-new");
        assert_eq!(slugify_title("---"), "");
    }

    #[test]
    fn suggest_slug_falls_back_to_pinyin() {
        assert_eq!(suggest_slug("基础教程"), "ji-chu-jiao-cheng");
        assert_eq!(suggest_slug("Rust Tips"), "rust-tips");
        assert_eq!(suggest_slug("   "), "");
    }

    #[test]
    fn derive_slug_transliterates_mixed_input() {
        assert_eq!(derive_slug("Rust 基础教程").expect("slug"), "rust-ji-chu-jiao-cheng");
        assert_eq!(derive_slug(" "), Err(SlugError::EmptyInput));
    }

    #[test]
    fn unique_slug_skips_taken_candidates() {
        let taken = ["release-notes", "release-notes-2"];
        let slug = generate_unique_slug("Release Notes", |candidate| !taken.contains(&candidate))
            .expect("unique slug");
        assert_eq!(slug, "release-notes-3");
    }

    #[test]
    fn unique_slug_gives_up_after_limit() {
        let result = generate_unique_slug("Example", |_| false);
        assert_eq!(
            result,
            Err(SlugError::Exhausted {
                base: "example".to_string()
            })
        );
    }

    #[test]
    fn anchors_are_unique_within_a_document() {
        let mut slugger = AnchorSlugger::new();
        assert_eq!(slugger.anchor_for("Overview").expect("slug"), "overview");
        assert_eq!(slugger.anchor_for("Overview").expect("slug"), "overview-2");
        assert_eq!(slugger.anchor_for("深入理解").expect("slug"), "shen-ru-li-jie");
    }
}
