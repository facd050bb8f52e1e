//! Rules for reader-submitted comments.

use serde::Deserialize;

pub const MIN_CONTENT_CHARS: usize = 10;

/// Raw comment form input.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommentDraft {
    pub name: String,
    pub email: String,
    pub website: String,
    pub content: String,
}

/// A draft that passed validation, with surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidComment {
    pub name: String,
    pub email: String,
    pub website: String,
    pub content: String,
}

/// Per-field messages for a rejected draft. At least one field is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentFieldErrors {
    pub name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub website: Option<&'static str>,
    pub content: Option<&'static str>,
}

impl CommentFieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.website.is_none()
            && self.content.is_none()
    }
}

impl CommentDraft {
    pub fn validate(&self) -> Result<ValidComment, CommentFieldErrors> {
        let name = self.name.trim();
        let email = self.email.trim();
        let website = self.website.trim();
        let content = self.content.trim();

        let mut errors = CommentFieldErrors::default();

        if name.is_empty() {
            errors.name = Some("Name is required");
        }

        if email.is_empty() {
            errors.email = Some("Email is required");
        } else if !looks_like_email(email) {
            errors.email = Some("Please enter a valid email address");
        }

        if content.is_empty() {
            errors.content = Some("Comment is required");
        } else if content.chars().count() < MIN_CONTENT_CHARS {
            errors.content = Some("Comment must be at least 10 characters long");
        }

        if !website.is_empty() && !looks_like_web_url(website) {
            errors.website = Some("Please enter a valid URL (including http:// or https://)");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidComment {
            name: name.to_string(),
            email: email.to_string(),
            website: website.to_string(),
            content: content.to_string(),
        })
    }
}

/// Somewhere in `value`: non-blank text, `@`, non-blank text, `.`, non-blank text.
pub fn looks_like_email(value: &str) -> bool {
    value.char_indices().any(|(at, ch)| {
        if ch != '@' {
            return false;
        }
        let before = value[..at].chars().next_back();
        if !before.is_some_and(|c| !c.is_whitespace()) {
            return false;
        }
        let domain: &str = value[at + 1..]
            .split(char::is_whitespace)
            .next()
            .unwrap_or_default();
        domain
            .char_indices()
            .any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < domain.len())
    })
}

fn looks_like_web_url(value: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        value
            .strip_prefix(scheme)
            .is_some_and(|rest| !rest.is_empty())
    })
}
