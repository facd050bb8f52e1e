//! Pure rules around posts: text statistics, tag selection and media paths.

use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

/// Words per minute used for reading-time estimates.
pub const WORDS_PER_MINUTE: usize = 200;
/// Default length for card excerpts.
pub const DEFAULT_TRUNCATE_CHARS: usize = 150;
/// Served when a post has no featured image.
pub const PLACEHOLDER_IMAGE: &str = "/static/public/placeholder.svg";

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:short] [day], [year]");
pub const LONG_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
pub const ADMIN_TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");
pub const CLOCK_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes needed to read `words` words, rounded up. Empty text takes zero minutes.
pub fn reading_time_minutes(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE)
}

pub fn format_reading_time(minutes: usize) -> String {
    if minutes < 1 {
        "< 1 min read".to_string()
    } else {
        format!("{minutes} min read")
    }
}

/// Cut `text` to at most `max` characters, appending `...` when anything was dropped.
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();
    format!("{}...", head.trim())
}

/// Like [`truncate_text`] but backs off to the last complete word.
pub fn truncate_at_word(text: &str, max: usize) -> String {
    let text = text.trim();
    if max == 0 || text.chars().count() <= max {
        return text.to_string();
    }

    let head: String = text.chars().take(max).collect();
    let cut = match head.rfind(' ') {
        Some(index) if index > 0 => &head[..index],
        _ => head.as_str(),
    };
    format!("{}...", cut.trim_end())
}

/// Resolve a stored media path against the API origin.
pub fn image_url(path: &str, api_origin: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        PLACEHOLDER_IMAGE.to_string()
    } else if path.starts_with("http") {
        path.to_string()
    } else {
        let origin = api_origin.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{origin}{path}")
        } else {
            format!("{origin}/{path}")
        }
    }
}

pub fn format_date(value: Option<OffsetDateTime>, format: &[FormatItem<'_>]) -> String {
    value
        .and_then(|timestamp| timestamp.format(format).ok())
        .unwrap_or_default()
}

/// Split a comma-separated tag field, trimming names and dropping blanks and repeats.
pub fn parse_tag_names(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        if !names.iter().any(|known| known.eq_ignore_ascii_case(name)) {
            names.push(name.to_string());
        }
    }
    names
}

/// Ordered set of tag names picked in the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSelection {
    names: Vec<String>,
}

impl TagSelection {
    pub fn from_field(raw: &str) -> Self {
        Self {
            names: parse_tag_names(raw),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove `name` when present (ignoring case), append it otherwise.
    pub fn toggle(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        match self.position(name) {
            Some(index) => {
                self.names.remove(index);
            }
            None => self.names.push(name.to_string()),
        }
    }

    pub fn to_field(&self) -> String {
        self.names.join(", ")
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .position(|known| known.eq_ignore_ascii_case(name.trim()))
    }
}

/// Options whose name contains `query`, ignoring case. A blank query keeps everything.
pub fn filter_options<'a>(options: &'a [String], query: &str) -> Vec<&'a str> {
    let needle = query.trim().to_lowercase();
    options
        .iter()
        .map(String::as_str)
        .filter(|option| needle.is_empty() || option.to_lowercase().contains(&needle))
        .collect()
}

/// Heading shown above a comment list.
pub fn comment_count_label(count: usize) -> String {
    if count == 1 {
        "1 Comment".to_string()
    } else {
        format!("{count} Comments")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_time_minutes(0), 0);
        assert_eq!(reading_time_minutes(1), 1);
        assert_eq!(reading_time_minutes(200), 1);
        assert_eq!(reading_time_minutes(201), 2);
        assert_eq!(format_reading_time(0), "< 1 min read");
        assert_eq!(format_reading_time(3), "3 min read");
    }

    #[test]
    fn word_count_splits_on_any_whitespace() {
        assert_eq!(word_count("  one\ttwo\nthree  "), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_text("short", 150), "short");
        assert_eq!(truncate_text("héllo wörld", 6), "héllo...");
    }

    #[test]
    fn truncate_at_word_backs_off_to_space() {
        assert_eq!(truncate_at_word("the quick brown fox", 12), "the quick...");
        assert_eq!(truncate_at_word("unbroken", 4), "unbr...");
        assert_eq!(truncate_at_word("fits", 10), "fits");
    }

    #[test]
    fn image_url_resolves_relative_paths() {
        assert_eq!(image_url("", "http://api"), PLACEHOLDER_IMAGE);
        assert_eq!(image_url("https://cdn/x.png", "http://api"), "https://cdn/x.png");
        assert_eq!(image_url("/uploads/a.png", "http://api/"), "http://api/uploads/a.png");
        assert_eq!(image_url("uploads/a.png", "http://api"), "http://api/uploads/a.png");
    }

    #[test]
    fn tag_names_dedupe_case_insensitively() {
        assert_eq!(parse_tag_names(" Rust, web,rust ,, Axum"), vec!["Rust", "web", "Axum"]);
    }

    #[test]
    fn tag_selection_toggles() {
        let mut selection = TagSelection::from_field("rust, web");
        selection.toggle("WEB");
        selection.toggle("axum");
        selection.toggle("  ");
        assert_eq!(selection.to_field(), "rust, axum");
        assert!(selection.contains("Rust"));
    }

    #[test]
    fn filter_options_is_case_insensitive() {
        let options = vec!["Rust".to_string(), "Trust".to_string(), "Web".to_string()];
        assert_eq!(filter_options(&options, "rus"), vec!["Rust", "Trust"]);
        assert_eq!(filter_options(&options, "").len(), 3);
    }

    #[test]
    fn dates_format_for_readers() {
        let when = datetime!(2024-01-02 03:04:05 UTC);
        assert_eq!(format_date(Some(when), HUMAN_DATE_FORMAT), "Jan 02, 2024");
        assert_eq!(format_date(Some(when), LONG_DATE_FORMAT), "January 2, 2024");
        assert_eq!(format_date(None, HUMAN_DATE_FORMAT), "");
    }

    #[test]
    fn comment_label_pluralizes() {
        assert_eq!(comment_count_label(1), "1 Comment");
        assert_eq!(comment_count_label(0), "0 Comments");
    }
}
