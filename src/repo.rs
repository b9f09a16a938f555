use serde::Serialize;

use crate::utils::format_compact;

pub const MAX_CHARS_PER_LINE: usize = 55;
pub const MAX_DESCRIPTION_LINES: usize = 3;

const DEFAULT_DESCRIPTION: &str = "No description provided";
const DEFAULT_LANGUAGE: &str = "N/A";
const DEFAULT_LANGUAGE_COLOR: &str = "#ccc";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Language {
    pub name: String,
    pub color: Option<String>,
}

/// Repository fields shown on a pinned-repository card.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Repository {
    pub name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub language: Option<Language>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoCard {
    pub name: String,
    pub description_lines: Vec<String>,
    pub language: String,
    pub language_color: String,
    pub stars: String,
    pub forks: String,
}

pub fn build_repo_card(repo: &Repository, show_description: bool) -> RepoCard {
    let description_lines = if show_description {
        let description = repo.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION);
        wrap_text(description, MAX_CHARS_PER_LINE, MAX_DESCRIPTION_LINES)
    } else {
        Vec::new()
    };

    let (language, language_color) = match &repo.language {
        Some(lang) => (
            lang.name.clone(),
            lang.color
                .clone()
                .unwrap_or_else(|| DEFAULT_LANGUAGE_COLOR.to_string()),
        ),
        None => (
            DEFAULT_LANGUAGE.to_string(),
            DEFAULT_LANGUAGE_COLOR.to_string(),
        ),
    };

    RepoCard {
        name: repo.name.clone(),
        description_lines,
        language,
        language_color,
        stars: format_compact(repo.stars),
        forks: format_compact(repo.forks),
    }
}

/// Greedy word wrap on single spaces. When more text remains after
/// `max_lines` lines, the last kept line ends in `...`.
pub fn wrap_text(text: &str, line_limit: usize, max_lines: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        if current.chars().count() + word.chars().count() + 1 > line_limit {
            lines.push(std::mem::take(&mut current));
            if lines.len() >= max_lines {
                if let Some(last) = lines.last_mut() {
                    let len = last.chars().count();
                    if len > 3 {
                        let kept: String = last.chars().take(len - 3).collect();
                        *last = format!("{}...", kept);
                    }
                }
                return lines;
            }
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
