// This file is part of the product Homestead.
// SPDX-FileCopyrightText: 2025-2026 Homestead Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::HashSet;
use std::fmt;

pub const NAME_LENGTH_MAX: usize = 25;
pub const NAME_WORDS_MAX: usize = 1;
pub const MAX_SITE_TAGS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    TooManySpaces(String),
    InvalidChars(String),
    TooManyWords(String),
    TooLong(String),
    TooManyTags,
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagError::TooManySpaces(tag) => {
                write!(f, "Tag \"{}\" cannot have spaces next to each other", tag)
            }
            TagError::InvalidChars(tag) => write!(
                f,
                "Tag \"{}\" can only contain letters, numbers, spaces, dashes and underscores",
                tag
            ),
            TagError::TooManyWords(tag) => {
                let unit = if NAME_WORDS_MAX == 1 { "word" } else { "words" };
                write!(
                    f,
                    "Tag \"{}\" cannot be more than {} {}",
                    tag, NAME_WORDS_MAX, unit
                )
            }
            TagError::TooLong(tag) => write!(
                f,
                "Tag \"{}\" cannot be longer than {} characters",
                tag, NAME_LENGTH_MAX
            ),
            TagError::TooManyTags => write!(
                f,
                "Cannot have more than {} tags for your site",
                MAX_SITE_TAGS
            ),
        }
    }
}

impl std::error::Error for TagError {}

/// Parse a free-text, comma-separated tag list into canonical tag names.
///
/// Candidates are trimmed and lowercased; duplicates are silently dropped
/// while first-occurrence order is preserved. Empty input is a valid empty
/// list. Per-candidate checks run before the overall count check so a
/// malformed tag is reported even when the list is also over the cap.
pub fn normalize_tags(raw: &str) -> Result<Vec<String>, TagError> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for candidate in raw.split(',') {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            continue;
        }
        validate_tag_name(trimmed)?;
        let name = trimmed.to_ascii_lowercase();
        if seen.insert(name.clone()) {
            tags.push(name);
        }
    }
    if tags.len() > MAX_SITE_TAGS {
        return Err(TagError::TooManyTags);
    }
    Ok(tags)
}

// Check order matters for error selection: repeated spaces, then charset,
// then word count, then length. A two-word candidate with a bad symbol
// reports the bad symbol, not the word count.
fn validate_tag_name(tag: &str) -> Result<(), TagError> {
    if tag.contains("  ") {
        return Err(TagError::TooManySpaces(tag.to_string()));
    }
    if !tag
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == ' ' || ch == '-' || ch == '_')
    {
        return Err(TagError::InvalidChars(tag.to_string()));
    }
    if tag.split(' ').filter(|word| !word.is_empty()).count() > NAME_WORDS_MAX {
        return Err(TagError::TooManyWords(tag.to_string()));
    }
    if tag.chars().count() > NAME_LENGTH_MAX {
        return Err(TagError::TooLong(tag.to_string()));
    }
    Ok(())
}
