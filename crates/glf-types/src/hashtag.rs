//! Hashtag normalization.
//!
//! Raw hashtag input is free text such as `"#art, #new!"`. It is split on
//! every run of non-word characters, where a word character is an ASCII
//! letter, an ASCII digit or `_`. Empty pieces are discarded and repeated
//! tags keep only their first occurrence.

/// Returns `true` for characters that may appear inside a tag.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Normalize raw hashtag text into an ordered set of tags.
///
/// # Examples
///
/// ```
/// use glf_types::normalize_hashtags;
///
/// assert_eq!(normalize_hashtags("#art, #new!"), vec!["art", "new"]);
/// assert_eq!(normalize_hashtags("sun sun moon"), vec!["sun", "moon"]);
/// assert!(normalize_hashtags("  #!? ").is_empty());
/// ```
pub fn normalize_hashtags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for piece in raw.split(|c: char| !is_word_char(c)) {
        if piece.is_empty() || tags.iter().any(|t| t == piece) {
            continue;
        }
        tags.push(piece.to_string());
    }
    tags
}
