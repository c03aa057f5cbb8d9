use unicode_segmentation::UnicodeSegmentation;

/// Splits verse text into word and punctuation tokens on Unicode word
/// boundaries. Whitespace segments are dropped; punctuation segments are
/// kept so that token positions count them.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_word_bounds()
        .filter(|segment| !segment.chars().all(char::is_whitespace))
        .map(str::to_string)
        .collect()
}
