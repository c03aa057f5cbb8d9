//! Token-level rules shared by the annotator and the indexing pipeline:
//! which tokens are indexed, how proper nouns are recognized, and how the
//! stored word form is derived.

/// Tag prefix marking the proper-noun categories of the Penn Treebank tag
/// set (`NNP`, `NNPS`).
pub const PROPER_NOUN_PREFIX: &str = "NNP";

/// A part-of-speech tag as emitted by the tagging capability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PosTag(String);

impl PosTag {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_proper_noun(&self) -> bool {
        self.0.starts_with(PROPER_NOUN_PREFIX)
    }
}

/// One token of verse text together with its part-of-speech tag, in the
/// order produced by the annotator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedToken {
    pub text: String,
    pub tag: PosTag,
}

impl TaggedToken {
    pub fn new(text: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: PosTag::new(tag.into()),
        }
    }
}

/// A token enters the index iff its first character is an ASCII letter.
/// Drops punctuation, numbers, and tokens starting with non-letters.
pub fn is_indexable(token: &str) -> bool {
    token.chars().next().is_some_and(|ch| ch.is_ascii_alphabetic())
}

/// Stored word form: proper nouns keep their casing, everything else is
/// lowercased. Two tokens share a word row only when the results are
/// identical strings.
pub fn normalize(token: &str, is_proper_noun: bool) -> String {
    if is_proper_noun {
        token.to_string()
    } else {
        token.to_lowercase()
    }
}
