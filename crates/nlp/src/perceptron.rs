use std::collections::HashMap;
use std::fs;
use std::path::Path;

use concord_core::text::{PosTag, TaggedToken};
use serde::de::DeserializeOwned;

use crate::resources::ModelPaths;
use crate::tokenizer::tokenize;
use crate::{Annotator, NlpError};

const START: [&str; 2] = ["-START-", "-START2-"];
const END: [&str; 2] = ["-END-", "-END2-"];

/// Greedy averaged-perceptron part-of-speech tagger. Inference-only: the
/// weights, the tag dictionary of unambiguous words, and the class list
/// come from a pre-trained model on disk (the same JSON layout the
/// reference `averaged_perceptron_tagger_eng` distribution uses), so index
/// runs are reproducible for a fixed model.
pub struct PerceptronTagger {
    weights: HashMap<String, HashMap<String, f64>>,
    tagdict: HashMap<String, String>,
    classes: Vec<String>,
}

impl PerceptronTagger {
    pub fn load(paths: &ModelPaths) -> Result<Self, NlpError> {
        let weights = read_json(&paths.weights)?;
        let tagdict = read_json(&paths.tagdict)?;
        let classes = read_json(&paths.classes)?;
        Ok(Self::from_parts(weights, tagdict, classes))
    }

    pub fn from_parts(
        weights: HashMap<String, HashMap<String, f64>>,
        tagdict: HashMap<String, String>,
        mut classes: Vec<String>,
    ) -> Self {
        // Ascending order makes the scoring loop's >= comparison resolve
        // ties toward the lexicographically greatest class, matching the
        // reference tagger.
        classes.sort();
        classes.dedup();
        Self {
            weights,
            tagdict,
            classes,
        }
    }

    /// Tags tokens in order. Unambiguous words short-circuit through the
    /// tag dictionary; everything else is scored against the weights with
    /// the two previous predictions as context.
    pub fn tag(&self, tokens: &[String]) -> Vec<TaggedToken> {
        let mut context: Vec<String> = Vec::with_capacity(tokens.len() + 4);
        context.extend(START.iter().map(|s| s.to_string()));
        context.extend(tokens.iter().map(|token| normalize_token(token)));
        context.extend(END.iter().map(|s| s.to_string()));

        let mut prev = START[0].to_string();
        let mut prev2 = START[1].to_string();
        let mut output = Vec::with_capacity(tokens.len());
        for (index, token) in tokens.iter().enumerate() {
            let tag = match self.tagdict.get(token.as_str()) {
                Some(tag) => tag.clone(),
                None => {
                    let features = extract_features(index, token, &context, &prev, &prev2);
                    self.predict(&features)
                }
            };
            output.push(TaggedToken {
                text: token.clone(),
                tag: PosTag::new(tag.clone()),
            });
            prev2 = std::mem::replace(&mut prev, tag);
        }
        output
    }

    fn predict(&self, features: &[String]) -> String {
        let mut scores: HashMap<&str, f64> = HashMap::new();
        for feature in features {
            if let Some(class_weights) = self.weights.get(feature) {
                for (class, weight) in class_weights {
                    *scores.entry(class.as_str()).or_insert(0.0) += weight;
                }
            }
        }
        let mut best: Option<(&str, f64)> = None;
        for class in &self.classes {
            let score = scores.get(class.as_str()).copied().unwrap_or(0.0);
            match best {
                Some((_, best_score)) if score < best_score => {}
                _ => best = Some((class, score)),
            }
        }
        best.map(|(class, _)| class.to_string()).unwrap_or_default()
    }
}

/// Combines the word-boundary tokenizer with the perceptron tagger behind
/// the `Annotator` boundary.
pub struct PerceptronAnnotator {
    tagger: PerceptronTagger,
}

impl PerceptronAnnotator {
    pub fn new(tagger: PerceptronTagger) -> Self {
        Self { tagger }
    }
}

impl Annotator for PerceptronAnnotator {
    fn annotate(&self, text: &str) -> Vec<TaggedToken> {
        self.tagger.tag(&tokenize(text))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, NlpError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Context normalization from the reference tagger: hyphenated words,
/// four-digit years, and leading-digit tokens collapse onto markers, the
/// rest is lowercased.
fn normalize_token(token: &str) -> String {
    let first = token.chars().next();
    if token.contains('-') && first != Some('-') {
        return "!HYPHEN".to_string();
    }
    if token.chars().count() == 4 && token.chars().all(|ch| ch.is_ascii_digit()) {
        return "!YEAR".to_string();
    }
    if first.is_some_and(|ch| ch.is_ascii_digit()) {
        return "!DIGITS".to_string();
    }
    token.to_lowercase()
}

fn suffix3(value: &str) -> String {
    let count = value.chars().count();
    value.chars().skip(count.saturating_sub(3)).collect()
}

fn extract_features(
    index: usize,
    token: &str,
    context: &[String],
    prev: &str,
    prev2: &str,
) -> Vec<String> {
    let i = index + START.len();
    let first = token.chars().next().map(String::from).unwrap_or_default();
    vec![
        "bias".to_string(),
        format!("i suffix {}", suffix3(token)),
        format!("i pref1 {first}"),
        format!("i-1 tag {prev}"),
        format!("i-2 tag {prev2}"),
        format!("i tag+i-2 tag {prev} {prev2}"),
        format!("i word {}", context[i]),
        format!("i-1 tag+i word {prev} {}", context[i]),
        format!("i-1 word {}", context[i - 1]),
        format!("i-1 suffix {}", suffix3(&context[i - 1])),
        format!("i-2 word {}", context[i - 2]),
        format!("i+1 word {}", context[i + 1]),
        format!("i+1 suffix {}", suffix3(&context[i + 1])),
        format!("i+2 word {}", context[i + 2]),
    ]
}
