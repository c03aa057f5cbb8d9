use concord_core::text::{is_indexable, normalize};
use concord_nlp::Annotator;
use concord_storage::{IndexBatch, IndexStore, StoreError};
use std::collections::HashMap;

/// The run's word→id map, owned by the pipeline and built fresh each run.
/// Keyed by the normalized stored form; the proper-noun flag of a row is
/// fixed by the first occurrence that inserts it.
struct Lexicon {
    ids: HashMap<String, i64>,
}

impl Lexicon {
    fn new() -> Self {
        Self {
            ids: HashMap::new(),
        }
    }

    /// First sight inserts the word row (frequency 1) and caches its id;
    /// every later sight bumps the stored frequency and reuses the id.
    fn observe(
        &mut self,
        batch: &IndexBatch<'_>,
        word: &str,
        is_proper_noun: bool,
    ) -> Result<i64, StoreError> {
        if let Some(&id) = self.ids.get(word) {
            batch.bump_frequency(id)?;
            return Ok(id);
        }
        let id = batch.insert_word(word, is_proper_noun)?;
        self.ids.insert(word.to_string(), id);
        Ok(id)
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}

pub struct IndexSummary {
    pub translation: String,
    pub verses: usize,
    pub unique_words: usize,
    pub occurrences: u64,
}

/// The indexing pass: rebuild the index schema, walk all verses in id
/// order, record retained tokens, commit at verse-id multiples of
/// `commit_every`, then build lookup indexes and compact the store.
pub fn run_index(
    store: &mut IndexStore,
    annotator: &dyn Annotator,
    commit_every: i64,
) -> Result<IndexSummary, StoreError> {
    let translation = store.translation().as_str().to_string();
    match store.translation_title()? {
        Some(title) => println!("Indexing {title} ({translation})."),
        None => println!("Indexing {translation}."),
    }

    if store.create_index_schema()? {
        println!("Word index for {translation} already exists. Dropping and recreating.");
    }

    let verses = store.read_verses()?;
    let mut lexicon = Lexicon::new();
    let mut occurrences: u64 = 0;

    let mut batch = store.batch()?;
    for verse in &verses {
        // Positions count every tagged token, including the punctuation and
        // numbers filtered out below.
        for (position, token) in annotator.annotate(&verse.text).iter().enumerate() {
            if !is_indexable(&token.text) {
                continue;
            }
            let is_proper_noun = token.tag.is_proper_noun();
            let word = normalize(&token.text, is_proper_noun);
            let word_id = lexicon.observe(&batch, &word, is_proper_noun)?;
            batch.insert_occurrence(word_id, verse.id, position)?;
            occurrences += 1;
        }

        if verse.id % commit_every == 0 {
            batch.commit()?;
            println!(
                "Processed {} verses... ({} {}:{})",
                verse.id, verse.book, verse.chapter, verse.verse
            );
            batch = store.batch()?;
        }
    }
    batch.commit()?;

    store.create_lookup_indexes()?;

    println!("Optimizing database...");
    store.analyze()?;
    let report = store.compact()?;
    println!("Database size before VACUUM: {} bytes", report.before_bytes);
    println!("Database size after VACUUM: {} bytes", report.after_bytes);
    println!("Space reclaimed: {} bytes", report.reclaimed_bytes());

    Ok(IndexSummary {
        translation,
        verses: verses.len(),
        unique_words: lexicon.len(),
        occurrences,
    })
}
