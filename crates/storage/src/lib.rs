#![forbid(unsafe_code)]

use concord_core::ids::{TranslationCode, TranslationCodeError};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    MissingDatabase(PathBuf),
    InvalidInput(&'static str),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::MissingDatabase(path) => {
                write!(f, "database file '{}' does not exist", path.display())
            }
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

fn invalid_translation(err: TranslationCodeError) -> StoreError {
    StoreError::InvalidInput(match err {
        TranslationCodeError::Empty => "translation code must not be empty",
        TranslationCodeError::TooLong => "translation code is too long",
        TranslationCodeError::InvalidFirstChar => {
            "translation code must start with an ASCII letter or digit"
        }
        TranslationCodeError::InvalidChar { .. } => {
            "translation code contains an unsupported character"
        }
        TranslationCodeError::NoFileName => "database path has no file name",
    })
}

/// One verse of source text, joined with its book name for progress lines.
#[derive(Clone, Debug)]
pub struct VerseRow {
    pub id: i64,
    pub text: String,
    pub book: String,
    pub chapter: i64,
    pub verse: i64,
}

#[derive(Clone, Copy, Debug)]
pub struct CompactionReport {
    pub before_bytes: u64,
    pub after_bytes: u64,
}

impl CompactionReport {
    pub fn reclaimed_bytes(&self) -> u64 {
        self.before_bytes.saturating_sub(self.after_bytes)
    }
}

/// Repository over one translation database. All SQL lives here; physical
/// table names are resolved from the validated translation code, never from
/// caller strings.
#[derive(Debug)]
pub struct IndexStore {
    conn: Connection,
    db_path: PathBuf,
    translation: TranslationCode,
}

impl IndexStore {
    /// Opens an existing translation database. The file must already exist:
    /// this system indexes pre-imported text and never creates stores.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref().to_path_buf();
        if !db_path.is_file() {
            return Err(StoreError::MissingDatabase(db_path));
        }
        let translation = TranslationCode::from_db_path(&db_path).map_err(invalid_translation)?;
        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn,
            db_path,
            translation,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn translation(&self) -> &TranslationCode {
        &self.translation
    }

    /// Display title from the optional global `translations` metadata
    /// table. Absence of the table or the row is not an error.
    pub fn translation_title(&self) -> Result<Option<String>, StoreError> {
        if !self.table_exists("translations")? {
            return Ok(None);
        }
        let title = self
            .conn
            .query_row(
                "SELECT title FROM translations WHERE translation = ?1",
                params![self.translation.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(title)
    }

    /// Drops any index tables left by a prior run (occurrences before
    /// words, to respect the reference) and recreates both empty. Returns
    /// whether a prior index was dropped. Destructive by design: every run
    /// starts from a clean slate.
    pub fn create_index_schema(&mut self) -> Result<bool, StoreError> {
        let words = self.table("words");
        let occurrences = self.table("word_occurrences");
        let verses = self.table("verses");
        let had_previous =
            self.table_exists(&words)? || self.table_exists(&occurrences)?;

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {occurrences};\n\
             DROP TABLE IF EXISTS {words};\n\
             CREATE TABLE {words} (\n\
               id INTEGER PRIMARY KEY AUTOINCREMENT,\n\
               word TEXT UNIQUE,\n\
               is_proper_noun BOOLEAN,\n\
               frequency INTEGER DEFAULT 0\n\
             );\n\
             CREATE TABLE {occurrences} (\n\
               id INTEGER PRIMARY KEY AUTOINCREMENT,\n\
               word_id INTEGER,\n\
               verse_id INTEGER,\n\
               position INTEGER,\n\
               FOREIGN KEY(word_id) REFERENCES {words}(id),\n\
               FOREIGN KEY(verse_id) REFERENCES {verses}(id)\n\
             );"
        ))?;
        tx.commit()?;
        Ok(had_previous)
    }

    /// All verses for the translation joined with book names, ordered by
    /// verse id ascending. Materialized once per run; later stages reuse
    /// the rows as join keys. Missing source tables surface as `Sql`.
    pub fn read_verses(&self) -> Result<Vec<VerseRow>, StoreError> {
        let sql = format!(
            "SELECT v.id, v.text, b.name, v.chapter, v.verse \
             FROM {verses} v \
             JOIN {books} b ON v.book_id = b.id \
             ORDER BY v.id",
            verses = self.table("verses"),
            books = self.table("books"),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(VerseRow {
                id: row.get(0)?,
                text: row.get(1)?,
                book: row.get(2)?,
                chapter: row.get(3)?,
                verse: row.get(4)?,
            })
        })?;
        let mut verses = Vec::new();
        for row in rows {
            verses.push(row?);
        }
        Ok(verses)
    }

    /// Opens a write transaction scoped to the index tables. Commit via
    /// `IndexBatch::commit`; dropping the batch rolls back.
    pub fn batch(&mut self) -> Result<IndexBatch<'_>, StoreError> {
        let insert_word_sql = format!(
            "INSERT INTO {} (word, is_proper_noun, frequency) VALUES (?1, ?2, 1)",
            self.table("words")
        );
        let bump_frequency_sql = format!(
            "UPDATE {} SET frequency = frequency + 1 WHERE id = ?1",
            self.table("words")
        );
        let insert_occurrence_sql = format!(
            "INSERT INTO {} (word_id, verse_id, position) VALUES (?1, ?2, ?3)",
            self.table("word_occurrences")
        );
        let tx = self.conn.transaction()?;
        Ok(IndexBatch {
            tx,
            insert_word_sql,
            bump_frequency_sql,
            insert_occurrence_sql,
        })
    }

    /// Lookup indexes for later readers: words by surface form, occurrences
    /// by word and by verse.
    pub fn create_lookup_indexes(&mut self) -> Result<(), StoreError> {
        let t = self.translation.as_str();
        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "CREATE INDEX idx_{t}_words_word ON {t}_words(word);\n\
             CREATE INDEX idx_{t}_word_occurrences_word_id ON {t}_word_occurrences(word_id);\n\
             CREATE INDEX idx_{t}_word_occurrences_verse_id ON {t}_word_occurrences(verse_id);"
        ))?;
        tx.commit()?;
        Ok(())
    }

    /// Refreshes the query planner statistics.
    pub fn analyze(&self) -> Result<(), StoreError> {
        self.conn.execute_batch("ANALYZE")?;
        Ok(())
    }

    /// VACUUMs the store, physically reclaiming the space freed by the
    /// destructive schema rebuild, and reports the file size around it.
    pub fn compact(&self) -> Result<CompactionReport, StoreError> {
        let before_bytes = self.file_size()?;
        self.conn.execute_batch("VACUUM")?;
        let after_bytes = self.file_size()?;
        Ok(CompactionReport {
            before_bytes,
            after_bytes,
        })
    }

    pub fn file_size(&self) -> Result<u64, StoreError> {
        Ok(std::fs::metadata(&self.db_path)?.len())
    }

    fn table(&self, suffix: &str) -> String {
        format!("{}_{}", self.translation.as_str(), suffix)
    }

    fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        let found = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                params![name],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

/// Transaction-scoped writer for the index tables.
pub struct IndexBatch<'conn> {
    tx: Transaction<'conn>,
    insert_word_sql: String,
    bump_frequency_sql: String,
    insert_occurrence_sql: String,
}

impl IndexBatch<'_> {
    /// Inserts a word row on first sight, with frequency 1, and returns
    /// its assigned id for the run's word→id map.
    pub fn insert_word(&self, word: &str, is_proper_noun: bool) -> Result<i64, StoreError> {
        let mut stmt = self.tx.prepare_cached(&self.insert_word_sql)?;
        stmt.execute(params![word, is_proper_noun])?;
        Ok(self.tx.last_insert_rowid())
    }

    /// Increments the stored frequency of an already-known word.
    pub fn bump_frequency(&self, word_id: i64) -> Result<(), StoreError> {
        let mut stmt = self.tx.prepare_cached(&self.bump_frequency_sql)?;
        let updated = stmt.execute(params![word_id])?;
        if updated != 1 {
            return Err(StoreError::InvalidInput("unknown word id"));
        }
        Ok(())
    }

    /// Appends one occurrence row. `position` is the token's index in the
    /// annotated sequence, assigned before filtering.
    pub fn insert_occurrence(
        &self,
        word_id: i64,
        verse_id: i64,
        position: usize,
    ) -> Result<(), StoreError> {
        let mut stmt = self.tx.prepare_cached(&self.insert_occurrence_sql)?;
        stmt.execute(params![word_id, verse_id, position as i64])?;
        Ok(())
    }

    pub fn commit(self) -> Result<(), StoreError> {
        self.tx.commit()?;
        Ok(())
    }
}
