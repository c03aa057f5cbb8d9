#![forbid(unsafe_code)]

mod pipeline;

use concord_nlp::{PerceptronAnnotator, PerceptronTagger, ensure_model};
use concord_storage::IndexStore;
use pipeline::run_index;
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "ASV.db";
const DEFAULT_COMMIT_EVERY: i64 = 1000;

#[derive(Debug)]
struct IndexerConfig {
    db_path: PathBuf,
    data_dir: PathBuf,
    model_url: String,
    commit_every: i64,
}

fn usage() -> &'static str {
    "concord_indexer — build the word-occurrence index for one translation database\n\n\
USAGE:\n\
  concord_indexer [DB_PATH] [--data-dir DIR] [--model-url URL] [--commit-every N]\n\n\
NOTES:\n\
  - DB_PATH defaults to ASV.db; the translation code is the file name up to\n\
    the first '.' and prefixes every table the indexer touches.\n\
  - the words/word_occurrences tables are dropped and rebuilt on every run;\n\
    rerunning after a crash is always safe.\n\
  - tagger model files are verified under --data-dir (CONCORD_DATA_DIR) and\n\
    fetched from --model-url (CONCORD_MODEL_URL) when missing.\n"
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_data_dir() -> PathBuf {
    if let Some(dir) = env_var("CONCORD_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = env_var("HOME")
        .or_else(|| env_var("USERPROFILE"))
        .unwrap_or_else(|| ".".to_string());
    PathBuf::from(home).join(".concord").join("models")
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<IndexerConfig, String> {
    let mut config = IndexerConfig {
        db_path: PathBuf::from(DEFAULT_DB_PATH),
        data_dir: default_data_dir(),
        model_url: env_var("CONCORD_MODEL_URL")
            .unwrap_or_else(|| concord_nlp::DEFAULT_MODEL_URL.to_string()),
        commit_every: DEFAULT_COMMIT_EVERY,
    };
    let mut positional = Vec::new();
    let mut args = args;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            "--data-dir" => {
                let value = args.next().ok_or("--data-dir requires a value")?;
                config.data_dir = PathBuf::from(value);
            }
            "--model-url" => {
                config.model_url = args.next().ok_or("--model-url requires a value")?;
            }
            "--commit-every" => {
                let raw = args.next().ok_or("--commit-every requires a value")?;
                config.commit_every = raw
                    .parse()
                    .map_err(|_| format!("invalid --commit-every value: {raw}"))?;
                if config.commit_every <= 0 {
                    return Err("--commit-every must be positive".to_string());
                }
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown flag: {other}\n\n{}", usage()));
            }
            _ => positional.push(arg),
        }
    }
    if positional.len() > 1 {
        return Err(format!("expected at most one DB_PATH\n\n{}", usage()));
    }
    if let Some(path) = positional.pop() {
        config.db_path = PathBuf::from(path);
    }
    Ok(config)
}

fn main() {
    let config = parse_args(std::env::args().skip(1)).unwrap_or_else(|err| {
        eprintln!("{err}");
        std::process::exit(2);
    });

    let model = ensure_model(&config.data_dir, &config.model_url).unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        std::process::exit(1);
    });

    let mut store = IndexStore::open(&config.db_path).unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        std::process::exit(1);
    });

    let tagger = PerceptronTagger::load(&model).unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        std::process::exit(1);
    });
    let annotator = PerceptronAnnotator::new(tagger);

    let summary = run_index(&mut store, &annotator, config.commit_every).unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        std::process::exit(1);
    });

    println!(
        "Indexed {} verses ({} occurrences).",
        summary.verses, summary.occurrences
    );
    println!(
        "Word indexing completed for {}. Total unique words: {}",
        summary.translation, summary.unique_words
    );
}
