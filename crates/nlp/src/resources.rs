use std::fs;
use std::path::{Path, PathBuf};

use crate::NlpError;

/// Release location of the pre-trained English tagger model. Overridable
/// for mirrors and air-gapped setups.
pub const DEFAULT_MODEL_URL: &str =
    "https://github.com/concord-index/models/releases/download/tagger-eng-1";

/// The three files making up the averaged-perceptron model distribution.
pub const MODEL_FILES: [&str; 3] = [
    "averaged_perceptron_tagger_eng.weights.json",
    "averaged_perceptron_tagger_eng.tagdict.json",
    "averaged_perceptron_tagger_eng.classes.json",
];

#[derive(Clone, Debug)]
pub struct ModelPaths {
    pub weights: PathBuf,
    pub tagdict: PathBuf,
    pub classes: PathBuf,
}

impl ModelPaths {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            weights: data_dir.join(MODEL_FILES[0]),
            tagdict: data_dir.join(MODEL_FILES[1]),
            classes: data_dir.join(MODEL_FILES[2]),
        }
    }
}

/// Verifies the tagger model files under `data_dir`, fetching any that are
/// missing from `{base_url}/{file}`. A failed fetch is fatal for the whole
/// run: tagging must not proceed with a partial model.
pub fn ensure_model(data_dir: &Path, base_url: &str) -> Result<ModelPaths, NlpError> {
    fs::create_dir_all(data_dir)?;
    for file in MODEL_FILES {
        let target = data_dir.join(file);
        if target.is_file() {
            println!("Tagger resource '{file}' is available.");
            continue;
        }
        println!("Tagger resource '{file}' not found. Downloading...");
        let url = format!("{}/{file}", base_url.trim_end_matches('/'));
        fetch(&url, &target)?;
        println!("Download of '{file}' complete.");
    }
    Ok(ModelPaths::new(data_dir))
}

fn fetch(url: &str, target: &Path) -> Result<(), NlpError> {
    let response = reqwest::blocking::get(url).map_err(|err| NlpError::Fetch {
        resource: url.to_string(),
        detail: err.to_string(),
    })?;
    if !response.status().is_success() {
        return Err(NlpError::Fetch {
            resource: url.to_string(),
            detail: format!("http status {}", response.status()),
        });
    }
    let body = response.bytes().map_err(|err| NlpError::Fetch {
        resource: url.to_string(),
        detail: err.to_string(),
    })?;

    // Stage next to the target so a torn download never looks like a model.
    let staged = target.with_extension("part");
    fs::write(&staged, &body)?;
    fs::rename(&staged, target)?;
    Ok(())
}
