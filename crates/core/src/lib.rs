#![forbid(unsafe_code)]

pub mod text;

pub mod ids {
    use std::path::Path;

    /// Short code identifying one translation, e.g. `ASV`. The code doubles
    /// as the physical table-name prefix, so it is validated strictly at
    /// construction; everything downstream trusts it.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct TranslationCode(String);

    impl TranslationCode {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, TranslationCodeError> {
            let value = value.into();
            validate_translation_code(&value)?;
            Ok(Self(value))
        }

        /// Derives the code from a database path: the file name up to the
        /// first `.` (`kjv.bible.db` → `kjv`).
        pub fn from_db_path(path: &Path) -> Result<Self, TranslationCodeError> {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or(TranslationCodeError::NoFileName)?;
            let code = name.split('.').next().unwrap_or_default();
            Self::try_new(code)
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum TranslationCodeError {
        Empty,
        TooLong,
        InvalidFirstChar,
        InvalidChar { ch: char, index: usize },
        NoFileName,
    }

    fn validate_translation_code(value: &str) -> Result<(), TranslationCodeError> {
        if value.is_empty() {
            return Err(TranslationCodeError::Empty);
        }
        if value.len() > 32 {
            return Err(TranslationCodeError::TooLong);
        }
        let mut chars = value.chars();
        let Some(first) = chars.next() else {
            return Err(TranslationCodeError::Empty);
        };
        if !first.is_ascii_alphanumeric() {
            return Err(TranslationCodeError::InvalidFirstChar);
        }
        for (index, ch) in value.chars().enumerate() {
            if index == 0 {
                continue;
            }
            if ch.is_ascii_alphanumeric() || ch == '_' {
                continue;
            }
            return Err(TranslationCodeError::InvalidChar { ch, index });
        }
        Ok(())
    }

}
