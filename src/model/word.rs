//! Vocabulary entry model.

use serde::{Deserialize, Serialize};

/// One vocabulary entry of a sheet.
///
/// Entries have no identity once persisted; the numeric key lives only
/// inside the sheet database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordEntry {
    /// The Japanese word
    pub japanese: String,

    /// Chinese translation
    pub chinese: String,

    /// Part of speech, possibly empty
    #[serde(default)]
    pub part_of_speech: String,
}

impl WordEntry {
    /// Create a new entry.
    pub fn new(
        japanese: impl Into<String>,
        chinese: impl Into<String>,
        part_of_speech: impl Into<String>,
    ) -> Self {
        Self {
            japanese: japanese.into(),
            chinese: chinese.into(),
            part_of_speech: part_of_speech.into(),
        }
    }
}
