use std::fs;
use std::path::Path;

use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

static PRESET_DIR: Dir = include_dir!("src/presets");

/// How whitespace inside a passage is treated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WhitespaceMode {
    /// Collapse every whitespace run into a single space.
    #[default]
    Collapse,
    /// Keep the raw text, newlines included.
    Preserve,
}

/// The text to type. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    text: String,
    chars: Vec<char>,
}

impl Passage {
    pub fn new(raw: &str, mode: WhitespaceMode) -> Result<Self> {
        let text = match mode {
            WhitespaceMode::Collapse => raw.split_whitespace().join(" "),
            WhitespaceMode::Preserve => raw.replace("\r\n", "\n").trim().to_string(),
        };
        if text.is_empty() {
            return Err(Error::EmptyPassage);
        }
        let chars = text.chars().collect();
        Ok(Self { text, chars })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Length in characters, not bytes.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    /// Whitespace-delimited token count of the trimmed passage.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Reads a passage from a local text file, enforcing `limit_bytes`.
pub fn load_file<P: AsRef<Path>>(path: P, limit_bytes: u64, mode: WhitespaceMode) -> Result<Passage> {
    let path = path.as_ref();
    let size = fs::metadata(path)?.len();
    if size > limit_bytes {
        return Err(Error::PassageTooLarge {
            size,
            limit: limit_bytes,
        });
    }
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?;
    debug!(path = %path.display(), size, "loaded passage file");
    Passage::new(&text, mode)
}

/// A named passage bundled with the binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Preset {
    pub name: String,
    pub title: String,
    pub text: String,
}

impl Preset {
    pub fn passage(&self, mode: WhitespaceMode) -> Result<Passage> {
        Passage::new(&self.text, mode)
    }
}

/// All bundled presets, sorted by name.
pub fn presets() -> Result<Vec<Preset>> {
    PRESET_DIR
        .files()
        .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
        .map(|f| {
            let contents = f.contents_utf8().ok_or(Error::InvalidUtf8)?;
            Ok(serde_json::from_str::<Preset>(contents)?)
        })
        .collect::<Result<Vec<_>>>()
        .map(|list| list.into_iter().sorted_by(|a, b| a.name.cmp(&b.name)).collect())
}

pub fn preset(name: &str) -> Result<Preset> {
    presets()?
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::UnknownPreset(name.to_string()))
}

pub fn random_preset() -> Result<Preset> {
    let all = presets()?;
    all.choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| Error::UnknownPreset("<random>".to_string()))
}
