//! Reply text loaded from disk.
//!
//! The interjection whispered by the `gnu` responder and the quotes logged at
//! shutdown. Both fall back to the copies compiled into the binary when no
//! file is configured.

use rand::seq::SliceRandom;
use std::path::Path;
use thiserror::Error;

/// Built-in interjection text.
pub const DEFAULT_INTERJECTION: &str = include_str!("../assets/interject.txt");

/// Built-in quotes, `%`-separated.
pub const DEFAULT_QUOTES: &str = include_str!("../assets/quotes.txt");

#[derive(Debug, Error)]
#[error("failed to read asset {path}: {source}")]
pub struct AssetError {
    pub path: String,
    #[source]
    pub source: std::io::Error,
}

/// Loaded reply text.
#[derive(Debug, Clone)]
pub struct Assets {
    interjection: String,
    quotes: Vec<String>,
}

impl Default for Assets {
    fn default() -> Self {
        Self {
            interjection: DEFAULT_INTERJECTION.trim().to_string(),
            quotes: split_quotes(DEFAULT_QUOTES),
        }
    }
}

impl Assets {
    /// Load assets, using the built-in text for any file left unset.
    pub fn load(
        interjection_file: Option<&Path>,
        quotes_file: Option<&Path>,
    ) -> Result<Self, AssetError> {
        let mut assets = Self::default();
        if let Some(path) = interjection_file {
            assets.interjection = read(path)?.trim().to_string();
        }
        if let Some(path) = quotes_file {
            assets.quotes = split_quotes(&read(path)?);
        }
        Ok(assets)
    }

    pub fn interjection(&self) -> &str {
        &self.interjection
    }

    pub fn quotes(&self) -> &[String] {
        &self.quotes
    }

    /// A random quote, or `None` when the quotes file was empty.
    pub fn random_quote(&self) -> Option<&str> {
        self.quotes
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }
}

fn read(path: &Path) -> Result<String, AssetError> {
    std::fs::read_to_string(path).map_err(|source| AssetError {
        path: path.display().to_string(),
        source,
    })
}

/// Split a fortune-style file on `%`, dropping blank entries.
pub fn split_quotes(content: &str) -> Vec<String> {
    content
        .trim()
        .split('%')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect()
}
