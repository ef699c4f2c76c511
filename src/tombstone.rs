//! Tombstone records and the site data set.
//!
//! Each tombstone lives in its own `<id>.json` file. Loading validates every
//! file, skips the broken ones, sorts what is left by numeric id and splits
//! it into pages.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single memorial entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tombstone {
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub avatar: String,
    #[serde(deserialize_with = "lenient_string")]
    pub epitaph: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub created: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
}

/// Text fields accept any JSON scalar. Non-strings keep their JSON text and
/// null reads as empty.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Like `lenient_string`, but null means absent
fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

impl Tombstone {
    /// Numeric value of the id. Validated files always have one.
    pub fn numeric_id(&self) -> u64 {
        self.id.parse().unwrap_or(u64::MAX)
    }

    /// The creation date, if present and non-empty
    pub fn created(&self) -> Option<&str> {
        self.created.as_deref().filter(|c| !c.is_empty())
    }
}

/// Why a tombstone file was rejected
#[derive(Debug, Error)]
pub enum TombstoneError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} is missing required field '{field}'", path.display())]
    MissingField { path: PathBuf, field: &'static str },
    #[error("{}: id must be a string holding a positive integer, got {id}", path.display())]
    InvalidId { path: PathBuf, id: String },
    #[error("{}: file name '{stem}' does not match id '{id}'", path.display())]
    IdMismatch {
        path: PathBuf,
        stem: String,
        id: String,
    },
    #[error("{}: invalid links: {reason}", path.display())]
    InvalidLinks { path: PathBuf, reason: String },
}

const REQUIRED_FIELDS: [&str; 4] = ["id", "name", "avatar", "epitaph"];

/// Validate the raw content of one tombstone file
pub fn parse_file(path: &Path, content: &str) -> Result<Tombstone, TombstoneError> {
    let value: Value = serde_json::from_str(content).map_err(|source| TombstoneError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    for field in REQUIRED_FIELDS {
        if value.get(field).is_none() {
            return Err(TombstoneError::MissingField {
                path: path.to_path_buf(),
                field,
            });
        }
    }

    let id = match value.get("id") {
        Some(Value::String(s)) => s.clone(),
        other => {
            return Err(TombstoneError::InvalidId {
                path: path.to_path_buf(),
                id: other.map(Value::to_string).unwrap_or_default(),
            })
        }
    };

    let numeric = match id.trim().parse::<u64>() {
        Ok(n) if n > 0 => n,
        _ => {
            return Err(TombstoneError::InvalidId {
                path: path.to_path_buf(),
                id,
            })
        }
    };

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    if numeric.to_string() != stem {
        return Err(TombstoneError::IdMismatch {
            path: path.to_path_buf(),
            stem,
            id,
        });
    }

    if let Some(links) = value.get("links") {
        let Some(items) = links.as_array() else {
            return Err(TombstoneError::InvalidLinks {
                path: path.to_path_buf(),
                reason: "'links' must be an array".to_string(),
            });
        };
        for (i, item) in items.iter().enumerate() {
            if !item.is_object() {
                return Err(TombstoneError::InvalidLinks {
                    path: path.to_path_buf(),
                    reason: format!("item {} is not an object", i),
                });
            }
            if item.get("url").is_none() || item.get("title").is_none() {
                return Err(TombstoneError::InvalidLinks {
                    path: path.to_path_buf(),
                    reason: format!("item {} is missing 'url' or 'title'", i),
                });
            }
        }
    }

    serde_json::from_value(value).map_err(|source| TombstoneError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every valid `*.json` tombstone in `dir`, sorted by numeric id
pub fn load_all(dir: &Path) -> Result<Vec<Tombstone>> {
    let read_dir = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read tombstone directory {}", dir.display()))?;

    let mut tombstones = Vec::new();
    for dir_entry in read_dir {
        let path = match dir_entry {
            Ok(e) => e.path(),
            Err(e) => {
                tracing::warn!("Failed to read directory entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let loaded = std::fs::read_to_string(&path)
            .map_err(|source| TombstoneError::Io {
                path: path.clone(),
                source,
            })
            .and_then(|content| parse_file(&path, &content));

        match loaded {
            Ok(t) => tombstones.push(t),
            Err(e) => tracing::warn!("Skipping tombstone: {}", e),
        }
    }

    if tombstones.is_empty() {
        tracing::warn!("No valid tombstones found in {}", dir.display());
    }

    tombstones.sort_by_key(Tombstone::numeric_id);
    Ok(tombstones)
}

/// Current page and page count, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageContext {
    pub current_page: usize,
    pub total_pages: usize,
}

/// The whole data set, already split into pages
#[derive(Debug, Clone)]
pub struct Site {
    pages: Vec<Vec<Tombstone>>,
}

impl Site {
    /// Split sorted tombstones into pages of `per_page`.
    /// An empty data set still has one (empty) page.
    pub fn paginate(tombstones: Vec<Tombstone>, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let mut pages: Vec<Vec<Tombstone>> = tombstones
            .chunks(per_page)
            .map(|chunk| chunk.to_vec())
            .collect();
        if pages.is_empty() {
            pages.push(Vec::new());
        }
        Self { pages }
    }

    /// Load and paginate a tombstone directory
    pub fn load(dir: &Path, per_page: usize) -> Result<Self> {
        let tombstones = load_all(dir)?;
        let site = Self::paginate(tombstones, per_page);
        tracing::info!(
            "Loaded {} tombstones across {} pages",
            site.len(),
            site.total_pages()
        );
        Ok(site)
    }

    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// Total number of tombstones across all pages
    pub fn len(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    /// Entries and context for a 1-based page number
    pub fn page(&self, page: usize) -> Option<(&[Tombstone], PageContext)> {
        let entries = self.pages.get(page.checked_sub(1)?)?;
        Some((
            entries,
            PageContext {
                current_page: page,
                total_pages: self.total_pages(),
            },
        ))
    }
}

#[cfg(test)]
pub(crate) fn sample(id: &str, created: Option<&str>, links: &[(&str, &str)]) -> Tombstone {
    Tombstone {
        id: id.to_string(),
        name: format!("CyberSoul{}", id),
        avatar: "/assets/m.png".to_string(),
        epitaph: format!("Here lies the echo of a digital dream.\n{}", id),
        created: created.map(str::to_string),
        links: links
            .iter()
            .map(|(title, url)| Link {
                title: title.to_string(),
                url: url.to_string(),
            })
            .collect(),
    }
}
