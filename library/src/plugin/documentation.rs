//! Documentation artifacts shipped next to extension libraries.
//!
//! `libfoo.so` may be accompanied by `libfoo.docs.json`:
//!
//! ```json
//! { "members": [ { "name": "M:foo.Text.Reverse(string)", "summary": "Reverses text." } ] }
//! ```
//!
//! Only method entries (`M:` prefix) are indexed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::LibraryError;

pub const DOCUMENTATION_EXTENSION: &str = "docs.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberType {
    Type,
    Member,
    Property,
    Field,
    Event,
    Unknown,
}

impl MemberType {
    fn from_signature(signature: &str) -> Self {
        match signature.split_once(':').map(|(prefix, _)| prefix) {
            Some("T") => MemberType::Type,
            Some("M") => MemberType::Member,
            Some("P") => MemberType::Property,
            Some("F") => MemberType::Field,
            Some("E") => MemberType::Event,
            _ => MemberType::Unknown,
        }
    }
}

#[derive(Deserialize)]
struct DocumentationFile {
    #[serde(default)]
    members: Vec<MemberEntry>,
}

#[derive(Deserialize)]
struct MemberEntry {
    name: String,
    #[serde(default)]
    summary: String,
}

/// Method summaries keyed by documentation signature.
#[derive(Debug, Default)]
pub struct Documentation {
    summaries: HashMap<String, String>,
}

impl Documentation {
    /// Sibling artifact path for a library: same directory and base name.
    pub fn path_for(library_path: &Path) -> PathBuf {
        let stem = library_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        library_path.with_file_name(format!("{}.{}", stem, DOCUMENTATION_EXTENSION))
    }

    pub fn parse(text: &str) -> Result<Self, LibraryError> {
        let file: DocumentationFile = serde_json::from_str(text)?;
        let summaries = file
            .members
            .into_iter()
            .filter(|m| MemberType::from_signature(&m.name) == MemberType::Member)
            .map(|m| (m.name, normalize(&m.summary)))
            .collect();
        Ok(Self { summaries })
    }

    pub fn load(path: &Path) -> Result<Self, LibraryError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Loads the sibling artifact of `library_path` if there is one.
    pub fn for_library(library_path: &Path) -> Option<Self> {
        let path = Self::path_for(library_path);
        if !path.is_file() {
            return None;
        }
        match Self::load(&path) {
            Ok(documentation) => Some(documentation),
            Err(e) => {
                log::warn!("Ignoring documentation {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn summary(&self, signature: &str) -> Option<&str> {
        self.summaries.get(signature).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

fn normalize(summary: &str) -> String {
    summary.split_whitespace().collect::<Vec<_>>().join(" ")
}
