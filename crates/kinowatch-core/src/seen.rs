use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::PathBuf,
};

use tracing::warn;

use crate::{domain::SourceKey, errors::Error, Result};

type SeenMap = BTreeMap<SourceKey, BTreeSet<String>>;

/// Durable record of every canonical title ever reported, per source.
///
/// The map only grows: a title once recorded is never reported as new again
/// for that source, whichever date's listing it reappears in. Stored as
/// pretty-printed JSON so the file stays human-diffable.
pub struct SeenStore {
    path: PathBuf,
    data: SeenMap,
}

impl SeenStore {
    /// Load from `path`. A missing or unreadable file yields an empty store;
    /// at worst the next cycle re-reports titles that were already seen.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<SeenMap>(&text) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "seen-state unreadable, starting empty");
                    SeenMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SeenMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "seen-state unreadable, starting empty");
                SeenMap::new()
            }
        };
        Self { path, data }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// All titles ever recorded for `key`.
    pub fn seen(&self, key: SourceKey) -> BTreeSet<String> {
        self.data.get(&key).cloned().unwrap_or_default()
    }

    /// Titles from `candidates` not yet recorded for `key`, input order
    /// preserved. A non-empty result is merged into the set and the whole
    /// mapping is rewritten before returning; an empty result leaves storage
    /// untouched. A failed write is the caller's problem: swallowing it would
    /// make the missed merge re-report the same titles on every later cycle.
    pub fn diff_and_merge(&mut self, key: SourceKey, candidates: &[String]) -> Result<Vec<String>> {
        let recorded = self.data.get(&key);
        let new_titles: Vec<String> = candidates
            .iter()
            .filter(|t| recorded.map_or(true, |set| !set.contains(*t)))
            .cloned()
            .collect();

        if new_titles.is_empty() {
            return Ok(new_titles);
        }

        self.data
            .entry(key)
            .or_default()
            .extend(new_titles.iter().cloned());
        self.persist()?;
        Ok(new_titles)
    }

    fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|source| Error::SeenWrite {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, json).map_err(|source| Error::SeenWrite {
            path: self.path.clone(),
            source,
        })
    }
}
