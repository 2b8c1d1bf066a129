//! Per-folder progress cache.
//!
//! Remembers which entry a folder resolved to and the last confirmed
//! progress, so replaying from the same folder skips the search. Stored as
//! one JSON object keyed by folder fingerprint.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shinchoku_api::ListStatus;
use shinchoku_parse::ParsedFilename;

use crate::error::CoreError;

/// Cache key: SHA-256 of the normalized containing folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint of the folder holding `path`. Separators, case and
    /// trailing slashes are normalized so the same folder seen through
    /// different mounts maps to one key. The year keeps same-titled shows
    /// in one folder apart.
    pub fn for_path(path: &str, year: Option<u32>) -> Self {
        let normalized = path.replace('\\', "/").to_lowercase();
        let trimmed = normalized.trim_end_matches('/');
        let folder = trimmed.rsplit_once('/').map_or("", |(dir, _)| dir);
        Self::hash(&salted(folder.trim_end_matches('/'), year))
    }

    /// Fingerprint for inputs without a meaningful folder (streams,
    /// caller-supplied titles).
    pub fn for_title(title: &str, year: Option<u32>) -> Self {
        Self::hash(&salted(&format!("title:{}", title.to_lowercase()), year))
    }

    pub fn for_parsed(parsed: &ParsedFilename) -> Self {
        let is_url = parsed.raw_path.starts_with("http://") || parsed.raw_path.starts_with("https://");
        if parsed.from_override || is_url {
            Self::for_title(&parsed.title, parsed.year)
        } else {
            Self::for_path(&parsed.raw_path, parsed.year)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn hash(input: &str) -> Self {
        Self(format!("{:x}", Sha256::digest(input.as_bytes())))
    }
}

fn salted(base: &str, year: Option<u32>) -> String {
    match year {
        Some(year) => format!("{base}|{year}"),
        None => base.to_string(),
    }
}

/// One remembered folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Search title the entry was resolved from. A different guess for the
    /// same folder is a miss.
    pub guessed_name: String,
    pub anime_id: u64,
    pub last_progress: u32,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub anime_title: String,
    /// 1-based season within the series.
    #[serde(default)]
    pub season: u32,
    #[serde(default)]
    pub total_episodes: Option<u32>,
    #[serde(default)]
    pub current_status: ListStatus,
    /// File episode minus season episode.
    #[serde(default)]
    pub episode_offset: u32,
    #[serde(default)]
    pub low_confidence: bool,
    #[serde(default)]
    pub last_used: u64,
}

impl CacheEntry {
    /// Live up to and including `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Season episode for a file episode, if it falls inside this entry.
    pub fn relative_episode(&self, absolute: u32) -> Option<u32> {
        let relative = absolute.checked_sub(self.episode_offset).filter(|&ep| ep >= 1)?;
        match self.total_episodes {
            Some(total) if relative > total => None,
            _ => Some(relative),
        }
    }
}

/// The on-disk cache, loaded once per run.
#[derive(Debug)]
pub struct ProgressCache {
    path: PathBuf,
    entries: HashMap<Fingerprint, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
    clock: u64,
    dirty: bool,
}

impl ProgressCache {
    /// Load the cache file. A missing file is an empty cache; so is an
    /// unreadable one, which is replaced on the next save.
    pub fn load(path: &Path, ttl_hours: u32, max_entries: usize) -> Result<Self, CoreError> {
        let entries: HashMap<Fingerprint, CacheEntry> = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt cache file");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(CoreError::Cache(format!("{}: {e}", path.display()))),
        };

        let clock = entries.values().map(|e| e.last_used).max().unwrap_or(0);
        tracing::debug!(path = %path.display(), entries = entries.len(), "Cache loaded");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
            ttl: Duration::hours(i64::from(ttl_hours)),
            max_entries: max_entries.max(1),
            clock,
            dirty: false,
        })
    }

    /// Live entry for `fingerprint`. Expired entries are dropped on sight.
    pub fn get(&mut self, fingerprint: &Fingerprint, now: DateTime<Utc>) -> Option<CacheEntry> {
        if self.entries.get(fingerprint)?.is_expired(now) {
            tracing::debug!(fingerprint = fingerprint.as_str(), "Cache entry expired");
            self.remove(fingerprint);
            return None;
        }
        self.touch(fingerprint);
        self.entries.get(fingerprint).cloned()
    }

    /// Store `entry`, stamping its expiry and recency. Evicts the least
    /// recently used entries past the size limit.
    pub fn put(&mut self, fingerprint: Fingerprint, mut entry: CacheEntry, now: DateTime<Utc>) {
        self.clock += 1;
        entry.expires_at = now + self.ttl;
        entry.last_used = self.clock;
        self.entries.insert(fingerprint, entry);
        self.dirty = true;
        self.evict();
    }

    /// Mark an entry as recently used. Recency alone never dirties the
    /// cache; it reaches disk with the next write, so a process that only
    /// reads loses its touches and eviction falls back to write order.
    pub fn touch(&mut self, fingerprint: &Fingerprint) -> bool {
        match self.entries.get_mut(fingerprint) {
            Some(entry) => {
                self.clock += 1;
                entry.last_used = self.clock;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        let removed = self.entries.remove(fingerprint);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the cache back if anything changed. The file is replaced
    /// atomically. Returns whether a write happened.
    pub fn save_if_dirty(&mut self) -> Result<bool, CoreError> {
        if !self.dirty {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| CoreError::Cache(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        self.dirty = false;
        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "Cache saved");
        Ok(true)
    }

    fn evict(&mut self) {
        while self.entries.len() > self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(fp, _)| fp.clone());
            match oldest {
                Some(fp) => {
                    tracing::debug!(fingerprint = fp.as_str(), "Evicting cache entry");
                    self.entries.remove(&fp);
                }
                None => break,
            }
        }
    }
}
