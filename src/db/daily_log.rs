//! Per-date consumption log with lazy loading and undo history.
//!
//! Each date persists to its own `<date>.log` file under a per-user
//! directory, one entry per line. A date is loaded from disk on first touch
//! and cached for the rest of the process; every mutation writes the date's
//! full sequence back synchronously.
//!
//! Undo is a stack of whole-date snapshots: each mutation pushes the
//! pre-mutation sequence for its date, and `undo` restores that sequence
//! wholesale, overwriting anything added since. The stack is unbounded and
//! cleared only by [`DailyLog::reload`].

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

use super::codec;
use crate::models::LogEntry;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error for {0}: {1}")]
    Io(PathBuf, #[source] io::Error),
}

/// Load state of a single date.
#[derive(Debug, Clone, PartialEq)]
pub enum DateState {
    Unloaded,
    Loaded(Vec<LogEntry>),
}

impl DateState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, DateState::Loaded(_))
    }

    pub fn entries(&self) -> &[LogEntry] {
        match self {
            DateState::Unloaded => &[],
            DateState::Loaded(entries) => entries,
        }
    }
}

pub struct DailyLog {
    log_dir: PathBuf,
    days: HashMap<String, DateState>,
    undo_stack: Vec<(String, Vec<LogEntry>)>,
}

impl DailyLog {
    /// Opens the log rooted at the given per-user directory, creating it if
    /// needed. Nothing is read until a date is first touched.
    pub fn open(log_dir: impl Into<PathBuf>) -> Result<Self, LogError> {
        let log_dir = log_dir.into();
        fs::create_dir_all(&log_dir).map_err(|e| LogError::Io(log_dir.clone(), e))?;
        Ok(Self {
            log_dir,
            days: HashMap::new(),
            undo_stack: Vec::new(),
        })
    }

    fn log_path(&self, date: &str) -> PathBuf {
        self.log_dir.join(format!("{}.log", date))
    }

    fn read_entries(path: &Path) -> Result<Vec<LogEntry>, LogError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            // Absent resource loads as an empty day.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(LogError::Io(path.to_path_buf(), e)),
        };

        let mut entries = Vec::new();
        for (i, line) in contents.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            match codec::decode_log_entry(line, i + 1) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("{}: skipping malformed log record: {}", path.display(), e);
                }
            }
        }
        Ok(entries)
    }

    /// Transitions a date to `Loaded`, reading its file on first touch.
    fn ensure_loaded(&mut self, date: &str) -> Result<&mut Vec<LogEntry>, LogError> {
        let path = self.log_path(date);
        let state = self
            .days
            .entry(date.to_string())
            .or_insert(DateState::Unloaded);
        if !state.is_loaded() {
            *state = DateState::Loaded(Self::read_entries(&path)?);
        }
        match state {
            DateState::Loaded(entries) => Ok(entries),
            DateState::Unloaded => unreachable!("date was just loaded"),
        }
    }

    fn push_undo(&mut self, date: &str) {
        if let Some(DateState::Loaded(entries)) = self.days.get(date) {
            self.undo_stack.push((date.to_string(), entries.clone()));
        }
    }

    fn persist(&self, date: &str) -> Result<(), LogError> {
        let entries = match self.days.get(date) {
            Some(DateState::Loaded(entries)) => entries,
            _ => return Ok(()),
        };
        let mut contents = String::new();
        for entry in entries {
            let _ = writeln!(contents, "{}", codec::encode_log_entry(entry));
        }
        let path = self.log_path(date);
        fs::write(&path, contents).map_err(|e| LogError::Io(path, e))
    }

    /// Appends an entry stamped with the current time and persists the date.
    ///
    /// The food identifier is not checked against any store; the log is
    /// decoupled from food existence at write time.
    pub fn add_entry(&mut self, date: &str, food_id: &str, servings: u32) -> Result<(), LogError> {
        self.ensure_loaded(date)?;
        self.push_undo(date);

        let entry = LogEntry::new(food_id, servings, Utc::now().timestamp());
        if let Some(DateState::Loaded(entries)) = self.days.get_mut(date) {
            entries.push(entry);
        }
        self.persist(date)?;
        tracing::debug!("added {} x{} to {}", food_id, servings, date);
        Ok(())
    }

    /// Removes the entry at `index` for a date that is already loaded.
    ///
    /// An unloaded date is a silent no-op (this does not lazy-load,
    /// mirroring the asymmetry with `add_entry`). The undo snapshot is
    /// pushed before the bounds check, so an out-of-range index still
    /// consumes an undo slot.
    pub fn remove_entry(&mut self, date: &str, index: usize) -> Result<(), LogError> {
        if !self.days.get(date).is_some_and(DateState::is_loaded) {
            return Ok(());
        }
        self.push_undo(date);

        let removed = match self.days.get_mut(date) {
            Some(DateState::Loaded(entries)) if index < entries.len() => {
                entries.remove(index);
                true
            }
            _ => false,
        };
        if removed {
            self.persist(date)?;
            tracing::debug!("removed entry {} from {}", index, date);
        }
        Ok(())
    }

    /// Returns the (possibly empty) entry sequence for a date, loading it on
    /// first access.
    pub fn get_log(&mut self, date: &str) -> Result<&[LogEntry], LogError> {
        Ok(self.ensure_loaded(date)?.as_slice())
    }

    /// Sums calories over a date's entries using the supplied food lookup
    /// (identifier and servings in, calories out). Entries whose identifier
    /// no longer resolves contribute zero.
    pub fn total_calories<F>(&mut self, date: &str, lookup: F) -> Result<f64, LogError>
    where
        F: Fn(&str, u32) -> Option<f64>,
    {
        let entries = self.ensure_loaded(date)?;
        Ok(entries
            .iter()
            .map(|e| lookup(&e.food_id, e.servings).unwrap_or(0.0))
            .sum())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Pops the most recent snapshot and restores that date's entire
    /// sequence, persisting it. Returns `false` when there is nothing to
    /// undo.
    pub fn undo(&mut self) -> Result<bool, LogError> {
        let Some((date, entries)) = self.undo_stack.pop() else {
            return Ok(false);
        };
        self.days.insert(date.clone(), DateState::Loaded(entries));
        self.persist(&date)?;
        tracing::debug!("restored {} from undo snapshot", date);
        Ok(true)
    }

    /// Discards all in-memory state (undo history included) and loads every
    /// `<date>.log` file under the log directory.
    pub fn reload(&mut self) -> Result<(), LogError> {
        self.days.clear();
        self.undo_stack.clear();
        fs::create_dir_all(&self.log_dir).map_err(|e| LogError::Io(self.log_dir.clone(), e))?;

        let dir = fs::read_dir(&self.log_dir).map_err(|e| LogError::Io(self.log_dir.clone(), e))?;
        for item in dir {
            let item = item.map_err(|e| LogError::Io(self.log_dir.clone(), e))?;
            let path = item.path();
            if path.extension().is_some_and(|ext| ext == "log") {
                if let Some(date) = path.file_stem().and_then(|s| s.to_str()) {
                    let entries = Self::read_entries(&path)?;
                    self.days.insert(date.to_string(), DateState::Loaded(entries));
                }
            }
        }
        tracing::debug!("reloaded {} day(s)", self.days.len());
        Ok(())
    }

    /// Persists every loaded date.
    pub fn save_all(&self) -> Result<(), LogError> {
        for (date, state) in &self.days {
            if state.is_loaded() {
                self.persist(date)?;
            }
        }
        Ok(())
    }
}
