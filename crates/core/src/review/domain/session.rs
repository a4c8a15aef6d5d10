use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::dataset::domain::results_repository::{ResultsRepository, StoreError};
use crate::dataset::domain::trial::TrialRecord;
use crate::scoring::similarity::score_against_target;

use super::filter::FilterConfig;
use super::sort::SortMode;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("could not load results table: {0}")]
    Load(#[source] StoreError),
    #[error("edit applied in memory, but saving failed; the on-disk copy may be stale: {0}")]
    Persist(#[source] StoreError),
    #[error("no trial is selected")]
    NoSelection,
    #[error("no visible trial at position {0}")]
    BadPosition(usize),
}

/// One reviewer's editing session over a participant's results table.
///
/// Owns the table, the persistence handle, the filter/sort
/// configuration, and the current selection. Every mutating command
/// is atomic update-then-persist: the in-memory record changes, then
/// the whole table is rewritten to disk. No batching, no dirty flags.
///
/// Records are addressed by their position in the underlying table, so
/// duplicate (block, trial) keys stay distinct and both render.
pub struct ReviewSession {
    records: Vec<TrialRecord>,
    path: PathBuf,
    repository: Box<dyn ResultsRepository>,
    filter: FilterConfig,
    sort: SortMode,
    selected: Option<usize>,
}

impl ReviewSession {
    /// Load a participant's results table and select the first visible
    /// trial under the default filter.
    pub fn open(
        repository: Box<dyn ResultsRepository>,
        path: PathBuf,
    ) -> Result<Self, SessionError> {
        let records = repository.load(&path).map_err(SessionError::Load)?;
        let mut session = Self {
            records,
            path,
            repository,
            filter: FilterConfig::default(),
            sort: SortMode::default(),
            selected: None,
        };
        session.selected = session.visible().first().copied();
        Ok(session)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn filter(&self) -> FilterConfig {
        self.filter
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    /// Table indices of the visible sequence: filtered, then sorted.
    /// The sort is stable, so equal keys keep their table order.
    pub fn visible(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.records.len())
            .filter(|&i| self.filter.matches(&self.records[i]))
            .collect();
        indices.sort_by(|&a, &b| self.sort.compare(&self.records[a], &self.records[b]));
        indices
    }

    pub fn visible_records(&self) -> Vec<&TrialRecord> {
        self.visible().into_iter().map(|i| &self.records[i]).collect()
    }

    /// `(visible, total)` — the "Showing x / y trials" counts.
    pub fn counts(&self) -> (usize, usize) {
        (self.visible().len(), self.records.len())
    }

    pub fn selected(&self) -> Option<&TrialRecord> {
        self.selected.map(|i| &self.records[i])
    }

    /// Position of the selection within the visible sequence, if it is
    /// currently visible.
    pub fn selected_position(&self) -> Option<usize> {
        let current = self.selected?;
        self.visible().iter().position(|&i| i == current)
    }

    /// Replace the filter; a selection that drops out of view resets
    /// to the first element of the new sequence.
    pub fn set_filter(&mut self, filter: FilterConfig) {
        self.filter = filter;
        self.normalize_selection();
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.sort = sort;
        self.normalize_selection();
    }

    /// Absolute jump to a position in the visible sequence.
    pub fn select(&mut self, position: usize) -> Result<(), SessionError> {
        let visible = self.visible();
        match visible.get(position) {
            Some(&index) => {
                self.selected = Some(index);
                Ok(())
            }
            None => Err(SessionError::BadPosition(position)),
        }
    }

    /// Step to the following visible trial. Boundary steps are no-ops;
    /// the return value reports whether the selection moved.
    pub fn next(&mut self) -> bool {
        self.step(1)
    }

    /// Step to the preceding visible trial.
    pub fn prev(&mut self) -> bool {
        self.step(-1)
    }

    fn step(&mut self, delta: isize) -> bool {
        let visible = self.visible();
        if visible.is_empty() {
            return false;
        }
        let Some(position) = self.selected_position() else {
            // Selection fell out of view (e.g. after marking reviewed
            // with hide-reviewed active); re-anchor at the start.
            self.selected = Some(visible[0]);
            return true;
        };
        let target = position as isize + delta;
        if target < 0 || target as usize >= visible.len() {
            return false;
        }
        self.selected = Some(visible[target as usize]);
        true
    }

    /// Replace the selected trial's transcription and recompute its
    /// similarity score. An empty transcription or an empty target
    /// forces the score to 0.0. Persists before returning. An edit
    /// that pushes the trial out of the visible sequence resets the
    /// selection to the first visible trial.
    pub fn edit_transcription(&mut self, text: &str) -> Result<(), SessionError> {
        let index = self.selected.ok_or(SessionError::NoSelection)?;
        let record = &mut self.records[index];
        record.transcribed_text = text.to_string();
        record.similarity_score = if text.is_empty() || record.target_phrase.is_empty() {
            0.0
        } else {
            score_against_target(text, &record.target_phrase)
        };
        self.persist()?;
        self.normalize_selection();
        Ok(())
    }

    /// Toggle the reviewer's correctness override. Never touches the
    /// similarity score. Clearing the override can hide the trial, in
    /// which case the selection resets to the first visible trial.
    pub fn set_correct(&mut self, value: bool) -> Result<(), SessionError> {
        let index = self.selected.ok_or(SessionError::NoSelection)?;
        self.records[index].manual_correct = value;
        self.persist()?;
        self.normalize_selection();
        Ok(())
    }

    /// Mark the selected trial reviewed (or not). A false-to-true
    /// transition auto-advances: the first later trial in the visible
    /// sequence still awaiting review becomes selected. With none
    /// left, the selection stays on the just-reviewed trial even if
    /// the next filter recompute hides it. Re-marking an already
    /// reviewed trial does not advance.
    pub fn set_reviewed(&mut self, value: bool) -> Result<(), SessionError> {
        let index = self.selected.ok_or(SessionError::NoSelection)?;

        // Sequence as the reviewer saw it at the moment of the click.
        let visible_before = self.visible();
        let position = visible_before.iter().position(|&i| i == index);

        let was_reviewed = self.records[index].manual_reviewed;
        self.records[index].manual_reviewed = value;
        self.persist()?;

        if value && !was_reviewed {
            if let Some(position) = position {
                let advance_to = visible_before[position + 1..]
                    .iter()
                    .find(|&&i| !self.records[i].manual_reviewed)
                    .copied();
                if let Some(next_index) = advance_to {
                    self.selected = Some(next_index);
                }
            }
        }
        Ok(())
    }

    /// Up to `limit` visible trials surrounding the selection, for a
    /// bounded table preview. The window starts at the selection and
    /// shifts back when the sequence ends before the window fills.
    pub fn preview(&self, limit: usize) -> Vec<&TrialRecord> {
        let visible = self.visible();
        if visible.is_empty() || limit == 0 {
            return Vec::new();
        }
        let anchor = self.selected_position().unwrap_or(0);
        let start = anchor.min(visible.len().saturating_sub(limit));
        visible[start..]
            .iter()
            .take(limit)
            .map(|&i| &self.records[i])
            .collect()
    }

    fn normalize_selection(&mut self) {
        let visible = self.visible();
        let still_visible = self
            .selected
            .map(|index| visible.contains(&index))
            .unwrap_or(false);
        if !still_visible {
            self.selected = visible.first().copied();
        }
    }

    fn persist(&mut self) -> Result<(), SessionError> {
        self.repository
            .save(&self.path, &self.records)
            .map_err(SessionError::Persist)
    }
}
