use std::cmp::Ordering;

use crate::dataset::domain::trial::TrialRecord;

/// Ordering of the visible sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Ascending by (block, trial).
    #[default]
    Natural,
    /// Unreviewed trials first, then ascending by (block, trial)
    /// within each group.
    UnreviewedFirst,
}

impl SortMode {
    pub fn compare(&self, a: &TrialRecord, b: &TrialRecord) -> Ordering {
        match self {
            SortMode::Natural => trial_key(a).cmp(&trial_key(b)),
            SortMode::UnreviewedFirst => a
                .manual_reviewed
                .cmp(&b.manual_reviewed)
                .then_with(|| trial_key(a).cmp(&trial_key(b))),
        }
    }
}

/// Block/trial identifiers come out of the manifest as strings; order
/// them numerically when they parse as integers so "10" sorts after
/// "9", falling back to lexicographic for anything else. Numbers sort
/// before non-numeric labels.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum OrdinalKey {
    Number(i64),
    Text(String),
}

impl OrdinalKey {
    fn parse(value: &str) -> Self {
        match value.trim().parse() {
            Ok(n) => OrdinalKey::Number(n),
            Err(_) => OrdinalKey::Text(value.to_string()),
        }
    }
}

fn trial_key(record: &TrialRecord) -> (OrdinalKey, OrdinalKey) {
    (
        OrdinalKey::parse(&record.block),
        OrdinalKey::parse(&record.trial),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(block: &str, trial: &str, reviewed: bool) -> TrialRecord {
        TrialRecord {
            block: block.to_string(),
            trial: trial.to_string(),
            audio_filename: "a.wav".to_string(),
            target_phrase: "x".to_string(),
            transcribed_text: "x".to_string(),
            similarity_score: 0.5,
            error: None,
            manual_correct: false,
            manual_reviewed: reviewed,
            original_transcription: "x".to_string(),
        }
    }

    fn sorted(mode: SortMode, mut records: Vec<TrialRecord>) -> Vec<(String, String)> {
        records.sort_by(|a, b| mode.compare(a, b));
        records
            .into_iter()
            .map(|r| (r.block, r.trial))
            .collect()
    }

    #[test]
    fn test_natural_orders_by_block_then_trial() {
        let out = sorted(
            SortMode::Natural,
            vec![
                record("2", "1", false),
                record("1", "2", false),
                record("1", "1", false),
            ],
        );
        assert_eq!(
            out,
            vec![
                ("1".to_string(), "1".to_string()),
                ("1".to_string(), "2".to_string()),
                ("2".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_numeric_ordering_beats_lexicographic() {
        let out = sorted(
            SortMode::Natural,
            vec![record("1", "10", false), record("1", "9", false)],
        );
        assert_eq!(out[0].1, "9");
        assert_eq!(out[1].1, "10");
    }

    #[test]
    fn test_non_numeric_labels_fall_back_to_text_order() {
        let out = sorted(
            SortMode::Natural,
            vec![record("practice", "1", false), record("2", "1", false)],
        );
        // Numbers sort before text labels.
        assert_eq!(out[0].0, "2");
        assert_eq!(out[1].0, "practice");
    }

    #[test]
    fn test_unreviewed_first_partitions_by_review_state() {
        let out = sorted(
            SortMode::UnreviewedFirst,
            vec![
                record("1", "1", true),
                record("2", "2", false),
                record("1", "2", true),
                record("2", "1", false),
            ],
        );
        assert_eq!(
            out,
            vec![
                ("2".to_string(), "1".to_string()),
                ("2".to_string(), "2".to_string()),
                ("1".to_string(), "1".to_string()),
                ("1".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_every_unreviewed_precedes_every_reviewed() {
        let records = vec![
            record("1", "1", true),
            record("1", "2", false),
            record("1", "3", true),
            record("2", "1", false),
        ];
        let mode = SortMode::UnreviewedFirst;
        let mut sorted = records;
        sorted.sort_by(|a, b| mode.compare(a, b));
        let first_reviewed = sorted
            .iter()
            .position(|r| r.manual_reviewed)
            .unwrap();
        assert!(sorted[first_reviewed..].iter().all(|r| r.manual_reviewed));
    }
}
