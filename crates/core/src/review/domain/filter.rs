use crate::dataset::domain::trial::TrialRecord;
use crate::shared::constants::DEFAULT_SCORE_THRESHOLD;

/// Which trials the reviewer currently sees. A record passes when all
/// configured predicates hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    /// Show only trials scoring below this threshold. Reviewer
    /// overrides (`manual_correct` or `manual_reviewed`) keep a record
    /// visible regardless of its score.
    pub score_threshold: Option<f64>,
    /// Drop trials already marked reviewed.
    pub hide_reviewed: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            score_threshold: Some(DEFAULT_SCORE_THRESHOLD),
            hide_reviewed: false,
        }
    }
}

impl FilterConfig {
    /// Everything visible.
    pub fn all() -> Self {
        Self {
            score_threshold: None,
            hide_reviewed: false,
        }
    }

    pub fn matches(&self, record: &TrialRecord) -> bool {
        if let Some(threshold) = self.score_threshold {
            let needs_review = record.similarity_score < threshold;
            if !(needs_review || record.manual_correct || record.manual_reviewed) {
                return false;
            }
        }
        if self.hide_reviewed && record.manual_reviewed {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: f64, correct: bool, reviewed: bool) -> TrialRecord {
        TrialRecord {
            block: "1".to_string(),
            trial: "1".to_string(),
            audio_filename: "a.wav".to_string(),
            target_phrase: "x".to_string(),
            transcribed_text: "x".to_string(),
            similarity_score: score,
            error: None,
            manual_correct: correct,
            manual_reviewed: reviewed,
            original_transcription: "x".to_string(),
        }
    }

    #[test]
    fn test_no_predicates_passes_everything() {
        assert!(FilterConfig::all().matches(&record(1.0, false, false)));
    }

    #[test]
    fn test_threshold_hides_high_scores() {
        let filter = FilterConfig {
            score_threshold: Some(0.8),
            hide_reviewed: false,
        };
        assert!(filter.matches(&record(0.5, false, false)));
        assert!(!filter.matches(&record(0.95, false, false)));
    }

    #[test]
    fn test_threshold_boundary_is_exclusive() {
        let filter = FilterConfig {
            score_threshold: Some(0.8),
            hide_reviewed: false,
        };
        // score == threshold is not "below threshold"
        assert!(!filter.matches(&record(0.8, false, false)));
    }

    #[test]
    fn test_manual_correct_keeps_high_score_visible() {
        let filter = FilterConfig {
            score_threshold: Some(0.8),
            hide_reviewed: false,
        };
        assert!(filter.matches(&record(0.95, true, false)));
    }

    #[test]
    fn test_manual_reviewed_keeps_high_score_visible() {
        let filter = FilterConfig {
            score_threshold: Some(0.8),
            hide_reviewed: false,
        };
        assert!(filter.matches(&record(0.95, false, true)));
    }

    #[test]
    fn test_hide_reviewed_drops_reviewed_rows() {
        let filter = FilterConfig {
            score_threshold: None,
            hide_reviewed: true,
        };
        assert!(!filter.matches(&record(0.2, false, true)));
        assert!(filter.matches(&record(0.2, false, false)));
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let filter = FilterConfig {
            score_threshold: Some(0.8),
            hide_reviewed: true,
        };
        // Reviewed row passes the threshold override but fails
        // hide-reviewed, so it stays hidden.
        assert!(!filter.matches(&record(0.95, false, true)));
    }
}
