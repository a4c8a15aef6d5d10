use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One (block, trial) unit of the results table: the audio reference,
/// the expected phrase, the machine transcription with its similarity
/// score, and the reviewer's annotations.
///
/// `block` and `trial` are kept verbatim as read from the manifest;
/// ordering treats them numerically when they parse as integers.
/// Field order here is the on-disk column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub block: String,
    pub trial: String,
    pub audio_filename: String,
    pub target_phrase: String,
    #[serde(default)]
    pub transcribed_text: String,
    #[serde(default, deserialize_with = "lenient_score")]
    pub similarity_score: f64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub error: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_bool",
        serialize_with = "pandas_bool"
    )]
    pub manual_correct: bool,
    #[serde(
        default,
        deserialize_with = "lenient_bool",
        serialize_with = "pandas_bool"
    )]
    pub manual_reviewed: bool,
    #[serde(default)]
    pub original_transcription: String,
}

impl TrialRecord {
    /// True once the reviewer has edited the transcription away from
    /// what the batch job produced.
    pub fn is_changed(&self) -> bool {
        self.transcribed_text != self.original_transcription
    }
}

/// Review status of a trial relative to a score threshold, used for
/// listing labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialStatus {
    /// Reviewer asserted the transcription is acceptable.
    Confirmed,
    /// Score below the threshold, needs attention.
    LowScore,
    /// Score at or above the threshold.
    Acceptable,
}

impl TrialRecord {
    pub fn status(&self, threshold: f64) -> TrialStatus {
        if self.manual_correct {
            TrialStatus::Confirmed
        } else if self.similarity_score < threshold {
            TrialStatus::LowScore
        } else {
            TrialStatus::Acceptable
        }
    }
}

/// Boolean parsing tolerant of pandas output: the Python tool wrote
/// these columns as `True`/`False`, sometimes as `1.0`/`0.0`, and old
/// files omit them entirely. Anything unrecognized reads as false.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    let value = raw.trim();
    Ok(value.eq_ignore_ascii_case("true") || value == "1" || value == "1.0")
}

/// Serialize booleans as `True`/`False` so files stay interchangeable
/// with ones written by the pandas-based tool.
fn pandas_bool<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "True" } else { "False" })
}

/// Score parsing tolerant of blank cells (pandas NaN renders empty).
fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw.trim().parse().unwrap_or(0.0))
}

/// Empty error cells read as `None` rather than `Some("")`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    if raw.is_empty() {
        Ok(None)
    } else {
        Ok(Some(raw))
    }
}
