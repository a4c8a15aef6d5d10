use std::path::Path;

use serde::Deserialize;

/// One row of the input manifest describing a trial to transcribe.
///
/// Columns are header-keyed, so their order in the file is irrelevant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestRow {
    pub audio_filename: String,
    pub phrase: String,
    pub block: String,
    pub trial: String,
}

impl ManifestRow {
    /// Audio path exactly as written in the manifest, with Windows
    /// backslash separators normalized.
    pub fn normalized_audio_path(&self) -> String {
        self.audio_filename.replace('\\', "/")
    }
}

pub fn read_manifest(path: &Path) -> Result<Vec<ManifestRow>, csv::Error> {
    let mut reader = csv::Reader::from_path(path)?;
    reader.deserialize().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_manifest_header_keyed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("101_data.csv");
        // Columns deliberately out of declaration order.
        fs::write(
            &path,
            "phrase,block,trial,audio_filename\nopen the door,1,2,rec/a.wav\n",
        )
        .unwrap();

        let rows = read_manifest(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].phrase, "open the door");
        assert_eq!(rows[0].block, "1");
        assert_eq!(rows[0].trial, "2");
        assert_eq!(rows[0].audio_filename, "rec/a.wav");
    }

    #[test]
    fn test_read_manifest_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(read_manifest(&tmp.path().join("nope.csv")).is_err());
    }

    #[test]
    fn test_normalized_audio_path_fixes_backslashes() {
        let row = ManifestRow {
            audio_filename: "data\\101\\a.wav".to_string(),
            phrase: String::new(),
            block: "1".to_string(),
            trial: "1".to_string(),
        };
        assert_eq!(row.normalized_audio_path(), "data/101/a.wav");
    }
}
