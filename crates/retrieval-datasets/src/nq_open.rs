//! Loader for the NQ-open question answering benchmark.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use serde::Deserialize;

use retrieval_core::{Result, RetrievalError};

const TRAIN_FILE: &str = "open-domain-qa-data/nq-open/train.json";
const DEV_FILE: &str = "open-domain-qa-data/nq-open/dev.json";
const TEST_FILE: &str = "open-domain-qa-data/nq-open/test.json";

/// One question with its accepted answers.
#[derive(Debug, Clone, Deserialize)]
pub struct QaExample {
    pub question: String,
    pub answers: Vec<String>,
}

impl QaExample {
    /// The answer, when exactly one is accepted.
    pub fn single_answer(&self) -> Option<&str> {
        match self.answers.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct SplitFile {
    data: Vec<QaExample>,
}

/// The three NQ-open splits, loaded from the distribution archive.
#[derive(Debug, Clone)]
pub struct NaturalQuestionsOpen {
    pub train: Vec<QaExample>,
    pub dev: Vec<QaExample>,
    pub test: Vec<QaExample>,
}

impl NaturalQuestionsOpen {
    /// Load all splits from the zip archive at `zip_path`.
    ///
    /// With `only_single_answers` set, examples carrying more than one
    /// accepted answer are dropped from every split.
    pub fn load(zip_path: impl AsRef<Path>, only_single_answers: bool) -> Result<Self> {
        let path = zip_path.as_ref();
        let file = File::open(path)
            .map_err(|e| RetrievalError::dataset_load(path.display().to_string(), e.to_string()))?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| RetrievalError::dataset_load(path.display().to_string(), e.to_string()))?;

        let train = read_split(&mut archive, path, TRAIN_FILE, only_single_answers)?;
        let dev = read_split(&mut archive, path, DEV_FILE, only_single_answers)?;
        let test = read_split(&mut archive, path, TEST_FILE, only_single_answers)?;

        Ok(Self { train, dev, test })
    }
}

fn read_split<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    path: &Path,
    member: &str,
    only_single_answers: bool,
) -> Result<Vec<QaExample>> {
    let mut entry = archive.by_name(member).map_err(|e| {
        RetrievalError::dataset_load(path.display().to_string(), format!("{}: {}", member, e))
    })?;
    let mut contents = String::new();
    entry.read_to_string(&mut contents).map_err(|e| {
        RetrievalError::dataset_load(path.display().to_string(), format!("{}: {}", member, e))
    })?;

    let split: SplitFile = serde_json::from_str(&contents).map_err(|e| {
        RetrievalError::dataset_load(
            path.display().to_string(),
            format!("malformed {}: {}", member, e),
        )
    })?;

    let mut examples = split.data;
    if only_single_answers {
        examples.retain(|example| example.answers.len() == 1);
    }
    Ok(examples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    use zip::write::SimpleFileOptions;

    const TRAIN_JSON: &str = r#"{"data":[
        {"question":"who wrote the iliad","answers":["Homer"]},
        {"question":"what are the primary colors","answers":["red","blue","yellow"]}
    ]}"#;
    const DEV_JSON: &str = r#"{"data":[{"question":"capital of france","answers":["Paris"]}]}"#;
    const TEST_JSON: &str = r#"{"data":[{"question":"largest planet","answers":["Jupiter"]}]}"#;

    fn write_archive(dir: &tempfile::TempDir, members: &[(&str, &str)]) -> PathBuf {
        let path = dir.path().join("nq-open.zip");
        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, contents) in members {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    fn full_archive(dir: &tempfile::TempDir) -> PathBuf {
        write_archive(
            dir,
            &[
                (TRAIN_FILE, TRAIN_JSON),
                (DEV_FILE, DEV_JSON),
                (TEST_FILE, TEST_JSON),
            ],
        )
    }

    #[test]
    fn test_load_reads_all_splits() {
        let dir = tempfile::tempdir().unwrap();
        let path = full_archive(&dir);

        let dataset = NaturalQuestionsOpen::load(&path, false).unwrap();

        assert_eq!(dataset.train.len(), 2);
        assert_eq!(dataset.dev.len(), 1);
        assert_eq!(dataset.test.len(), 1);
        assert_eq!(dataset.dev[0].question, "capital of france");
        assert_eq!(dataset.dev[0].answers, vec!["Paris"]);
    }

    #[test]
    fn test_load_can_filter_to_single_answer_examples() {
        let dir = tempfile::tempdir().unwrap();
        let path = full_archive(&dir);

        let dataset = NaturalQuestionsOpen::load(&path, true).unwrap();

        assert_eq!(dataset.train.len(), 1);
        assert_eq!(dataset.train[0].question, "who wrote the iliad");
    }

    #[test]
    fn test_single_answer_accessor() {
        let one = QaExample {
            question: "q".to_string(),
            answers: vec!["a".to_string()],
        };
        let many = QaExample {
            question: "q".to_string(),
            answers: vec!["a".to_string(), "b".to_string()],
        };

        assert_eq!(one.single_answer(), Some("a"));
        assert_eq!(many.single_answer(), None);
    }

    #[test]
    fn test_missing_member_is_dataset_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_archive(&dir, &[(TRAIN_FILE, TRAIN_JSON), (DEV_FILE, DEV_JSON)]);

        let err = NaturalQuestionsOpen::load(&path, false).unwrap_err();

        assert!(matches!(err, RetrievalError::DatasetLoad { .. }));
        assert!(err.to_string().contains("test.json"));
    }

    #[test]
    fn test_malformed_split_is_dataset_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_archive(
            &dir,
            &[
                (TRAIN_FILE, "{not json"),
                (DEV_FILE, DEV_JSON),
                (TEST_FILE, TEST_JSON),
            ],
        );

        let err = NaturalQuestionsOpen::load(&path, false).unwrap_err();

        assert!(matches!(err, RetrievalError::DatasetLoad { .. }));
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_missing_archive_is_dataset_load_error() {
        let err = NaturalQuestionsOpen::load("/nonexistent/nq-open.zip", false).unwrap_err();
        assert!(matches!(err, RetrievalError::DatasetLoad { .. }));
    }
}
