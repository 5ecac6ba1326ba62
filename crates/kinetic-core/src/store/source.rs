//! Record sources: where the corpus comes from.

use crate::error::{KineticError, Result};
use crate::models::ExerciseRecord;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Asynchronous provider of the full exercise corpus.
///
/// Implementations should report transport failures as
/// [`KineticError::DataSourceUnavailable`]; the controller applies its own timeout.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every record.
    async fn fetch(&self) -> Result<Vec<ExerciseRecord>>;

    /// Short label used in log lines.
    fn describe(&self) -> String {
        "record source".to_string()
    }
}

type FetchFn = dyn Fn() -> BoxFuture<'static, Result<Vec<ExerciseRecord>>> + Send + Sync;

/// Adapts an async closure into a [`RecordSource`].
///
/// ```rust,ignore
/// let source = FnSource::new(|| async { fetch_from_backend().await });
/// ```
pub struct FnSource {
    fetch: Box<FetchFn>,
}

impl FnSource {
    pub fn new<F, Fut>(fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<ExerciseRecord>>> + Send + 'static,
    {
        Self {
            fetch: Box::new(move || fetch().boxed()),
        }
    }
}

#[async_trait]
impl RecordSource for FnSource {
    async fn fetch(&self) -> Result<Vec<ExerciseRecord>> {
        (self.fetch)().await
    }

    fn describe(&self) -> String {
        "closure source".to_string()
    }
}

/// A fixed, in-memory corpus.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Arc<Vec<ExerciseRecord>>,
}

impl StaticSource {
    pub fn new(records: Vec<ExerciseRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<ExerciseRecord>> {
        Ok(self.records.as_ref().clone())
    }

    fn describe(&self) -> String {
        format!("static source ({} records)", self.records.len())
    }
}

/// Reads a JSON array of exercises, as produced by the corpus export script.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<ExerciseRecord>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| KineticError::io_with_path(e, &self.path))?;

        let records: Vec<ExerciseRecord> =
            serde_json::from_str(&contents).map_err(|e| KineticError::Json {
                message: format!("Failed to parse {}: {}", self.path.display(), e),
                source: Some(e),
            })?;

        debug!("Read {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_fn_source_delegates() {
        let source = FnSource::new(|| async { Ok(vec![ExerciseRecord::new("1", "Plank")]) });
        let records = source.fetch().await.unwrap();
        assert_eq!(records[0].name, "Plank");
    }

    #[tokio::test]
    async fn test_fn_source_propagates_error() {
        let source = FnSource::new(|| async {
            Err(KineticError::unavailable("backend down", "503"))
        });
        assert!(source.fetch().await.is_err());
    }

    #[tokio::test]
    async fn test_json_file_source_reads_export() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "1", "name": "Push Up", "primary_muscles": ["Chest"], "equipment": []}}]"#
        )
        .unwrap();

        let source = JsonFileSource::new(file.path());
        let records = source.fetch().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].primary_muscles, vec!["Chest"]);
    }

    #[tokio::test]
    async fn test_json_file_source_missing_file() {
        let source = JsonFileSource::new("/nonexistent/exercises.json");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, KineticError::Io { path: Some(_), .. }));
    }

    #[tokio::test]
    async fn test_json_file_source_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not an array").unwrap();

        let err = JsonFileSource::new(file.path()).fetch().await.unwrap_err();
        assert!(matches!(err, KineticError::Json { .. }));
    }
}
