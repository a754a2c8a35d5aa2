//! File-backed [`PipelineService`].
//!
//! Each RPC answers from a captured JSON response on disk. A file that was
//! not supplied stands for a source with nothing recorded; a file that cannot
//! be read or decoded is reported as that service failing, which the engine
//! treats as a degraded source where it can.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracelens_core::diff::model::ServerDiff;
use tracelens_core::errors::TraceLensError;
use tracelens_core::model::{RawPipelineEvent, RawTrace, StageRunRecord};
use tracelens_core::Result;
use tracelens_engine::PipelineService;

#[derive(Debug, Clone, Default)]
pub struct FileService {
    /// JSON array of pipeline events
    pub pipeline_file: Option<PathBuf>,
    /// JSON array of telemetry traces
    pub telemetry_file: Option<PathBuf>,
    /// JSON array of stage runs
    pub runs_file: Option<PathBuf>,
    /// JSON object `{summary, payload?}` computed by the pipeline service
    pub diff_file: Option<PathBuf>,
}

fn read_json<T: DeserializeOwned>(service: &str, path: &Path) -> Result<T> {
    let failed = |message: String| TraceLensError::ExternalService {
        service: service.to_string(),
        message: format!("{}: {}", path.display(), message),
    };
    let text = std::fs::read_to_string(path).map_err(|e| failed(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| failed(e.to_string()))
}

fn read_list<T: DeserializeOwned>(service: &str, path: Option<&Path>) -> Result<Vec<T>> {
    match path {
        Some(path) => read_json(service, path),
        None => Ok(Vec::new()),
    }
}

impl PipelineService for FileService {
    fn pipeline_events(&self, _content_id: &str) -> Result<Vec<RawPipelineEvent>> {
        read_list("pipeline", self.pipeline_file.as_deref())
    }

    fn traces(&self, _content_id: &str) -> Result<Vec<RawTrace>> {
        read_list("telemetry", self.telemetry_file.as_deref())
    }

    fn stage_runs(
        &self,
        _source_id: i64,
        stage: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<StageRunRecord>> {
        let runs: Vec<StageRunRecord> = read_list("pipeline", self.runs_file.as_deref())?;
        let matching = runs
            .into_iter()
            .filter(|r| stage.map_or(true, |s| r.stage_name == s));
        Ok(match limit {
            Some(n) => matching.take(n).collect(),
            None => matching.collect(),
        })
    }

    fn run_diff(&self, _run_a: i64, _run_b: i64) -> Result<Option<ServerDiff>> {
        self.diff_file
            .as_deref()
            .map(|path| read_json("pipeline", path))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_files_mean_empty_sources() {
        let service = FileService::default();
        assert!(service.pipeline_events("c1").unwrap().is_empty());
        assert!(service.traces("c1").unwrap().is_empty());
        assert!(service.stage_runs(1, None, None).unwrap().is_empty());
        assert_eq!(service.run_diff(1, 2).unwrap(), None);
    }

    #[test]
    fn test_unreadable_file_is_service_failure() {
        let dir = tempfile::tempdir().unwrap();
        let service = FileService {
            telemetry_file: Some(write(&dir, "traces.json", "{not json")),
            ..FileService::default()
        };
        let err = service.traces("c1").unwrap_err();
        assert!(matches!(
            err,
            TraceLensError::ExternalService { ref service, .. } if service == "telemetry"
        ));
    }

    #[test]
    fn test_stage_runs_filter_and_limit() {
        let dir = tempfile::tempdir().unwrap();
        let runs = r#"[
            {"run_id": 1, "stage_name": "triage", "status": "completed", "created_at": "2025-03-01T10:00:00Z"},
            {"run_id": 2, "stage_name": "analyze", "status": "failed", "created_at": "2025-03-01T10:01:00Z"},
            {"run_id": 3, "stage_name": "analyze", "status": "completed", "created_at": "2025-03-01T10:02:00Z"}
        ]"#;
        let service = FileService {
            runs_file: Some(write(&dir, "runs.json", runs)),
            ..FileService::default()
        };

        let analyze = service.stage_runs(9, Some("analyze"), None).unwrap();
        assert_eq!(analyze.iter().map(|r| r.run_id).collect::<Vec<_>>(), [2, 3]);
        assert_eq!(service.stage_runs(9, None, Some(1)).unwrap().len(), 1);
    }
}
