//! Export of the in-memory analysis result.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{SessionError, SessionResult};
use crate::session::Session;

/// A downloadable copy of the current analysis result.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    /// `analysis_{job_id}.json`
    pub file_name: String,
    /// Pretty-printed result JSON
    pub contents: String,
}

impl ExportDocument {
    /// Serialize the session's current result. Reads memory only.
    pub fn from_session(session: &Session) -> SessionResult<Self> {
        let job_id = session.job_id().ok_or(SessionError::NothingToExport)?;
        let result = session.result.as_ref().ok_or(SessionError::NothingToExport)?;

        Ok(Self {
            file_name: export_file_name(job_id),
            contents: serde_json::to_string_pretty(result)?,
        })
    }

    /// Write the document into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> SessionResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.contents)?;
        info!(path = %path.display(), bytes = self.contents.len(), "Exported analysis");
        Ok(path)
    }
}

/// File name for a job's export. Path separators in the id are replaced.
pub fn export_file_name(job_id: &str) -> String {
    let safe: String = job_id
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("analysis_{}.json", safe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotscope_models::{AnalysisResult, JobHandle, Segment};

    fn finished_session() -> Session {
        Session::replay(
            JobHandle::new("job_42"),
            AnalysisResult::from_segments(vec![Segment::new("s1", 0.0, 1500.0)]),
        )
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("job_42"), "analysis_job_42.json");
        assert_eq!(export_file_name("a/b"), "analysis_a_b.json");
    }

    #[test]
    fn test_export_requires_result() {
        let err = ExportDocument::from_session(&Session::new()).unwrap_err();
        assert!(matches!(err, SessionError::NothingToExport));
    }

    #[test]
    fn test_export_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let doc = ExportDocument::from_session(&finished_session()).unwrap();
        assert!(doc.contents.contains('\n'));

        let path = doc.write_to(&dir.path().join("exports")).unwrap();
        assert_eq!(path.file_name().unwrap(), "analysis_job_42.json");

        let written: AnalysisResult =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.segments()[0].id, "s1");
    }
}
