use std::path::Path;

use pubtally_core::{
    AppConfig, ExportConfig, ExportFile, Report, Session, Table, UploadOptions, parse_upload,
};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::error::Result;
use crate::ingest::{IngestPipeline, IngestSummary};
use crate::sources::{PublicationSource, SemanticScholarSource};

/// The session plus the pipeline that feeds it.
///
/// Uploads are serialized by `upload_lock`; the table is swapped only after the
/// whole pipeline succeeded, so a failed upload leaves the previous table intact.
pub struct Workspace<S> {
    session: RwLock<Session>,
    upload_lock: Mutex<()>,
    pipeline: IngestPipeline<S>,
    upload: UploadOptions,
    export: ExportConfig,
}

impl Workspace<SemanticScholarSource> {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let source = SemanticScholarSource::new(&config.remote, config.remote_api_key())?;
        let upload = UploadOptions {
            faculty_column: config.upload.faculty_column.clone(),
            default_faculty: None,
        };
        Ok(Self::new(source, upload, config.export.clone()))
    }
}

impl<S: PublicationSource> Workspace<S> {
    pub fn new(source: S, upload: UploadOptions, export: ExportConfig) -> Self {
        Self {
            session: RwLock::new(Session::new()),
            upload_lock: Mutex::new(()),
            pipeline: IngestPipeline::new(source),
            upload,
            export,
        }
    }

    pub fn pipeline(&self) -> &IngestPipeline<S> {
        &self.pipeline
    }

    /// Parse, look up and merge `path`, then replace the working table.
    /// `default_faculty` names the owner of BibTeX entries without a `faculty` field.
    pub async fn upload(&self, path: &Path, default_faculty: Option<&str>) -> Result<IngestSummary> {
        let _guard = self.upload_lock.lock().await;

        let mut options = self.upload.clone();
        if let Some(name) = default_faculty.map(str::trim).filter(|n| !n.is_empty()) {
            options.default_faculty = Some(name.to_string());
        }

        let parsed = parse_upload(path, &options)?;
        let (table, summary) = self.pipeline.run(&parsed).await;

        self.session.write().await.replace(table);
        info!(path = %path.display(), rows = summary.rows, "upload applied");
        Ok(summary)
    }

    pub async fn report(&self) -> Result<Report> {
        Ok(self.session.read().await.report()?)
    }

    /// A copy of the current table.
    pub async fn table(&self) -> Result<Table> {
        Ok(self.session.read().await.table()?.clone())
    }

    pub async fn export_all(&self, format: Option<&str>) -> Result<ExportFile> {
        Ok(self.session.read().await.export_all(format, &self.export)?)
    }

    pub async fn export_faculty(
        &self,
        faculty: Option<&str>,
        format: Option<&str>,
    ) -> Result<ExportFile> {
        Ok(self
            .session
            .read()
            .await
            .export_faculty(faculty, format, &self.export)?)
    }

    pub async fn export_years(
        &self,
        start_year: Option<&str>,
        end_year: Option<&str>,
        format: Option<&str>,
    ) -> Result<ExportFile> {
        Ok(self
            .session
            .read()
            .await
            .export_years(start_year, end_year, format, &self.export)?)
    }

    /// Forget a memoized lookup so the next upload re-queries it.
    pub async fn invalidate(&self, faculty_name: &str) -> bool {
        self.pipeline.cache().invalidate(faculty_name).await
    }
}
