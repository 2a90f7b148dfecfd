// src/core/presenter.rs
//! Export side of a finished analysis: clipboard payloads and downloadable
//! artifacts. Nothing here mutates the result.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::core::service_client::AnalysisApi;
use crate::error::{ClientError, Result};
use crate::types::analysis::category_max_points;
use crate::types::{AnalysisResult, AtsBand};

pub const TEXT_MIME: &str = "text/plain";
pub const JSON_MIME: &str = "application/json";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportField {
    CoverLetter,
    TailoredResume,
    RewrittenBullets,
}

impl ExportField {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().replace('_', "-").as_str() {
            "cover-letter" | "letter" => Some(ExportField::CoverLetter),
            "tailored-resume" | "resume" => Some(ExportField::TailoredResume),
            "bullets" | "rewritten-bullets" => Some(ExportField::RewrittenBullets),
            _ => None,
        }
    }
}

/// Named payload ready to be saved; built per export and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub async fn write_to(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        let path = dir.join(&self.filename);
        crate::utils::write_file_bytes(&path, &self.bytes).await?;
        info!("Saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtsSummary {
    pub score: f64,
    pub band: AtsBand,
    pub categories: Vec<String>,
    pub recommendations: Vec<String>,
}

impl std::fmt::Display for AtsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ATS score: {:.0}/100 ({})", self.score, self.band.label())?;
        for line in &self.categories {
            writeln!(f, "  {}", line)?;
        }
        if !self.recommendations.is_empty() {
            writeln!(f, "Recommendations:")?;
            for rec in &self.recommendations {
                writeln!(f, "  - {}", rec)?;
            }
        }
        Ok(())
    }
}

pub struct ResultPresenter {
    result: Arc<AnalysisResult>,
}

impl ResultPresenter {
    pub fn new(result: Arc<AnalysisResult>) -> Self {
        Self { result }
    }

    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    fn tailored_resume(&self) -> Result<&str> {
        self.result
            .tailored_resume
            .as_deref()
            .ok_or_else(|| ClientError::Export("No tailored resume in this analysis".to_string()))
    }

    fn bullets_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.result.rewritten_bullets)
            .map_err(|e| ClientError::Export(e.to_string()))
    }

    pub fn clipboard_text(&self, field: ExportField) -> Result<String> {
        match field {
            ExportField::CoverLetter => Ok(self.result.cover_letter.clone()),
            ExportField::TailoredResume => self.tailored_resume().map(str::to_string),
            ExportField::RewrittenBullets => self.bullets_json(),
        }
    }

    pub fn text_artifact(&self, field: ExportField) -> Result<ExportArtifact> {
        let (filename, mime_type, body) = match field {
            ExportField::CoverLetter => {
                ("cover_letter.txt", TEXT_MIME, self.result.cover_letter.clone())
            }
            ExportField::TailoredResume => (
                "tailored_resume.txt",
                TEXT_MIME,
                self.tailored_resume()?.to_string(),
            ),
            ExportField::RewrittenBullets => {
                ("rewritten_bullets.json", JSON_MIME, self.bullets_json()?)
            }
        };

        Ok(ExportArtifact {
            filename: filename.to_string(),
            mime_type,
            bytes: body.into_bytes(),
        })
    }

    /// The whole normalized result.
    pub fn json_artifact(&self) -> Result<ExportArtifact> {
        let body = serde_json::to_vec_pretty(self.result.as_ref())
            .map_err(|e| ClientError::Export(e.to_string()))?;
        Ok(ExportArtifact {
            filename: "analysis.json".to_string(),
            mime_type: JSON_MIME,
            bytes: body,
        })
    }

    /// Word document rendered by the service from the tailored resume.
    pub async fn document_artifact(&self, api: &dyn AnalysisApi) -> Result<ExportArtifact> {
        let text = self.tailored_resume()?;
        let bytes = api.export_document(text).await?;
        if bytes.is_empty() {
            return Err(ClientError::Export("Failed to download DOCX".to_string()));
        }

        Ok(ExportArtifact {
            filename: "tailored_resume.docx".to_string(),
            mime_type: DOCX_MIME,
            bytes,
        })
    }

    pub fn ats_summary(&self) -> Option<AtsSummary> {
        let ats = self.result.ats.as_ref()?;
        let categories = ats
            .breakdown
            .iter()
            .map(|(name, points)| match category_max_points(name) {
                Some(max) => format!("{}: {:.0}/{}", name, points, max),
                None => format!("{}: {:.0}", name, points),
            })
            .collect();

        Some(AtsSummary {
            score: ats.score,
            band: ats.band(),
            categories,
            recommendations: ats.recommendations.clone(),
        })
    }
}
