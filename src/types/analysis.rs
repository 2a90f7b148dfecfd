// src/types/analysis.rs
//! Normalized analysis result and the inputs of one submission.
//!
//! The service payload is loosely shaped: lists may be missing, the ATS block
//! is optional and the tailored resume may be blank. Everything is folded into
//! [`AnalysisResult`] on deserialization so downstream code never sees the raw
//! variants.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::{ClientError, Result};
use crate::utils::{check_resume_name, resume_content_type};

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_JD_CHARS: usize = 10_000;

/// Resume file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ResumeFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a resume from disk; the name sent upstream is the file name only.
    pub async fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read resume: {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume")
            .to_string();

        Ok(Self { file_name, bytes })
    }

    pub fn content_type(&self) -> Option<&'static str> {
        resume_content_type(&self.file_name)
    }
}

/// A resume paired with a job description, checked and ready to send.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub resume: ResumeFile,
    pub jd_text: String,
}

impl AnalysisRequest {
    /// Admission check run before any network traffic.
    pub fn validate(resume: Option<ResumeFile>, jd_text: &str) -> Result<Self> {
        let (resume, jd) = match resume {
            Some(resume) if !jd_text.trim().is_empty() => (resume, jd_text),
            _ => {
                return Err(ClientError::Validation(
                    "Please provide both a resume and a job description.".to_string(),
                ))
            }
        };

        check_resume_name(&resume.file_name)?;
        if resume.bytes.is_empty() {
            return Err(ClientError::Validation("Resume file is empty.".to_string()));
        }
        if resume.bytes.len() > MAX_RESUME_BYTES {
            return Err(ClientError::Validation(
                "File too large. Maximum size is 5MB.".to_string(),
            ));
        }
        if jd.chars().count() > MAX_JD_CHARS {
            return Err(ClientError::Validation(
                "Job description too long. Maximum 10,000 characters.".to_string(),
            ));
        }

        Ok(Self {
            resume,
            jd_text: jd.to_string(),
        })
    }
}

/// ATS scoring block. Only ever present as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtsReport {
    #[serde(rename = "ats_score")]
    pub score: f64,
    #[serde(rename = "ats_breakdown")]
    pub breakdown: BTreeMap<String, f64>,
    #[serde(rename = "ats_recommendations")]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtsBand {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl AtsBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            AtsBand::Excellent
        } else if score >= 60.0 {
            AtsBand::Good
        } else if score >= 40.0 {
            AtsBand::Fair
        } else {
            AtsBand::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AtsBand::Excellent => "Excellent Match",
            AtsBand::Good => "Good Match",
            AtsBand::Fair => "Fair Match",
            AtsBand::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl AtsReport {
    pub fn band(&self) -> AtsBand {
        AtsBand::from_score(self.score)
    }
}

/// Maximum points the service awards per breakdown category.
pub fn category_max_points(category: &str) -> Option<u32> {
    match category {
        "keywords" => Some(40),
        "sections" | "format" => Some(15),
        "contact" | "achievements" => Some(10),
        "length" => Some(8),
        "action_verbs" => Some(7),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAnalysisResult")]
pub struct AnalysisResult {
    pub jd_skills: Vec<String>,
    pub resume_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub overlap_skills: Vec<String>,
    pub rewritten_bullets: Vec<String>,
    pub cover_letter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tailored_resume: Option<String>,
    #[serde(flatten)]
    pub ats: Option<AtsReport>,
}

/// Payload exactly as the service may send it.
#[derive(Debug, Default, Deserialize)]
struct RawAnalysisResult {
    #[serde(default)]
    jd_skills: Option<Vec<String>>,
    #[serde(default)]
    resume_skills: Option<Vec<String>>,
    #[serde(default)]
    missing_skills: Option<Vec<String>>,
    #[serde(default)]
    overlap_skills: Option<Vec<String>>,
    #[serde(default)]
    rewritten_bullets: Option<Vec<String>>,
    #[serde(default)]
    cover_letter: Option<String>,
    #[serde(default)]
    tailored_resume: Option<String>,
    #[serde(default)]
    ats_score: Option<f64>,
    #[serde(default)]
    ats_breakdown: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    ats_recommendations: Option<Vec<String>>,
}

impl From<RawAnalysisResult> for AnalysisResult {
    fn from(raw: RawAnalysisResult) -> Self {
        let jd_skills = dedup(raw.jd_skills.unwrap_or_default());
        let resume_skills = dedup(raw.resume_skills.unwrap_or_default());

        let (overlap_skills, missing_skills) = match (raw.overlap_skills, raw.missing_skills) {
            (None, None) => derive_skill_gap(&jd_skills, &resume_skills),
            (overlap, missing) => {
                let overlap = dedup(overlap.unwrap_or_default());
                let missing = dedup(missing.unwrap_or_default())
                    .into_iter()
                    .filter(|s| !overlap.contains(s))
                    .collect();
                (overlap, missing)
            }
        };

        let ats = raw.ats_score.map(|score| AtsReport {
            score: if score.is_nan() { 0.0 } else { score.clamp(0.0, 100.0) },
            breakdown: raw.ats_breakdown.unwrap_or_default(),
            recommendations: raw.ats_recommendations.unwrap_or_default(),
        });

        Self {
            jd_skills,
            resume_skills,
            missing_skills,
            overlap_skills,
            rewritten_bullets: raw.rewritten_bullets.unwrap_or_default(),
            cover_letter: raw.cover_letter.unwrap_or_default(),
            tailored_resume: raw.tailored_resume.filter(|t| !t.trim().is_empty()),
            ats,
        }
    }
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Split the job's skills into (overlap, missing) against the resume's.
fn derive_skill_gap(jd_skills: &[String], resume_skills: &[String]) -> (Vec<String>, Vec<String>) {
    let have: HashSet<&str> = resume_skills.iter().map(String::as_str).collect();
    jd_skills
        .iter()
        .cloned()
        .partition(|skill| have.contains(skill.as_str()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteResult {
    #[serde(default)]
    pub rewritten_bullets: Vec<String>,
}
