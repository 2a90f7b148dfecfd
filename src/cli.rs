// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::ClientConfig;
use crate::core::{
    AccessController, AccessState, CredentialStore, ExportField, FileCredentialStore,
    ResultPresenter, ServiceClient, SubmissionController,
};
use crate::error::ClientError;
use crate::types::ResumeFile;
use crate::utils::read_file_content;

const REPROMPT: &str = "Access code rejected or missing. Run `resumeboost unlock <code>` to continue.";

#[derive(Parser)]
#[command(name = "resumeboost")]
#[command(about = "Analyze a resume against a job description and export the results")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Override the analysis service base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Override where the access code is stored
    #[arg(long, global = true)]
    pub credential_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store an access code and unlock the client
    Unlock { code: String },
    /// Forget the stored access code
    Logout,
    /// Show whether the client is unlocked
    Status,
    /// Check that the service is reachable
    Health,
    /// Submit a resume and job description for analysis
    Analyze {
        /// Resume file (PDF or TXT)
        #[arg(long)]
        resume: Option<PathBuf>,
        /// File containing the job description
        #[arg(long, conflicts_with = "jd_text")]
        jd: Option<PathBuf>,
        /// Job description passed inline
        #[arg(long)]
        jd_text: Option<String>,
        /// Directory for exported artifacts
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also export the tailored resume as a Word document
        #[arg(long)]
        docx: bool,
        /// Print one field for the clipboard: cover-letter, resume or bullets
        #[arg(long)]
        copy: Option<String>,
    },
    /// Rewrite bullet points (one per line) for a job description
    Rewrite {
        #[arg(long)]
        bullets: PathBuf,
        #[arg(long, conflicts_with = "jd_text")]
        jd: Option<PathBuf>,
        #[arg(long)]
        jd_text: Option<String>,
    },
}

/// Components wired together for one process.
struct Session {
    config: ClientConfig,
    client: Arc<ServiceClient>,
    access: Arc<AccessController>,
    submissions: SubmissionController,
}

impl Session {
    fn open(config: ClientConfig) -> Result<Self> {
        let store: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(config.credential_path.clone()));
        let client = Arc::new(ServiceClient::new(
            config.api_base_url.clone(),
            config.timeout_seconds,
            store.clone(),
        )?);
        let access = Arc::new(AccessController::new(store));
        let submissions = SubmissionController::new(client.clone(), access.clone());

        Ok(Self {
            config,
            client,
            access,
            submissions,
        })
    }
}

impl Cli {
    /// Layer command-line overrides on top of the loaded configuration.
    pub fn apply_to(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(url) = &self.api_url {
            config = config.with_api_base_url(url.clone());
        }
        if let Some(path) = &self.credential_path {
            config = config.with_credential_path(path.clone());
        }
        if let Command::Analyze { out: Some(dir), .. } = &self.command {
            config = config.with_output_dir(dir.clone());
        }
        config
    }
}

pub async fn handle_command(cli: Cli, config: ClientConfig) -> Result<()> {
    let config = cli.apply_to(config);
    let session = Session::open(config)?;

    match cli.command {
        Command::Unlock { code } => {
            session.access.unlock(&code)?;
            println!("✓ Access code saved. You're in.");
        }

        Command::Logout => {
            session.access.logout()?;
            println!("✓ Access code removed.");
        }

        Command::Status => {
            let state = match session.access.state() {
                AccessState::Unlocked => "unlocked",
                AccessState::Locked => "locked",
            };
            println!("Access:      {}", state);
            println!("Service:     {}", session.config.api_base_url);
            println!("Environment: {}", session.config.environment);
            println!("Credential:  {}", session.config.credential_path.display());
        }

        Command::Health => {
            let status = session.client.health().await?;
            println!("Service {} is {}", session.config.api_base_url, status);
        }

        Command::Analyze {
            resume,
            jd,
            jd_text,
            docx,
            copy,
            ..
        } => {
            let copy = copy
                .map(|name| {
                    ExportField::parse(&name)
                        .ok_or_else(|| anyhow::anyhow!("Unknown field to copy: {}", name))
                })
                .transpose()?;
            let jd_text = resolve_jd(jd.as_deref(), jd_text).await?;
            let resume = match resume {
                Some(path) => Some(ResumeFile::from_path(&path).await?),
                None => None,
            };

            let result = session.submissions.submit(resume, &jd_text).await;
            let presenter = match result {
                Ok(_) => session
                    .submissions
                    .presenter()
                    .context("Analysis finished without a result")?,
                Err(ClientError::Auth) | Err(ClientError::Locked) => {
                    anyhow::bail!(REPROMPT)
                }
                Err(e) => return Err(e.into()),
            };

            print_summary(&presenter);

            if let Some(field) = copy {
                println!("{}", presenter.clipboard_text(field)?);
            }

            export_all(&session, &presenter, &session.config.output_dir, docx).await?;
        }

        Command::Rewrite {
            bullets,
            jd,
            jd_text,
        } => {
            let jd_text = resolve_jd(jd.as_deref(), jd_text).await?;
            let bullets: Vec<String> = read_file_content(&bullets)
                .await?
                .lines()
                .map(|line| line.trim_start_matches(['-', '*', '•']).trim().to_string())
                .filter(|line| !line.is_empty())
                .collect();

            match session.submissions.rewrite(&bullets, &jd_text).await {
                Ok(result) => {
                    for bullet in result.rewritten_bullets {
                        println!("• {}", bullet);
                    }
                }
                Err(ClientError::Auth) | Err(ClientError::Locked) => anyhow::bail!(REPROMPT),
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

async fn resolve_jd(path: Option<&Path>, inline: Option<String>) -> Result<String> {
    match (path, inline) {
        (Some(path), _) => read_file_content(path).await,
        (None, Some(text)) => Ok(text),
        (None, None) => Ok(String::new()),
    }
}

fn print_summary(presenter: &ResultPresenter) {
    let result = presenter.result();

    println!(
        "Matching skills: {}",
        join_or(&result.overlap_skills, "No direct matches found.")
    );
    println!(
        "Missing skills:  {}",
        join_or(&result.missing_skills, "Great job! No missing skills detected.")
    );
    if let Some(summary) = presenter.ats_summary() {
        print!("{}", summary);
    }
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

async fn export_all(
    session: &Session,
    presenter: &ResultPresenter,
    out_dir: &Path,
    docx: bool,
) -> Result<()> {
    let mut artifacts = vec![
        presenter.json_artifact()?,
        presenter.text_artifact(ExportField::CoverLetter)?,
        presenter.text_artifact(ExportField::RewrittenBullets)?,
    ];
    if presenter.result().tailored_resume.is_some() {
        artifacts.push(presenter.text_artifact(ExportField::TailoredResume)?);

        if docx {
            let document = session
                .access
                .observe(presenter.document_artifact(session.client.as_ref()).await);
            match document {
                Ok(artifact) => artifacts.push(artifact),
                Err(ClientError::Auth) => anyhow::bail!(REPROMPT),
                Err(e) => eprintln!("Failed to download DOCX: {}", e),
            }
        }
    } else if docx {
        eprintln!("No tailored resume in this analysis, skipping DOCX export");
    }

    for artifact in &artifacts {
        let path = artifact.write_to(out_dir).await?;
        println!("✓ Saved {}", path.display());
    }
    info!("Exported {} artifacts to {}", artifacts.len(), out_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileConfig;

    fn local_config() -> ClientConfig {
        ClientConfig::from_profile("local", ProfileConfig::default())
    }

    #[test]
    fn test_parse_analyze_command() {
        let cli = Cli::try_parse_from([
            "resumeboost",
            "--api-url",
            "http://127.0.0.1:8000/api",
            "analyze",
            "--resume",
            "cv.pdf",
            "--jd-text",
            "Rust engineer",
            "--docx",
            "--copy",
            "cover-letter",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:8000/api"));
        match cli.command {
            Command::Analyze {
                resume,
                jd_text,
                docx,
                copy,
                ..
            } => {
                assert_eq!(resume, Some(PathBuf::from("cv.pdf")));
                assert_eq!(jd_text.as_deref(), Some("Rust engineer"));
                assert!(docx);
                assert_eq!(copy.as_deref(), Some("cover-letter"));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_jd_sources_conflict() {
        let parsed = Cli::try_parse_from([
            "resumeboost",
            "analyze",
            "--jd",
            "jd.txt",
            "--jd-text",
            "inline",
        ]);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn test_resolve_jd() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jd.txt");
        std::fs::write(&path, "From file").unwrap();

        assert_eq!(resolve_jd(Some(&path), None).await.unwrap(), "From file");
        assert_eq!(
            resolve_jd(None, Some("Inline".to_string())).await.unwrap(),
            "Inline"
        );
        assert_eq!(resolve_jd(None, None).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_unlock_then_logout_persists() {
        let dir = tempfile::tempdir().unwrap();
        let credential_path = dir.path().join("code.json");
        let config = local_config().with_credential_path(credential_path.clone());

        let cli = Cli::try_parse_from(["resumeboost", "unlock", "  abc  "]).unwrap();
        handle_command(cli, config.clone()).await.unwrap();
        assert_eq!(
            FileCredentialStore::new(credential_path.clone()).get(),
            Some("abc".to_string())
        );

        let cli = Cli::try_parse_from(["resumeboost", "logout"]).unwrap();
        handle_command(cli, config).await.unwrap();
        assert_eq!(FileCredentialStore::new(credential_path).get(), None);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "resumeboost",
            "--credential-path",
            "/tmp/rb/code.json",
            "analyze",
            "--out",
            "exports",
        ])
        .unwrap();

        let config = cli.apply_to(local_config());
        assert_eq!(config.output_dir, PathBuf::from("exports"));
        assert_eq!(config.credential_path, PathBuf::from("/tmp/rb/code.json"));
        assert_eq!(config.api_base_url, crate::config::LOCAL_API_URL);

        let cli = Cli::try_parse_from(["resumeboost", "status"]).unwrap();
        assert_eq!(cli.apply_to(local_config()).output_dir, PathBuf::from("out"));
    }
}
