pub mod analysis;
pub mod response;

pub use analysis::{
    AnalysisRequest, AnalysisResult, AtsBand, AtsReport, ResumeFile, RewriteResult,
};
