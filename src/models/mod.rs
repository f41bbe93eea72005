//! Domain models for tracked documents.

pub mod analysis;
mod identifier;
mod record;
pub mod wire;

pub use analysis::{structure_lines, AnalysisItem};
pub use identifier::{split_url_list, DocumentId};
pub use record::{
    split_analysis_lines, DocumentRecord, LifecycleStep, Stage, ANALYSIS_COMPLETED,
    IDENTIFICATION_COMPLETED,
};
pub use wire::{
    AnalyzeResponse, IdentifyEntry, IdentifyResponse, SummarizeRequest, SummarizeResponse,
    SummaryEntry,
};
