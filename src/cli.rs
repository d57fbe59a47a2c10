use std::path::PathBuf;

use clap::Parser;

pub const PROCESS_SUMMARIES_KEYWORD: &str = "process_summaries";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "manifesto-dataset",
    version,
    about = "Rebuild OCR word output into reviewable chunks and package summaries into a fine-tuning dataset"
)]
pub struct Cli {
    /// `process_summaries` builds the dataset; anything else (or nothing) runs initial processing.
    #[arg(allow_hyphen_values = true)]
    pub mode: Option<String>,

    /// Anything after the mode is ignored.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub ignored: Vec<String>,

    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,

    #[arg(long)]
    pub ocr_path: Option<PathBuf>,

    #[arg(long)]
    pub reassembled_path: Option<PathBuf>,

    #[arg(long)]
    pub chunks_path: Option<PathBuf>,

    #[arg(long)]
    pub summaries_path: Option<PathBuf>,

    #[arg(long)]
    pub dataset_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 15.0)]
    pub line_y_tolerance: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RunMode {
    Prepare,
    ProcessSummaries,
}

impl RunMode {
    pub fn from_arg(value: Option<&str>) -> Self {
        match value {
            Some(keyword) if keyword.eq_ignore_ascii_case(PROCESS_SUMMARIES_KEYWORD) => {
                Self::ProcessSummaries
            }
            _ => Self::Prepare,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::ProcessSummaries => "process_summaries",
        }
    }
}

impl Cli {
    pub fn run_mode(&self) -> RunMode {
        RunMode::from_arg(self.mode.as_deref())
    }
}
