use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::cli::Cli;

pub const DEFAULT_LINE_Y_TOLERANCE: f64 = 15.0;

const DEFAULT_OCR_FILE: &str = "export.json";
const DEFAULT_REASSEMBLED_FILE: &str = "01_reassembled_text.txt";
const DEFAULT_CHUNKS_FILE: &str = "02_chunks_for_editing_and_summarization.txt";
const DEFAULT_SUMMARIES_FILE: &str = "03_summaries.txt";
const DEFAULT_DATASET_FILE: &str = "manifesto_fine_tuning_data.json";
const DEFAULT_MANIFEST_DIR: &str = "manifests";

const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI assistant that provides concise and neutral summaries of election manifesto sections. Focus on key policies and promises.";
const DEFAULT_USER_PREFIX: &str =
    "Please summarize the following section from the election manifesto:\n\n";

/// Fixed strings embedded in every dataset record.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptConfig {
    pub system_prompt: String,
    pub user_prefix: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            user_prefix: DEFAULT_USER_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelinePaths {
    pub ocr_path: PathBuf,
    pub reassembled_path: PathBuf,
    pub chunks_path: PathBuf,
    pub summaries_path: PathBuf,
    pub dataset_path: PathBuf,
    pub manifest_dir: PathBuf,
}

impl PipelinePaths {
    pub fn in_dir(work_dir: &Path) -> Self {
        Self {
            ocr_path: work_dir.join(DEFAULT_OCR_FILE),
            reassembled_path: work_dir.join(DEFAULT_REASSEMBLED_FILE),
            chunks_path: work_dir.join(DEFAULT_CHUNKS_FILE),
            summaries_path: work_dir.join(DEFAULT_SUMMARIES_FILE),
            dataset_path: work_dir.join(DEFAULT_DATASET_FILE),
            manifest_dir: work_dir.join(DEFAULT_MANIFEST_DIR),
        }
    }
}

/// Everything a single run needs, resolved once from the command line and
/// handed to each component at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub paths: PipelinePaths,
    pub line_y_tolerance: f64,
    pub prompts: PromptConfig,
}

impl PipelineConfig {
    pub fn in_dir(work_dir: &Path) -> Self {
        Self {
            paths: PipelinePaths::in_dir(work_dir),
            line_y_tolerance: DEFAULT_LINE_Y_TOLERANCE,
            prompts: PromptConfig::default(),
        }
    }

    pub fn from_cli(cli: &Cli) -> Result<Self> {
        if !cli.line_y_tolerance.is_finite() || cli.line_y_tolerance < 0.0 {
            bail!(
                "line y tolerance must be a finite, non-negative number (got {})",
                cli.line_y_tolerance
            );
        }

        let work_dir = &cli.work_dir;
        let mut config = Self::in_dir(work_dir);
        let resolve = |value: &Option<PathBuf>, fallback: &mut PathBuf| {
            if let Some(path) = value {
                *fallback = work_dir.join(path);
            }
        };

        resolve(&cli.ocr_path, &mut config.paths.ocr_path);
        resolve(&cli.reassembled_path, &mut config.paths.reassembled_path);
        resolve(&cli.chunks_path, &mut config.paths.chunks_path);
        resolve(&cli.summaries_path, &mut config.paths.summaries_path);
        resolve(&cli.dataset_path, &mut config.paths.dataset_path);
        resolve(&cli.manifest_dir, &mut config.paths.manifest_dir);
        config.line_y_tolerance = cli.line_y_tolerance;

        Ok(config)
    }
}
