use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::RunMode;
use crate::config::PipelineConfig;
use crate::dataset::DatasetAssembler;
use crate::model::{AssembleCounts, AssemblePaths, AssembleRunManifest};
use crate::util::{now_utc_string, sha256_file, utc_compact_string, write_json_pretty};

pub fn run(config: &PipelineConfig) -> Result<()> {
    execute(config)?;
    Ok(())
}

pub fn execute(config: &PipelineConfig) -> Result<AssembleRunManifest> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("assemble-{}", utc_compact_string(started_ts));
    let paths = &config.paths;

    info!(
        run_id = %run_id,
        chunks_path = %paths.chunks_path.display(),
        summaries_path = %paths.summaries_path.display(),
        "processing summaries into the fine-tuning dataset"
    );

    let assembler = DatasetAssembler::new(config.prompts.clone())?;
    let report = assembler.assemble(
        &paths.chunks_path,
        &paths.summaries_path,
        &paths.dataset_path,
    )?;

    for warning in &report.warnings {
        warn!(warning = %warning, "chunk marker numbering differs from file order");
    }

    info!(
        path = %paths.dataset_path.display(),
        records = report.record_count,
        "created fine-tuning dataset"
    );

    let manifest = AssembleRunManifest {
        manifest_version: 1,
        run_id,
        mode: RunMode::ProcessSummaries.as_str().to_string(),
        started_at,
        updated_at: now_utc_string(),
        chunks_sha256: hash_input(&paths.chunks_path),
        summaries_sha256: hash_input(&paths.summaries_path),
        paths: AssemblePaths {
            chunks_path: paths.chunks_path.display().to_string(),
            summaries_path: paths.summaries_path.display().to_string(),
            dataset_path: paths.dataset_path.display().to_string(),
        },
        counts: AssembleCounts {
            chunk_count: report.chunk_count,
            summary_count: report.summary_count,
            record_count: report.record_count,
        },
        warnings: report.warnings,
    };

    let manifest_path = paths.manifest_dir.join(format!(
        "assemble_run_{}.json",
        utc_compact_string(started_ts)
    ));
    match write_json_pretty(&manifest_path, &manifest) {
        Ok(()) => info!(path = %manifest_path.display(), "wrote assemble run manifest"),
        Err(error) => warn!(
            error = %format!("{error:#}"),
            "could not write assemble run manifest; dataset is complete"
        ),
    }

    Ok(manifest)
}

/// The dataset already exists by the time inputs are hashed, so a failure
/// here leaves the digest empty instead of failing the run.
fn hash_input(path: &Path) -> String {
    sha256_file(path).unwrap_or_else(|error| {
        warn!(error = %format!("{error:#}"), "could not hash input for the run manifest");
        String::new()
    })
}
