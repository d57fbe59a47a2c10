use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::chunking::{ParagraphSegmenter, write_chunk_file};
use crate::cli::{PROCESS_SUMMARIES_KEYWORD, RunMode};
use crate::config::PipelineConfig;
use crate::model::{OcrExport, PrepareCounts, PreparePaths, PrepareRunManifest};
use crate::reassembly::LineReconstructor;
use crate::util::{now_utc_string, sha256_file, utc_compact_string, write_json_pretty, write_text};

pub fn run(config: &PipelineConfig) -> Result<()> {
    let manifest = execute(config)?;
    log_manual_steps(config, manifest.counts.chunk_count);
    Ok(())
}

pub fn execute(config: &PipelineConfig) -> Result<PrepareRunManifest> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("prepare-{}", utc_compact_string(started_ts));
    let paths = &config.paths;

    info!(
        run_id = %run_id,
        ocr_path = %paths.ocr_path.display(),
        line_y_tolerance = config.line_y_tolerance,
        "starting initial OCR processing"
    );

    let export = load_ocr_export(&paths.ocr_path)?;
    let ocr_sha256 = sha256_file(&paths.ocr_path)?;

    let reconstructor = LineReconstructor::new(config.line_y_tolerance);
    let document = reconstructor.reassemble(&export);
    for page in &document.pages {
        debug!(
            page = %page.page_label,
            words = page.word_count,
            lines = page.line_count,
            "page reassembled"
        );
    }
    info!(
        pages = document.pages.len(),
        empty_pages = document.empty_page_count(),
        words = document.word_count(),
        lines = document.line_count(),
        "reassembled text from OCR words"
    );

    let mut warnings = Vec::new();
    match write_text(&paths.reassembled_path, &document.text) {
        Ok(()) => info!(
            path = %paths.reassembled_path.display(),
            "wrote reassembled text for reference"
        ),
        Err(error) => {
            warn!(error = %format!("{error:#}"), "could not write reassembled text; continuing");
            warnings.push(format!("{error:#}"));
        }
    }

    let segmenter = ParagraphSegmenter::new()?;
    let chunks = segmenter.split(&document.text);
    let chunk_count = write_chunk_file(&paths.chunks_path, &chunks)?;
    if chunk_count == 0 {
        warn!(path = %paths.chunks_path.display(), "no chunks produced; review file is empty");
    } else {
        info!(
            path = %paths.chunks_path.display(),
            chunks = chunk_count,
            "wrote chunk review file"
        );
    }

    let manifest = PrepareRunManifest {
        manifest_version: 1,
        run_id,
        mode: RunMode::Prepare.as_str().to_string(),
        started_at,
        updated_at: now_utc_string(),
        line_y_tolerance: config.line_y_tolerance,
        ocr_sha256,
        paths: PreparePaths {
            ocr_path: paths.ocr_path.display().to_string(),
            reassembled_path: paths.reassembled_path.display().to_string(),
            chunks_path: paths.chunks_path.display().to_string(),
        },
        counts: PrepareCounts {
            page_count: document.pages.len(),
            empty_page_count: document.empty_page_count(),
            word_count: document.word_count(),
            line_count: document.line_count(),
            chunk_count,
        },
        warnings,
    };

    let manifest_path = paths.manifest_dir.join(format!(
        "prepare_run_{}.json",
        utc_compact_string(started_ts)
    ));
    match write_json_pretty(&manifest_path, &manifest) {
        Ok(()) => info!(path = %manifest_path.display(), "wrote prepare run manifest"),
        Err(error) => warn!(
            error = %format!("{error:#}"),
            "could not write prepare run manifest; outputs are complete"
        ),
    }

    Ok(manifest)
}

fn load_ocr_export(path: &Path) -> Result<OcrExport> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            return Err(error)
                .with_context(|| format!("OCR input file not found: {}", path.display()));
        }
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to read OCR input file: {}", path.display()));
        }
    };

    serde_json::from_slice(&raw).with_context(|| {
        format!(
            "could not decode OCR JSON from {}; expected an object with a 'page_data' array",
            path.display()
        )
    })
}

fn log_manual_steps(config: &PipelineConfig, chunk_count: usize) {
    let paths = &config.paths;

    info!("manual review required before the dataset can be built");
    info!(
        path = %paths.chunks_path.display(),
        "1. review and edit each chunk in place; fix OCR errors and keep every chunk a coherent section"
    );
    info!("   keep the '--- CHUNK <n> ---' and '--- END CHUNK <n> ---' markers intact");
    info!(
        path = %paths.summaries_path.display(),
        "2. create the summaries file"
    );
    info!(
        expected_summaries = chunk_count,
        "3. write one summary per line; line 1 summarizes CHUNK 1, line 2 summarizes CHUNK 2, and so on"
    );
    info!("   if chunks are added or removed while editing, match the final count and order");
    info!(
        command = %format!("manifesto-dataset {PROCESS_SUMMARIES_KEYWORD}"),
        "4. re-run in summary mode once both files are saved"
    );
}
