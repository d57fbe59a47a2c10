//! Pairs reviewed chunks with human summaries and writes the fine-tuning set.
//!
//! Chunk *i* in file order is paired with summary line *i*. Marker numbers in
//! the chunk file play no part in the pairing.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::chunking::{ChunkFileParser, marker_warnings};
use crate::config::PromptConfig;
use crate::model::{ChatMessage, DatasetRecord, Role};
use crate::util::{normalize_newlines, write_json_pretty};

/// Non-empty, trimmed lines in file order.
pub fn parse_summaries(content: &str) -> Vec<String> {
    normalize_newlines(content)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub chunk_count: usize,
    pub summary_count: usize,
    pub record_count: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatasetAssembler {
    prompts: PromptConfig,
    parser: ChunkFileParser,
}

impl DatasetAssembler {
    pub fn new(prompts: PromptConfig) -> Result<Self> {
        Ok(Self {
            prompts,
            parser: ChunkFileParser::new()?,
        })
    }

    pub fn build_record(&self, chunk: &str, summary: &str) -> DatasetRecord {
        DatasetRecord {
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: self.prompts.system_prompt.clone(),
                },
                ChatMessage {
                    role: Role::User,
                    content: format!("{}{}", self.prompts.user_prefix, chunk),
                },
                ChatMessage {
                    role: Role::Model,
                    content: summary.to_string(),
                },
            ],
        }
    }

    /// Pairs chunks and summaries by position. Both sides must be non-empty and
    /// of equal length.
    pub fn build_records(
        &self,
        chunks: &[String],
        summaries: &[String],
    ) -> Result<Vec<DatasetRecord>> {
        if chunks.is_empty() {
            bail!("no chunks to pair; expected at least one '--- CHUNK <n> ---' block");
        }
        if summaries.is_empty() {
            bail!("no summaries to pair; expected one summary per line");
        }
        if chunks.len() != summaries.len() {
            bail!(
                "mismatch between the number of chunks ({}) and summaries ({})",
                chunks.len(),
                summaries.len()
            );
        }

        Ok(chunks
            .iter()
            .zip(summaries)
            .map(|(chunk, summary)| self.build_record(chunk, summary))
            .collect())
    }

    /// Reads both inputs, validates them and writes the record array. Nothing
    /// is written unless every check passes.
    pub fn assemble(
        &self,
        chunks_path: &Path,
        summaries_path: &Path,
        output_path: &Path,
    ) -> Result<AssemblyReport> {
        let chunk_content = read_input(chunks_path, "edited chunks")?;
        let parsed = self.parser.parse(&chunk_content);
        let warnings = marker_warnings(&parsed);
        let chunks = parsed
            .into_iter()
            .map(|chunk| chunk.text)
            .collect::<Vec<String>>();

        let summary_content = read_input(summaries_path, "summaries")?;
        let summaries = parse_summaries(&summary_content);

        if chunks.is_empty() {
            bail!(
                "no chunks found in {}; check the file and its '--- CHUNK <n> ---' / '--- END CHUNK <n> ---' delimiters",
                chunks_path.display()
            );
        }
        if summaries.is_empty() {
            bail!(
                "no summaries found in {}; it must contain one summary per line",
                summaries_path.display()
            );
        }

        let records = self.build_records(&chunks, &summaries).with_context(|| {
            format!(
                "each chunk in {} needs a matching summary line in {}",
                chunks_path.display(),
                summaries_path.display()
            )
        })?;

        write_json_pretty(output_path, &records)?;

        Ok(AssemblyReport {
            chunk_count: chunks.len(),
            summary_count: summaries.len(),
            record_count: records.len(),
            warnings,
        })
    }
}

fn read_input(path: &Path, label: &str) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(error) if error.kind() == ErrorKind::NotFound => {
            Err(error).with_context(|| format!("{label} file not found: {}", path.display()))
        }
        Err(error) => {
            Err(error).with_context(|| format!("failed to read {label} file: {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::Value;
    use tempfile::TempDir;

    use super::*;
    use crate::chunking::render_chunk_file;

    struct Fixture {
        dir: TempDir,
        chunks_path: PathBuf,
        summaries_path: PathBuf,
        output_path: PathBuf,
    }

    impl Fixture {
        fn new(chunk_file: &str, summaries: &str) -> Self {
            let dir = tempfile::tempdir().expect("tempdir");
            let chunks_path = dir.path().join("chunks.txt");
            let summaries_path = dir.path().join("summaries.txt");
            let output_path = dir.path().join("out").join("dataset.json");
            fs::write(&chunks_path, chunk_file).expect("write chunks");
            fs::write(&summaries_path, summaries).expect("write summaries");
            Self {
                dir,
                chunks_path,
                summaries_path,
                output_path,
            }
        }

        fn assemble(&self) -> Result<AssemblyReport> {
            assembler().assemble(&self.chunks_path, &self.summaries_path, &self.output_path)
        }

        fn output(&self) -> Value {
            let raw = fs::read_to_string(&self.output_path).expect("read dataset");
            serde_json::from_str(&raw).expect("dataset is json")
        }
    }

    fn assembler() -> DatasetAssembler {
        DatasetAssembler::new(PromptConfig::default()).expect("assembler builds")
    }

    fn chunk_file(chunks: &[&str]) -> String {
        render_chunk_file(
            &chunks
                .iter()
                .map(|chunk| chunk.to_string())
                .collect::<Vec<String>>(),
        )
    }

    #[test]
    fn parse_summaries_skips_blank_lines_and_trims() {
        let summaries = parse_summaries("  first  \n\n\t\nsecond\r\nthird");
        assert_eq!(summaries, vec!["first", "second", "third"]);
    }

    #[test]
    fn parse_summaries_splits_on_bare_carriage_returns() {
        let summaries = parse_summaries("one\rtwo\r\rthree\r");
        assert_eq!(summaries, vec!["one", "two", "three"]);
    }

    #[test]
    fn pairs_chunks_with_summaries_in_order() {
        let fixture = Fixture::new(&chunk_file(&["X", "Y"]), "sum-X\nsum-Y\n");

        let report = fixture.assemble().expect("assembly succeeds");
        assert_eq!(report.record_count, 2);
        assert!(report.warnings.is_empty());

        let output = fixture.output();
        let records = output.as_array().expect("array");
        assert_eq!(records.len(), 2);

        let first = &records[0]["messages"];
        assert_eq!(first[0]["role"], "system");
        assert_eq!(first[1]["role"], "user");
        assert!(first[1]["content"].as_str().unwrap().contains("X"));
        assert!(
            first[1]["content"]
                .as_str()
                .unwrap()
                .ends_with("manifesto:\n\nX")
        );
        assert_eq!(first[2]["role"], "model");
        assert_eq!(first[2]["content"], "sum-X");

        let second = &records[1]["messages"];
        assert!(second[1]["content"].as_str().unwrap().contains("Y"));
        assert_eq!(second[2]["content"], "sum-Y");
    }

    #[test]
    fn count_mismatch_reports_both_counts_and_writes_nothing() {
        let fixture = Fixture::new(&chunk_file(&["first", "second"]), "only one\n\n");

        let error = fixture.assemble().expect_err("mismatch fails");
        let message = format!("{error:#}");
        assert!(message.contains("chunks (2)"), "{message}");
        assert!(message.contains("summaries (1)"), "{message}");
        assert!(!fixture.output_path.exists());
        assert!(!fixture.dir.path().join("out").exists());
    }

    #[test]
    fn swapped_blocks_pair_by_file_order() {
        let content = "--- CHUNK 2 ---\nsecond text\n--- END CHUNK 2 ---\n\n\
                       --- CHUNK 1 ---\nfirst text\n--- END CHUNK 1 ---\n\n";
        let fixture = Fixture::new(content, "summary one\nsummary two\n");

        let report = fixture.assemble().expect("assembly succeeds");
        assert_eq!(report.warnings.len(), 2);

        let output = fixture.output();
        assert!(
            output[0]["messages"][1]["content"]
                .as_str()
                .unwrap()
                .ends_with("second text")
        );
        assert_eq!(output[0]["messages"][2]["content"], "summary one");
        assert!(
            output[1]["messages"][1]["content"]
                .as_str()
                .unwrap()
                .ends_with("first text")
        );
        assert_eq!(output[1]["messages"][2]["content"], "summary two");
    }

    #[test]
    fn missing_chunk_file_names_the_path() {
        let fixture = Fixture::new("", "summary\n");
        fs::remove_file(&fixture.chunks_path).expect("remove chunks");

        let error = fixture.assemble().expect_err("missing file fails");
        let message = format!("{error:#}");
        assert!(message.contains("edited chunks file not found"), "{message}");
        assert!(message.contains("chunks.txt"), "{message}");
        assert!(!fixture.output_path.exists());
    }

    #[test]
    fn missing_summaries_file_names_the_path() {
        let fixture = Fixture::new(&chunk_file(&["X"]), "");
        fs::remove_file(&fixture.summaries_path).expect("remove summaries");

        let error = fixture.assemble().expect_err("missing file fails");
        assert!(format!("{error:#}").contains("summaries file not found"));
    }

    #[test]
    fn chunk_file_without_markers_is_rejected() {
        let fixture = Fixture::new("just some notes\nwithout markers\n", "summary\n");

        let error = fixture.assemble().expect_err("no chunks fails");
        assert!(format!("{error:#}").contains("no chunks found"));
        assert!(!fixture.output_path.exists());
    }

    #[test]
    fn blank_summaries_file_is_rejected() {
        let fixture = Fixture::new(&chunk_file(&["X"]), "\n   \n\n");

        let error = fixture.assemble().expect_err("no summaries fails");
        assert!(format!("{error:#}").contains("no summaries found"));
    }

    #[test]
    fn output_keeps_non_ascii_and_pretty_layout() {
        let fixture = Fixture::new(&chunk_file(&["Égalité für alle"]), "Résumé — kurz\n");
        fixture.assemble().expect("assembly succeeds");

        let raw = fs::read_to_string(&fixture.output_path).expect("read dataset");
        assert!(raw.contains("Égalité für alle"));
        assert!(raw.contains("Résumé — kurz"));
        assert!(raw.starts_with("[\n  {\n    \"messages\": [\n      {\n        \"role\": \"system\""));
    }

    #[test]
    fn build_records_uses_configured_prompts() {
        let assembler = DatasetAssembler::new(PromptConfig {
            system_prompt: "sys".to_string(),
            user_prefix: "Summarize: ".to_string(),
        })
        .expect("assembler builds");

        let records = assembler
            .build_records(&["body".to_string()], &["short".to_string()])
            .expect("records build");
        assert_eq!(records[0].messages[0].content, "sys");
        assert_eq!(records[0].messages[1].content, "Summarize: body");
        assert_eq!(records[0].messages[2].role, Role::Model);
    }

    #[test]
    fn build_records_rejects_empty_sides() {
        let assembler = assembler();
        assert!(
            assembler
                .build_records(&[], &["s".to_string()])
                .is_err()
        );
        assert!(
            assembler
                .build_records(&["c".to_string()], &[])
                .is_err()
        );
    }
}
