//! Paragraph chunks and the marker-delimited review file that carries them
//! between the two pipeline runs.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

use crate::util::{normalize_newlines, write_text};

/// Splits a reassembled document into paragraph chunks.
#[derive(Debug, Clone)]
pub struct ParagraphSegmenter {
    paragraph_break: Regex,
}

impl ParagraphSegmenter {
    pub fn new() -> Result<Self> {
        let paragraph_break =
            Regex::new(r"\n\s*\n+").context("failed to compile paragraph break regex")?;
        Ok(Self { paragraph_break })
    }

    /// Splits on runs of two or more newlines (whitespace allowed between
    /// them), trims each piece and drops the empty ones.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.paragraph_break
            .split(text)
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}

pub fn render_chunk_file(chunks: &[String]) -> String {
    let mut rendered = String::new();
    for (index, chunk) in chunks.iter().enumerate() {
        let id = index + 1;
        rendered.push_str(&format!("--- CHUNK {id} ---\n"));
        rendered.push_str(chunk);
        rendered.push('\n');
        rendered.push_str(&format!("--- END CHUNK {id} ---\n\n"));
    }
    rendered
}

/// Writes the review file and returns how many chunks it holds. Zero chunks is
/// a valid outcome; only IO failures are errors.
pub fn write_chunk_file(path: &Path, chunks: &[String]) -> Result<usize> {
    write_text(path, &render_chunk_file(chunks))
        .with_context(|| format!("failed to write chunk file: {}", path.display()))?;

    Ok(chunks.len())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChunk {
    pub start_id: String,
    pub end_id: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ChunkFileParser {
    block: Regex,
}

impl ChunkFileParser {
    pub fn new() -> Result<Self> {
        let block = Regex::new(
            r"(?s)--- CHUNK (?P<start>\d+) ---\n(?P<body>.*?)\n--- END CHUNK (?P<end>\d+) ---",
        )
        .context("failed to compile chunk block regex")?;
        Ok(Self { block })
    }

    /// Extracts chunk bodies in the order their markers appear in the file.
    /// The numbers inside the markers are kept for diagnostics only.
    pub fn parse(&self, content: &str) -> Vec<ParsedChunk> {
        let normalized = normalize_newlines(content);

        self.block
            .captures_iter(&normalized)
            .map(|captures| ParsedChunk {
                start_id: captures["start"].to_string(),
                end_id: captures["end"].to_string(),
                text: captures["body"].trim().to_string(),
            })
            .collect()
    }
}

/// Reports marker numbering that disagrees with file order. Pairing with
/// summaries ignores the numbers, so these are warnings for the reviewer.
pub fn marker_warnings(chunks: &[ParsedChunk]) -> Vec<String> {
    let mut warnings = Vec::new();

    for (index, chunk) in chunks.iter().enumerate() {
        let position = index + 1;
        let start = chunk.start_id.parse::<u64>().ok();
        let end = chunk.end_id.parse::<u64>().ok();

        if start != end {
            warnings.push(format!(
                "chunk block {position} opens as CHUNK {} but closes as END CHUNK {}",
                chunk.start_id, chunk.end_id
            ));
        }

        if start != Some(position as u64) {
            warnings.push(format!(
                "chunk block {position} is numbered {}; pairing follows file order",
                chunk.start_id
            ));
        }
    }

    warnings
}
