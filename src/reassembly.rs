//! Rebuilds reading-order text from positioned OCR words.
//!
//! Words on a page are ordered top-to-bottom, left-to-right and clustered
//! into lines with a single greedy pass. A line's vertical anchor is the
//! `ymin` of the word that opened it; it is never re-centred as words are
//! added, so a slowly drifting baseline can split into several lines. The
//! heuristic assumes single-column layout without rotated or overlapping text.

use std::cmp::Ordering;

use crate::model::{OcrExport, OcrWord};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub page_label: String,
    pub word_count: usize,
    pub line_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ReassembledDocument {
    pub text: String,
    pub pages: Vec<PageSummary>,
}

impl ReassembledDocument {
    pub fn empty_page_count(&self) -> usize {
        self.pages.iter().filter(|page| page.word_count == 0).count()
    }

    pub fn word_count(&self) -> usize {
        self.pages.iter().map(|page| page.word_count).sum()
    }

    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|page| page.line_count).sum()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LineReconstructor {
    line_y_tolerance: f64,
}

impl LineReconstructor {
    pub fn new(line_y_tolerance: f64) -> Self {
        Self { line_y_tolerance }
    }

    pub fn reassemble(&self, export: &OcrExport) -> ReassembledDocument {
        let mut document = ReassembledDocument::default();

        for (index, page) in export.page_data.iter().enumerate() {
            let page_label = page.page_label(index);

            if page.words.is_empty() {
                document
                    .text
                    .push_str(&format!("\n--- Page {page_label} (No words found) ---\n"));
                document.pages.push(PageSummary {
                    page_label,
                    word_count: 0,
                    line_count: 0,
                });
                continue;
            }

            let lines = self.page_lines(&page.words);
            document.text.push_str(&format!(
                "\n--- Page {page_label} ---\n{}\n",
                lines.join("\n")
            ));
            document.pages.push(PageSummary {
                page_label,
                word_count: page.words.len(),
                line_count: lines.len(),
            });
        }

        document
    }

    pub fn page_lines(&self, words: &[OcrWord]) -> Vec<String> {
        let mut ordered = words.iter().collect::<Vec<&OcrWord>>();
        ordered.sort_by(|left, right| {
            compare_coordinate(left.ymin, right.ymin)
                .then_with(|| compare_coordinate(left.xmin, right.xmin))
        });

        let mut lines = Vec::<String>::new();
        let mut current = Vec::<&OcrWord>::new();
        let mut anchor_y = ordered.first().map(|word| word.ymin).unwrap_or_default();

        for word in ordered {
            if current.is_empty() || (word.ymin - anchor_y).abs() <= self.line_y_tolerance {
                current.push(word);
                continue;
            }

            lines.push(render_line(&mut current));
            current.push(word);
            anchor_y = word.ymin;
        }

        if !current.is_empty() {
            lines.push(render_line(&mut current));
        }

        lines
    }
}

/// Drains `words` into a single space-joined line ordered by `xmin`.
fn render_line(words: &mut Vec<&OcrWord>) -> String {
    words.sort_by(|left, right| compare_coordinate(left.xmin, right.xmin));
    let line = words
        .iter()
        .map(|word| word.text.as_str())
        .collect::<Vec<&str>>()
        .join(" ");
    words.clear();
    line
}

fn compare_coordinate(left: f64, right: f64) -> Ordering {
    left.total_cmp(&right)
}
