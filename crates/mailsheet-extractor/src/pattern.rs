//! Deterministic label-based field extraction

use crate::labels::{canonical, parse_label_line, LabelLine, FIELD_LABELS};
use crate::splitter::BlockSplitter;
use mailsheet_domain::{EmailBlock, ProjectRecord};
use tracing::debug;

/// One labelled region of a block: the label line and the lines up to the
/// next label line
#[derive(Debug)]
struct Section<'a> {
    label: String,
    lines: Vec<&'a str>,
}

impl Section<'_> {
    /// Whole value, each line right-trimmed, surrounding blank lines removed
    fn multiline_value(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    /// First non-empty line of the value
    fn single_line_value(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

/// Break a block into labelled sections, in source order
///
/// Text before the first label and under unknown `【…】` headings belongs to
/// no section.
fn sections(text: &str) -> Vec<Section<'_>> {
    let mut sections: Vec<Section<'_>> = Vec::new();
    let mut current: Option<Section<'_>> = None;

    for line in text.lines() {
        match parse_label_line(line) {
            Some(LabelLine::Known { label, rest }) => {
                sections.extend(current.take());
                current = Some(Section {
                    label,
                    lines: vec![rest],
                });
            }
            Some(LabelLine::Unknown) => {
                sections.extend(current.take());
            }
            None => {
                if let Some(section) = current.as_mut() {
                    section.lines.push(line);
                }
            }
        }
    }
    sections.extend(current);

    sections
}

/// Pattern-strategy extractor: label tables applied to split blocks
pub struct PatternExtractor {
    splitter: BlockSplitter,
}

impl PatternExtractor {
    /// Create an extractor whose splitter drops blocks under `min_block_chars`
    pub fn new(min_block_chars: usize) -> Self {
        Self {
            splitter: BlockSplitter::new(min_block_chars),
        }
    }

    /// Extract exactly one record from a block
    ///
    /// For each field the label alternatives are tried in table order and
    /// the first non-empty value wins; fields with no match keep the
    /// sentinel.
    pub fn extract_block(&self, block: &EmailBlock) -> ProjectRecord {
        let sections = sections(&block.text);
        let mut record = ProjectRecord::empty();

        for entry in FIELD_LABELS.iter() {
            let value = entry.labels.iter().find_map(|label| {
                let label = canonical(label);
                sections
                    .iter()
                    .filter(|s| s.label == label)
                    .map(|s| {
                        if entry.multiline {
                            s.multiline_value()
                        } else {
                            s.single_line_value()
                        }
                    })
                    .find(|v| !v.is_empty())
            });

            if let Some(value) = value {
                record.set(entry.field, value);
            }
        }

        debug!(
            "Block {}: {} labelled sections, meaningful={}",
            block.index,
            sections.len(),
            record.is_meaningful()
        );

        record
    }

    /// Split the message and extract one record per block
    ///
    /// A message with no section header is treated as a single block.
    pub fn extract_all(&self, text: &str) -> Vec<ProjectRecord> {
        let mut blocks = self.splitter.split(text);
        if blocks.is_empty() {
            blocks.push(EmailBlock::new(0, text.trim()));
        }

        blocks.iter().map(|b| self.extract_block(b)).collect()
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new(10)
    }
}
