//! Splits an email body into per-project blocks

use crate::labels::NUMBERING;
use mailsheet_domain::EmailBlock;
use regex::Regex;
use std::sync::LazyLock;

/// Lines starting with one of these keywords open a new project section
const SECTION_KEYWORDS: &[&str] = &[
    "案件名",
    "案件概要",
    "募集案件",
    "案件タイトル",
    "案件情報",
    r"project\s+name",
    r"project\s+overview",
    r"recruiting\s+project",
    r"project\s+title",
    r"project\s+info",
];

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    let keywords = SECTION_KEYWORDS.join("|");
    let number = NUMBERING;
    Regex::new(&format!(
        r"(?i)^\s*(?:[■◆●▼・*\-]\s*)?{number}[【\[]?\s*(?:{keywords})"
    ))
    .expect("section header pattern is valid")
});

/// Partitions message text into candidate project blocks
pub struct BlockSplitter {
    min_block_chars: usize,
}

impl BlockSplitter {
    /// Create a splitter that drops blocks shorter than `min_block_chars`
    pub fn new(min_block_chars: usize) -> Self {
        Self { min_block_chars }
    }

    /// True if the line opens a new project section
    pub fn is_section_header(line: &str) -> bool {
        SECTION_HEADER.is_match(line)
    }

    /// Split the text at section-header lines
    ///
    /// Content before the first header is discarded. The result is empty
    /// when no header line exists.
    pub fn split(&self, text: &str) -> Vec<EmailBlock> {
        let lines: Vec<&str> = text.lines().collect();
        let starts: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| Self::is_section_header(line))
            .map(|(idx, _)| idx)
            .collect();

        let mut blocks = Vec::new();
        for (n, &start) in starts.iter().enumerate() {
            let end = starts.get(n + 1).copied().unwrap_or(lines.len());
            let segment = lines[start..end].join("\n");
            let block = EmailBlock::new(blocks.len(), segment.trim());

            if block.char_len() < self.min_block_chars {
                continue;
            }
            blocks.push(block);
        }

        blocks
    }
}

impl Default for BlockSplitter {
    fn default() -> Self {
        Self::new(10)
    }
}
