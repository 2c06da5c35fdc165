//! Email blocks - candidate per-project slices of a message

/// A contiguous slice of a message hypothesized to describe one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailBlock {
    /// Position of the block within the source message (0-based)
    pub index: usize,
    /// Trimmed block text
    pub text: String,
}

impl EmailBlock {
    /// Create a new block
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
