//! Indentation stack used by the tokenizer to synthesize `Indent`/`Dedent` tokens.

/// Popping would have removed the base level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentUnderflow;

/// Strictly increasing indentation widths, always starting with `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentStack {
    levels: Vec<usize>,
}

impl Default for IndentStack {
    fn default() -> Self {
        Self::new()
    }
}

impl IndentStack {
    pub fn new() -> Self {
        IndentStack { levels: vec![0] }
    }

    /// Width of the innermost open block.
    pub fn top(&self) -> usize {
        self.levels.last().copied().unwrap_or(0)
    }

    /// Number of levels including the base.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    /// Opens a block. Widths not above the current top are ignored so the stack stays
    /// strictly increasing.
    pub fn push(&mut self, width: usize) -> bool {
        if width > self.top() {
            self.levels.push(width);
            true
        } else {
            false
        }
    }

    /// Closes the innermost block and returns its width. Refuses to remove the base:
    /// the stack is reset to `[0]` and the caller reports the underflow.
    pub fn pop(&mut self) -> Result<usize, IndentUnderflow> {
        if self.levels.len() <= 1 {
            self.levels.clear();
            self.levels.push(0);
            return Err(IndentUnderflow);
        }
        self.levels.pop().ok_or(IndentUnderflow)
    }
}
