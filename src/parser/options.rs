//! Parsing options and configuration.

use crate::context::DEFAULT_CONTEXT_WINDOW;

/// Options for parsing DOCX documents and extracting tables.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Context window budget per table
    pub context_window_size: usize,

    /// Whether to read docProps/core.xml metadata
    pub extract_metadata: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip malformed tables).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable strict mode (fail on the first malformed table).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Set the context window budget.
    pub fn with_context_window(mut self, size: usize) -> Self {
        self.context_window_size = size;
        self
    }

    /// Enable or disable metadata extraction.
    pub fn with_metadata(mut self, extract: bool) -> Self {
        self.extract_metadata = extract;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            context_window_size: DEFAULT_CONTEXT_WINDOW,
            extract_metadata: true,
        }
    }
}

/// Error handling mode during parsing and extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Skip malformed tables with a diagnostic and continue
    #[default]
    Lenient,
    /// Fail on the first malformed table
    Strict,
}
