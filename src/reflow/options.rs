//! Reflow options and presets.

/// Reflow preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReflowPreset {
    /// Pairwise merges only, colon does not end a sentence, no normalization
    Minimal,
    /// Chained merges, colon ends a sentence, NFC normalization
    #[default]
    Standard,
    /// Standard plus collapsing of space runs
    Aggressive,
}

/// Options controlling the reflow heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflowOptions {
    /// Normalize Unicode to NFC form before reflowing
    pub normalize_unicode: bool,

    /// Join words hyphenated across a line break
    pub fix_hyphenation: bool,

    /// Join lines broken mid-sentence
    pub merge_soft_wraps: bool,

    /// Treat a trailing `:` as sentence-terminal punctuation
    pub colon_terminates: bool,

    /// Re-examine a merged line against the line after it
    pub chain_merges: bool,

    /// Collapse runs of spaces into a single space
    pub collapse_spaces: bool,

    /// Inputs longer than this many bytes are returned unchanged
    pub max_input_len: Option<usize>,
}

impl ReflowOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options from a preset.
    pub fn from_preset(preset: ReflowPreset) -> Self {
        match preset {
            ReflowPreset::Minimal => Self::minimal(),
            ReflowPreset::Standard => Self::standard(),
            ReflowPreset::Aggressive => Self::aggressive(),
        }
    }

    /// Minimal reflow options.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: false,
            fix_hyphenation: true,
            merge_soft_wraps: true,
            colon_terminates: false,
            chain_merges: false,
            collapse_spaces: false,
            max_input_len: None,
        }
    }

    /// Standard reflow options.
    pub fn standard() -> Self {
        Self {
            normalize_unicode: true,
            fix_hyphenation: true,
            merge_soft_wraps: true,
            colon_terminates: true,
            chain_merges: true,
            collapse_spaces: false,
            max_input_len: None,
        }
    }

    /// Aggressive reflow options.
    pub fn aggressive() -> Self {
        Self {
            collapse_spaces: true,
            ..Self::standard()
        }
    }

    /// Enable or disable hyphenation repair.
    pub fn with_hyphenation(mut self, enabled: bool) -> Self {
        self.fix_hyphenation = enabled;
        self
    }

    /// Enable or disable soft-wrap repair.
    pub fn with_soft_wraps(mut self, enabled: bool) -> Self {
        self.merge_soft_wraps = enabled;
        self
    }

    /// Set whether `:` ends a sentence.
    pub fn with_colon_terminates(mut self, enabled: bool) -> Self {
        self.colon_terminates = enabled;
        self
    }

    /// Set whether merged lines keep absorbing continuation lines.
    pub fn with_chain_merges(mut self, enabled: bool) -> Self {
        self.chain_merges = enabled;
        self
    }

    /// Enable or disable space-run collapsing.
    pub fn with_collapse_spaces(mut self, enabled: bool) -> Self {
        self.collapse_spaces = enabled;
        self
    }

    /// Enable or disable NFC normalization.
    pub fn with_unicode_normalization(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    /// Set the maximum input length in bytes.
    pub fn with_max_input_len(mut self, limit: usize) -> Self {
        self.max_input_len = Some(limit);
        self
    }

    /// Check whether a trimmed line ends a sentence.
    pub(crate) fn is_terminal(&self, c: char) -> bool {
        matches!(c, '.' | '!' | '?') || (self.colon_terminates && c == ':')
    }
}

impl Default for ReflowOptions {
    fn default() -> Self {
        Self::standard()
    }
}

impl From<ReflowPreset> for ReflowOptions {
    fn from(preset: ReflowPreset) -> Self {
        Self::from_preset(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_standard() {
        assert_eq!(ReflowOptions::default(), ReflowOptions::standard());
        assert_eq!(
            ReflowOptions::from(ReflowPreset::default()),
            ReflowOptions::standard()
        );
    }

    #[test]
    fn test_presets_differ_where_expected() {
        let minimal = ReflowOptions::minimal();
        let aggressive = ReflowOptions::aggressive();

        assert!(!minimal.colon_terminates);
        assert!(!minimal.chain_merges);
        assert!(aggressive.collapse_spaces);
        assert!(aggressive.chain_merges);
    }

    #[test]
    fn test_builder() {
        let options = ReflowOptions::new()
            .with_collapse_spaces(true)
            .with_colon_terminates(false)
            .with_max_input_len(1024);

        assert!(options.collapse_spaces);
        assert!(!options.colon_terminates);
        assert_eq!(options.max_input_len, Some(1024));
    }

    #[test]
    fn test_terminal_punctuation() {
        let standard = ReflowOptions::standard();
        assert!(standard.is_terminal('.'));
        assert!(standard.is_terminal('?'));
        assert!(standard.is_terminal(':'));
        assert!(!standard.is_terminal(','));
        assert!(!ReflowOptions::minimal().is_terminal(':'));
    }
}
