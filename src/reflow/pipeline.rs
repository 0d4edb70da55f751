//! Line reflow for text extracted from PDF pages.
//!
//! PDF text keeps the visual line breaks of the page. The reflower removes
//! the ones that split a word or a sentence and keeps the ones that separate
//! sentences, headings and paragraphs.

use std::panic::{self, AssertUnwindSafe};

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

use super::{ReflowOptions, ReflowPreset};

/// Characters accepted as a line-final hyphen: ASCII hyphen-minus, soft
/// hyphen and the Unicode hyphen.
const HYPHENS: [char; 3] = ['-', '\u{00AD}', '\u{2010}'];

/// Whether the reflow ran or the input was passed through.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReflowStatus {
    /// The text was reflowed
    #[default]
    Applied,
    /// The original text was returned unchanged
    Fallback { reason: String },
}

/// Output of [`Reflower::reflow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reflowed {
    /// Reflowed text, or the untouched input on fallback
    pub text: String,
    /// How `text` was produced
    pub status: ReflowStatus,
}

impl Reflowed {
    fn applied(text: String) -> Self {
        Self {
            text,
            status: ReflowStatus::Applied,
        }
    }

    fn fallback(original: &str, reason: String) -> Self {
        Self {
            text: original.to_string(),
            status: ReflowStatus::Fallback { reason },
        }
    }

    /// Check whether the reflow was applied.
    pub fn is_applied(&self) -> bool {
        self.status == ReflowStatus::Applied
    }

    /// Consume and return the text.
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Reflow heuristic configured by [`ReflowOptions`].
pub struct Reflower {
    options: ReflowOptions,
    space_run_regex: Regex,
}

impl Reflower {
    /// Create a new reflower with the given options.
    pub fn new(options: ReflowOptions) -> Self {
        Self {
            options,
            space_run_regex: Regex::new(r" {2,}").expect("space run pattern is valid"),
        }
    }

    /// Create a reflower from a preset.
    pub fn from_preset(preset: ReflowPreset) -> Self {
        Self::new(ReflowOptions::from_preset(preset))
    }

    /// Options in effect.
    pub fn options(&self) -> &ReflowOptions {
        &self.options
    }

    /// Reflow `text`, falling back to the original on any failure.
    ///
    /// This never panics and never returns an error: refused input and
    /// panics inside the heuristic both yield [`ReflowStatus::Fallback`]
    /// with the input returned verbatim.
    pub fn reflow(&self, text: &str) -> Reflowed {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_reflow(text))) {
            Ok(Ok(cleaned)) => Reflowed::applied(cleaned),
            Ok(Err(e)) => {
                log::warn!("Text cleanup skipped: {}", e);
                Reflowed::fallback(text, e.to_string())
            }
            Err(_) => {
                log::warn!("Text cleanup panicked; keeping raw text");
                Reflowed::fallback(text, "reflow panicked".to_string())
            }
        }
    }

    /// Reflow `text`, reporting refused input as an error.
    pub fn try_reflow(&self, text: &str) -> Result<String> {
        if let Some(limit) = self.options.max_input_len {
            if text.len() > limit {
                return Err(Error::Reflow(format!(
                    "input of {} bytes exceeds limit of {}",
                    text.len(),
                    limit
                )));
            }
        }

        if text.contains('\0') {
            return Err(Error::Reflow("input contains NUL bytes".to_string()));
        }

        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let mut normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        if self.options.normalize_unicode {
            normalized = normalized.nfc().collect();
        }

        let mut output: Vec<String> = Vec::new();
        for paragraph in split_paragraphs(&normalized) {
            let mut lines = paragraph;
            if self.options.fix_hyphenation {
                lines = join_hyphenated(lines);
            }
            if self.options.merge_soft_wraps {
                lines = self.join_soft_wraps(lines);
            }

            if !output.is_empty() {
                output.push(String::new());
            }
            output.extend(lines);
        }

        let mut result = output.join("\n");
        if self.options.collapse_spaces {
            result = self.space_run_regex.replace_all(&result, " ").into_owned();
        }

        Ok(result.trim_matches('\n').to_string())
    }

    fn join_soft_wraps(&self, lines: Vec<String>) -> Vec<String> {
        let mut out = Vec::with_capacity(lines.len());
        let mut iter = lines.into_iter();
        let Some(mut current) = iter.next() else {
            return out;
        };
        let mut current_is_merged = false;

        for next in iter {
            let may_extend = self.options.chain_merges || !current_is_merged;
            if may_extend && self.continues(&current, &next) {
                current = format!("{} {}", current.trim_end(), next.trim_start());
                current_is_merged = true;
            } else {
                out.push(std::mem::replace(&mut current, next));
                current_is_merged = false;
            }
        }

        out.push(current);
        out
    }

    /// A line continues into the next one when it lacks terminal
    /// punctuation and the next one starts in lowercase.
    fn continues(&self, line: &str, next: &str) -> bool {
        let ends_sentence = line
            .trim_end()
            .chars()
            .last()
            .map_or(true, |c| self.options.is_terminal(c));
        let starts_lowercase = next
            .trim_start()
            .chars()
            .next()
            .is_some_and(char::is_lowercase);

        !ends_sentence && starts_lowercase
    }
}

impl Default for Reflower {
    fn default() -> Self {
        Self::new(ReflowOptions::default())
    }
}

/// Split text into paragraphs of non-blank, right-trimmed lines.
fn split_paragraphs(text: &str) -> Vec<Vec<String>> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in text.split('\n') {
        let line = line.trim_end();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.to_string());
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

/// Join each hyphen-terminated line with the line after it. A joined line
/// is not examined again.
fn join_hyphenated(lines: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        match (hyphenated_stem(&lines[i]), lines.get(i + 1)) {
            (Some(stem), Some(next)) => {
                out.push(format!("{}{}", stem, next.trim_start()));
                i += 2;
            }
            _ => {
                out.push(lines[i].clone());
                i += 1;
            }
        }
    }

    out
}

/// The text before a line-final hyphen, unless the hyphen is all there is.
fn hyphenated_stem(line: &str) -> Option<&str> {
    let last = line.chars().last()?;
    if !HYPHENS.contains(&last) {
        return None;
    }
    let stem = &line[..line.len() - last.len_utf8()];
    (!stem.trim().is_empty()).then_some(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard(text: &str) -> String {
        Reflower::default().reflow(text).into_text()
    }

    #[test]
    fn test_hyphenation_repair() {
        assert_eq!(standard("inter-\nnational"), "international");
        assert_eq!(standard("exam-\n   ple text."), "example text.");
    }

    #[test]
    fn test_soft_wrap_repair() {
        assert_eq!(
            standard("The cat sat on\nthe mat."),
            "The cat sat on the mat."
        );
    }

    #[test]
    fn test_terminal_punctuation_blocks_merge() {
        let text = "End of sentence.\nNext sentence starts.";
        assert_eq!(standard(text), text);
        assert_eq!(standard("Really?\nyes, really."), "Really?\nyes, really.");
    }

    #[test]
    fn test_uppercase_blocks_merge() {
        let text = "Heading Line\nNext Paragraph";
        assert_eq!(standard(text), text);
    }

    #[test]
    fn test_blank_lines_collapse_to_one() {
        let text = "First line.\n\n\n\n\nSecond line.";
        assert_eq!(standard(text), "First line.\n\nSecond line.");
    }

    #[test]
    fn test_merges_do_not_cross_paragraphs() {
        let text = "a sentence without end\n\ncontinues here";
        assert_eq!(standard(text), text);
    }

    #[test]
    fn test_empty_and_blank_input() {
        let result = Reflower::default().reflow("");
        assert!(result.is_applied());
        assert_eq!(result.text, "");
        assert_eq!(standard("  \n\n \t\n"), "");
    }

    #[test]
    fn test_well_formed_text_is_unchanged() {
        let text = "Alpha beta.\nGamma delta!\n\n  Indented Epsilon\nZeta";
        assert_eq!(standard(text), text);
    }

    #[test]
    fn test_outer_blank_lines_stripped() {
        assert_eq!(standard("\n\nHello\n\n"), "Hello");
    }

    #[test]
    fn test_hyphen_checked_before_soft_wrap() {
        assert_eq!(standard("well-\nknown facts"), "wellknown facts");
    }

    #[test]
    fn test_lone_hyphen_is_not_a_word_break() {
        assert_eq!(standard("-\nitem"), "- item");
    }

    #[test]
    fn test_unicode_hyphens() {
        assert_eq!(standard("co\u{00AD}\noperate"), "cooperate");
        assert_eq!(standard("re\u{2010}\nflow"), "reflow");
    }

    #[test]
    fn test_hyphen_merge_is_not_chained() {
        // "ab-" is the product of a join, so it is not joined again by the
        // hyphen rule; the soft-wrap rule then attaches "c".
        assert_eq!(standard("a-\nb-\nc"), "ab- c");
    }

    #[test]
    fn test_hyphen_before_paragraph_break_is_kept() {
        assert_eq!(standard("exam-\n\nple"), "exam-\n\nple");
        assert_eq!(standard("exam-"), "exam-");
    }

    #[test]
    fn test_unchained_hyphen_join_settles_on_second_pass() {
        // One join per pass leaves "ab-" ending in a hyphen, so a second
        // pass joins it with the capitalized line the first pass kept apart.
        let once = standard("a-\nb-\nC");
        assert_eq!(once, "ab-\nC");
        assert_eq!(standard(&once), "abC");
        assert_eq!(standard("abC"), "abC");
    }

    #[test]
    fn test_chained_soft_wraps() {
        assert_eq!(
            standard("The cat\nsat on\nthe mat."),
            "The cat sat on the mat."
        );
    }

    #[test]
    fn test_pairwise_soft_wraps() {
        let reflower = Reflower::from_preset(ReflowPreset::Minimal);
        let result = reflower.reflow("The cat\nsat on\nthe mat.");
        assert_eq!(result.text, "The cat sat on\nthe mat.");
    }

    #[test]
    fn test_colon_option() {
        let text = "Ingredients:\nflour and water";
        assert_eq!(standard(text), text);

        let minimal = Reflower::from_preset(ReflowPreset::Minimal);
        assert_eq!(
            minimal.reflow(text).text,
            "Ingredients: flour and water"
        );
    }

    #[test]
    fn test_collapse_spaces() {
        let aggressive = Reflower::from_preset(ReflowPreset::Aggressive);
        assert_eq!(
            aggressive.reflow("Too   many  spaces.").text,
            "Too many spaces."
        );
        assert_eq!(standard("Two  spaces."), "Two  spaces.");
    }

    #[test]
    fn test_cyrillic_continuation() {
        assert_eq!(
            standard("Это предложение\nпродолжается."),
            "Это предложение продолжается."
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(standard("one\r\ntwo"), "one two");
    }

    #[test]
    fn test_unicode_normalization() {
        assert_eq!(standard("cafe\u{301}"), "caf\u{e9}");
        let minimal = Reflower::from_preset(ReflowPreset::Minimal);
        assert_eq!(minimal.reflow("cafe\u{301}").text, "cafe\u{301}");
    }

    #[test]
    fn test_nul_bytes_fall_back() {
        let text = "garbage\0from a\nbroken decode";
        let result = Reflower::default().reflow(text);
        assert!(!result.is_applied());
        assert_eq!(result.text, text);
        assert!(matches!(result.status, ReflowStatus::Fallback { .. }));
    }

    #[test]
    fn test_input_limit_falls_back() {
        let reflower = Reflower::new(ReflowOptions::default().with_max_input_len(8));
        let result = reflower.reflow("line one\nline two");
        assert_eq!(result.text, "line one\nline two");
        match result.status {
            ReflowStatus::Fallback { reason } => assert!(reason.contains("exceeds limit")),
            ReflowStatus::Applied => panic!("expected fallback"),
        }
    }

    #[test]
    fn test_try_reflow_reports_error() {
        let err = Reflower::default().try_reflow("a\0b").unwrap_err();
        assert!(matches!(err, Error::Reflow(_)));
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let text = "Intro-\nduction to the\nsubject.\n\n\n\nSecond para-\ngraph ends here.\nThird Line";
        let once = standard(text);
        assert_eq!(
            once,
            "Introduction to the subject.\n\nSecond paragraph ends here.\nThird Line"
        );
        assert_eq!(standard(&once), once);
    }

    #[test]
    fn test_disabled_rules() {
        let reflower = Reflower::new(
            ReflowOptions::default()
                .with_hyphenation(false)
                .with_soft_wraps(false),
        );
        assert_eq!(reflower.reflow("inter-\nnational").text, "inter-\nnational");
    }
}
