//! Label stripping: drop redundant "Description:"-style keys from markdown, keeping values.
//!
//! A label is only removed where it sits in a recognised position: a heading, a list item,
//! a bold or emphasised span followed by a colon, or the start of a plain line. The position
//! patterns live in [`LABEL_RULES`] so they can be audited and tested as data.
//!
//! Every form needs the colon except headings: a heading that is nothing but a label
//! (`### Description`) is a section title, not content, and is dropped.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::core::util::squash_whitespace;

/// Built-in label vocabulary recognised in chat responses.
pub const DEFAULT_LABELS: &[&str] = &[
    "Description",
    "Title",
    "Subtitle",
    "Value Proposition",
    "Key Features",
    "Features",
    "Benefits",
    "Use Cases",
    "Capabilities",
];

/// Markdown emphasis markers that may wrap a label.
const MARK: &str = r"(?:\*\*|__|\*|_)";

/// Where a label may appear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LabelForm {
    Heading,
    ListItem,
    Bold,
    Emphasis,
    PlainLine,
}

/// Pattern templates, applied in order. `{L}` is the escaped label, `{M}` an emphasis marker.
/// Heading and list rules capture the marker (group 1) and the remaining value (group 2).
const LABEL_RULES: &[(LabelForm, &str)] = &[
    (
        LabelForm::Heading,
        r"(?im)^([ \t]*#{1,6})[ \t]*{M}?{L}{M}?(?:[ \t]*:[ \t]*{M}?|[ \t]*$)[ \t]*([^\n]*)$",
    ),
    (
        LabelForm::ListItem,
        r"(?im)^([ \t]*(?:[-*+•]|\d+[.)])[ \t]+){M}?{L}{M}?[ \t]*:[ \t]*{M}?[ \t]*([^\n]*)$",
    ),
    (
        LabelForm::Bold,
        r"(?i)(?:\*\*|__)[ \t]*{L}(?:[ \t]*:[ \t]*(?:\*\*|__)|(?:\*\*|__)[ \t]*:)[ \t]*",
    ),
    (
        LabelForm::Emphasis,
        r"(?im)(^|[\s(])[*_]{L}(?:[ \t]*:[ \t]*[*_]|[*_][ \t]*:)[ \t]*",
    ),
    (LabelForm::PlainLine, r"(?im)^[ \t]*{L}[ \t]*:[ \t]*"),
];

static EXCESS_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n(?:[ \t]*\n){2,}").expect("blank line pattern must compile")
});

/// Characters removed by [`clean_text`] wherever they appear.
const STRIPPED_CHARS: &[char] = &[
    '*', '(', ')', '"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}',
];

#[derive(Debug)]
struct CompiledRule {
    form: LabelForm,
    re: Regex,
}

/// Compiled label table. Cheap to share; `strip` takes `&self` and keeps no state between calls.
#[derive(Debug)]
pub struct LabelStripper {
    labels: Vec<String>,
    rules: Vec<CompiledRule>,
}

impl Default for LabelStripper {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS)
    }
}

impl LabelStripper {
    /// Build a stripper for `labels`. Longer labels are applied first so "Key Features"
    /// wins over "Features". Blank labels and case-insensitive repeats are ignored.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels: Vec<String> = labels
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        labels.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        let mut seen = HashSet::new();
        labels.retain(|l| seen.insert(squash_whitespace(&l.to_lowercase())));

        let mut rules = Vec::with_capacity(labels.len() * LABEL_RULES.len());
        for label in &labels {
            let escaped = label_pattern(label);
            for (form, template) in LABEL_RULES {
                let pattern = template.replace("{L}", &escaped).replace("{M}", MARK);
                match Regex::new(&pattern) {
                    Ok(re) => rules.push(CompiledRule { form: *form, re }),
                    Err(e) => log::warn!("Skipping label '{}' ({:?}): {}", label, form, e),
                }
            }
        }
        Self { labels, rules }
    }

    /// Remove every recognised label prefix and keep the values. Runs of blank lines are
    /// collapsed and the result is trimmed.
    pub fn strip(&self, markdown: &str) -> String {
        let mut text = markdown.replace("\r\n", "\n");
        for rule in &self.rules {
            text = match rule.form {
                LabelForm::Heading | LabelForm::ListItem => rule
                    .re
                    .replace_all(&text, |caps: &Captures| keep_marker_with_value(rule.form, caps))
                    .into_owned(),
                LabelForm::Emphasis => rule.re.replace_all(&text, "$1").into_owned(),
                LabelForm::Bold | LabelForm::PlainLine => {
                    rule.re.replace_all(&text, "").into_owned()
                }
            };
        }
        EXCESS_BLANK_LINES
            .replace_all(&text, "\n\n")
            .trim()
            .to_string()
    }

    /// Return the canonical label when `text` is exactly a label, ignoring case,
    /// emphasis markers and a trailing colon.
    pub fn match_label(&self, text: &str) -> Option<&str> {
        let key = text
            .trim()
            .trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
            .trim_end_matches(':')
            .trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace());
        let key = squash_whitespace(key);
        self.labels
            .iter()
            .find(|l| l.eq_ignore_ascii_case(&key))
            .map(String::as_str)
    }
}

/// Heading/list rewrite: keep the marker when a value follows, drop the whole line otherwise.
fn keep_marker_with_value(form: LabelForm, caps: &Captures) -> String {
    let marker = &caps[1];
    let value = caps[2].trim_end();
    if value.trim().is_empty() {
        return String::new();
    }
    match form {
        LabelForm::Heading => format!("{} {}", marker, value),
        _ => format!("{}{}", marker, value),
    }
}

/// Escape each word of the label and allow any run of spaces between words.
fn label_pattern(label: &str) -> String {
    label
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"[ \t]+")
}

/// One-shot helper: compile `labels` and strip them from `markdown`.
pub fn strip_labels<S: AsRef<str>>(markdown: &str, labels: &[S]) -> String {
    LabelStripper::new(labels.iter().map(AsRef::as_ref)).strip(markdown)
}

/// Reduce a display fragment to bare text: no asterisks, quotes or parentheses,
/// no trailing colon, no surrounding whitespace. Idempotent.
pub fn clean_text(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect();
    stripped
        .trim()
        .trim_end_matches(|c: char| c == ':' || c.is_whitespace())
        .to_string()
}
