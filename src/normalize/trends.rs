//! Mega trend parsing: split market-analysis markdown into numbered trend sections.
//!
//! Headings are recognised in three forms (bold heading, plain heading, bare line). When none
//! are present the text is split on the analysis markers (THEME, THE SHIFT, ...), and failing
//! that it becomes a single section.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Trend heading forms, highest priority first. Group 1 is the trend number.
/// A bare line only counts when nothing but `**` or a `:`/dash subtitle follows the number,
/// so prose that opens with "Mega Trend 1 is ..." stays body text.
const TREND_HEADING_PATTERNS: &[&str] = &[
    r"(?m)^[ \t]*#{1,6}[ \t]*\*\*[ \t]*(?i:mega[ \t]+trend)[ \t]*[-–—]?[ \t]*(\d+)",
    r"(?m)^[ \t]*#{1,6}[ \t]*(?i:mega[ \t]+trend)[ \t]*[-–—]?[ \t]*(\d+)",
    r"(?m)^[ \t]*(?:\*\*)?[ \t]*(?i:mega[ \t]+trend)[ \t]*[-–—]?[ \t]*(\d+)[ \t]*(?:\*\*)?[ \t]*(?:[:\-–—][^\n]*)?$",
];

/// Section markers used when a document has no trend headings.
const FALLBACK_MARKER_PATTERN: &str = r"(?m)^[ \t]*(?:#{1,6}[ \t]*)?(?:\*\*)?[ \t]*(?:THEME|THE SHIFT|THE TENSION|THE OPPORTUNITY|AGENTIC OPPORTUNITY PLAYS)\b";

/// Matches closer than this (in bytes) with the same number are the same heading.
const DEDUP_WINDOW: usize = 10;

/// Title for a document that has no recognisable sections.
const SINGLE_SECTION_TITLE: &str = "Mega Trends";

static TREND_HEADINGS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TREND_HEADING_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("trend heading pattern must compile"))
        .collect()
});

static FALLBACK_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(FALLBACK_MARKER_PATTERN).expect("fallback marker pattern must compile")
});

/// Lines left over from a split heading: lone `#` runs or `**`.
static RESIDUAL_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[ \t]*(?:#{1,6}|\*\*)[ \t]*(?:\n|$))+").expect("residual pattern must compile")
});

static EXCESS_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n(?:[ \t]*\n){2,}").expect("blank line pattern must compile")
});

/// One trend tab.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrendSection {
    pub title: String,
    pub content: String,
    /// Trend number from the heading; ordinal position for marker or single sections.
    pub index: u32,
}

/// Trend sections plus any text that precedes the first one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrendDocument {
    pub preamble: String,
    pub sections: Vec<TrendSection>,
}

#[derive(Clone, Copy, Debug)]
struct HeadingMatch {
    start: usize,
    /// `None` when the digits do not fit a `u32`.
    number: Option<u32>,
    len: usize,
}

/// Where a section starts, its number if the heading carried one, and the marker length.
#[derive(Clone, Copy, Debug)]
struct Span {
    start: usize,
    number: Option<u32>,
    len: usize,
}

/// Parse trend sections in source order.
pub fn parse_trends(markdown: &str) -> Vec<TrendSection> {
    parse_trend_document(markdown).sections
}

/// Parse trend sections, keeping the text before the first section as a preamble.
pub fn parse_trend_document(markdown: &str) -> TrendDocument {
    let markdown = markdown.replace("\r\n", "\n");
    if markdown.trim().is_empty() {
        return TrendDocument::default();
    }

    let headings = find_trend_headings(&markdown);
    if !headings.is_empty() {
        log::debug!("Found {} mega trend headings", headings.len());
        let spans: Vec<Span> = headings
            .iter()
            .map(|h| Span {
                start: h.start,
                number: h.number,
                len: h.len,
            })
            .collect();
        return build_document(&markdown, &spans);
    }

    let markers: Vec<Span> = FALLBACK_MARKERS
        .find_iter(&markdown)
        .map(|m| Span {
            start: m.start(),
            number: None,
            len: m.len(),
        })
        .collect();
    if markers.len() >= 2 {
        log::debug!("No trend headings; splitting on {} section markers", markers.len());
        return build_document(&markdown, &markers);
    }

    log::debug!("No trend headings or markers; using a single section");
    TrendDocument {
        preamble: String::new(),
        sections: vec![TrendSection {
            title: SINGLE_SECTION_TITLE.to_string(),
            content: tidy_body(&markdown),
            index: 1,
        }],
    }
}

/// All heading matches across the patterns, de-duplicated and sorted by offset.
fn find_trend_headings(markdown: &str) -> Vec<HeadingMatch> {
    let mut found: Vec<HeadingMatch> = Vec::new();
    for re in TREND_HEADINGS.iter() {
        for caps in re.captures_iter(markdown) {
            let (Some(whole), Some(num)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let number = num.as_str().parse::<u32>().ok();
            let duplicate = found
                .iter()
                .any(|h| h.number == number && h.start.abs_diff(whole.start()) <= DEDUP_WINDOW);
            if !duplicate {
                found.push(HeadingMatch {
                    start: whole.start(),
                    number,
                    len: whole.len(),
                });
            }
        }
    }
    found.sort_by_key(|h| h.start);
    found
}

/// Cut the document at each span start. Each section body runs from the end of its
/// heading line to the next span start.
fn build_document(markdown: &str, spans: &[Span]) -> TrendDocument {
    let preamble = spans
        .first()
        .map(|span| tidy_body(&markdown[..span.start]))
        .unwrap_or_default();

    let sections = spans
        .iter()
        .enumerate()
        .map(|(i, span)| {
            let next = spans
                .get(i + 1)
                .map(|s| s.start)
                .unwrap_or(markdown.len());
            let marker_end = (span.start + span.len).min(next);
            let line_end = markdown[marker_end..]
                .find('\n')
                .map(|p| marker_end + p)
                .unwrap_or(markdown.len())
                .min(next);
            let ordinal = u32::try_from(i + 1).unwrap_or(u32::MAX);
            TrendSection {
                title: heading_title(&markdown[span.start..line_end]),
                content: tidy_body(&markdown[line_end..next]),
                index: span.number.filter(|n| *n > 0).unwrap_or(ordinal),
            }
        })
        .collect();

    TrendDocument { preamble, sections }
}

fn heading_title(line: &str) -> String {
    line.trim()
        .trim_start_matches('#')
        .replace("**", "")
        .trim()
        .trim_end_matches(':')
        .trim()
        .to_string()
}

fn tidy_body(body: &str) -> String {
    let body = body.trim_start_matches([' ', '\t']);
    let body = body.strip_prefix('\n').unwrap_or(body);
    let body = RESIDUAL_HEADING.replace(body, "");
    EXCESS_BLANK_LINES
        .replace_all(&body, "\n\n")
        .trim()
        .to_string()
}
