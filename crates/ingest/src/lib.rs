//! Homework document ingestion.
//!
//! Text extraction is deliberately simple: the uploaded payload is decoded
//! as UTF-8 (lossily) and scanned with keyword heuristics to estimate how
//! many questions the homework contains. The estimate is rough by design
//! and always lands in `1..=20`.

use serde::Serialize;
use tracing::warn;
use tutoragent_core::IngestError;

/// Hard floor and ceiling for the question estimate.
pub const MIN_QUESTIONS: u32 = 1;
pub const MAX_QUESTIONS: u32 = 20;

/// Phrases that mark a line as a likely question.
const QUESTION_INDICATORS: &[&str] = &[
    "?",
    "find",
    "calculate",
    "solve",
    "what is",
    "determine",
    "evaluate",
    "simplify",
    "factorize",
    "expand",
    "graph",
    "plot",
    "draw",
    "construct",
    "prove",
    "show that",
];

/// Result of extracting a homework document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    /// The extracted text, or a fixed explanatory placeholder when the
    /// payload could not be read.
    pub text: String,
    pub page_count: u32,
    /// Heuristic question estimate, clamped to `1..=20`.
    pub questions_found: u32,
    /// False when extraction degraded to the placeholder text.
    pub complete: bool,
}

/// Count likely question lines in homework text.
///
/// A line participates when it is longer than 10 characters and either
/// contains a question indicator, starts with a `1.`/`1)` style number up
/// to 50, or starts with a lettered marker `a)` through `m)`.
pub fn count_questions(text: &str) -> u32 {
    let mut count: u32 = 0;

    for line in text.to_lowercase().lines() {
        let line = line.trim();
        if line.len() <= 10 {
            continue;
        }

        if QUESTION_INDICATORS.iter().any(|ind| line.contains(ind)) {
            count += 1;
        } else if has_numbered_marker(line) || has_lettered_marker(line) {
            count += 1;
        }
    }

    count.clamp(MIN_QUESTIONS, MAX_QUESTIONS)
}

fn has_numbered_marker(line: &str) -> bool {
    (1..=50).any(|i| line.starts_with(&format!("{i}.")) || line.starts_with(&format!("{i})")))
}

fn has_lettered_marker(line: &str) -> bool {
    ('a'..='m').any(|letter| line.starts_with(&format!("{letter})")))
}

/// Extract text and a question estimate from an uploaded document.
///
/// Never fails: a payload that is not meaningful text degrades to a fixed
/// explanatory message and a conservative question estimate, so the chat
/// session can still start.
pub fn extract_document(content: &[u8], filename: &str) -> ExtractedDocument {
    let text = String::from_utf8_lossy(content);

    // A payload that is mostly replacement characters or control bytes is
    // binary (e.g. a scanned PDF); there is nothing useful to scan.
    if !looks_like_text(&text) {
        warn!(filename, "document is not readable text, using placeholder");
        return ExtractedDocument {
            text: format!(
                "Could not extract text from {filename}. The PDF might be image-based or corrupted."
            ),
            page_count: 1,
            questions_found: 3,
            complete: false,
        };
    }

    let questions_found = count_questions(&text);
    let page_count = estimate_pages(&text);

    ExtractedDocument {
        text: text.into_owned(),
        page_count,
        questions_found,
        complete: true,
    }
}

/// Validate an upload before extraction.
pub fn validate_upload(
    filename: &str,
    size: usize,
    max_size: usize,
    allowed_extensions: &[String],
) -> Result<(), IngestError> {
    let extension = filename
        .rsplit('.')
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();

    if filename.rfind('.').is_none() || !allowed_extensions.contains(&extension) {
        return Err(IngestError::UnsupportedType(extension));
    }

    if size > max_size {
        return Err(IngestError::TooLarge {
            size,
            max: max_size,
        });
    }

    Ok(())
}

fn looks_like_text(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    let total = text.chars().count();
    let unreadable = text
        .chars()
        .filter(|c| *c == char::REPLACEMENT_CHARACTER || (c.is_control() && !c.is_whitespace()))
        .count();
    unreadable * 10 < total
}

/// Roughly 40 lines to a page, minimum one page.
fn estimate_pages(text: &str) -> u32 {
    let lines = text.lines().count() as u32;
    lines.div_ceil(40).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_markers_clamps_to_one() {
        assert_eq!(count_questions("just some plain text here"), 1);
        assert_eq!(count_questions(""), 1);
    }

    #[test]
    fn counts_indicator_lines() {
        let text = "Solve for x in the equation\nCalculate the area of the circle\nnothing here today";
        assert_eq!(count_questions(text), 2);
    }

    #[test]
    fn short_lines_are_ignored() {
        // "solve x?" is under the 10 char floor
        assert_eq!(count_questions("solve x?"), 1);
    }

    #[test]
    fn numbered_markers_count() {
        let text = "1. the first exercise on fractions\n2) the second exercise on decimals";
        assert_eq!(count_questions(text), 2);
    }

    #[test]
    fn lettered_markers_count() {
        let text = "a) the first part of the exercise\nb) the second part of it";
        assert_eq!(count_questions(text), 2);
    }

    #[test]
    fn clamps_to_twenty() {
        let text = (0..40)
            .map(|i| format!("{}. question number {} about fractions", i + 1, i + 1))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(count_questions(&text), 20);
    }

    #[test]
    fn case_insensitive_matching() {
        assert_eq!(count_questions("FIND the value of x here"), 1);
    }

    #[test]
    fn extracts_readable_text() {
        let body = b"1. Find the perimeter of the rectangle\n2. What is 3/4 of 80?";
        let doc = extract_document(body, "homework.pdf");
        assert!(doc.complete);
        assert_eq!(doc.questions_found, 2);
        assert_eq!(doc.page_count, 1);
        assert!(doc.text.contains("perimeter"));
    }

    #[test]
    fn binary_payload_degrades_to_placeholder() {
        let body: Vec<u8> = (0u8..=255).cycle().take(1024).collect();
        let doc = extract_document(&body, "scan.pdf");
        assert!(!doc.complete);
        assert_eq!(doc.questions_found, 3);
        assert_eq!(doc.page_count, 1);
        assert!(doc.text.contains("scan.pdf"));
    }

    #[test]
    fn empty_payload_degrades() {
        let doc = extract_document(b"", "empty.pdf");
        assert!(!doc.complete);
    }

    #[test]
    fn page_estimate_grows_with_lines() {
        let text = vec!["a line of homework text that is long enough"; 90].join("\n");
        let doc = extract_document(text.as_bytes(), "big.pdf");
        assert_eq!(doc.page_count, 3);
    }

    #[test]
    fn validate_accepts_pdf() {
        let allowed = vec!["pdf".to_string()];
        assert!(validate_upload("homework.pdf", 1000, 10_000, &allowed).is_ok());
        assert!(validate_upload("Homework.PDF", 1000, 10_000, &allowed).is_ok());
    }

    #[test]
    fn validate_rejects_wrong_extension() {
        let allowed = vec!["pdf".to_string()];
        let err = validate_upload("notes.docx", 1000, 10_000, &allowed).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedType(_)));
    }

    #[test]
    fn validate_rejects_missing_extension() {
        let allowed = vec!["pdf".to_string()];
        assert!(validate_upload("homework", 1000, 10_000, &allowed).is_err());
    }

    #[test]
    fn validate_rejects_oversized_file() {
        let allowed = vec!["pdf".to_string()];
        let err = validate_upload("big.pdf", 20_000, 10_000, &allowed).unwrap_err();
        assert!(matches!(err, IngestError::TooLarge { .. }));
    }
}
