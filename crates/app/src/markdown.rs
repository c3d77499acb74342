//! Markdown rendering for exported search results and code snippets.
//!
//! Output is byte-for-byte deterministic for a given input order. Code is
//! written into the fences verbatim; a snippet that itself contains a
//! triple-backtick line is not escaped.

use codescope_domain::{CodeSnippetDetail, SearchResultItem};
use std::fmt::Write as _;

/// Title line of a search results export.
pub const SEARCH_RESULTS_TITLE: &str = "# Search Results Export";

/// Title line of a code snippet export.
pub const CODE_SNIPPET_TITLE: &str = "# Code Snippet Export";

const FENCE_OPEN: &str = "```text\n";
const FENCE_CLOSE: &str = "\n```\n";

/// Render search results as a Markdown document.
///
/// Each item gets a `## Result {n}` section, `n` starting at 1. An empty
/// slice renders only the title.
///
/// ```
/// use codescope_app::format_search_results_markdown;
///
/// assert_eq!(format_search_results_markdown(&[]), "# Search Results Export\n\n");
/// ```
#[must_use]
pub fn format_search_results_markdown(results: &[SearchResultItem]) -> String {
    let mut out = String::with_capacity(32 + results.len() * 128);
    out.push_str(SEARCH_RESULTS_TITLE);
    out.push_str("\n\n");

    for (index, item) in results.iter().enumerate() {
        let score = item.similarity_score.text_with(|score| number_text(*score));
        let _ = write!(
            out,
            "## Result {}\nSnippet ID: {}\nFile Path: {}\nSimilarity Score: {score}\n\n",
            index + 1,
            item.id,
            item.file_path,
        );
        out.push_str(FENCE_OPEN);
        out.push_str(item.code_preview.as_deref().unwrap_or_default());
        out.push_str(FENCE_CLOSE);
        out.push('\n');
    }

    out
}

/// Render a single snippet as a Markdown document.
#[must_use]
pub fn format_code_detail_markdown(snippet: &CodeSnippetDetail) -> String {
    let mut out = String::with_capacity(96 + snippet.code.as_deref().map_or(0, str::len));
    let _ = write!(
        out,
        "{CODE_SNIPPET_TITLE}\n\nSnippet ID: {}\nRepository: {}\nFile Path: {}\n\n{FENCE_OPEN}{}{FENCE_CLOSE}",
        snippet.id, snippet.repository_name, snippet.file_path, snippet.code,
    );
    out
}

/// Body of the last fenced block in `markdown`.
///
/// For a document produced by [`format_code_detail_markdown`] this is the
/// snippet's code, even when the code contains fences of its own.
#[must_use]
pub fn extract_fenced_code(markdown: &str) -> Option<&str> {
    let start = markdown.find(FENCE_OPEN)? + FENCE_OPEN.len();
    let end = markdown.rfind(FENCE_CLOSE)?;
    markdown.get(start..end.max(start))
}

/// Number text as a script runtime would print it.
///
/// Shortest round-trip digits; integral values have no fractional part;
/// very large or very small magnitudes switch to `1.5e+21` / `1e-7` form.
fn number_text(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if value == 0.0 {
        return "0".to_owned();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    // `{:e}` yields the shortest round-trip digits as `d.ddde[-]x`.
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or_default();
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let digit_count = i32::try_from(digits.len()).unwrap_or(i32::MAX);
    let point = exponent + 1;

    let body = if digit_count <= point && point <= 21 {
        let zeros = usize::try_from(point - digit_count).unwrap_or_default();
        format!("{digits}{}", "0".repeat(zeros))
    } else if 0 < point && point <= 21 {
        let split = usize::try_from(point).unwrap_or_default();
        let (int_part, frac_part) = digits.split_at(split.min(digits.len()));
        format!("{int_part}.{frac_part}")
    } else if -6 < point && point <= 0 {
        let zeros = usize::try_from(-point).unwrap_or_default();
        format!("0.{}{digits}", "0".repeat(zeros))
    } else {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1.min(digits.len()));
        if rest.is_empty() {
            format!("{lead}e{exp_sign}{}", exponent.abs())
        } else {
            format!("{lead}.{rest}e{exp_sign}{}", exponent.abs())
        }
    };

    format!("{sign}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescope_domain::{IdError, SnippetId, WireValue};
    use proptest::prelude::*;

    fn item(id: i64, file_path: &str, preview: Option<&str>, score: Option<f64>) -> SearchResultItem {
        SearchResultItem {
            id: SnippetId::from(id),
            file_path: file_path.into(),
            code_preview: preview.map(Box::from),
            similarity_score: score.map_or(WireValue::Absent, WireValue::Present),
        }
    }

    fn detail(code: &str, repository: Option<&str>) -> CodeSnippetDetail {
        CodeSnippetDetail {
            id: SnippetId::from(9),
            repository_name: repository.map_or(WireValue::Absent, WireValue::from),
            file_path: "src/lib.rs".into(),
            code: code.into(),
        }
    }

    #[test]
    fn single_result_renders_exact_bytes() {
        let markdown =
            format_search_results_markdown(&[item(1, "a.py", Some("print(1)"), Some(0.873))]);
        assert_eq!(
            markdown,
            "# Search Results Export\n\n\
             ## Result 1\nSnippet ID: 1\nFile Path: a.py\nSimilarity Score: 0.873\n\n\
             ```text\nprint(1)\n```\n\n"
        );
    }

    #[test]
    fn missing_score_and_preview_render_placeholders() {
        let markdown = format_search_results_markdown(&[item(2, "b.rs", None, None)]);
        assert!(markdown.contains("Similarity Score: undefined\n"));
        assert!(markdown.contains("```text\n\n```\n"));
    }

    #[test]
    fn null_score_and_missing_path_follow_template_text() {
        let mut result = item(4, "", Some("x"), None);
        result.file_path = WireValue::Absent;
        result.similarity_score = WireValue::Null;
        assert_eq!(
            format_search_results_markdown(&[result]),
            "# Search Results Export\n\n\
             ## Result 1\nSnippet ID: 4\nFile Path: undefined\nSimilarity Score: null\n\n\
             ```text\nx\n```\n\n"
        );
    }

    #[test]
    fn null_preview_renders_an_empty_fence() -> Result<(), serde_json::Error> {
        let result: SearchResultItem = serde_json::from_value(serde_json::json!({
            "id": 5,
            "file_path": "n.py",
            "code_preview": null,
            "similarity_score": 0.25
        }))?;
        assert!(
            format_search_results_markdown(&[result])
                .ends_with("Similarity Score: 0.25\n\n```text\n\n```\n\n")
        );
        Ok(())
    }

    #[test]
    fn code_detail_with_null_and_missing_fields_renders_exact_bytes() -> Result<(), serde_json::Error> {
        let snippet: CodeSnippetDetail = serde_json::from_value(serde_json::json!({
            "id": 11,
            "repository_name": null,
            "code": null
        }))?;
        assert_eq!(
            format_code_detail_markdown(&snippet),
            "# Code Snippet Export\n\nSnippet ID: 11\nRepository: null\nFile Path: undefined\n\n\
             ```text\nnull\n```\n"
        );
        Ok(())
    }

    #[test]
    fn text_ids_are_written_verbatim() -> Result<(), IdError> {
        let mut result = item(0, "c.go", Some("x"), Some(1.0));
        result.id = SnippetId::parse("chunk-7f")?;
        let markdown = format_search_results_markdown(&[result]);
        assert!(markdown.contains("Snippet ID: chunk-7f\n"));
        assert!(markdown.contains("Similarity Score: 1\n"));
        Ok(())
    }

    #[test]
    fn code_detail_renders_exact_bytes() {
        assert_eq!(
            format_code_detail_markdown(&detail("fn main() {}", Some("demo"))),
            "# Code Snippet Export\n\nSnippet ID: 9\nRepository: demo\nFile Path: src/lib.rs\n\n\
             ```text\nfn main() {}\n```\n"
        );
        assert!(
            format_code_detail_markdown(&detail("", None)).contains("Repository: undefined\n")
        );
    }

    #[test]
    fn nested_fences_are_not_escaped() {
        let code = "```rust\nlet x = 1;\n```";
        let markdown = format_code_detail_markdown(&detail(code, Some("demo")));
        assert_eq!(extract_fenced_code(&markdown), Some(code));
    }

    #[test]
    fn number_text_matches_script_formatting() {
        let cases = [
            (0.873, "0.873"),
            (1.0, "1"),
            (-2.5, "-2.5"),
            (100.0, "100"),
            (0.1 + 0.2, "0.30000000000000004"),
            (0.000_001, "0.000001"),
            (1e-7, "1e-7"),
            (1.5e21, "1.5e+21"),
            (1e21, "1e+21"),
            (123_456_789_012_345_680_000.0, "123456789012345680000"),
            (-0.0, "0"),
            (f64::NAN, "NaN"),
            (f64::INFINITY, "Infinity"),
            (f64::NEG_INFINITY, "-Infinity"),
        ];
        for (value, expected) in cases {
            assert_eq!(number_text(value), expected, "{value:?}");
        }
    }

    proptest! {
        #[test]
        fn one_header_per_result_in_order(
            previews in proptest::collection::vec("[a-z =();]{0,24}", 0..12),
        ) {
            let items: Vec<_> = previews
                .iter()
                .enumerate()
                .map(|(index, preview)| {
                    item(i64::try_from(index).unwrap_or_default(), "f.rs", Some(preview), Some(0.5))
                })
                .collect();
            let markdown = format_search_results_markdown(&items);

            let headers: Vec<&str> = markdown
                .lines()
                .filter(|line| line.starts_with("## Result "))
                .collect();
            let expected: Vec<String> =
                (1..=items.len()).map(|n| format!("## Result {n}")).collect();
            prop_assert_eq!(headers, expected);
            prop_assert!(markdown.starts_with("# Search Results Export\n\n"));
        }

        #[test]
        fn code_detail_round_trips_through_fence(code in any::<String>()) {
            let markdown = format_code_detail_markdown(&detail(&code, Some("demo")));
            prop_assert_eq!(extract_fenced_code(&markdown), Some(code.as_str()));
        }

        #[test]
        fn number_text_round_trips(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
            let text = number_text(value);
            let parsed: f64 = text.parse().unwrap_or(f64::NAN);
            prop_assert!(parsed == value || (parsed == 0.0 && value == 0.0), "{} -> {}", value, text);
        }
    }
}
