//! Guest wire shapes → editor shapes.
//!
//! The editor vocabulary is `tower_lsp::lsp_types`. Severity mapping is
//! total: everything the editor cannot express (hidden or unrecognized
//! guest levels) degrades to an information-level diagnostic rather than
//! being dropped.

use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemLabelDetails, Diagnostic, DiagnosticSeverity, Position, Range,
};
use tracing::warn;

use inkhost_guest::{
    CompletionItem as WireCompletionItem, Diagnostic as WireDiagnostic, Severity,
};

/// Converts a guest diagnostic to an LSP diagnostic against the current
/// document text. Out-of-range offsets yield `None`.
pub fn to_lsp_diagnostic(diag: &WireDiagnostic, text: &str) -> Option<Diagnostic> {
    let range = offset_to_range(diag.start as usize, diag.end as usize, text)?;

    let severity = match diag.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Info | Severity::Hidden | Severity::Unknown => DiagnosticSeverity::INFORMATION,
    };

    Some(Diagnostic {
        range,
        severity: Some(severity),
        source: Some("inkhost".to_string()),
        message: diag.message.clone(),
        ..Default::default()
    })
}

/// Converts a guest completion item to an LSP completion item.
///
/// The display type derived from the tag set lands in the label details;
/// the inline description becomes the detail text.
pub fn to_lsp_completion(item: &WireCompletionItem) -> CompletionItem {
    CompletionItem {
        label: item.display_text.clone(),
        label_details: Some(CompletionItemLabelDetails {
            detail: None,
            description: Some(completion_display_type(&item.tags)),
        }),
        detail: (!item.inline_description.is_empty()).then(|| item.inline_description.clone()),
        ..Default::default()
    }
}

/// Display-type string for a completion item's tag set.
///
/// One tag lowercases; two or more lowercase the first two joined with a
/// hyphen. An empty tag set falls back to `"keyword"`, with a warning in
/// debug builds since the guest is expected to always tag items.
pub fn completion_display_type(tags: &[String]) -> String {
    match tags {
        [] => {
            if cfg!(debug_assertions) {
                warn!("Completion item has no tags; falling back to keyword");
            }
            "keyword".to_string()
        }
        [only] => only.to_lowercase(),
        [first, second, ..] => format!("{}-{}", first.to_lowercase(), second.to_lowercase()),
    }
}

/// Converts byte offsets to an LSP range.
pub fn offset_to_range(start: usize, end: usize, text: &str) -> Option<Range> {
    let start_pos = offset_to_position(start, text)?;
    let end_pos = offset_to_position(end, text)?;
    Some(Range::new(start_pos, end_pos))
}

/// Converts a byte offset to an LSP position (UTF-16 columns).
pub fn offset_to_position(offset: usize, text: &str) -> Option<Position> {
    if offset > text.len() {
        return None;
    }

    let mut line = 0u32;
    let mut col = 0u32;
    let mut current_offset = 0;

    for ch in text.chars() {
        if current_offset >= offset {
            break;
        }

        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += ch.len_utf16() as u32;
        }

        current_offset += ch.len_utf8();
    }

    Some(Position::new(line, col))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Severity::Error, DiagnosticSeverity::ERROR)]
    #[case(Severity::Warning, DiagnosticSeverity::WARNING)]
    #[case(Severity::Info, DiagnosticSeverity::INFORMATION)]
    #[case(Severity::Hidden, DiagnosticSeverity::INFORMATION)]
    #[case(Severity::Unknown, DiagnosticSeverity::INFORMATION)]
    fn severity_mapping_is_total(#[case] wire: Severity, #[case] expected: DiagnosticSeverity) {
        let diag = WireDiagnostic::new(0, 4, "message", wire);
        let lsp = to_lsp_diagnostic(&diag, "var x = 1;").expect("in range");
        assert_eq!(lsp.severity, Some(expected));
    }

    #[test]
    fn diagnostic_carries_range_and_message() {
        let text = "var x\nvar y = ;";
        let diag = WireDiagnostic::new(14, 15, "; unexpected", Severity::Error);
        let lsp = to_lsp_diagnostic(&diag, text).expect("in range");

        assert_eq!(lsp.range, Range::new(Position::new(1, 8), Position::new(1, 9)));
        assert_eq!(lsp.message, "; unexpected");
        assert_eq!(lsp.source.as_deref(), Some("inkhost"));
    }

    #[test]
    fn out_of_range_diagnostic_is_dropped() {
        let diag = WireDiagnostic::new(0, 99, "m", Severity::Error);
        assert_eq!(to_lsp_diagnostic(&diag, "short"), None);
    }

    #[rstest]
    #[case(&[], "keyword")]
    #[case(&["Class"], "class")]
    #[case(&["Method", "Public"], "method-public")]
    #[case(&["Field", "Private", "Static"], "field-private")]
    fn display_type_from_tags(#[case] tags: &[&str], #[case] expected: &str) {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        assert_eq!(completion_display_type(&tags), expected);
    }

    #[test]
    fn completion_conversion_fills_label_and_detail() {
        let item = WireCompletionItem {
            display_text: "Console".to_string(),
            inline_description: "class System.Console".to_string(),
            tags: vec!["Class".to_string(), "Public".to_string()],
        };

        let lsp = to_lsp_completion(&item);
        assert_eq!(lsp.label, "Console");
        assert_eq!(lsp.detail.as_deref(), Some("class System.Console"));
        assert_eq!(
            lsp.label_details.unwrap().description.as_deref(),
            Some("class-public")
        );
    }

    #[test]
    fn empty_inline_description_stays_unset() {
        let item = WireCompletionItem {
            display_text: "var".to_string(),
            inline_description: String::new(),
            tags: vec![],
        };

        assert_eq!(to_lsp_completion(&item).detail, None);
    }

    #[test]
    fn offset_position_counts_utf16_columns() {
        let text = "a🎉b";
        assert_eq!(offset_to_position(1, text), Some(Position::new(0, 1)));
        assert_eq!(offset_to_position(5, text), Some(Position::new(0, 3)));
    }
}
