//! Diagnostics produced while postponed variables are inferred.
//!
//! The session layer only ever writes diagnostics; rendering and buffering
//! policy belong to the checker front-end.

use quill_ast::Span;
use serde::Serialize;

/// Human-readable diagnostic entry describing an inference failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceDiagnostic {
    pub code: &'static str,
    pub message: String,
    pub span: Option<Span>,
    pub notes: Vec<String>,
}

impl InferenceDiagnostic {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            span: None,
            notes: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// Write-only collector accepted by the inference entry points.
pub trait DiagnosticsSink {
    fn report(&mut self, diagnostic: InferenceDiagnostic);
}

/// Vec-backed sink used by the checker driver and by tests.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DiagnosticsCollector {
    entries: Vec<InferenceDiagnostic>,
}

impl DiagnosticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[InferenceDiagnostic] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<InferenceDiagnostic> {
        self.entries
    }
}

impl DiagnosticsSink for DiagnosticsCollector {
    fn report(&mut self, diagnostic: InferenceDiagnostic) {
        self.entries.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_span_and_notes() {
        let diagnostic = InferenceDiagnostic::new("QL2101", "message")
            .with_span(Span::new(1, 1, 1, 5))
            .with_note("first")
            .with_note("second");
        assert_eq!(diagnostic.code, "QL2101");
        assert!(diagnostic.span.is_some());
        assert_eq!(diagnostic.notes.len(), 2);
    }

    #[test]
    fn collector_preserves_report_order() {
        let mut collector = DiagnosticsCollector::new();
        collector.report(InferenceDiagnostic::new("QL2101", "first"));
        collector.report(InferenceDiagnostic::new("QL2102", "second"));
        let codes: Vec<_> = collector.entries().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec!["QL2101", "QL2102"]);
    }
}
