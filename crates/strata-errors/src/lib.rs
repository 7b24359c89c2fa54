//! Diagnostics carried by syntax trees.
//!
//! A [`Diagnostic`] has no position: it is attached to a green node or token
//! and only acquires a range once a positioned view locates it.

use std::fmt::{self, Display};

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::TextRange;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Hint,
}

impl Severity {
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Hint => "hint",
        }
    }

    fn level(self) -> Level {
        match self {
            Self::Error => Level::Error,
            Self::Warning => Level::Warning,
            Self::Hint => Level::Help,
        }
    }
}

/// Stable identifier for a class of diagnostics, such as `STX0001`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagnosticCode(pub &'static str);

impl DiagnosticCode {
    pub const MISSING_TOKEN: Self = Self("STX0001");
    pub const INVALID_TOKEN: Self = Self("STX0002");
    pub const UNEXPECTED_NODE: Self = Self("STX0003");

    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    severity: Severity,
    code: DiagnosticCode,
    message: Box<str>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: DiagnosticCode, message: impl Into<Box<str>>) -> Self {
        Self { severity, code, message: message.into() }
    }

    pub fn error(code: DiagnosticCode, message: impl Into<Box<str>>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<Box<str>>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> DiagnosticCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Pins this diagnostic to a source range.
    pub fn located(self, range: TextRange) -> LocatedDiagnostic {
        LocatedDiagnostic { range, diagnostic: self }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity.as_str(), self.code, self.message)
    }
}

/// A diagnostic together with the range of the node that carried it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocatedDiagnostic {
    pub range: TextRange,
    pub diagnostic: Diagnostic,
}

impl LocatedDiagnostic {
    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        self.diagnostic.message()
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let severity = self.diagnostic.severity;
        let message = severity
            .level()
            .title(self.diagnostic.message())
            .id(self.diagnostic.code.as_str())
            .snippet(
                Snippet::source(text)
                    .origin(path)
                    .annotation(severity.level().span(self.range.into()).label("here"))
                    .fold(true),
            );
        renderer.render(message)
    }
}

#[cfg(test)]
mod tests {
    use text_size::TextSize;

    use super::*;

    #[test]
    fn display_includes_code_and_severity() {
        let diagnostic = Diagnostic::error(DiagnosticCode::MISSING_TOKEN, "missing `<-`");
        assert_eq!(diagnostic.to_string(), "error[STX0001]: missing `<-`");
    }

    #[test]
    fn render_points_at_range() {
        let source = "x <- y;\n";
        let located = Diagnostic::warning(DiagnosticCode::UNEXPECTED_NODE, "unexpected receive")
            .located(TextRange::at(TextSize::new(2), TextSize::new(2)));

        let rendered = located.render(&Renderer::plain(), "main.bal", source).to_string();
        assert!(rendered.contains("unexpected receive"), "{rendered}");
        assert!(rendered.contains("main.bal"), "{rendered}");
        assert!(rendered.contains("here"), "{rendered}");
    }
}
