//! Terminal reports for parse diagnostics, compiler issues and other errors.
//!
//! Every problem the CLI shows goes through [`Report`], which implements
//! [`miette::Diagnostic`] and is rendered with [`render`]. Parse diagnostics
//! carry the source for snippets; compiler issues name the element they are
//! about.

use std::fmt;

use miette::{GraphicalReportHandler, LabeledSpan, Severity, SourceSpan};

use diagen::{
    DiagenError,
    compiler::{Issue, IssueCode},
};
use diagen_parser::{
    Span,
    error::{Diagnostic, ErrorCode},
};

/// One problem to show to the user.
#[derive(Debug)]
pub enum Report<'a> {
    /// A parser diagnostic together with the source it points into.
    Parse { diag: &'a Diagnostic, src: &'a str },
    /// A validation finding of the compiler.
    Issue(&'a Issue),
    /// Any other failure of a run.
    Error(&'a DiagenError),
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Parse { diag, .. } => f.write_str(diag.message()),
            Report::Issue(issue) => f.write_str(&issue.message),
            Report::Error(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Report<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Report::Error(err) => err.source(),
            _ => None,
        }
    }
}

impl miette::Diagnostic for Report<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            Report::Parse { diag, .. } => diag.code()?.as_str(),
            Report::Issue(issue) => issue.code.as_str(),
            Report::Error(err) => error_code(err)?,
        };
        Some(Box::new(code))
    }

    fn severity(&self) -> Option<Severity> {
        let warning = match self {
            Report::Parse { diag, .. } => diag.severity().is_warning(),
            Report::Issue(issue) => issue.code.is_warning(),
            Report::Error(_) => false,
        };
        Some(if warning {
            Severity::Warning
        } else {
            Severity::Error
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Report::Parse { diag, .. } => diag
                .help()
                .or_else(|| diag.code().and_then(parse_help))
                .map(|help| Box::new(help) as Box<dyn fmt::Display>),
            Report::Issue(issue) => Some(Box::new(issue_help(issue)) as Box<dyn fmt::Display>),
            Report::Error(DiagenError::Config(_)) => Some(Box::new(
                "check the file given with `--config`, or `diagen/config.toml`",
            ) as Box<dyn fmt::Display>),
            Report::Error(_) => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Report::Parse { src, .. } => Some(src as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let Report::Parse { diag, .. } = self else {
            return None;
        };
        if diag.labels().is_empty() {
            return None;
        }

        Some(Box::new(diag.labels().iter().map(|label| {
            let span = to_source_span(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

fn error_code(err: &DiagenError) -> Option<&'static str> {
    match err {
        DiagenError::Io(_) => Some("diagen::io"),
        DiagenError::Compile(_) | DiagenError::Validation(_) => Some("diagen::compile"),
        DiagenError::Layout(_) => Some("diagen::layout"),
        DiagenError::Export(_) => Some("diagen::export"),
        DiagenError::Config(_) => Some("diagen::config"),
        DiagenError::Parse { .. } => None,
    }
}

/// Help for parse errors whose fix does not depend on the context.
fn parse_help(code: ErrorCode) -> Option<&'static str> {
    let help = match code {
        ErrorCode::E001 => "labels are single-line; close the string with `\"` before the line ends",
        ErrorCode::E002 => "put the text in quotes to use it as a label, e.g. `api: \"API & Auth\"`",
        ErrorCode::E003 => "a backslash inside a string must be followed by the escaped character",
        ErrorCode::E004 => "numbers have no units; write `width: 12` rather than `width: 12px`",
        ErrorCode::E102 => "this `}` closes nothing; remove it or open a `group name {` before it",
        ErrorCode::E302 => "use one of TB, BT, LR, RL, e.g. `direction: LR`",
        ErrorCode::E303 => "list ports as `ports: (in, out)`, optionally with `[side: left]`",
        ErrorCode::E100 | ErrorCode::E101 | ErrorCode::E300 | ErrorCode::E301 => return None,
    };
    Some(help)
}

fn issue_help(issue: &Issue) -> String {
    let Some(id) = issue.element_id else {
        return match issue.code {
            IssueCode::InvalidAttribute => "check the attribute values".to_string(),
            _ => "fix the diagram definition".to_string(),
        };
    };

    match issue.code {
        IssueCode::DuplicateId => {
            format!("`{id}` must name exactly one node or group; rename one of them")
        }
        IssueCode::UndefinedParent => {
            format!("define the parent group of `{id}`, or move `{id}` to the top level")
        }
        IssueCode::CircularGroup => {
            format!("move `{id}` out of its parent so the groups no longer contain each other")
        }
        IssueCode::InvalidAttribute => format!("check the attribute values of `{id}`"),
        IssueCode::UndefinedEndpoint => {
            format!("define `{id}` to set its label and shape; it is drawn as a plain box")
        }
        IssueCode::UnreferencedNode => {
            format!("connect `{id}` with an edge, or remove it")
        }
    }
}

fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Splits a failed run into reports: one per parse diagnostic, one per
/// validation error, or a single report for anything else.
pub fn error_reports(err: &DiagenError) -> Vec<Report<'_>> {
    match err {
        DiagenError::Parse { err, src } => err
            .diagnostics()
            .iter()
            .map(|diag| Report::Parse { diag, src })
            .collect(),
        DiagenError::Validation(issues) => issues.iter().map(Report::Issue).collect(),
        _ => vec![Report::Error(err)],
    }
}

/// Renders `report` with source snippets where it has them.
pub fn render(report: &Report<'_>) -> String {
    let mut out = String::new();
    if GraphicalReportHandler::new()
        .render_report(&mut out, report)
        .is_err()
    {
        return report.to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use miette::Diagnostic as _;

    use diagen::identifier::Id;
    use diagen_parser::error::ParseError;

    use super::*;

    fn text(value: Option<Box<dyn fmt::Display + '_>>) -> Option<String> {
        value.map(|v| v.to_string())
    }

    #[test]
    fn test_parse_error_reports_every_diagnostic() {
        let diags = vec![
            Diagnostic::error("unexpected closing brace")
                .with_code(ErrorCode::E102)
                .with_label(Span::new(11..12), "no open group"),
            Diagnostic::error("unterminated string literal")
                .with_code(ErrorCode::E001)
                .with_label(Span::new(18..23), "string starts here")
                .with_help("add the closing quote"),
        ];
        let err = DiagenError::new_parse_error(ParseError::from(diags), "@diagram\nA\n}\nC -> \"oops\n");

        let reports = error_reports(&err);

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].to_string(), "unexpected closing brace");
        assert_eq!(text(reports[0].code()).as_deref(), Some("E102"));
        assert!(text(reports[0].help()).is_some_and(|h| h.contains("closes nothing")));
        assert_eq!(text(reports[1].help()).as_deref(), Some("add the closing quote"));
        assert!(reports[1].source_code().is_some());
    }

    #[test]
    fn test_direction_help_without_own_help() {
        let diag = Diagnostic::error("unknown direction `UP`").with_code(ErrorCode::E302);
        let report = Report::Parse {
            diag: &diag,
            src: "@diagram\n---\ndirection: UP\n---\n",
        };

        assert!(text(report.help()).is_some_and(|h| h.contains("TB, BT, LR, RL")));
        assert_eq!(report.severity(), Some(Severity::Error));
    }

    #[test]
    fn test_label_spans_and_primary_flag() {
        let diag = Diagnostic::error("unexpected end of input")
            .with_label(Span::new(20..20), "input ends here")
            .with_secondary_label(Span::new(15..16), "group opened here");
        let report = Report::Parse {
            diag: &diag,
            src: "@diagram\ngroup g {\n  A",
        };

        let labels: Vec<_> = report.labels().expect("labels").collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert_eq!(labels[0].offset(), 20);
        assert!(!labels[1].primary());
        assert_eq!(labels[1].label(), Some("group opened here"));
    }

    #[test]
    fn test_validation_error_reports_each_issue() {
        let err = DiagenError::Validation(vec![
            Issue::new(IssueCode::DuplicateId, "Group ID \"a\" conflicts with node ID")
                .with_element(Id::new("a")),
            Issue::new(IssueCode::CircularGroup, "Circular group reference detected: A -> B -> A")
                .with_element(Id::new("A")),
        ]);

        let reports = error_reports(&err);

        assert_eq!(reports.len(), 2);
        assert_eq!(text(reports[0].code()).as_deref(), Some("DIAGEN-002"));
        assert!(text(reports[0].help()).is_some_and(|h| h.contains("`a`")));
        assert!(text(reports[1].help()).is_some_and(|h| h.contains("move `A` out")));
        assert!(reports.iter().all(|r| r.severity() == Some(Severity::Error)));
        assert!(reports[0].labels().is_none());
    }

    #[test]
    fn test_warning_issue_is_rendered_as_warning() {
        let issue = Issue::new(
            IssueCode::UnreferencedNode,
            "Node \"cache\" is defined but never referenced in any edge",
        )
        .with_element(Id::new("cache"));
        let report = Report::Issue(&issue);

        assert_eq!(report.severity(), Some(Severity::Warning));
        assert!(text(report.help()).is_some_and(|h| h.contains("connect `cache`")));

        let rendered = render(&report);
        assert!(rendered.contains("DIAGEN-W002"));
        assert!(rendered.contains("never referenced"));
    }

    #[test]
    fn test_other_errors_are_single_reports() {
        let err = DiagenError::Config("unknown direction \"diagonal\"".to_string());

        let reports = error_reports(&err);

        assert_eq!(reports.len(), 1);
        assert_eq!(text(reports[0].code()).as_deref(), Some("diagen::config"));
        assert!(text(reports[0].help()).is_some_and(|h| h.contains("--config")));
        assert!(reports[0].source_code().is_none());
    }
}
