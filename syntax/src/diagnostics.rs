/// Render parse errors against their source with ariadne
use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use crate::error::ParseError;

/// Build a report for `error` in the file `name`. Falls back to the plain
/// error message if the report cannot be written.
pub fn render(error: &ParseError, name: &str, source: &str, color: bool) -> String {
    let span = error.span(source);
    let report = Report::build(ReportKind::Error, name, span.start)
        .with_config(Config::default().with_color(color))
        .with_message(error.to_string())
        .with_label(
            Label::new((name, span))
                .with_message(error.label())
                .with_color(Color::Red),
        )
        .finish();

    let mut output = Vec::new();
    match report.write((name, Source::from(source)), &mut output) {
        Ok(()) => String::from_utf8_lossy(&output).into_owned(),
        Err(_) => error.to_string(),
    }
}
