//! Handles all user-facing output for test results.
//!
//! Rendering is pure (`render_*` functions return strings); emission goes through
//! a [`ReportSink`] so output can be captured in tests or written to a terminal.

use std::fmt;
use std::io::Write;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use unicode_width::UnicodeWidthStr;

use crate::config::ReportFormat;
use crate::engine::{ResultTable, TestResult};

// ============================================================================
// OUTPUT SINKS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Summary,
    Passed,
    Failed,
    Plain,
}

/// Destination for rendered report lines.
pub trait ReportSink {
    fn emit_line(&mut self, text: &str, style: LineStyle);
}

/// Collects lines in memory, unstyled.
#[derive(Debug, Default)]
pub struct BufferSink {
    pub lines: Vec<String>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_string(&self) -> String {
        self.lines.join("\n")
    }
}

impl ReportSink for BufferSink {
    fn emit_line(&mut self, text: &str, _style: LineStyle) {
        self.lines.push(text.to_string());
    }
}

/// Writes to stdout, colored green/red per result.
pub struct StdoutSink {
    stream: StandardStream,
}

impl StdoutSink {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stream: StandardStream::stdout(choice),
        }
    }
}

impl ReportSink for StdoutSink {
    fn emit_line(&mut self, text: &str, style: LineStyle) {
        let mut spec = ColorSpec::new();
        match style {
            LineStyle::Summary => {
                spec.set_dimmed(true);
            }
            LineStyle::Passed => {
                spec.set_fg(Some(Color::Green));
            }
            LineStyle::Failed => {
                spec.set_fg(Some(Color::Red));
            }
            LineStyle::Plain => {}
        }
        let _ = self.stream.set_color(&spec);
        let _ = writeln!(self.stream, "{}", text);
        let _ = self.stream.reset();
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub all: usize,
    pub failed: usize,
    pub succeeded: usize,
}

impl Summary {
    pub fn new(all: usize, failed: usize) -> Self {
        Self {
            all,
            failed,
            succeeded: all.saturating_sub(failed),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "All: {} | Failed: {} | Succeeded: {}",
            self.all, self.failed, self.succeeded
        )
    }
}

// ============================================================================
// RENDERING
// ============================================================================

/// `"{index} {name} [{duration}ms] {message}"`, without the message when empty.
pub fn render_line(index: usize, result: &TestResult) -> String {
    let mut line = format!("{} {} [{}ms]", index, result.name, result.duration_ms);
    if !result.message.is_empty() {
        line.push(' ');
        line.push_str(&result.message);
    }
    line
}

const TABLE_HEADERS: [&str; 5] = ["(index)", "success", "methodName", "message", "executionTime"];

/// A bordered table with one row per result.
pub fn render_table(results: &ResultTable) -> Vec<String> {
    let rows: Vec<[String; 5]> = results
        .iter()
        .map(|(id, r)| {
            [
                id.to_string(),
                r.success.to_string(),
                r.name.clone(),
                r.message.clone(),
                r.duration_ms.to_string(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(|h| h.width());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let border = {
        let dashes: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
        format!("+{}+", dashes.join("+"))
    };
    let render_row = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!(" {}{} ", cell, " ".repeat(w - cell.width())))
            .collect();
        format!("|{}|", padded.join("|"))
    };

    let headers = TABLE_HEADERS.map(str::to_string);
    let mut lines = vec![border.clone(), render_row(&headers[..]), border.clone()];
    lines.extend(rows.iter().map(|row| render_row(&row[..])));
    lines.push(border);
    lines
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: Summary,
    results: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    index: usize,
    #[serde(flatten)]
    result: &'a TestResult,
}

pub fn render_json(results: &ResultTable, summary: Summary) -> Result<String, serde_json::Error> {
    let report = JsonReport {
        summary,
        results: results
            .iter()
            .map(|(index, result)| JsonEntry { index, result })
            .collect(),
    };
    serde_json::to_string_pretty(&report)
}

fn style_for(result: &TestResult) -> LineStyle {
    if result.success {
        LineStyle::Passed
    } else {
        LineStyle::Failed
    }
}

/// Emits the summary line followed by the results in `format`.
pub fn print_report(
    sink: &mut dyn ReportSink,
    results: &ResultTable,
    summary: Summary,
    format: ReportFormat,
) {
    match format {
        ReportFormat::Lines => {
            sink.emit_line(&summary.to_string(), LineStyle::Summary);
            for (index, result) in results.iter() {
                sink.emit_line(&render_line(index, result), style_for(result));
            }
        }
        ReportFormat::Table => {
            sink.emit_line(&summary.to_string(), LineStyle::Summary);
            for line in render_table(results) {
                sink.emit_line(&line, LineStyle::Plain);
            }
        }
        ReportFormat::Json => match render_json(results, summary) {
            Ok(json) => sink.emit_line(&json, LineStyle::Plain),
            Err(e) => tracing::error!(error = %e, "failed to serialize test report"),
        },
    }
}
