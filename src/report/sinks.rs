//! Output sinks for an [`Aggregate`]: pretty JSON file, HTML table, console.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use owo_colors::OwoColorize;
use tracing::debug;

use super::{Aggregate, ScenarioCounts};
use crate::{
    error::{Error, Result},
    fs::FileSystem,
};

pub const CONSOLE_HEADER: &str = "Scenario Name | Passed | Pending | Failed | Skipped | Errors";

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style>
table { border-collapse: collapse; font-family: sans-serif; }
th, td { border: 1px solid #ccc; padding: 4px 8px; }
th { background: #f0f0f0; }
</style>
</head>
<body>
<h1>{{title}}</h1>
<table>
<tr><th>Scenario Name</th><th>Passed</th><th>Pending</th><th>Failed</th><th>Skipped</th><th>Errors</th></tr>
{{rows}}
</table>
</body>
</html>
"#;

pub trait ReportSink {
    fn name(&self) -> &'static str;

    fn emit(&mut self, aggregate: &Aggregate) -> Result<()>;
}

/// Run `sinks` in order, stopping at the first failure. Sinks that already
/// ran are not rolled back.
pub fn emit_all(sinks: &mut [&mut dyn ReportSink], aggregate: &Aggregate) -> Result<()> {
    for sink in sinks.iter_mut() {
        debug!(sink = sink.name(), "emitting report");
        sink.emit(aggregate)?;
    }
    Ok(())
}

pub fn json_file_name(prefix: &str) -> String {
    format!("{prefix}_aggregated_results.json")
}

pub fn html_file_name(prefix: &str) -> String {
    format!("{prefix}_report.html")
}

pub struct JsonSink<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
}

impl<'a> JsonSink<'a> {
    pub fn new(fs: &'a dyn FileSystem, out_dir: &Path, prefix: &str) -> Self {
        Self { fs, path: out_dir.join(json_file_name(prefix)) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonSink<'_> {
    fn name(&self) -> &'static str {
        "json"
    }

    fn emit(&mut self, aggregate: &Aggregate) -> Result<()> {
        let failure = |source: std::io::Error| Error::SinkWriteFailure {
            sink: "json",
            target: self.path.display().to_string(),
            source,
        };
        let data = serde_json::to_vec_pretty(aggregate).map_err(|e| failure(e.into()))?;
        self.fs.write(&self.path, &data).map_err(failure)
    }
}

pub struct HtmlSink<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
    title: String,
}

impl<'a> HtmlSink<'a> {
    pub fn new(fs: &'a dyn FileSystem, out_dir: &Path, prefix: &str) -> Self {
        Self {
            fs,
            path: out_dir.join(html_file_name(prefix)),
            title: format!("{prefix} scenario summary"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for HtmlSink<'_> {
    fn name(&self) -> &'static str {
        "html"
    }

    fn emit(&mut self, aggregate: &Aggregate) -> Result<()> {
        let html = render_html(&self.title, aggregate);
        self.fs
            .write(&self.path, html.as_bytes())
            .map_err(|source| Error::SinkWriteFailure {
                sink: "html",
                target: self.path.display().to_string(),
                source,
            })
    }
}

pub struct ConsoleSink<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_table(&mut self, aggregate: &Aggregate) -> std::io::Result<()> {
        if self.color {
            writeln!(self.out, "{}", CONSOLE_HEADER.bold())?;
        } else {
            writeln!(self.out, "{CONSOLE_HEADER}")?;
        }
        for (name, counts) in aggregate {
            writeln!(self.out, "{}", console_row(name, counts))?;
        }
        self.out.flush()
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn name(&self) -> &'static str {
        "console"
    }

    fn emit(&mut self, aggregate: &Aggregate) -> Result<()> {
        self.write_table(aggregate)
            .map_err(|source| Error::SinkWriteFailure {
                sink: "console",
                target: "<stdout>".into(),
                source,
            })
    }
}

/// One line per scenario: line breaks inside the name or messages collapse to spaces.
pub fn console_row(name: &str, c: &ScenarioCounts) -> String {
    let messages: Vec<String> = c.messages.iter().map(|m| single_line(m)).collect();
    let row = format!(
        "{} | {} | {} | {} | {} | {}",
        single_line(name),
        c.passed,
        c.pending,
        c.failed,
        c.skipped,
        messages.join("; ")
    );
    row.trim_end().to_string()
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn render_html(title: &str, aggregate: &Aggregate) -> String {
    let mut rows = String::new();
    for (name, c) in aggregate {
        let messages: Vec<String> = c.messages.iter().map(|m| escape_html(m)).collect();
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(name),
            c.passed,
            c.pending,
            c.failed,
            c.skipped,
            messages.join("<br>")
        ));
    }
    apply_template(
        REPORT_TEMPLATE,
        &[("title", escape_html(title)), ("rows", rows)],
    )
}

fn apply_template(t: &str, vars: &[(&str, String)]) -> String {
    let mut s = t.to_string();
    for (k, v) in vars {
        let needle = format!("{{{{{}}}}}", k);
        s = s.replace(&needle, v);
    }
    s
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
