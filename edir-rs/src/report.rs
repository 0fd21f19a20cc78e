use crossterm::style::{Color, Stylize};
use edir_core::prelude::*;
use std::path::Path;

/// Formats outcome records for the terminal.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    color: bool,
    quiet: bool,
}

impl Reporter {
    pub fn new(color: bool, quiet: bool) -> Self {
        Self { color, quiet }
    }

    fn paint(&self, text: &str, color: Color, bold: bool) -> String {
        if !self.color {
            return text.to_string();
        }
        let styled = text.with(color);
        if bold {
            styled.bold().to_string()
        } else {
            styled.to_string()
        }
    }

    fn kind_color(kind: ActionKind) -> (Color, Color) {
        match kind {
            ActionKind::Deleted => (Color::DarkMagenta, Color::Magenta),
            ActionKind::Renamed => (Color::DarkYellow, Color::Yellow),
        }
    }

    /// One line per applied action, source column padded to a common width.
    pub fn applied_lines(&self, report: &Report) -> Vec<String> {
        if self.quiet {
            return Vec::new();
        }
        let quoted: Vec<String> = report
            .applied()
            .map(|record| format!("\"{}\"", display_path(&record.source, record.is_dir)))
            .collect();
        let width = quoted.iter().map(|q| q.chars().count()).max().unwrap_or(0);

        report
            .applied()
            .zip(quoted)
            .map(|(record, source)| {
                let (dim, bright) = Self::kind_color(record.kind);
                let mut line = format!(
                    "{}  {}",
                    self.paint(record.kind.as_str(), dim, false),
                    self.paint(&source, bright, true)
                );
                match (&record.destination, record.kind) {
                    (Some(to), ActionKind::Renamed) => {
                        let padding = width - source.chars().count();
                        line.push_str(&" ".repeat(padding));
                        let target = format!("\"{}\"", display_path(to, record.is_dir));
                        line.push_str(&format!("  →  {}", self.paint(&target, bright, true)));
                    }
                    _ if record.recursive => line.push_str(" recursively"),
                    _ => {}
                }
                line
            })
            .collect()
    }

    /// One line per failed action.
    pub fn failure_lines(&self, report: &Report) -> Vec<String> {
        report
            .failed()
            .map(|record| {
                let source = display_path(&record.source, record.is_dir);
                let cause = record
                    .error
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                let text = match &record.destination {
                    Some(to) => format!(
                        "Rename \"{source}\" → \"{}\" failed: {cause}",
                        display_path(to, record.is_dir)
                    ),
                    None => format!("Delete \"{source}\" failed: {cause}"),
                };
                self.error_text(&text)
            })
            .collect()
    }

    pub fn error_text(&self, text: &str) -> String {
        self.paint(text, Color::Red, false)
    }

    pub fn actions_file_notice(&self, path: &Path) -> String {
        let shown = path.display().to_string();
        format!(
            "{}\n\nSome or all files could not be processed. You can try to reapply those actions with\n  edir -i {}",
            self.error_text(&format!("ACTIONS FILE: {shown}")),
            self.paint(&shown, Color::White, true)
        )
    }
}
