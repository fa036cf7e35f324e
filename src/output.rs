//! Progress reporting on stderr.
//!
//! Stage headers, command echoes and captured tool output all go through here
//! so that color is only emitted when stderr is a terminal. Every printer has
//! a `*_to_with_tty` variant that writes to an arbitrary sink for tests.

use console::{Color, Term, style};
use std::io::{self, Write};

fn stderr_is_tty() -> bool {
    Term::stderr().is_term()
}

fn format_label(label: &str, color: Color, is_tty: bool) -> String {
    if is_tty {
        style(label).bold().fg(color).to_string()
    } else {
        label.to_string()
    }
}

fn write_labeled(
    label: &str,
    color: Color,
    msg: &str,
    w: &mut dyn Write,
    is_tty: bool,
) -> io::Result<()> {
    let label = format_label(label, color, is_tty);
    if msg.is_empty() {
        writeln!(w, "{label}")
    } else {
        writeln!(w, "{label} {msg}")
    }
}

pub fn action_to_with_tty(w: &mut dyn Write, label: &str, msg: &str, is_tty: bool) {
    let _ = write_labeled(label, Color::Cyan, msg, w, is_tty);
}

pub fn success_to_with_tty(w: &mut dyn Write, label: &str, msg: &str, is_tty: bool) {
    let _ = write_labeled(label, Color::Green, msg, w, is_tty);
}

pub fn fail_to_with_tty(w: &mut dyn Write, label: &str, msg: &str, is_tty: bool) {
    let _ = write_labeled(label, Color::Red, msg, w, is_tty);
}

pub fn note_to_with_tty(w: &mut dyn Write, label: &str, msg: &str, is_tty: bool) {
    let _ = write_labeled(label, Color::Yellow, msg, w, is_tty);
}

pub fn detail_to_with_tty(w: &mut dyn Write, msg: &str, is_tty: bool) {
    let line = if is_tty {
        style(format!("  {msg}")).dim().to_string()
    } else {
        format!("  {msg}")
    };
    let _ = writeln!(w, "{line}");
}

/// Echo captured tool output line by line, dropping blank lines.
pub fn tool_output_to_with_tty(w: &mut dyn Write, text: &str, is_tty: bool) {
    for line in text.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
        detail_to_with_tty(w, line, is_tty);
    }
}

/// Write an aligned `key : value` table, as printed before a build starts.
pub fn table_to(w: &mut dyn Write, rows: &[(&str, String)]) {
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in rows {
        let _ = writeln!(w, "{key:<width$} : {value}");
    }
}

pub fn action(label: &str, msg: &str) {
    action_to_with_tty(&mut io::stderr(), label, msg, stderr_is_tty());
}

pub fn success(label: &str, msg: &str) {
    success_to_with_tty(&mut io::stderr(), label, msg, stderr_is_tty());
}

pub fn fail(label: &str, msg: &str) {
    fail_to_with_tty(&mut io::stderr(), label, msg, stderr_is_tty());
}

pub fn note(label: &str, msg: &str) {
    note_to_with_tty(&mut io::stderr(), label, msg, stderr_is_tty());
}

pub fn detail(msg: &str) {
    detail_to_with_tty(&mut io::stderr(), msg, stderr_is_tty());
}

pub fn tool_output(text: &str) {
    tool_output_to_with_tty(&mut io::stderr(), text, stderr_is_tty());
}

pub fn table(rows: &[(&str, String)]) {
    table_to(&mut io::stderr(), rows);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
