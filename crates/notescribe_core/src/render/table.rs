//! Fixed-width note table.

use crate::model::note::{Note, NoteSequence};
use std::fmt::Write as _;

/// Width of the `=` and `-` rule lines.
pub const TABLE_WIDTH: usize = 70;

/// Renders notes as a fixed-width table followed by `Total notes: <n>`.
///
/// An empty sequence still renders the header, both rules and a zero count.
pub fn render_table(notes: &NoteSequence) -> String {
    let heavy_rule = "=".repeat(TABLE_WIDTH);
    let light_rule = "-".repeat(TABLE_WIDTH);
    let mut out = String::new();

    out.push_str(&heavy_rule);
    out.push('\n');
    let _ = writeln!(
        out,
        "{:>9}  {:>9}  {:>10}  {:>10}  {:>5}  {:>3}",
        "Time", "Duration", "Note (EN)", "Note (FR)", "MIDI#", "Vel"
    );
    out.push_str(&light_rule);
    out.push('\n');

    for note in notes {
        out.push_str(&table_row(note));
        out.push('\n');
    }

    out.push_str(&heavy_rule);
    out.push('\n');
    let _ = writeln!(out, "Total notes: {}", notes.len());
    out
}

fn table_row(note: &Note) -> String {
    let marker = if note.is_sharp() { " #" } else { "" };
    format!(
        "{:8.3}s  {:8.3}s  {:>10}  {:>10}  {:>5}  {:>3}{marker}",
        note.start(),
        note.duration(),
        note.name_en(),
        note.name_fr(),
        note.midi_number(),
        note.velocity()
    )
}
