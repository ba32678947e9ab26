use notescribe_core::{render_table, Note, NoteSequence, TABLE_WIDTH};

fn sequence(notes: Vec<Note>) -> NoteSequence {
    NoteSequence::from_notes(notes)
}

#[test]
fn empty_sequence_renders_frame_and_zero_count() {
    let table = render_table(&NoteSequence::default());
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "=".repeat(TABLE_WIDTH));
    assert!(lines[1].contains("Note (EN)"));
    assert!(lines[1].contains("Note (FR)"));
    assert_eq!(lines[2], "-".repeat(TABLE_WIDTH));
    assert_eq!(lines[3], "=".repeat(TABLE_WIDTH));
    assert_eq!(lines[4], "Total notes: 0");
}

#[test]
fn rows_follow_sequence_order_with_sharp_marker() {
    let notes = sequence(vec![
        Note::new(61, 0.234, 0.156, 82).unwrap(),
        Note::new(64, 0.0, 0.234, 78).unwrap(),
    ]);
    let table = render_table(&notes);

    let expected = [
        "=".repeat(70),
        "     Time   Duration   Note (EN)   Note (FR)  MIDI#  Vel".to_string(),
        "-".repeat(70),
        "   0.000s     0.234s          E4         Mi4     64   78".to_string(),
        "   0.234s     0.156s         C#4        Do#4     61   82 #".to_string(),
        "=".repeat(70),
        "Total notes: 2".to_string(),
    ]
    .join("\n")
        + "\n";
    assert_eq!(table, expected);
}

#[test]
fn rendering_does_not_change_input() {
    let notes = sequence(vec![Note::new(69, 1.0, 0.5, 64).unwrap()]);
    let before = notes.clone();
    let first = render_table(&notes);
    let second = render_table(&notes);
    assert_eq!(notes, before);
    assert_eq!(first, second);
}

#[test]
fn french_names_with_accents_keep_alignment() {
    let notes = sequence(vec![Note::new(62, 0.0, 1.0, 90).unwrap()]);
    let table = render_table(&notes);
    let row = table.lines().nth(3).expect("one data row");
    assert!(row.contains("        Ré4"));
    assert_eq!(
        row.chars().count(),
        "   0.000s     1.000s          D4         Ré4     62   90".chars().count()
    );
}
