use notescribe_core::{midi_to_name, Note, NoteField, OutOfRangeError};

const SHARP_CLASSES: [i64; 5] = [1, 3, 6, 8, 10];

#[test]
fn every_midi_number_has_stable_names_and_sharp_flag() {
    for midi in 0..=127_i64 {
        let first = midi_to_name(midi).expect("in range");
        let second = midi_to_name(midi).expect("in range");
        assert_eq!(first, second, "naming must be deterministic for {midi}");
        assert_eq!(
            first.is_sharp,
            SHARP_CLASSES.contains(&(midi % 12)),
            "sharp flag mismatch for {midi}"
        );
        assert_eq!(first.name_en.contains('#'), first.is_sharp);
        assert_eq!(first.name_fr.contains('#'), first.is_sharp);
        assert!(first.name_en.ends_with(&first.octave.to_string()));
        assert!(first.name_fr.ends_with(&first.octave.to_string()));
    }
}

#[test]
fn out_of_range_numbers_fail() {
    for midi in [-1_i64, -60, 128, 255, i64::MAX, i64::MIN] {
        assert_eq!(
            midi_to_name(midi).unwrap_err(),
            OutOfRangeError {
                field: NoteField::Pitch,
                value: midi,
            }
        );
    }
}

#[test]
fn one_octave_of_names() {
    let expected = [
        ("C4", "Do4"),
        ("C#4", "Do#4"),
        ("D4", "Ré4"),
        ("D#4", "Ré#4"),
        ("E4", "Mi4"),
        ("F4", "Fa4"),
        ("F#4", "Fa#4"),
        ("G4", "Sol4"),
        ("G#4", "Sol#4"),
        ("A4", "La4"),
        ("A#4", "La#4"),
        ("B4", "Si4"),
    ];

    for (offset, (en, fr)) in expected.iter().enumerate() {
        let name = midi_to_name(60 + offset as i64).unwrap();
        assert_eq!(name.name_en, *en);
        assert_eq!(name.name_fr, *fr);
    }
}

#[test]
fn middle_c_note_fields() {
    let note = Note::new(60, 0.0, 0.25, 100).unwrap();
    assert_eq!(note.name_en(), "C4");
    assert_eq!(note.name_fr(), "Do4");
    assert!(!note.is_sharp());
    assert_eq!(note.midi_number(), 60);
    assert_eq!(note.end(), 0.25);
}

#[test]
fn note_serializes_with_snake_case_fields() {
    let note = Note::new(61, 0.5, 0.25, 82).unwrap();
    let json = serde_json::to_value(&note).unwrap();
    assert_eq!(json["midi_number"], 61);
    assert_eq!(json["name_en"], "C#4");
    assert_eq!(json["name_fr"], "Do#4");
    assert_eq!(json["is_sharp"], true);
    assert_eq!(json["velocity"], 82);
}
