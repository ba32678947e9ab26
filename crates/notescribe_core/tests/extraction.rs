use notescribe_core::{
    extract, render_table, ExtractError, InvalidEventReason, Note, NoteField, RawEvent,
    RawVelocity,
};

fn event(pitch: i64, start: f64, end: f64, velocity: i64) -> RawEvent {
    RawEvent::new(pitch, start, end, RawVelocity::Midi(velocity))
}

fn order(events: &[RawEvent]) -> Vec<(u8, f64)> {
    extract(events)
        .expect("valid events")
        .iter()
        .map(|note| (note.midi_number(), note.start()))
        .collect()
}

#[test]
fn two_notes_order_by_start() {
    let events = [event(61, 0.234, 0.39, 82), event(64, 0.0, 0.234, 78)];

    let notes = extract(&events).unwrap();
    let names: Vec<&str> = notes.iter().map(Note::name_en).collect();
    assert_eq!(names, vec!["E4", "C#4"]);
    assert_eq!(notes.notes()[0].start(), 0.0);
    assert_eq!(notes.notes()[1].start(), 0.234);
    assert!((notes.notes()[1].duration() - 0.156).abs() < 1e-9);
    assert!(render_table(&notes).ends_with("Total notes: 2\n"));
}

#[test]
fn output_is_independent_of_input_permutation() {
    let base = [
        event(67, 0.5, 1.0, 90),
        event(60, 0.5, 1.0, 90),
        event(64, 0.0, 0.5, 90),
        event(72, 1.25, 1.5, 90),
        event(48, 0.0, 2.0, 90),
    ];
    let expected = order(&base);
    assert_eq!(
        expected,
        vec![(48, 0.0), (64, 0.0), (60, 0.5), (67, 0.5), (72, 1.25)]
    );

    let mut permuted = base.to_vec();
    for _ in 0..base.len() {
        permuted.rotate_left(1);
        assert_eq!(order(&permuted), expected);
        permuted.reverse();
        assert_eq!(order(&permuted), expected);
    }
}

#[test]
fn extracting_sorted_output_again_is_stable() {
    let events = [event(62, 1.0, 1.5, 70), event(60, 0.0, 0.5, 70)];
    let once = extract(&events).unwrap();

    let replayed: Vec<RawEvent> = once
        .iter()
        .map(|note| {
            RawEvent::new(
                i64::from(note.midi_number()),
                note.start(),
                note.end(),
                RawVelocity::from(note.velocity()),
            )
        })
        .collect();
    assert_eq!(extract(&replayed).unwrap(), once);
}

#[test]
fn empty_input_is_an_empty_sequence() {
    let notes = extract(&[]).unwrap();
    assert!(notes.is_empty());
    assert_eq!(notes.end_time(), 0.0);
}

#[test]
fn normalized_velocities_are_scaled() {
    let events = [
        RawEvent::new(60, 0.0, 0.5, RawVelocity::Normalized(0.0)),
        RawEvent::new(62, 0.5, 1.0, RawVelocity::Normalized(0.5)),
        RawEvent::new(64, 1.0, 1.5, RawVelocity::Normalized(1.0)),
    ];
    let velocities: Vec<u8> = extract(&events).unwrap().iter().map(Note::velocity).collect();
    assert_eq!(velocities, vec![0, 64, 127]);
}

#[test]
fn zero_and_negative_durations_fail_whole_call() {
    for (start, end) in [(1.0, 1.0), (1.0, 0.5)] {
        let events = [event(60, 0.0, 0.5, 90), event(62, start, end, 90)];
        let err = extract(&events).expect_err("bad duration must fail");
        assert_eq!(
            err,
            ExtractError::InvalidEvent {
                index: 1,
                reason: InvalidEventReason::NonPositiveDuration {
                    start_time: start,
                    end_time: end,
                },
            }
        );
    }
}

#[test]
fn negative_start_is_invalid() {
    let err = extract(&[event(60, -0.1, 0.5, 90)]).expect_err("negative start");
    assert_eq!(
        err,
        ExtractError::InvalidEvent {
            index: 0,
            reason: InvalidEventReason::NegativeStart(-0.1),
        }
    );
}

#[test]
fn out_of_range_pitch_and_velocity_are_reported_not_clamped() {
    let pitch_err = extract(&[event(128, 0.0, 0.5, 90)]).expect_err("pitch 128");
    let velocity_err = extract(&[event(60, 0.0, 0.5, -1)]).expect_err("velocity -1");

    match pitch_err {
        ExtractError::OutOfRange { index, source } => {
            assert_eq!(index, 0);
            assert_eq!(source.field, NoteField::Pitch);
            assert_eq!(source.value, 128);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    match velocity_err {
        ExtractError::OutOfRange { source, .. } => {
            assert_eq!(source.field, NoteField::Velocity);
            assert_eq!(source.value, -1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn error_message_names_the_event() {
    let err = extract(&[event(60, 0.0, 0.5, 90), event(300, 0.0, 0.5, 90)]).unwrap_err();
    assert_eq!(err.to_string(), "event #1: pitch 300 is out of range 0..=127");
}
