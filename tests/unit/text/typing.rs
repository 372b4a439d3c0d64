use super::*;

#[test]
fn empty_text_yields_no_intervals() {
    assert!(generate_typing_intervals("", "seed").is_empty());
    assert!(generate_typing_intervals("   \n", "seed").is_empty());
    assert_eq!(typewriter_total_secs(&[]), 0.0);
}

#[test]
fn one_delay_per_char_plus_word_pauses() {
    let q = "Is Rust fast?";
    let intervals = generate_typing_intervals(q, "s");
    // 2 + 4 + 5 characters, two pauses
    assert_eq!(intervals.len(), 13);
    assert_eq!(intervals.len(), expected_interval_count(q));
}

#[test]
fn delays_fall_in_their_ranges() {
    let q = "What makes borrow checking sound in practice";
    let intervals = generate_typing_intervals(q, "seed-x");
    let mut idx = 0;
    for (w, word) in q.split_whitespace().enumerate() {
        if w > 0 {
            let p = intervals[idx];
            assert!((100.0..400.0).contains(&p), "pause {p}");
            idx += 1;
        }
        for _ in word.chars() {
            let c = intervals[idx];
            assert!((30.0..80.0).contains(&c), "char delay {c}");
            idx += 1;
        }
    }
    assert_eq!(idx, intervals.len());
}

#[test]
fn intervals_are_deterministic_per_seed() {
    let a = generate_typing_intervals("Same question", "k");
    let b = generate_typing_intervals("Same question", "k");
    assert_eq!(a, b);
}

#[test]
fn display_text_collapses_whitespace() {
    assert_eq!(display_text("  a \t b\nc "), "a b c");
}

#[test]
fn schedule_reveals_in_order() {
    let schedule = RevealSchedule::build("ab c", &[50.0, 50.0, 200.0, 40.0]).unwrap();
    assert_eq!(schedule.len(), 4);
    assert_eq!(schedule.visible_at(0.0), 0);
    assert_eq!(schedule.visible_at(0.05), 1);
    assert_eq!(schedule.visible_at(0.1), 2);
    assert_eq!(schedule.visible_at(0.29), 2);
    assert_eq!(schedule.visible_at(0.31), 3);
    assert_eq!(schedule.visible_at(10.0), 4);
    assert!((schedule.total_secs() - 0.34).abs() < 1e-12);
}

#[test]
fn schedule_rejects_mismatched_lengths() {
    assert!(RevealSchedule::build("ab", &[10.0]).is_err());
    assert!(RevealSchedule::build("ab", &[10.0, f64::NAN]).is_err());
}
