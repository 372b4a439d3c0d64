use super::*;

#[test]
fn initial_state_is_char_sum_mod_1000() {
    // 'a' + 'b' = 97 + 98
    assert_eq!(SeededRng::from_seed("ab").state(), 195);
    // 11 * 'z' = 1342
    assert_eq!(SeededRng::from_seed("zzzzzzzzzzz").state(), 342);
    assert_eq!(SeededRng::from_seed("").state(), 0);
}

#[test]
fn first_draw_matches_lcg_step() {
    let mut rng = SeededRng::from_seed("ab");
    let expected = ((195u64 * 9301 + 49297) % 233_280) as f64 / 233_280.0;
    assert_eq!(rng.next_f64(), expected);
}

#[test]
fn same_seed_same_sequence() {
    let mut a = SeededRng::from_seed("what is rust?-a language");
    let mut b = SeededRng::from_seed("what is rust?-a language");
    for _ in 0..64 {
        assert_eq!(a.next_f64(), b.next_f64());
    }
}

#[test]
fn draws_stay_in_unit_interval() {
    let mut rng = SeededRng::from_seed("range check");
    for _ in 0..10_000 {
        let v = rng.next_f64();
        assert!((0.0..1.0).contains(&v));
    }
}

#[test]
fn index_is_bounded() {
    let mut rng = SeededRng::from_seed("idx");
    for _ in 0..1000 {
        assert!(rng.index(7) < 7);
    }
    assert_eq!(rng.index(0), 0);
}

#[test]
fn range_respects_bounds() {
    let mut rng = SeededRng::from_seed("bounds");
    for _ in 0..1000 {
        let v = rng.range_f64(30.0, 80.0);
        assert!((30.0..80.0).contains(&v));
    }
}
