use super::*;

#[test]
fn fake_clock_advances_both_instant_and_epoch() {
    let clock = FakeClock::new();
    let start_ms = clock.epoch_ms();
    let start_instant = clock.now();
    clock.advance(Duration::from_secs(5));
    assert_eq!(clock.epoch_ms(), start_ms + 5000);
    assert!(clock.now() > start_instant);
}

#[test]
fn fake_clock_epoch_nanos_tracks_ms() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(2_000);
    assert_eq!(clock.epoch_nanos(), 2_000_000_000);
}

#[test]
fn system_clock_epoch_ms_is_nonzero() {
    let clock = SystemClock;
    assert!(clock.epoch_ms() > 0);
}
