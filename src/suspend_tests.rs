//! Timer-backed sleep and cancellation flag behavior.

use std::time::{Duration, Instant};

use crate::suspend::{CancelToken, block_on, sleep};

#[test]
fn sleep_wakes_after_the_deadline() {
    let start = Instant::now();
    block_on(sleep(Duration::from_millis(5)));
    assert!(start.elapsed() >= Duration::from_millis(5));
}

#[test]
fn zero_sleep_is_immediately_ready() {
    let start = Instant::now();
    block_on(sleep(Duration::ZERO));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn concurrent_sleepers_are_independent() {
    let handles: Vec<_> = [1u64, 7, 3]
        .into_iter()
        .map(|ms| {
            std::thread::spawn(move || {
                let start = Instant::now();
                block_on(sleep(Duration::from_millis(ms)));
                assert!(start.elapsed() >= Duration::from_millis(ms));
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("sleeper thread");
    }
}

#[test]
fn cancel_token_is_sticky_and_shared() {
    let token = CancelToken::new();
    assert!(!token.is_cancelled());

    let clone = token.clone();
    clone.cancel();
    assert!(token.is_cancelled());
    assert!(clone.is_cancelled());
}
