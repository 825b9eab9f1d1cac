use crate::errno::Errno;
use crate::platform::mock::{self, Outcome};
use crate::time::TimeSpec;
use crate::time::clock::ClockId;

fn raw_bytes<T>(value: &T) -> Vec<u8> {
    unsafe { core::slice::from_raw_parts((value as *const T).cast::<u8>(), size_of::<T>()) }
        .to_vec()
}

#[test]
fn test_realtime_reads_a_plausible_instant() {
    let now = ClockId::REALTIME.time().unwrap();
    assert!(now.seconds() > 1_600_000_000);
    assert!((0..1_000_000_000).contains(&now.nanoseconds()));
}

#[test]
fn test_monotonic_never_steps_back() {
    let a = ClockId::MONOTONIC.time().unwrap();
    let b = ClockId::MONOTONIC.time().unwrap();
    assert!((a.seconds(), a.nanoseconds()) <= (b.seconds(), b.nanoseconds()));
}

#[test]
fn test_resolution_is_sane() {
    let res = ClockId::MONOTONIC.resolution().unwrap();
    assert!(res.seconds() >= 0);
    assert!((0..1_000_000_000).contains(&res.nanoseconds()));
    assert!(res.seconds() > 0 || res.nanoseconds() > 0);
}

#[test]
fn test_cputime_clocks_are_readable() {
    let process = ClockId::PROCESS_CPUTIME.time().unwrap();
    let thread = ClockId::THREAD_CPUTIME.time().unwrap();
    assert!(process.seconds() >= 0);
    assert!(thread.seconds() >= 0);
}

#[test]
fn test_set_time_forwards_the_exact_argument() {
    let guard = mock::install(vec![Outcome::ok(0)]);

    ClockId::REALTIME.set_time(TimeSpec::new(5, 25)).unwrap();

    let expected = libc::timespec {
        tv_sec: 5,
        tv_nsec: 25,
    };
    let trace = guard.trace();
    assert_eq!(trace.len(), 1);
    assert_eq!(trace[0].name, "clock_settime");
    assert_eq!(trace[0].args, vec![libc::CLOCK_REALTIME as i64]);
    assert_eq!(trace[0].bytes.as_deref(), Some(&raw_bytes(&expected)[..]));
}

#[test]
fn test_set_time_permission_failure() {
    let guard = mock::install(vec![Outcome::fail(Errno::EPERM)]);

    assert_eq!(
        ClockId::REALTIME.set_time(TimeSpec::ZERO).unwrap_err(),
        Errno::EPERM
    );
    assert_eq!(guard.calls("clock_settime"), 1);
}

#[test]
fn test_mocked_clock_read_decodes_the_kernel_payload() {
    let ts = libc::timespec {
        tv_sec: 100,
        tv_nsec: 42,
    };
    let _guard = mock::install(vec![Outcome::ok(0).with_payload(&raw_bytes(&ts))]);

    assert_eq!(ClockId::REALTIME.time().unwrap(), TimeSpec::new(100, 42));
}
