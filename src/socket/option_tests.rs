use libc::c_int;

use crate::errno::Errno;
use crate::fd::FileDescriptor;
use crate::platform::mock::{self, Outcome};
use crate::socket::addr::AddressFamily;
use crate::socket::option::{
    Linger, PendingError, ReceiveBufferSize, ReceiveTimeout, ReuseAddress, SendBufferSize,
    SocketOption, TcpNoDelay,
};
use crate::socket::{SocketType, socket};
use crate::time::TimeVal;

fn raw_bytes<T>(value: &T) -> Vec<u8> {
    unsafe { core::slice::from_raw_parts((value as *const T).cast::<u8>(), size_of::<T>()) }
        .to_vec()
}

#[test]
fn test_bool_option_encode_decode_symmetry() {
    for value in [false, true] {
        let raw = ReuseAddress(value).to_raw();
        assert_eq!(ReuseAddress::from_raw(raw), ReuseAddress(value));
        let raw = TcpNoDelay(value).to_raw();
        assert_eq!(TcpNoDelay::from_raw(raw), TcpNoDelay(value));
    }
    // Any non-zero kernel answer reads as set.
    assert_eq!(ReuseAddress::from_raw(7), ReuseAddress(true));
}

#[test]
fn test_linger_encode_decode() {
    let raw = Linger(Some(30)).to_raw();
    assert_eq!(raw.l_onoff, 1);
    assert_eq!(raw.l_linger, 30);
    assert_eq!(Linger::from_raw(raw), Linger(Some(30)));

    let raw = Linger(None).to_raw();
    assert_eq!(raw.l_onoff, 0);
    assert_eq!(Linger::from_raw(raw), Linger(None));
}

#[test]
fn test_reuseaddr_roundtrip_on_a_live_socket() {
    let sock = socket(AddressFamily::INET, SocketType::DGRAM, 0).unwrap();

    assert_eq!(sock.option::<ReuseAddress>(true).unwrap(), ReuseAddress(false));
    sock.set_option(&ReuseAddress(true), true).unwrap();
    assert_eq!(sock.option::<ReuseAddress>(true).unwrap(), ReuseAddress(true));

    sock.close().unwrap();
}

#[test]
fn test_tcp_nodelay_roundtrip_on_a_live_socket() {
    let sock = socket(AddressFamily::INET, SocketType::STREAM, 0).unwrap();

    sock.set_option(&TcpNoDelay(true), true).unwrap();
    assert_eq!(sock.option::<TcpNoDelay>(true).unwrap(), TcpNoDelay(true));

    sock.close().unwrap();
}

#[test]
fn test_buffer_sizes_report_kernel_values() {
    let sock = socket(AddressFamily::INET, SocketType::DGRAM, 0).unwrap();

    // The kernel rounds stored buffer sizes up, never below the request.
    sock.set_option(&SendBufferSize(8192), true).unwrap();
    assert!(sock.option::<SendBufferSize>(true).unwrap().0 >= 8192);
    sock.set_option(&ReceiveBufferSize(8192), true).unwrap();
    assert!(sock.option::<ReceiveBufferSize>(true).unwrap().0 >= 8192);

    sock.close().unwrap();
}

#[test]
fn test_whole_second_timeout_survives_a_live_socket() {
    let sock = socket(AddressFamily::INET, SocketType::DGRAM, 0).unwrap();

    sock.set_option(&ReceiveTimeout(TimeVal::new(1, 0)), true)
        .unwrap();
    let got = sock.option::<ReceiveTimeout>(true).unwrap();
    assert_eq!(got.0.seconds(), 1);
    assert_eq!(got.0.microseconds(), 0);

    sock.close().unwrap();
}

#[test]
fn test_no_pending_error_on_a_fresh_socket() {
    let sock = socket(AddressFamily::INET, SocketType::DGRAM, 0).unwrap();
    assert_eq!(sock.option::<PendingError>(true).unwrap(), PendingError(None));
    sock.close().unwrap();
}

#[test]
fn test_set_hands_kernel_the_exact_payload() {
    let guard = mock::install(vec![Outcome::ok(0)]);
    let sock = FileDescriptor::from_raw(33);

    sock.set_option(&ReuseAddress(true), true).unwrap();

    let trace = guard.trace();
    assert_eq!(trace.len(), 1);
    assert_eq!(trace[0].name, "setsockopt");
    assert_eq!(
        trace[0].args,
        vec![
            33,
            libc::SOL_SOCKET as i64,
            libc::SO_REUSEADDR as i64,
            size_of::<c_int>() as i64,
        ]
    );
    assert_eq!(trace[0].bytes.as_deref(), Some(&1i32.to_ne_bytes()[..]));
}

#[test]
fn test_get_decodes_the_kernel_payload() {
    let guard = mock::install(vec![Outcome::ok(0).with_payload(&5i32.to_ne_bytes())]);
    let sock = FileDescriptor::from_raw(33);

    assert_eq!(sock.option::<ReceiveBufferSize>(true).unwrap(), ReceiveBufferSize(5));
    assert_eq!(guard.calls("getsockopt"), 1);
}

#[test]
fn test_short_kernel_answer_is_rejected() {
    let _guard = mock::install(vec![Outcome::ok(0).with_payload(&[1, 0])]);
    let sock = FileDescriptor::from_raw(33);

    assert_eq!(sock.option::<ReuseAddress>(true).unwrap_err(), Errno::EINVAL);
}

#[test]
fn test_timeout_microseconds_decode_exactly() {
    let tv = libc::timeval {
        tv_sec: 1,
        tv_usec: 500_000,
    };
    let _guard = mock::install(vec![Outcome::ok(0).with_payload(&raw_bytes(&tv))]);
    let sock = FileDescriptor::from_raw(33);

    let got = sock.option::<ReceiveTimeout>(true).unwrap();
    assert_eq!(got.0, TimeVal::new(1, 500_000));
}

#[test]
fn test_pending_error_decodes_errno() {
    let _guard = mock::install(vec![
        Outcome::ok(0).with_payload(&libc::ECONNREFUSED.to_ne_bytes()),
    ]);
    let sock = FileDescriptor::from_raw(33);

    assert_eq!(
        sock.option::<PendingError>(true).unwrap(),
        PendingError(Some(Errno::ECONNREFUSED))
    );
}
