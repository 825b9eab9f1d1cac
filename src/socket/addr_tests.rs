use core::mem;

use libc::socklen_t;

use crate::errno::Errno;
use crate::socket::addr::{
    AddressFamily, Ipv4Addr, Ipv6Addr, RawSocketAddr, SocketAddr, SocketAddrV4, UnixAddr,
};

#[test]
fn test_v4_loopback_text_roundtrip() {
    let addr = Ipv4Addr::parse("127.0.0.1").unwrap();
    assert_eq!(addr, Ipv4Addr::LOCALHOST);
    assert_eq!(addr.octets(), [127, 0, 0, 1]);
    assert_eq!(addr.to_string(), "127.0.0.1");
}

#[test]
fn test_v6_loopback_text_roundtrip() {
    let addr = Ipv6Addr::parse("::1").unwrap();
    assert_eq!(addr, Ipv6Addr::LOCALHOST);
    assert_eq!(addr.to_string(), "::1");
}

#[test]
fn test_parse_rejects_invalid_text() {
    assert_eq!(Ipv4Addr::parse("256.1.1.1"), Err(Errno::EINVAL));
    assert_eq!(Ipv4Addr::parse("not an address"), Err(Errno::EINVAL));
    assert_eq!(Ipv4Addr::parse(""), Err(Errno::EINVAL));
    // Wrong family for the text.
    assert_eq!(Ipv6Addr::parse("1.2.3.4"), Err(Errno::EINVAL));
    // Interior NUL never reaches the converter.
    assert_eq!(Ipv4Addr::parse("127.0.0.1\0x"), Err(Errno::EINVAL));
}

#[test]
fn test_parse_accepts_mixed_notation() {
    let addr = Ipv6Addr::parse("::ffff:192.0.2.1").unwrap();
    assert_eq!(addr.segments()[5], 0xffff);
    let addr = Ipv4Addr::parse("0.0.0.0").unwrap();
    assert!(addr.is_unspecified());
}

#[test]
fn test_v4_endpoint_encodes_family_and_big_endian_port() {
    let endpoint = SocketAddr::v4(Ipv4Addr::LOCALHOST, 0x1234);
    let raw = endpoint.to_raw().unwrap();

    assert_eq!(raw.family(), AddressFamily::INET);
    assert_eq!(raw.len() as usize, mem::size_of::<libc::sockaddr_in>());

    let sin: libc::sockaddr_in = unsafe { core::ptr::read(raw.as_ptr().cast()) };
    assert_eq!(sin.sin_port, 0x1234u16.to_be());
    assert_eq!(sin.sin_addr.s_addr, u32::from_ne_bytes([127, 0, 0, 1]));

    assert_eq!(SocketAddr::from_raw(&raw).unwrap(), endpoint);
}

#[test]
fn test_v6_endpoint_roundtrip() {
    let endpoint = SocketAddr::v6(Ipv6Addr::LOCALHOST, 443);
    let raw = endpoint.to_raw().unwrap();
    assert_eq!(raw.family(), AddressFamily::INET6);
    assert_eq!(SocketAddr::from_raw(&raw).unwrap(), endpoint);
}

#[test]
fn test_unix_path_roundtrip() {
    let endpoint = SocketAddr::unix("/tmp/wrappers-test.sock");
    let raw = endpoint.to_raw().unwrap();

    assert_eq!(raw.family(), AddressFamily::UNIX);
    // Family bytes, the path, and its terminating NUL.
    let expected = mem::offset_of!(libc::sockaddr_un, sun_path) + "/tmp/wrappers-test.sock".len() + 1;
    assert_eq!(raw.len() as usize, expected);

    assert_eq!(SocketAddr::from_raw(&raw).unwrap(), endpoint);
}

#[test]
fn test_unix_path_at_capacity_fits() {
    let path = "a".repeat(UnixAddr::MAX_PATH_LEN);
    let endpoint = SocketAddr::unix(&path);
    let raw = endpoint.to_raw().unwrap();
    assert_eq!(SocketAddr::from_raw(&raw).unwrap(), endpoint);
}

#[test]
fn test_unix_path_over_capacity_fails_instead_of_truncating() {
    let path = "a".repeat(UnixAddr::MAX_PATH_LEN + 1);
    assert_eq!(
        SocketAddr::unix(path).to_raw().unwrap_err(),
        Errno::ENAMETOOLONG
    );
}

#[test]
fn test_unix_path_with_interior_nul_fails() {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let path = OsString::from_vec(b"/tmp/a\0b".to_vec());
    assert_eq!(SocketAddr::unix(path).to_raw().unwrap_err(), Errno::EINVAL);
}

#[test]
fn test_unnamed_unix_block_decodes_to_empty_path() {
    // getsockname on an unbound local socket hands back just the family.
    let mut raw = RawSocketAddr::zeroed();
    raw.set_family(libc::AF_UNIX as libc::sa_family_t);
    raw.force_len(mem::size_of::<libc::sa_family_t>() as socklen_t);

    match SocketAddr::from_raw(&raw).unwrap() {
        SocketAddr::Unix(unix) => assert_eq!(unix.path().as_os_str(), ""),
        other => panic!("expected a local address, got {other:?}"),
    }
}

#[test]
fn test_unknown_family_decode_fails() {
    let mut raw = SocketAddr::v4(Ipv4Addr::LOCALHOST, 80).to_raw().unwrap();
    raw.set_family(123);
    assert_eq!(SocketAddr::from_raw(&raw).unwrap_err(), Errno::EAFNOSUPPORT);
}

#[test]
fn test_short_block_decode_fails() {
    let mut raw = SocketAddr::v4(Ipv4Addr::LOCALHOST, 80).to_raw().unwrap();
    raw.force_len(4);
    assert_eq!(SocketAddr::from_raw(&raw).unwrap_err(), Errno::EINVAL);
}

#[test]
fn test_endpoint_display() {
    assert_eq!(
        SocketAddr::v4(Ipv4Addr::LOCALHOST, 8080).to_string(),
        "127.0.0.1:8080"
    );
    assert_eq!(
        SocketAddr::v6(Ipv6Addr::LOCALHOST, 443).to_string(),
        "[::1]:443"
    );
    assert_eq!(
        SocketAddr::unix("/run/app.sock").to_string(),
        "/run/app.sock"
    );
}

#[test]
fn test_family_debug_names() {
    assert_eq!(format!("{:?}", AddressFamily::INET), "AddressFamily(AF_INET)");
    assert_eq!(
        format!("{:?}", AddressFamily::from_raw(123)),
        "AddressFamily(123)"
    );
}

#[test]
fn test_endpoint_family_tags() {
    assert_eq!(
        SocketAddr::v4(Ipv4Addr::UNSPECIFIED, 0).family(),
        AddressFamily::INET
    );
    assert_eq!(
        SocketAddr::v6(Ipv6Addr::UNSPECIFIED, 0).family(),
        AddressFamily::INET6
    );
    assert_eq!(SocketAddr::unix("/tmp/x").family(), AddressFamily::UNIX);
}

#[test]
fn test_v4_predicates() {
    assert!(Ipv4Addr::LOCALHOST.is_loopback());
    assert!(Ipv4Addr::BROADCAST.octets().iter().all(|&b| b == 255));
    assert!(Ipv4Addr::from_octets([224, 0, 0, 1]).is_multicast());
    assert!(!Ipv4Addr::from_octets([10, 0, 0, 1]).is_multicast());
}

#[test]
fn test_from_str_matches_parse() {
    let parsed: Ipv4Addr = "192.168.1.1".parse().unwrap();
    assert_eq!(parsed, Ipv4Addr::from_octets([192, 168, 1, 1]));
    let parsed: Result<Ipv6Addr, Errno> = "nope".parse();
    assert_eq!(parsed, Err(Errno::EINVAL));
}

#[test]
fn test_v4_endpoint_accessors() {
    let endpoint = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 9000);
    assert_eq!(endpoint.addr(), Ipv4Addr::LOCALHOST);
    assert_eq!(endpoint.port(), 9000);
}
