//! Descriptor wrappers against real files, pipes, and the scripted driver.

use std::time::Duration;

use crate::errno::Errno;
use crate::fd::{FdFlags, FileDescriptor, Mode, OpenFlags, Whence};
use crate::nonblock::BlockRetry;
use crate::platform::mock::{self, Outcome};
use crate::suspend::block_on;

fn scratch_file(dir: &tempfile::TempDir, name: &str) -> FileDescriptor {
    FileDescriptor::open(
        dir.path().join(name),
        OpenFlags::RDWR | OpenFlags::CREAT,
        Mode::RUSR | Mode::WUSR,
        true,
    )
    .expect("open scratch file")
}

#[test]
fn write_seek_read_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fd = scratch_file(&dir, "data");

    assert_eq!(fd.write(b"hello", true), Ok(5));
    assert_eq!(fd.seek(0, Whence::Set), Ok(0));

    let mut buf = [0u8; 16];
    assert_eq!(fd.read(&mut buf, true), Ok(5));
    assert_eq!(&buf[..5], b"hello");

    assert_eq!(fd.close(), Ok(()));
}

#[test]
fn closing_a_never_opened_descriptor_reports_ebadf() {
    // Far above any plausible descriptor limit, so no other test can have
    // opened it.
    assert_eq!(FileDescriptor::from_raw(1_000_000).close(), Err(Errno::EBADF));
}

#[test]
fn missing_file_reports_enoent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = FileDescriptor::open(
        dir.path().join("absent"),
        OpenFlags::RDONLY,
        Mode::empty(),
        true,
    );
    assert_eq!(result.unwrap_err(), Errno::ENOENT);
}

#[test]
fn interior_nul_in_path_is_rejected_before_the_kernel() {
    let result = FileDescriptor::open("bad\0path", OpenFlags::RDONLY, Mode::empty(), true);
    assert_eq!(result.unwrap_err(), Errno::EINVAL);
}

#[test]
fn positional_io_leaves_the_cursor_alone() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fd = scratch_file(&dir, "data");

    assert_eq!(fd.pwrite(b"abcdef", 0, true), Ok(6));
    let mut buf = [0u8; 3];
    assert_eq!(fd.pread(&mut buf, 2, true), Ok(3));
    assert_eq!(&buf, b"cde");

    // Cursor never moved.
    assert_eq!(fd.seek(0, Whence::Current), Ok(0));
    fd.close().expect("close");
}

#[test]
fn duplicate_shares_the_open_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fd = scratch_file(&dir, "data");
    let dup = fd.duplicate(0, false).expect("duplicate");

    assert_eq!(dup.write(b"xy", true), Ok(2));
    assert_eq!(fd.seek(0, Whence::Set), Ok(0));
    let mut buf = [0u8; 2];
    assert_eq!(fd.read(&mut buf, true), Ok(2));
    assert_eq!(&buf, b"xy");

    dup.close().expect("close dup");
    fd.close().expect("close");
}

#[test]
fn descriptor_flags_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fd = scratch_file(&dir, "data");

    fd.set_fd_flags(FdFlags::CLOEXEC).expect("set fd flags");
    assert!(fd.fd_flags().expect("fd flags").contains(FdFlags::CLOEXEC));

    fd.close().expect("close");
}

#[test]
fn nonblocking_mode_shows_in_status_flags_and_reads() {
    let (reader, writer) = FileDescriptor::pipe().expect("pipe");
    reader.set_nonblocking(true).expect("set nonblocking");

    assert!(
        reader
            .status_flags()
            .expect("status flags")
            .contains(OpenFlags::NONBLOCK)
    );
    let mut buf = [0u8; 4];
    assert_eq!(reader.read(&mut buf, true), Err(Errno::EAGAIN));

    writer.close().expect("close writer");
    reader.close().expect("close reader");
}

#[test]
fn read_retries_interrupts_when_asked() {
    let driver = mock::install(vec![
        Outcome::fail(Errno::EINTR),
        Outcome::fail(Errno::EINTR),
        Outcome::ok(3).with_payload(b"abc"),
    ]);
    let fd = FileDescriptor::from_raw(9);
    let mut buf = [0u8; 8];
    assert_eq!(fd.read(&mut buf, true), Ok(3));
    assert_eq!(&buf[..3], b"abc");
    assert_eq!(driver.calls("read"), 3);
}

#[test]
fn read_surfaces_the_interrupt_when_retry_is_off() {
    let driver = mock::install(vec![Outcome::fail(Errno::EINTR)]);
    let fd = FileDescriptor::from_raw(9);
    let mut buf = [0u8; 8];
    assert_eq!(fd.read(&mut buf, false), Err(Errno::EINTR));
    assert_eq!(driver.calls("read"), 1);
}

#[test]
fn async_read_waits_out_an_empty_pipe() {
    let (reader, writer) = FileDescriptor::pipe().expect("pipe");
    reader.set_nonblocking(true).expect("set nonblocking");

    let feeder = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        writer.write(b"ping", true).expect("write");
        writer.close().expect("close writer");
    });

    let policy = BlockRetry::with_interval(Duration::from_millis(1));
    let mut buf = [0u8; 8];
    let got = block_on(reader.read_async(&mut buf, &policy));
    assert_eq!(got, Ok(4));
    assert_eq!(&buf[..4], b"ping");

    feeder.join().expect("feeder thread");
    reader.close().expect("close reader");
}
