use crate::errno::Errno;
use crate::fd::{FileDescriptor, Mode, OpenFlags};
use crate::terminal::WindowSize;

/// A pseudo-terminal primary, or `None` where the environment provides no
/// `/dev/ptmx` (minimal containers).
fn pty_primary() -> Option<FileDescriptor> {
    FileDescriptor::open(
        "/dev/ptmx",
        OpenFlags::RDWR | OpenFlags::NOCTTY,
        Mode::empty(),
        true,
    )
    .ok()
}

#[test]
fn test_window_size_roundtrip_on_a_pty() {
    let Some(pty) = pty_primary() else { return };

    let size = WindowSize {
        rows: 24,
        columns: 80,
        x_pixels: 0,
        y_pixels: 0,
    };
    pty.set_window_size(size).unwrap();
    assert_eq!(pty.window_size().unwrap(), size);

    pty.close().unwrap();
}

#[test]
fn test_regular_file_does_not_answer_terminal_requests() {
    let dir = tempfile::tempdir().unwrap();
    let fd = FileDescriptor::open(
        dir.path().join("plain"),
        OpenFlags::RDWR | OpenFlags::CREAT,
        Mode::RUSR | Mode::WUSR,
        true,
    )
    .unwrap();

    assert_eq!(fd.window_size().unwrap_err(), Errno::ENOTTY);
    assert_eq!(fd.set_break(true).unwrap_err(), Errno::ENOTTY);
    assert_eq!(fd.line_discipline().unwrap_err(), Errno::ENOTTY);

    fd.close().unwrap();
}

#[cfg(any(target_os = "linux", target_os = "android"))]
#[test]
fn test_pty_number_and_lock() {
    let Some(pty) = pty_primary() else { return };

    // A fresh primary is born locked; unlock is what makes the replica
    // openable.
    assert!(pty.pty_number().unwrap() >= 0);
    pty.set_pty_lock(false).unwrap();
    pty.set_pty_lock(true).unwrap();

    pty.close().unwrap();
}

#[cfg(any(target_os = "linux", target_os = "android"))]
#[test]
fn test_pty_request_words_match_the_packed_layout() {
    use libc::c_int;

    use crate::ioctl::{ior, iow};
    use crate::terminal::{PTY_LOCK, PTY_NUMBER};

    assert_eq!(PTY_NUMBER, ior::<c_int>(b'T' as u32, 0x30));
    assert_eq!(PTY_LOCK, iow::<c_int>(b'T' as u32, 0x31));
}

#[test]
fn test_replica_window_size_tracks_the_primary() {
    let Some(pty) = pty_primary() else { return };

    let size = WindowSize {
        rows: 50,
        columns: 132,
        x_pixels: 0,
        y_pixels: 0,
    };
    pty.set_window_size(size).unwrap();
    // Both ends of the pair share one size.
    assert_eq!(pty.window_size().unwrap(), size);

    pty.close().unwrap();
}
