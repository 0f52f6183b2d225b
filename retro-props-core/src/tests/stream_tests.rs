use super::*;
use std::io::Write;

fn sample() -> Vec<u8> {
    (0..=255u8).collect()
}

#[test]
fn mem_stream_reads_and_clamps() {
    let mut s = MemStream::new(sample());
    assert_eq!(s.size(), Some(256));
    let mut buf = [0u8; 16];
    assert_eq!(s.seek_and_read(250, &mut buf).unwrap(), 6);
    assert_eq!(&buf[..6], &[250, 251, 252, 253, 254, 255]);
    assert_eq!(s.tell(), 256);
}

#[test]
fn mem_stream_seek_past_end_reads_nothing() {
    let mut s = MemStream::new(sample());
    s.seek(10_000).unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(s.read(&mut buf).unwrap(), 0);
}

#[test]
fn dup_has_independent_cursor() {
    let mut a = MemStream::new(sample());
    a.seek(100).unwrap();
    let mut b = a.dup().unwrap();
    assert_eq!(b.tell(), 0);
    let mut buf = [0u8; 1];
    b.read(&mut buf).unwrap();
    assert_eq!(buf[0], 0);
    assert_eq!(a.tell(), 100);
}

#[test]
fn closed_stream_reports_ebadf() {
    let mut s = MemStream::new(sample());
    s.close();
    assert!(!s.is_open());
    let mut buf = [0u8; 1];
    assert!(s.read(&mut buf).is_err());
    assert_eq!(s.last_error(), EBADF);
    assert!(s.dup().is_err());
    s.clear_error();
    assert_eq!(s.last_error(), 0);
}

#[test]
fn file_stream_positional_reads() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&sample()).unwrap();
    tmp.flush().unwrap();

    let mut s = FileStream::open(tmp.path()).unwrap();
    assert!(s.is_open());
    assert!(!s.is_device());
    assert_eq!(s.size(), Some(256));

    let mut d = s.dup().unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(s.seek_and_read(16, &mut buf).unwrap(), 4);
    assert_eq!(buf, [16, 17, 18, 19]);
    assert_eq!(d.read(&mut buf).unwrap(), 4);
    assert_eq!(buf, [0, 1, 2, 3]);

    s.close();
    assert_eq!(s.size(), None);
    assert!(s.read(&mut buf).is_err());
    assert_eq!(s.last_error(), EBADF);
}

#[test]
fn cursor_supports_relative_and_end_seeks() {
    let mut s = MemStream::new(sample());
    let mut c = StreamCursor::new(&mut s);
    assert_eq!(c.seek(SeekFrom::End(-4)).unwrap(), 252);
    assert_eq!(c.seek(SeekFrom::Current(2)).unwrap(), 254);
    let mut buf = Vec::new();
    c.read_to_end(&mut buf).unwrap();
    assert_eq!(buf, [254, 255]);
}

#[test]
fn cursor_rejects_negative_seek() {
    let mut s = MemStream::new(sample());
    let mut c = StreamCursor::new(&mut s);
    let err = c.seek(SeekFrom::Current(-1)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}
