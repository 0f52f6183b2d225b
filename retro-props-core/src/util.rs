/// Format a byte count as a human-readable size string (e.g., "4 KB", "2 MB").
///
/// Values that aren't clean multiples of KB/MB are shown in bytes.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 && bytes.is_multiple_of(1024 * 1024) {
        format!("{} MB", bytes / (1024 * 1024))
    } else if bytes >= 1024 && bytes.is_multiple_of(1024) {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Read a null-terminated ASCII string from a byte slice.
///
/// Stops at the first null byte and drops non-printable characters.
pub fn read_ascii(buf: &[u8]) -> String {
    buf.iter()
        .take_while(|&&b| b != 0)
        .filter(|&&b| (0x20..0x7F).contains(&b))
        .map(|&b| b as char)
        .collect()
}

/// Read a fixed-width, space- or null-padded ASCII field.
///
/// Non-printable bytes become spaces and the result is trimmed. Does not
/// stop at null bytes.
pub fn read_ascii_fixed(buf: &[u8]) -> String {
    let s: String = buf
        .iter()
        .map(|&b| {
            if (0x20..0x7F).contains(&b) {
                b as char
            } else {
                ' '
            }
        })
        .collect();
    s.trim().to_string()
}

/// True if every byte is printable ASCII or a trailing pad (space/NUL).
pub fn is_printable_ascii(buf: &[u8]) -> bool {
    buf.iter().all(|&b| (0x20..0x7F).contains(&b) || b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(2048 * 1024), "2 MB");
        assert_eq!(format_bytes(1025), "1025 bytes");
    }

    #[test]
    fn test_read_ascii() {
        assert_eq!(read_ascii(b"HELLO\0WORLD"), "HELLO");
        assert_eq!(read_ascii(b"\x01\x02ABC"), "ABC");
        assert_eq!(read_ascii(b""), "");
    }

    #[test]
    fn test_read_ascii_fixed() {
        assert_eq!(read_ascii_fixed(b"HELLO\0\0\0"), "HELLO");
        assert_eq!(read_ascii_fixed(b"\xFF\xFFABC\xFF\xFF"), "ABC");
        assert_eq!(read_ascii_fixed(b"SUPER MARIOWORLD     "), "SUPER MARIOWORLD");
    }

    #[test]
    fn test_is_printable_ascii() {
        assert!(is_printable_ascii(b"ZELDA \0\0"));
        assert!(!is_printable_ascii(b"ZEL\xFFDA"));
    }
}
