use super::*;

fn sample_header() -> [u8; XdvdfsHeader::SIZE] {
    let mut buf = [0u8; XdvdfsHeader::SIZE];
    for (i, b) in buf.iter_mut().enumerate() {
        *b = (i % 199) as u8;
    }
    buf[..20].copy_from_slice(XDVDFS_MAGIC);
    buf[0x14..0x18].copy_from_slice(&0x108u32.to_le_bytes());
    buf[0x18..0x1C].copy_from_slice(&0x800u32.to_le_bytes());
    buf[0x1C..0x24].copy_from_slice(&126_448_081_750_000_000u64.to_le_bytes());
    buf[2028..].copy_from_slice(XDVDFS_MAGIC);
    buf
}

#[test]
fn decode_encode_reproduces_input() {
    let raw = sample_header();
    assert_eq!(XdvdfsHeader::decode(&raw).encode(), raw);
}

#[test]
fn decode_reads_little_endian_fields() {
    let h = XdvdfsHeader::decode(&sample_header());
    assert!(h.has_valid_magic());
    assert_eq!(h.root_dir_sector, 0x108);
    assert_eq!(h.root_dir_size, 0x800);
    assert_eq!(h.unix_timestamp(), 1000334575);
}

#[test]
fn either_magic_copy_mismatch_fails() {
    let mut raw = sample_header();
    raw[2047] = b'X';
    assert!(!XdvdfsHeader::decode(&raw).has_valid_magic());

    let mut raw = sample_header();
    raw[0] = b'm';
    assert!(!XdvdfsHeader::decode(&raw).has_valid_magic());
}

#[test]
fn filetime_before_unix_epoch() {
    let mut raw = sample_header();
    // 1969-12-31 23:59:50 UTC
    raw[0x1C..0x24].copy_from_slice(&(116_444_736_000_000_000u64 - 100_000_000).to_le_bytes());
    assert_eq!(XdvdfsHeader::decode(&raw).unix_timestamp(), -10);
}
