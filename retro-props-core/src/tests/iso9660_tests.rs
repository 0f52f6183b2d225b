use super::*;
use crate::fields::FieldValue;
use crate::stream::MemStream;

fn pad<const N: usize>(s: &str) -> [u8; N] {
    let mut out = [b' '; N];
    out[..s.len()].copy_from_slice(s.as_bytes());
    out
}

/// A PVD sector with every region filled with distinct bytes.
fn sample_pvd_bytes() -> [u8; 2048] {
    let mut buf = [0u8; 2048];
    for (i, b) in buf.iter_mut().enumerate() {
        *b = (i * 7 % 256) as u8;
    }
    buf[0] = 1;
    buf[1..6].copy_from_slice(b"CD001");
    buf[6] = 1;
    buf[40..72].copy_from_slice(&pad::<32>("TEST_VOLUME"));
    buf[80..84].copy_from_slice(&1000u32.to_le_bytes());
    buf[84..88].copy_from_slice(&1000u32.to_be_bytes());
    buf[128..130].copy_from_slice(&2048u16.to_le_bytes());
    buf[130..132].copy_from_slice(&2048u16.to_be_bytes());
    buf[148..152].copy_from_slice(&0x1234u32.to_be_bytes());
    buf[813..829].copy_from_slice(b"2001091222425500");
    buf[829] = 0;
    buf
}

#[test]
fn decode_encode_reproduces_input() {
    let raw = sample_pvd_bytes();
    let pvd = PrimaryVolumeDescriptor::decode(&raw);
    assert_eq!(pvd.encode(), raw);
}

#[test]
fn decode_reads_fields_at_their_offsets() {
    let pvd = PrimaryVolumeDescriptor::decode(&sample_pvd_bytes());
    assert!(pvd.is_valid());
    assert_eq!(PrimaryVolumeDescriptor::text(&pvd.volume_id), "TEST_VOLUME");
    assert_eq!(pvd.volume_space_size, BothEndian::<u32>::new(1000));
    assert!(pvd.logical_block_size.is_consistent());
    assert_eq!(pvd.path_table_lba_m, 0x1234);
    assert_eq!(pvd.volume_size(), 1000 * 2048);
    assert_eq!(pvd.btime.to_unix_time(), Some(1000334575));
}

#[test]
fn both_endian_keeps_disagreeing_copies() {
    let mut raw = sample_pvd_bytes();
    raw[84..88].copy_from_slice(&999u32.to_be_bytes());
    let pvd = PrimaryVolumeDescriptor::decode(&raw);
    assert!(!pvd.volume_space_size.is_consistent());
    assert_eq!(pvd.volume_space_size.get(), 1000);
    assert_eq!(pvd.encode(), raw);
}

#[test]
fn unix_time_applies_quarter_hour_offset() {
    // 15:42:55 at -07:00 is 22:42:55 UTC.
    let t = PvdDateTime::from_digits("2001091215425500", -28).unwrap();
    assert_eq!(t.to_unix_time(), Some(1000334575));
    // 00:00 at +01:00 is 23:00 UTC the previous day.
    let t = PvdDateTime::from_digits("1970010200000000", 4).unwrap();
    assert_eq!(t.to_unix_time(), Some(86400 - 3600));
}

#[test]
fn unix_time_rejects_unset_and_malformed() {
    let zeros = PvdDateTime::from_digits("0000000000000000", 0).unwrap();
    assert!(zeros.is_unset());
    assert_eq!(zeros.to_unix_time(), None);

    let nulls = PvdDateTime {
        digits: [0; 16],
        tz_offset: 0,
    };
    assert_eq!(nulls.to_unix_time(), None);

    let bad_month = PvdDateTime::from_digits("2001139912000000", 0).unwrap();
    assert_eq!(bad_month.to_unix_time(), None);

    let not_digits = PvdDateTime::from_digits("2001-09-12 10:00", 0).unwrap();
    assert_eq!(not_digits.to_unix_time(), None);

    assert!(PvdDateTime::from_digits("2001", 0).is_none());
}

#[test]
fn unix_time_rejects_offset_out_of_range() {
    let east = PvdDateTime::from_digits("2001091215425500", 52).unwrap();
    assert!(east.to_unix_time().is_some());
    let west = PvdDateTime::from_digits("2001091215425500", -48).unwrap();
    assert!(west.to_unix_time().is_some());

    for tz in [53, -49, 127, -128] {
        let t = PvdDateTime::from_digits("2001091215425500", tz).unwrap();
        assert_eq!(t.to_unix_time(), None, "offset {}", tz);
    }
}

#[test]
fn datetime_round_trips_bytes() {
    let mut raw = [0u8; 17];
    raw[..16].copy_from_slice(b"2017010100000000");
    raw[16] = 0xE4;
    let t = PvdDateTime::decode(&raw);
    assert_eq!(t.tz_offset, -28);
    assert_eq!(t.encode(), raw);
}

#[test]
fn read_pvd_from_stream() {
    let mut img = vec![0u8; 16 * 2048];
    img.extend_from_slice(&sample_pvd_bytes());
    let mut s = MemStream::new(img.clone());
    let pvd = read_pvd(&mut s).unwrap().unwrap();
    assert_eq!(PrimaryVolumeDescriptor::text(&pvd.volume_id), "TEST_VOLUME");

    img[16 * 2048 + 1] = b'X';
    let mut s = MemStream::new(img);
    assert!(read_pvd(&mut s).unwrap().is_none());
}

#[test]
fn read_pvd_short_stream_is_not_iso() {
    let mut s = MemStream::new(vec![0u8; 16 * 2048 + 100]);
    assert!(read_pvd(&mut s).unwrap().is_none());
}

#[test]
fn fields_include_text_and_times() {
    let pvd = PrimaryVolumeDescriptor::decode(&sample_pvd_bytes());
    let f = pvd.fields();
    assert_eq!(f.tabs(), ["ISO-9660"]);
    assert_eq!(
        f.get("Volume ID"),
        Some(&FieldValue::String("TEST_VOLUME".into()))
    );
    assert_eq!(
        f.get("Creation Time"),
        Some(&FieldValue::DateTime {
            timestamp: 1000334575,
            has_date: true,
            has_time: true,
        })
    );
    assert_eq!(f.get("Volume Size"), Some(&FieldValue::String("2000 KB".into())));
}
