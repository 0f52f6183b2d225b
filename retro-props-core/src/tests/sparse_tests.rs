use super::*;
use crate::stream::{MemStream, StreamCursor};
use std::io::{Read, Seek, SeekFrom, Write};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Block map backed by an explicit table of raw addresses.
#[derive(Debug, Clone)]
struct TableMap {
    block_size: u32,
    table: Vec<i64>,
}

impl BlockMap for TableMap {
    fn block_size(&self) -> u32 {
        self.block_size
    }

    fn logical_size(&self) -> u64 {
        self.table.len() as u64 * u64::from(self.block_size)
    }

    fn phys_block_addr(&self, block_idx: u32) -> BlockAddr {
        self.table
            .get(block_idx as usize)
            .map_or(BlockAddr::Invalid, |&raw| BlockAddr::from_raw(raw))
    }
}

/// Backing stream that must never be read.
struct FailingStream;

impl ByteStream for FailingStream {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        panic!("sparse block touched the backing stream");
    }

    fn seek(&mut self, _pos: u64) -> io::Result<()> {
        panic!("sparse block touched the backing stream");
    }

    fn tell(&self) -> u64 {
        0
    }

    fn size(&self) -> Option<u64> {
        Some(0)
    }

    fn is_open(&self) -> bool {
        true
    }

    fn dup(&self) -> io::Result<Box<dyn ByteStream>> {
        Ok(Box::new(FailingStream))
    }

    fn close(&mut self) {}
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn reader(data: Vec<u8>, map: TableMap) -> SparseBlockReader<TableMap> {
    SparseBlockReader::new(Box::new(MemStream::new(data)), map).unwrap()
}

// ---------------------------------------------------------------------------
// BlockAddr
// ---------------------------------------------------------------------------

#[test]
fn block_addr_raw_sentinels() {
    assert_eq!(BlockAddr::from_raw(0), BlockAddr::Sparse);
    assert_eq!(BlockAddr::from_raw(-1), BlockAddr::Invalid);
    assert_eq!(BlockAddr::from_raw(0x8000), BlockAddr::Physical(0x8000));
    assert_eq!(BlockAddr::Sparse.raw(), 0);
    assert_eq!(BlockAddr::Invalid.raw(), -1);
    assert_eq!(BlockAddr::Physical(4096).raw(), 4096);
}

// ---------------------------------------------------------------------------
// SparseBlockReader
// ---------------------------------------------------------------------------

#[test]
fn fully_populated_reads_back_source() {
    // Logical block i stored at 16 + i * 16, identical to the source bytes.
    let logical = pattern(64);
    let mut backing = vec![0xEE; 16];
    backing.extend_from_slice(&logical);
    let map = TableMap {
        block_size: 16,
        table: vec![16, 32, 48, 64],
    };
    let mut r = reader(backing, map);
    assert_eq!(r.size(), Some(64));

    let mut out = vec![0u8; 64];
    assert_eq!(r.read(&mut out).unwrap(), 64);
    assert_eq!(out, logical);

    // Unaligned read spanning three blocks.
    let mut out = vec![0u8; 30];
    assert_eq!(r.seek_and_read(10, &mut out).unwrap(), 30);
    assert_eq!(out, &logical[10..40]);
    assert_eq!(r.tell(), 40);
}

/// Blocks stored back to back after a header, with an arbitrary logical size.
#[derive(Debug, Clone)]
struct LinearMap {
    block_size: u32,
    base: u64,
    size: u64,
}

impl BlockMap for LinearMap {
    fn block_size(&self) -> u32 {
        self.block_size
    }

    fn logical_size(&self) -> u64 {
        self.size
    }

    fn phys_block_addr(&self, block_idx: u32) -> BlockAddr {
        let bs = u64::from(self.block_size);
        if u64::from(block_idx) * bs >= self.size {
            return BlockAddr::Invalid;
        }
        BlockAddr::Physical(self.base + u64::from(block_idx) * bs)
    }
}

#[test]
fn populated_map_reads_back_source_at_any_block_size() {
    for block_size in [1u32, 2, 16, 512, 2048, 32 * 1024] {
        for size in [0usize, 1, 1000, 4096, 70_001] {
            let logical = pattern(size);
            let mut backing = vec![0xEE; 64];
            backing.extend_from_slice(&logical);
            let map = LinearMap {
                block_size,
                base: 64,
                size: size as u64,
            };
            let mut r = SparseBlockReader::new(Box::new(MemStream::new(backing)), map).unwrap();
            assert_eq!(r.size(), Some(size as u64));

            let mut out = vec![0u8; size + 100];
            assert_eq!(r.read(&mut out).unwrap(), size, "bs={} size={}", block_size, size);
            assert_eq!(&out[..size], &logical[..], "bs={} size={}", block_size, size);

            if size > 7 {
                let mut tail = vec![0u8; size];
                let n = r.seek_and_read(7, &mut tail).unwrap();
                assert_eq!(n, size - 7);
                assert_eq!(&tail[..n], &logical[7..]);
            }
        }
    }
}

#[test]
fn reads_at_or_past_end_return_zero() {
    let map = TableMap {
        block_size: 16,
        table: vec![16],
    };
    let mut r = reader(pattern(64), map);
    let mut buf = [0u8; 8];
    r.seek(16).unwrap();
    assert_eq!(r.read(&mut buf).unwrap(), 0);
    r.seek(1 << 40).unwrap();
    assert_eq!(r.read(&mut buf).unwrap(), 0);
}

#[test]
fn read_clamps_to_logical_size() {
    let map = TableMap {
        block_size: 16,
        table: vec![0, 0],
    };
    let mut r = SparseBlockReader::new(Box::new(FailingStream), map).unwrap();
    let mut buf = [0xAAu8; 64];
    r.seek(20).unwrap();
    assert_eq!(r.read(&mut buf).unwrap(), 12);
    assert!(buf[..12].iter().all(|&b| b == 0));
    assert!(buf[12..].iter().all(|&b| b == 0xAA));
}

#[test]
fn sparse_blocks_zero_fill_without_reading() {
    let map = TableMap {
        block_size: 32,
        table: vec![0, 0, 0],
    };
    let mut r = SparseBlockReader::new(Box::new(FailingStream), map).unwrap();
    let mut buf = [0xFFu8; 96];
    assert_eq!(r.read(&mut buf).unwrap(), 96);
    assert!(buf.iter().all(|&b| b == 0));
}

#[test]
fn invalid_block_stops_at_boundary() {
    let data = pattern(128);
    let map = TableMap {
        block_size: 16,
        table: vec![16, -1, 48],
    };
    let mut r = reader(data.clone(), map);
    let mut buf = [0u8; 48];
    r.seek(4).unwrap();
    assert_eq!(r.read(&mut buf).unwrap(), 12);
    assert_eq!(&buf[..12], &data[20..32]);
    assert_eq!(r.tell(), 16);
}

#[test]
fn short_backing_read_ends_call() {
    // Block 1 points past the end of a 40-byte backing stream.
    let map = TableMap {
        block_size: 16,
        table: vec![8, 32],
    };
    let mut r = reader(pattern(40), map);
    let mut buf = [0u8; 32];
    assert_eq!(r.read(&mut buf).unwrap(), 24);
    assert_eq!(r.last_error(), crate::error::EIO);
    r.clear_error();
    assert_eq!(r.last_error(), 0);
}

#[test]
fn invalid_geometry_reports_closed() {
    let map = TableMap {
        block_size: 24,
        table: vec![16],
    };
    let mut r = reader(pattern(64), map);
    assert!(!r.is_open());
    let mut buf = [0u8; 8];
    assert_eq!(r.read(&mut buf).unwrap(), 0);
    assert_eq!(r.last_error(), crate::error::EBADF);
}

#[test]
fn closed_stream_is_rejected() {
    let mut s = MemStream::new(pattern(16));
    s.close();
    let map = TableMap {
        block_size: 16,
        table: vec![0],
    };
    let err = SparseBlockReader::new(Box::new(s), map).err().unwrap();
    assert!(matches!(err, AnalysisError::NotOpen));
    assert_eq!(err.errno(), -crate::error::EBADF);
}

#[test]
fn dup_has_own_cursor() {
    let data = pattern(64);
    let map = TableMap {
        block_size: 16,
        table: vec![16, 32],
    };
    let mut r = reader(data.clone(), map);
    r.seek(20).unwrap();
    let mut d = r.dup().unwrap();
    assert_eq!(d.tell(), 0);
    assert_eq!(d.size(), Some(32));
    let mut buf = [0u8; 4];
    d.read(&mut buf).unwrap();
    assert_eq!(buf, data[16..20]);
    assert_eq!(r.tell(), 20);
}

#[test]
fn std_io_adapter_rejects_negative_seek() {
    let map = TableMap {
        block_size: 16,
        table: vec![16, 32],
    };
    let mut r = reader(pattern(64), map);
    let mut cur = StreamCursor::new(&mut r);
    assert!(cur.seek(SeekFrom::Current(-1)).is_err());
    assert_eq!(cur.seek(SeekFrom::End(-2)).unwrap(), 30);
    let mut rest = Vec::new();
    cur.read_to_end(&mut rest).unwrap();
    assert_eq!(rest.len(), 2);
}

#[test]
fn readers_stack() {
    // Outer: identity over 64 bytes. Inner: window starting at byte 32.
    let data = pattern(96);
    let outer = TableMap {
        block_size: 32,
        table: vec![32, 64],
    };
    let outer = reader(data.clone(), outer);
    let inner = TableMap {
        block_size: 16,
        table: vec![32, 48],
    };
    let mut r = SparseBlockReader::new(Box::new(outer), inner).unwrap();
    let mut buf = [0u8; 32];
    assert_eq!(r.read(&mut buf).unwrap(), 32);
    assert_eq!(buf, data[64..96]);
}

// ---------------------------------------------------------------------------
// CISO
// ---------------------------------------------------------------------------

const CISO_BS: usize = 0x8000;

fn ciso_image(flags: &[u8], blocks: &[u8]) -> Vec<u8> {
    let mut img = vec![0u8; ciso::CISO_HEADER_SIZE];
    img[0..4].copy_from_slice(b"CISO");
    img[4..8].copy_from_slice(&(CISO_BS as u32).to_le_bytes());
    img[8..8 + flags.len()].copy_from_slice(flags);
    for &fill in blocks {
        img.extend(std::iter::repeat_n(fill, CISO_BS));
    }
    img
}

#[test]
fn ciso_maps_present_and_missing_blocks() {
    let img = ciso_image(&[1, 0, 1], &[0x11, 0x33]);
    let mut s = MemStream::new(img);
    let Some(DiscContainer::Ciso(map)) = DiscContainer::open(&mut s).unwrap() else {
        panic!("expected CISO");
    };
    assert_eq!(map.logical_size(), 3 * CISO_BS as u64);
    assert_eq!(map.stored_blocks(), 2);
    assert_eq!(map.phys_block_addr(0), BlockAddr::Physical(0x8000));
    assert_eq!(map.phys_block_addr(1), BlockAddr::Sparse);
    assert_eq!(map.phys_block_addr(2), BlockAddr::Physical(0x8000 + CISO_BS as u64));
    assert_eq!(map.phys_block_addr(3), BlockAddr::Invalid);

    let mut r = SparseBlockReader::new(Box::new(s), map).unwrap();
    let mut buf = vec![0u8; 3 * CISO_BS];
    assert_eq!(r.read(&mut buf).unwrap(), 3 * CISO_BS);
    assert!(buf[..CISO_BS].iter().all(|&b| b == 0x11));
    assert!(buf[CISO_BS..2 * CISO_BS].iter().all(|&b| b == 0));
    assert!(buf[2 * CISO_BS..].iter().all(|&b| b == 0x33));
}

#[test]
fn ciso_rejects_bad_flags_and_block_sizes() {
    let img = ciso_image(&[1, 2], &[0]);
    assert!(CisoMap::parse(&img).is_none());

    let mut img = ciso_image(&[1], &[0]);
    img[4..8].copy_from_slice(&0x3000u32.to_le_bytes());
    assert!(CisoMap::parse(&img).is_none());
}

// ---------------------------------------------------------------------------
// WBFS
// ---------------------------------------------------------------------------

#[test]
fn wbfs_maps_first_disc() {
    const HD_SEC: usize = 512;
    const WBFS_SEC: usize = 0x8000;
    let entries = 143_432 * 2;

    let mut img = vec![0u8; HD_SEC];
    img[0..4].copy_from_slice(b"WBFS");
    img[4..8].copy_from_slice(&1000u32.to_be_bytes());
    img[8] = 9;
    img[9] = 15;
    img[12] = 1;

    let mut info = vec![0u8; 0x100 + entries * 2];
    info[0..6].copy_from_slice(b"RMCE01");
    // Logical 0 -> WBFS sector 20, logical 1 sparse, logical 2 -> sector 21.
    info[0x100..0x102].copy_from_slice(&20u16.to_be_bytes());
    info[0x104..0x106].copy_from_slice(&21u16.to_be_bytes());
    img.extend_from_slice(&info);

    img.resize(22 * WBFS_SEC, 0);
    img[20 * WBFS_SEC..21 * WBFS_SEC].fill(0xAB);
    img[21 * WBFS_SEC..].fill(0xCD);

    let mut s = MemStream::new(img);
    let Some(DiscContainer::Wbfs(map)) = DiscContainer::open(&mut s).unwrap() else {
        panic!("expected WBFS");
    };
    assert_eq!(&map.disc_header()[..6], b"RMCE01");
    assert_eq!(map.logical_size(), 3 * WBFS_SEC as u64);
    assert_eq!(map.phys_block_addr(1), BlockAddr::Sparse);
    assert_eq!(map.phys_block_addr(3), BlockAddr::Invalid);

    let mut r = SparseBlockReader::new(Box::new(s), map).unwrap();
    let mut buf = [0u8; 4];
    r.seek_and_read(WBFS_SEC as u64 - 2, &mut buf).unwrap();
    assert_eq!(buf, [0xAB, 0xAB, 0, 0]);
    r.seek_and_read(2 * WBFS_SEC as u64, &mut buf).unwrap();
    assert_eq!(buf, [0xCD; 4]);
}

// ---------------------------------------------------------------------------
// GCZ
// ---------------------------------------------------------------------------

fn gcz_image(blocks: &[Vec<u8>], block_size: u32, compress: &[bool]) -> Vec<u8> {
    let mut payload = Vec::new();
    let mut pointers = Vec::new();
    for (data, &z) in blocks.iter().zip(compress) {
        let start = payload.len() as u64;
        if z {
            let mut enc = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            enc.write_all(data).unwrap();
            payload.extend(enc.finish().unwrap());
            pointers.push(start);
        } else {
            payload.extend_from_slice(data);
            pointers.push(start | (1 << 63));
        }
    }
    let data_size: u64 = blocks.iter().map(|b| b.len() as u64).sum();

    let mut img = Vec::new();
    img.extend(gcz::GCZ_MAGIC.to_le_bytes());
    img.extend(0u32.to_le_bytes());
    img.extend((payload.len() as u64).to_le_bytes());
    img.extend(data_size.to_le_bytes());
    img.extend(block_size.to_le_bytes());
    img.extend((blocks.len() as u32).to_le_bytes());
    for p in &pointers {
        img.extend(p.to_le_bytes());
    }
    for _ in &pointers {
        img.extend(0u32.to_le_bytes());
    }
    img.extend(payload);
    img
}

#[test]
fn gcz_inflates_and_passes_through_stored_blocks() {
    let b0 = pattern(1024);
    let b1: Vec<u8> = pattern(1024).into_iter().rev().collect();
    let img = gcz_image(&[b0.clone(), b1.clone()], 1024, &[true, false]);

    let mut s = MemStream::new(img);
    let Some(container) = DiscContainer::open(&mut s).unwrap() else {
        panic!("expected GCZ");
    };
    assert_eq!(container.name(), "GCZ");
    assert_eq!(container.logical_size(), 2048);

    let mut r = SparseBlockReader::new(Box::new(s), container).unwrap();
    let mut out = vec![0u8; 2048];
    assert_eq!(r.read(&mut out).unwrap(), 2048);
    assert_eq!(&out[..1024], &b0[..]);
    assert_eq!(&out[1024..], &b1[..]);

    // Second read of the compressed block is served from the cache.
    let mut part = [0u8; 10];
    assert_eq!(r.seek_and_read(500, &mut part).unwrap(), 10);
    assert_eq!(part, b0[500..510]);
}

#[test]
fn gcz_rejects_undersized_block_table() {
    let mut img = gcz_image(&[pattern(1024)], 1024, &[true]);
    // Claim 4 KiB of data with a single 1 KiB block.
    img[16..24].copy_from_slice(&4096u64.to_le_bytes());
    let mut s = MemStream::new(img);
    assert!(DiscContainer::open(&mut s).unwrap().is_none());
}

#[test]
fn gcz_rejects_data_size_past_end_of_file() {
    let mut img = gcz_image(&[pattern(1024)], 1024, &[true]);
    img[8..16].copy_from_slice(&u64::MAX.to_le_bytes());
    let mut s = MemStream::new(img);
    assert!(DiscContainer::open(&mut s).unwrap().is_none());
}

#[test]
fn gcz_rejects_unordered_or_out_of_range_pointers() {
    let blocks = [pattern(1024), pattern(1024)];
    let img = gcz_image(&blocks, 1024, &[true, true]);
    let ptr0 = 32usize;
    let ptr1 = 40usize;

    // Second block starting before the first.
    let mut swapped = img.clone();
    swapped[ptr0..ptr0 + 8].copy_from_slice(&100u64.to_le_bytes());
    swapped[ptr1..ptr1 + 8].copy_from_slice(&50u64.to_le_bytes());
    assert!(DiscContainer::open(&mut MemStream::new(swapped)).unwrap().is_none());

    // Pointer beyond the compressed data.
    let mut past = img;
    past[ptr1..ptr1 + 8].copy_from_slice(&(1u64 << 40).to_le_bytes());
    assert!(DiscContainer::open(&mut MemStream::new(past)).unwrap().is_none());
}

#[test]
fn gcz_oversized_packed_block_is_a_short_read() {
    // The block claims 1 MiB of packed data; zlib cannot expand 1 KiB that far.
    let mut img = gcz_image(&[pattern(1024)], 1024, &[true]);
    let payload = (img.len() - (32 + 12)) as u64;
    let claimed = payload + (1 << 20);
    img[8..16].copy_from_slice(&claimed.to_le_bytes());
    img.resize(img.len() + (1 << 20), 0);

    let mut s = MemStream::new(img);
    let container = DiscContainer::open(&mut s).unwrap().unwrap();
    let mut r = SparseBlockReader::new(Box::new(s), container).unwrap();
    let mut out = [0u8; 16];
    assert_eq!(r.read(&mut out).unwrap(), 0);
    assert_ne!(r.last_error(), 0);
}

// ---------------------------------------------------------------------------
// Container probing and XDVDFS window
// ---------------------------------------------------------------------------

#[test]
fn plain_image_is_not_a_container() {
    let mut s = MemStream::new(pattern(4096));
    assert!(DiscContainer::open(&mut s).unwrap().is_none());
    let mut tiny = MemStream::new(vec![b'C', b'I']);
    assert!(DiscContainer::open(&mut tiny).unwrap().is_none());
}

#[test]
fn xdvdfs_window_offsets_reads() {
    let data = pattern(8 * 2048);
    let part = XdvdfsPartition::new(2 * 2048, 4 * 2048).unwrap();
    assert_eq!(part.phys_block_addr(1), BlockAddr::Physical(3 * 2048));
    assert_eq!(part.phys_block_addr(4), BlockAddr::Invalid);
    assert!(XdvdfsPartition::new(0, 2048).is_none());

    let mut r =
        SparseBlockReader::new(Box::new(MemStream::new(data.clone())), DiscContainer::Xdvdfs(part))
            .unwrap();
    let mut buf = [0u8; 16];
    r.seek_and_read(100, &mut buf).unwrap();
    assert_eq!(buf, data[4096 + 100..4096 + 116]);
}
