use crate::create_context;
use retro_props_core::{AnalysisOptions, ByteStream, FieldValue, MemStream, Platform};

const SECTOR: usize = 2048;

fn pvd_sector(volume_id: &str, btime: &str) -> Vec<u8> {
    let mut buf = vec![0u8; SECTOR];
    buf[0] = 1;
    buf[1..6].copy_from_slice(b"CD001");
    buf[6] = 1;
    buf[40..72].fill(b' ');
    buf[40..40 + volume_id.len()].copy_from_slice(volume_id.as_bytes());
    buf[80..84].copy_from_slice(&40u32.to_le_bytes());
    buf[84..88].copy_from_slice(&40u32.to_be_bytes());
    buf[128..130].copy_from_slice(&2048u16.to_le_bytes());
    buf[130..132].copy_from_slice(&2048u16.to_be_bytes());
    buf[813..829].copy_from_slice(btime.as_bytes());
    buf
}

fn iso_image(volume_id: &str) -> Vec<u8> {
    let mut img = vec![0u8; 40 * SECTOR];
    img[16 * SECTOR..17 * SECTOR].copy_from_slice(&pvd_sector(volume_id, "2020020212000000"));
    img
}

fn xdvdfs_sector() -> Vec<u8> {
    const MAGIC: &[u8; 20] = b"MICROSOFT*XBOX*MEDIA";
    let mut buf = vec![0u8; SECTOR];
    buf[..20].copy_from_slice(MAGIC);
    buf[0x14..0x18].copy_from_slice(&0x108u32.to_le_bytes());
    buf[0x18..0x1C].copy_from_slice(&0x800u32.to_le_bytes());
    buf[2028..].copy_from_slice(MAGIC);
    buf
}

fn gamecube_image() -> Vec<u8> {
    let mut img = vec![0u8; 0x10000];
    img[0..6].copy_from_slice(b"GALE01");
    img[0x1C..0x20].copy_from_slice(&0xC233_9F3Du32.to_be_bytes());
    img[0x20..0x36].copy_from_slice(b"Super Smash Bros Melee");
    img
}

/// 256 KB LoROM with a consistent checksum pair.
fn snes_rom() -> Vec<u8> {
    const BASE: usize = 0x7FB0;
    let mut rom = vec![0u8; 256 * 1024];
    rom[BASE + 0x10..BASE + 0x25].copy_from_slice(b"CONTEXT TEST         ");
    rom[BASE + 0x25] = 0x20;
    rom[BASE + 0x27] = 0x08;
    rom[BASE + 0x29] = 0x01;
    rom[BASE + 0x2A] = 0x01;
    rom[BASE + 0x2C..BASE + 0x2E].copy_from_slice(&[0xFF, 0xFF]);
    let sum = rom.iter().fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)));
    rom[BASE + 0x2C..BASE + 0x2E].copy_from_slice(&(sum ^ 0xFFFF).to_le_bytes());
    rom[BASE + 0x2E..BASE + 0x30].copy_from_slice(&sum.to_le_bytes());
    rom
}

#[test]
fn registration_order_is_detection_order() {
    let ctx = create_context();
    assert_eq!(
        ctx.short_names(),
        vec!["gamecube", "wii", "xbox", "snes", "iso"]
    );
}

#[test]
fn detects_gamecube() {
    let ctx = create_context();
    let mut s = MemStream::new(gamecube_image());
    let id = ctx.identify(&mut s, &AnalysisOptions::default()).unwrap();
    assert_eq!(id.platform, Some(Platform::GameCube));
}

#[test]
fn detects_snes() {
    let ctx = create_context();
    let mut s = MemStream::new(snes_rom());
    let console = ctx.detect(&mut s).unwrap();
    assert_eq!(console.metadata.platform, Platform::Snes);
}

#[test]
fn xbox_wins_over_plain_iso() {
    // Valid PVD, no XGD timestamp, XDVDFS header at sector 32.
    let mut img = iso_image("XBOXDISC");
    img[32 * SECTOR..33 * SECTOR].copy_from_slice(&xdvdfs_sector());
    let ctx = create_context();
    let mut s = MemStream::new(img);
    let id = ctx.identify(&mut s, &AnalysisOptions::default()).unwrap();
    assert_eq!(id.platform, Some(Platform::Xbox));
}

#[test]
fn plain_iso_falls_back() {
    let ctx = create_context();
    let mut s = MemStream::new(iso_image("MY_DISC"));
    let id = ctx.identify(&mut s, &AnalysisOptions::default()).unwrap();
    assert_eq!(id.platform, Some(Platform::Iso9660));
    assert_eq!(id.internal_name.as_deref(), Some("MY_DISC"));
    assert_eq!(id.expected_size, Some(40 * 2048));
    assert_eq!(
        id.fields.get("Volume ID"),
        Some(&FieldValue::String("MY_DISC".to_string()))
    );
}

#[test]
fn unrecognized_stream_reports_eio() {
    let ctx = create_context();
    let mut s = MemStream::new(vec![0u8; 4096]);
    let report = ctx.report(&mut s, &AnalysisOptions::default());
    assert!(!report.valid);
    assert_eq!(report.error_code, -5);
    assert!(report.fields().is_none());
}

#[test]
fn closed_stream_reports_ebadf() {
    let ctx = create_context();
    let mut s = MemStream::new(gamecube_image());
    s.close();
    let report = ctx.report(&mut s, &AnalysisOptions::default());
    assert!(!report.valid);
    assert_eq!(report.error_code, -9);
}

#[test]
fn valid_report_carries_fields() {
    let ctx = create_context();
    let mut s = MemStream::new(iso_image("FIELDS"));
    let report = ctx.report(&mut s, &AnalysisOptions::default());
    assert!(report.valid);
    assert_eq!(report.error_code, 0);
    assert_eq!(report.fields().unwrap().tabs()[0], "ISO-9660");
}

#[test]
fn find_by_extension_ignores_case_and_dot() {
    let ctx = create_context();
    let names: Vec<_> = ctx
        .find_by_extension(".ISO")
        .iter()
        .map(|c| c.metadata.short_name)
        .collect();
    assert_eq!(names, vec!["gamecube", "wii", "xbox", "iso"]);
    assert_eq!(ctx.find_by_extension("sfc").len(), 1);
    assert!(ctx.find_by_extension("zip").is_empty());
}

#[test]
fn lookup_by_alias() {
    let ctx = create_context();
    let console = ctx.get_by_short_name("gcn").unwrap();
    assert_eq!(console.metadata.platform, Platform::GameCube);
    assert_eq!(console.metadata.manufacturer, "Nintendo");
    assert!(ctx.get_by_short_name("genesis").is_none());
    // Xbox 360 discs share the Xbox analyzer and have no entry of their own.
    assert!(ctx.get_by_platform(Platform::Xbox360).is_none());
}
