use super::*;

#[test]
fn defaults() {
    let s = Settings::default();
    assert!(!s.analysis.quick);
    assert!(s.analysis.recurse_iso);
    assert!(s.downloads.ext_img_download);
    assert!(s.downloads.use_int_icon_for_small_sizes);
    assert!(s.downloads.download_high_res_scans);
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let s = Settings::load_from(&dir.path().join("nope.toml")).unwrap();
    assert_eq!(s, Settings::default());
}

#[test]
fn missing_keys_keep_defaults() {
    let s = Settings::from_toml_str("[analysis]\nquick = true\n").unwrap();
    assert!(s.analysis.quick);
    assert!(s.analysis.recurse_iso);
    assert_eq!(s.downloads, DownloadSettings::default());
}

#[test]
fn malformed_file_is_parse_error() {
    let err = Settings::from_toml_str("[analysis\nquick = ").unwrap_err();
    assert!(matches!(err, SettingsError::Parse(_)));
}

#[test]
fn save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.toml");

    let mut s = Settings::default();
    s.analysis.recurse_iso = false;
    s.downloads.download_high_res_scans = false;
    s.save_to(&path).unwrap();

    assert!(!path.with_extension("toml.tmp").exists());
    assert_eq!(Settings::load_from(&path).unwrap(), s);
}

#[test]
fn analysis_options_follow_settings() {
    let mut s = Settings::default();
    s.analysis.quick = true;
    s.analysis.recurse_iso = false;
    let opts = s.analysis_options();
    assert!(opts.quick);
    assert!(!opts.recurse_iso);
    assert!(opts.file_path.is_none());
}

#[test]
fn settings_path_ends_in_app_dir() {
    let p = settings_path();
    assert!(p.ends_with("retro-props/settings.toml"));
}
