//! Microsoft console disc image analyzers.
//!
//! This crate provides disc analysis for Xbox Game Discs (XGD1, XGD2, XGD3)
//! and extracted XDVDFS images. XGD2 and later discs report the Xbox 360
//! platform.

pub mod xbox;
pub mod xdvdfs;
pub mod xgd;

pub use xbox::XboxAnalyzer;
pub use xdvdfs::XdvdfsHeader;
pub use xgd::XboxDiscType;
