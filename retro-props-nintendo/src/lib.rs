//! Nintendo console image analyzers.
//!
//! This crate provides analysis implementations for:
//!
//! - SNES (Super Famicom), including Satellaview BS-X flash images
//! - GameCube
//! - Wii

pub(crate) mod licensee;
pub mod gamecube;
pub mod snes;
pub mod wii;

pub use gamecube::GameCubeAnalyzer;
pub use snes::SnesAnalyzer;
pub use wii::WiiAnalyzer;
