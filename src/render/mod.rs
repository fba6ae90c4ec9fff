//! Canvas layout and per-frame rasterization.

pub mod backend;
pub mod config;
pub mod cpu;
pub mod layout;
pub mod shading;
pub mod text;
