pub mod meter;
pub mod theme;
