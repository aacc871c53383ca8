//! The two remote sources

pub mod fallback;
pub mod primary;
