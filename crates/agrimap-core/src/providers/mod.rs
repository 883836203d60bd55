//! Provider-specific payload canonicalization.
//!
//! Each provider module turns its native record shape into canonical
//! [`RegionRecord`](crate::domain::RegionRecord) or
//! [`PriceRecord`](crate::domain::PriceRecord) sets.

pub mod bps;
pub mod local_file;
pub mod price_board;
