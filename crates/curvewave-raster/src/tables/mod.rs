//! Process-wide immutable lookup tables.
//!
//! Each table is built on first request and lives until the process exits.
//! Callers receive a cloned `Arc` and never see a partially built table.

mod curvelet;
mod transfer;

pub use curvelet::{CurveletTable, CURVELET_RESOLUTION, NUM_CURVELETS, NUM_RESOLUTIONS};
pub use transfer::{TransferTable, TRANSFER_TABLE_SIZE};
