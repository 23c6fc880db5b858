//!  Storage is organized through [daily_store::DailyStateStore].
//!  The basic idea is:
//!   - There is a single JSON document holding settings and the whole intake history.
//!   - History is keyed by local calendar date. Only today's record is ever touched.
//!   - A broken document is never fatal, the store falls back to defaults.

pub mod daily_store;
pub mod entities;
pub mod error;
