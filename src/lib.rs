//! Cargo flight scheduling: timeline layout, drag-to-reschedule and
//! optimistic persistence, shared by the desktop front-end and the tests.

pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod model;
pub mod notify;
pub mod schedule;
pub mod store;
pub mod summary;

pub use error::{Error, Result};
