//! css-search: the work queue, search driver, and pause/resume snapshot
//! format built on top of [`css_core`] and [`css_tree`].
//!
//! This is the crate a caller actually drives: construct a
//! [`driver::SearchDriver`] with a starting class and a
//! [`css_core::strategy::StrategyPack`], then either call
//! [`driver::SearchDriver::expand_one`] in a loop of your own, or let
//! [`driver::SearchDriver::auto_search`] manage the expand/try-extract
//! cadence.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod driver;
pub mod error;
pub mod policy;
pub mod queue;
pub mod snapshot;

pub use driver::{SearchDriver, SearchStats};
pub use error::SearchError;
pub use policy::{AutoSearchConfig, SearchPolicy};
pub use queue::WorkQueue;
pub use snapshot::Snapshot;
