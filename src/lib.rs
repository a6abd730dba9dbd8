//!
//! Read the metrics a process monitor displays, straight from the
//! /proc pseudo filesystem.
//! Every record is read fresh on the call, nothing is cached and no
//! state is shared, so queries are independent and safe to issue
//! from several threads.
//!
//! The one value that cannot come from a single read is the system
//! wide cpu utilization, a rate over two samples the caller takes
//! one polling interval apart, see [`cpu::Times::utilization_since`].
//!
//! ## Testing against fixtures
//! Nothing in here hardcodes /proc. Every reader also takes an
//! explicit path and [`metrics::Metrics`] bundles them, point it at
//! a synthetic directory tree to test against handcrafted records.

/// Get cpu times, utilization and the system process counts.
pub mod cpu;
/// Get memory totals and utilization.
pub mod memory;
/// Get the os identity, kernel version and uptime.
pub mod system;
/// Enumerate processes and read per process records.
pub mod process;
/// Resolve uids to usernames.
pub mod users;
/// Query every metric through one set of configured paths.
pub mod metrics;

mod util;


pub mod unit {
	use super::*;
	pub use util::{Size, clock_ticks};
}
