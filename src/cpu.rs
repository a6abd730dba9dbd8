//!
//! Aggregate cpu tick accounting and system wide process counts.
//! The data is retrieved from `/proc/stat`.
//!
//! Cpu utilization is a rate, one instantaneous read cannot yield it.
//! Take two samples at least one scheduler tick apart and compare them:
//!
//! ```
//! use linux_metrics::cpu::Stat;
//! let earlier = Stat::read().unwrap().times().unwrap();
//! // ... one polling interval later
//! let now = Stat::read().unwrap().times().unwrap();
//! let usage = now.utilization_since(&earlier);
//! ```

use std::path::Path;
use std::{fs, io};

/// One read of /proc/stat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
	raw: String
}

impl Stat {

	fn path() -> &'static Path {
		Path::new("/proc/stat")
	}

	#[cfg(test)]
	fn from_string(raw: String) -> Self {
		Self {raw}
	}

	/// Read the stat record from /proc/stat.
	pub fn read() -> io::Result<Self> {
		Self::read_from(Self::path())
	}

	/// Read the stat record from another location.
	pub fn read_from(path: &Path) -> io::Result<Self> {
		Ok(Self {
			raw: fs::read_to_string(path)?
		})
	}

	fn keyed_value(&self, key: &str) -> Option<u64> {
		self.raw.split('\n')
			.filter_map(|line| {
				let mut fields = line.split_whitespace();
				Some((fields.next()?, fields.next()?))
			})
			.find_map(|(k, v)| (k == key).then(|| v))?
			.parse().ok()
	}

	/// The aggregate cpu counters, from the first `cpu` line.
	///
	/// Returns `None` if the line is missing or malformed.
	pub fn times(&self) -> Option<Times> {
		self.raw.split('\n')
			.find(|line| {
				line.split_whitespace().next() == Some("cpu")
			})
			.and_then(Times::from_line)
	}

	/// How many processes were created since boot.
	///
	/// Returns `None` if the record carries no `processes` key.
	pub fn total_processes(&self) -> Option<u64> {
		self.keyed_value("processes")
	}

	/// How many processes are runnable right now.
	///
	/// Returns `None` if the record carries no `procs_running` key.
	pub fn running_processes(&self) -> Option<u64> {
		self.keyed_value("procs_running")
	}

}

/// One sample of the aggregate cpu counters, in clock ticks.
///
/// The ten categories decompose the full tick budget:
/// `total_ticks() == active_ticks() + idle_ticks() + guest_ticks()`
/// holds exactly for any sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
	feature = "serde",
	derive(serde1::Serialize, serde1::Deserialize),
	serde(crate = "serde1")
)]
pub struct Times {
	pub user: u64,
	pub nice: u64,
	pub system: u64,
	pub idle: u64,
	pub iowait: u64,
	pub irq: u64,
	pub softirq: u64,
	pub steal: u64,
	pub guest: u64,
	pub guest_nice: u64
}

impl Times {

	fn from_line(line: &str) -> Option<Self> {
		let mut fields = line.split_whitespace().skip(1);
		let mut parse = move || -> Option<u64> {
			fields.next()?.parse().ok()
		};
		Some(Self {
			user: parse()?,
			nice: parse()?,
			system: parse()?,
			idle: parse()?,
			iowait: parse()?,
			irq: parse()?,
			softirq: parse()?,
			steal: parse()?,
			// kernels before 2.6.33 miss the guest fields
			guest: parse().unwrap_or(0),
			guest_nice: parse().unwrap_or(0)
		})
	}

	/// The full tick budget, the sum of every category.
	pub fn total_ticks(&self) -> u64 {
		self.user + self.nice + self.system + self.idle + self.iowait
			+ self.irq + self.softirq + self.steal
			+ self.guest + self.guest_nice
	}

	/// Ticks spent doing work.
	///
	/// Guest time is left out, it is already accounted inside user
	/// time on the kernel side and tracked separately here.
	pub fn active_ticks(&self) -> u64 {
		self.user + self.nice + self.system + self.irq
			+ self.softirq + self.steal
	}

	/// Ticks spent idle or waiting on io.
	pub fn idle_ticks(&self) -> u64 {
		self.idle + self.iowait
	}

	/// Ticks spent running guests.
	pub fn guest_ticks(&self) -> u64 {
		self.guest + self.guest_nice
	}

	/// The fraction of ticks spent active between an earlier sample
	/// and this one, in `[0, 1]`.
	///
	/// Returns `None` if no ticks elapsed between the samples or a
	/// counter went backwards.
	pub fn utilization_since(&self, earlier: &Times) -> Option<f64> {
		let total = self.total_ticks().checked_sub(earlier.total_ticks())?;
		let active = self.active_ticks().checked_sub(earlier.active_ticks())?;
		if total == 0 {
			return None;
		}
		Some(active as f64 / total as f64)
	}

}
