//!
//! Memory totals and utilization.
//! The data is retrieved from `/proc/meminfo`.
//!
//! To list all available keys [linuxwiki.org](https://linuxwiki.org/proc/meminfo). Or you can use the api
//! ```
//! use linux_metrics::memory::Memory;
//! let info = Memory::read().unwrap();
//! let keys: Vec<_> = info.keys().collect();
//! ```

use crate::unit::Size;

use std::path::Path;
use std::{fs, io};

/// Read memory information from /proc/meminfo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
	raw: String
}

impl Memory {

	fn path() -> &'static Path {
		Path::new("/proc/meminfo")
	}

	#[cfg(test)]
	fn from_string(raw: String) -> Self {
		Self {raw}
	}

	/// Read memory infos from /proc/meminfo.
	pub fn read() -> io::Result<Self> {
		Self::read_from(Self::path())
	}

	/// Read memory infos from another location.
	pub fn read_from(path: &Path) -> io::Result<Self> {
		Ok(Self {
			raw: fs::read_to_string(path)?
		})
	}

	/// Get all key and values.
	pub fn values<'a>(&'a self) -> impl Iterator<Item=(&'a str, &'a str)> {
		self.raw.split('\n')
			.filter_map(|line| {
				let (key, value) = line.split_once(':')?;
				Some((key.trim(), value.trim()))
			})
	}

	/// get all keys.
	pub fn keys<'a>(&'a self) -> impl Iterator<Item=&'a str> {
		self.values()
			.map(|(k, _)| k)
	}

	/// Get value by key.
	pub fn value<'a>(&'a self, key: &str) -> Option<&'a str> {
		self.values()
			.find_map(|(k, v)| k.eq_ignore_ascii_case(key).then(|| v))
	}

	/// Get size by key.
	pub fn size_value<'a>(&'a self, key: &str) -> Option<Size> {
		self.value(key)?
			.parse().ok()
	}

	/// Returns the total memory.
	pub fn total(&self) -> Option<Size> {
		self.size_value("MemTotal")
	}

	/// Returns the free memory.
	pub fn free(&self) -> Option<Size> {
		self.size_value("MemFree")
	}

	/// Returns the available memory.
	pub fn available(&self) -> Option<Size> {
		self.size_value("MemAvailable")
	}

	/// The used fraction of physical memory, `(total - free) / total`,
	/// in `[0, 1]`.
	///
	/// Returns `None` if either line is missing or the total is zero.
	pub fn utilization(&self) -> Option<f64> {
		let total = self.total()?.kb();
		let free = self.free()?.kb();
		if total == 0 {
			return None;
		}
		Some(total.saturating_sub(free) as f64 / total as f64)
	}

}
