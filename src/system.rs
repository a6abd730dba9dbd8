//! System identity and uptime, retrieved from `/etc/os-release`,
//! `/proc/version` and `/proc/uptime`.
//!
//! ```
//! use linux_metrics::system::Uptime;
//! let uptime = Uptime::read().unwrap();
//! let secs = uptime.seconds().unwrap();
//! ```

use std::path::Path;
use std::time::Duration;
use std::{fs, io};

/// Read the os identity from /etc/os-release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsRelease {
	raw: String
}

impl OsRelease {

	fn path() -> &'static Path {
		Path::new("/etc/os-release")
	}

	#[cfg(test)]
	fn from_string(raw: String) -> Self {
		Self {raw}
	}

	/// Read the os identity from /etc/os-release.
	pub fn read() -> io::Result<Self> {
		Self::read_from(Self::path())
	}

	/// Read the os identity from another location.
	pub fn read_from(path: &Path) -> io::Result<Self> {
		Ok(Self {
			raw: fs::read_to_string(path)?
		})
	}

	/// Get all key and values, with surrounding quotes
	/// stripped from the values.
	pub fn values<'a>(&'a self) -> impl Iterator<Item=(&'a str, &'a str)> {
		self.raw.split('\n')
			.filter_map(|line| {
				let (key, value) = line.split_once('=')?;
				Some((key.trim(), value.trim().trim_matches('"')))
			})
	}

	/// Get value by key.
	pub fn value<'a>(&'a self, key: &str) -> Option<&'a str> {
		self.values()
			.find_map(|(k, v)| (k == key).then(|| v))
	}

	/// Returns the human readable os name.
	pub fn pretty_name<'a>(&'a self) -> Option<&'a str> {
		self.value("PRETTY_NAME")
	}

}

/// Read the kernel version from /proc/version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
	raw: String
}

impl Kernel {

	fn path() -> &'static Path {
		Path::new("/proc/version")
	}

	#[cfg(test)]
	fn from_string(raw: String) -> Self {
		Self {raw}
	}

	/// Read the kernel version from /proc/version.
	pub fn read() -> io::Result<Self> {
		Self::read_from(Self::path())
	}

	/// Read the kernel version from another location.
	pub fn read_from(path: &Path) -> io::Result<Self> {
		Ok(Self {
			raw: fs::read_to_string(path)?
		})
	}

	/// Returns the kernel release, the third token of the version line.
	pub fn release<'a>(&'a self) -> Option<&'a str> {
		self.raw.split_whitespace().nth(2)
	}

}

/// Read the system uptime from /proc/uptime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uptime {
	raw: String
}

impl Uptime {

	fn path() -> &'static Path {
		Path::new("/proc/uptime")
	}

	#[cfg(test)]
	fn from_string(raw: String) -> Self {
		Self {raw}
	}

	/// Read the uptime from /proc/uptime.
	pub fn read() -> io::Result<Self> {
		Self::read_from(Self::path())
	}

	/// Read the uptime from another location.
	pub fn read_from(path: &Path) -> io::Result<Self> {
		Ok(Self {
			raw: fs::read_to_string(path)?
		})
	}

	fn all_values<'a>(&'a self) -> impl Iterator<Item=f64> + 'a {
		self.raw.split(' ')
			.filter_map(|v| v.trim().parse().ok())
	}

	/// Get the system uptime.
	pub fn uptime(&self) -> Option<Duration> {
		self.all_values().next()
			.map(Duration::from_secs_f64)
	}

	/// Get the system uptime in whole seconds, rounded to the nearest.
	pub fn seconds(&self) -> Option<u64> {
		self.all_values().next()
			.map(|secs| secs.round() as u64)
	}

	/// Get the sum of how much time each core has spent idle.
	/// Should be idletime / cores to get the real idle time.
	pub fn idletime(&self) -> Option<Duration> {
		self.all_values().nth(1)
			.map(Duration::from_secs_f64)
	}

}


#[cfg(test)]
mod tests {
	use super::*;

	fn os_release() -> OsRelease {
		OsRelease::from_string("\
NAME=\"Ubuntu\"
VERSION=\"20.04.1 LTS (Focal Fossa)\"
ID=ubuntu
ID_LIKE=debian
PRETTY_NAME=\"Ubuntu 20.04.1 LTS\"
VERSION_ID=\"20.04\"
HOME_URL=\"https://www.ubuntu.com/\"
VERSION_CODENAME=focal\
		".into())
	}

	#[test]
	fn pretty_name() {
		let os = os_release();
		assert_eq!(os.pretty_name().unwrap(), "Ubuntu 20.04.1 LTS");
	}

	#[test]
	fn unquoted_value() {
		let os = os_release();
		assert_eq!(os.value("ID").unwrap(), "ubuntu");
		assert!(os.value("MISSING").is_none());
	}

	#[test]
	fn kernel_release() {
		let kernel = Kernel::from_string(
			"Linux version 5.4.0-42-generic (buildd@lgw01-amd64-038) \
			(gcc version 9.3.0) #46-Ubuntu SMP Fri Jul 10 00:24:02 UTC 2020\n".into()
		);
		assert_eq!(kernel.release().unwrap(), "5.4.0-42-generic");
	}

	#[test]
	fn kernel_short_line() {
		let kernel = Kernel::from_string("Linux version\n".into());
		assert!(kernel.release().is_none());
	}

	fn uptime() -> Uptime {
		Uptime::from_string("220420.83 5275548.45\n".into())
	}

	#[test]
	fn uptime_values() {
		assert_eq!(uptime().uptime().unwrap().as_secs(), 220420);
		assert_eq!(uptime().idletime().unwrap().as_secs(), 5275548);
	}

	#[test]
	fn uptime_rounds() {
		// .83 rounds up
		assert_eq!(uptime().seconds().unwrap(), 220421);
	}

	#[test]
	fn uptime_malformed() {
		let up = Uptime::from_string("no numbers here\n".into());
		assert!(up.seconds().is_none());
	}

}
