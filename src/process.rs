//!
//! Enumerate processes and read per process records.
//! The data is retrieved from `/proc/<pid>/stat`,
//! `/proc/<pid>/status` and `/proc/<pid>/cmdline`.
//!
//! A process can exit between being listed and its record being
//! opened. Every read returns the io error and every accessor an
//! `Option`, so a vanished process stays local to that one query and
//! never poisons the rest of a refresh cycle.

use crate::unit::Size;

use std::path::{Path, PathBuf};
use std::{fs, io};

/// Lists the process ids currently present under /proc.
pub fn pids() -> io::Result<Vec<u32>> {
	pids_in(Path::new("/proc"))
}

/// Lists the process ids under another proc root.
///
/// Only directories whose name consists entirely of decimal digits
/// count. The result is valid only at the instant of the call, any
/// pid may be gone by the time its records are opened.
pub fn pids_in(root: &Path) -> io::Result<Vec<u32>> {
	let mut pids = vec![];
	for entry in fs::read_dir(root)? {
		let entry = match entry {
			Ok(entry) => entry,
			Err(_) => continue
		};
		let is_dir = entry.file_type()
			.map(|t| t.is_dir())
			.unwrap_or(false);
		if !is_dir {
			continue;
		}
		let name = entry.file_name();
		let pid = name.to_str()
			.filter(|n| {
				!n.is_empty() &&
				n.bytes().all(|b| b.is_ascii_digit())
			})
			.and_then(|n| n.parse().ok());
		if let Some(pid) = pid {
			pids.push(pid);
		}
	}
	Ok(pids)
}

/// One read of a process stat record, `/proc/<pid>/stat`.
///
/// The record is positional, but the command field can contain
/// spaces and parentheses, so the numeric fields are tokenized only
/// after the last closing parenthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
	raw: String
}

impl Stat {

	fn path(root: &Path, pid: u32) -> PathBuf {
		root.join(pid.to_string()).join("stat")
	}

	#[cfg(test)]
	fn from_string(raw: String) -> Self {
		Self {raw}
	}

	/// Read the stat record of a process.
	pub fn read(pid: u32) -> io::Result<Self> {
		Self::read_in(Path::new("/proc"), pid)
	}

	/// Read the stat record of a process under another proc root.
	pub fn read_in(root: &Path, pid: u32) -> io::Result<Self> {
		Ok(Self {
			raw: fs::read_to_string(Self::path(root, pid))?
		})
	}

	/// The command name, the field between the parentheses.
	pub fn comm<'a>(&'a self) -> Option<&'a str> {
		let start = self.raw.find('(')?;
		let end = self.raw.rfind(')')?;
		(end > start).then(|| &self.raw[start + 1..end])
	}

	fn fields_after_comm<'a>(&'a self) -> impl Iterator<Item=&'a str> {
		let rest = self.raw.rfind(')')
			.map(|end| &self.raw[end + 1..])
			.unwrap_or("");
		rest.split_whitespace()
	}

	// stat fields keep their traditional 1 based numbering, the
	// first field after the comm is field 3, the state
	fn field<'a>(&'a self, nr: usize) -> Option<&'a str> {
		self.fields_after_comm().nth(nr - 3)
	}

	fn numeric_field(&self, nr: usize) -> Option<u64> {
		self.field(nr)?
			.parse().ok()
	}

	/// The process state, for example `R`, `S` or `Z`.
	pub fn state(&self) -> Option<char> {
		self.field(3)?.chars().next()
	}

	/// Ticks spent in user mode, field 14.
	pub fn utime(&self) -> Option<u64> {
		self.numeric_field(14)
	}

	/// Ticks spent in kernel mode, field 15.
	pub fn stime(&self) -> Option<u64> {
		self.numeric_field(15)
	}

	/// Ticks reaped children spent in user mode, field 16.
	pub fn cutime(&self) -> Option<u64> {
		self.numeric_field(16)
	}

	/// Ticks reaped children spent in kernel mode, field 17.
	pub fn cstime(&self) -> Option<u64> {
		self.numeric_field(17)
	}

	/// All ticks this process spent on a cpu since it started, its
	/// own user and kernel time plus that of its reaped children.
	///
	/// Returns `None` if the record is too short or a field fails to
	/// parse.
	pub fn active_ticks(&self) -> Option<u64> {
		Some(self.utime()? + self.stime()? + self.cutime()? + self.cstime()?)
	}

	/// When the process started, in ticks after boot, field 22.
	pub fn starttime(&self) -> Option<u64> {
		self.numeric_field(22)
	}

	/// Seconds this process has been alive, relative to the system
	/// uptime the caller sampled.
	///
	/// Returns `None` if the start time is missing or lies after the
	/// given uptime.
	pub fn age_secs(&self, system_uptime: f64, ticks_per_sec: u64) -> Option<f64> {
		if ticks_per_sec == 0 {
			return None;
		}
		let started = self.starttime()? as f64 / ticks_per_sec as f64;
		let age = system_uptime - started;
		(age >= 0.0).then(|| age)
	}

	/// The fraction of one cpu this process used over its lifetime,
	/// active ticks normalized by the wall time since it started.
	///
	/// Returns `None` for a process so young that no wall time
	/// elapsed yet, never NaN or infinity.
	pub fn cpu_utilization(&self, system_uptime: f64, ticks_per_sec: u64) -> Option<f64> {
		let age = self.age_secs(system_uptime, ticks_per_sec)?;
		if age <= 0.0 {
			return None;
		}
		let active_secs = self.active_ticks()? as f64 / ticks_per_sec as f64;
		Some(active_secs / age)
	}

}

/// One read of a process status record, `/proc/<pid>/status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
	raw: String
}

impl Status {

	fn path(root: &Path, pid: u32) -> PathBuf {
		root.join(pid.to_string()).join("status")
	}

	#[cfg(test)]
	fn from_string(raw: String) -> Self {
		Self {raw}
	}

	/// Read the status record of a process.
	pub fn read(pid: u32) -> io::Result<Self> {
		Self::read_in(Path::new("/proc"), pid)
	}

	/// Read the status record of a process under another proc root.
	pub fn read_in(root: &Path, pid: u32) -> io::Result<Self> {
		Ok(Self {
			raw: fs::read_to_string(Self::path(root, pid))?
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

	/// Get value by key.
	pub fn value<'a>(&'a self, key: &str) -> Option<&'a str> {
		self.values()
			.find_map(|(k, v)| (k == key).then(|| v))
	}

	/// The mapped virtual memory size, the `VmSize` line.
	///
	/// Kernel threads carry no `VmSize` at all.
	pub fn vm_size(&self) -> Option<Size> {
		self.value("VmSize")?
			.parse().ok()
	}

	/// The mapped memory in whole decimal megabytes (kB / 1000).
	pub fn ram_mb(&self) -> Option<u64> {
		self.vm_size().map(|size| size.mb())
	}

	/// The real uid owning the process, the first id of the `Uid`
	/// line.
	pub fn uid(&self) -> Option<u32> {
		self.value("Uid")?
			.split_whitespace().next()?
			.parse().ok()
	}

}

/// One read of a process command line, `/proc/<pid>/cmdline`.
///
/// The record is the argv blob, nul separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmdline {
	raw: String
}

impl Cmdline {

	fn path(root: &Path, pid: u32) -> PathBuf {
		root.join(pid.to_string()).join("cmdline")
	}

	#[cfg(test)]
	fn from_string(raw: String) -> Self {
		Self {raw}
	}

	/// Read the command line of a process.
	pub fn read(pid: u32) -> io::Result<Self> {
		Self::read_in(Path::new("/proc"), pid)
	}

	/// Read the command line of a process under another proc root.
	pub fn read_in(root: &Path, pid: u32) -> io::Result<Self> {
		Ok(Self {
			raw: fs::read_to_string(Self::path(root, pid))?
		})
	}

	/// All arguments.
	pub fn args<'a>(&'a self) -> impl Iterator<Item=&'a str> {
		self.raw.split('\0')
			.filter(|arg| !arg.is_empty())
	}

	/// The first token of the command line, usually the executable.
	///
	/// Everything after the first nul or whitespace is cut off, a
	/// caller that needs the full command line should use [`args`].
	///
	/// [`args`]: Self::args
	pub fn first<'a>(&'a self) -> Option<&'a str> {
		self.raw.split(|c: char| c == '\0' || c.is_whitespace())
			.find(|token| !token.is_empty())
	}

}
