//!
//! Query every metric through one set of configured paths.
//!
//! [`Metrics`] only stores where the records live, every call opens
//! them fresh and drops its handles before returning. No state is
//! shared between calls, so a caller may poll from several threads
//! without any coordination.
//!
//! ```
//! use linux_metrics::metrics::Metrics;
//! let metrics = Metrics::new();
//! if let Some(used) = metrics.memory_utilization() {
//! 	assert!(used >= 0.0 && used <= 1.0);
//! }
//! ```

use crate::cpu::{self, Stat};
use crate::memory::Memory;
use crate::process;
use crate::system::{Kernel, OsRelease, Uptime};
use crate::users::Users;
use crate::util::clock_ticks;

use std::io;
use std::path::PathBuf;

use tracing::{debug, warn};

/// The locations of every record this crate reads. Immutable once
/// created, tests hand it a fixture tree instead of the real /proc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
	proc_root: PathBuf,
	passwd_path: PathBuf,
	os_release_path: PathBuf
}

impl Metrics {

	/// Metrics from the usual locations, /proc and /etc.
	pub fn new() -> Self {
		Self::at("/proc", "/etc/passwd", "/etc/os-release")
	}

	/// Metrics from explicit locations.
	pub fn at(
		proc_root: impl Into<PathBuf>,
		passwd_path: impl Into<PathBuf>,
		os_release_path: impl Into<PathBuf>
	) -> Self {
		Self {
			proc_root: proc_root.into(),
			passwd_path: passwd_path.into(),
			os_release_path: os_release_path.into()
		}
	}

	fn proc_path(&self, name: &str) -> PathBuf {
		self.proc_root.join(name)
	}

	// a vanished process is an expected race, not an error
	fn pid_record<T>(&self, record: io::Result<T>, pid: u32) -> Option<T> {
		match record {
			Ok(record) => Some(record),
			Err(_) => {
				debug!(pid, "process record vanished");
				None
			}
		}
	}

	/// The human readable os name.
	///
	/// Returns `None` if the record is unreadable or carries no
	/// `PRETTY_NAME`.
	pub fn operating_system(&self) -> Option<String> {
		OsRelease::read_from(&self.os_release_path).ok()?
			.pretty_name()
			.map(str::to_string)
	}

	/// The kernel release.
	pub fn kernel(&self) -> Option<String> {
		Kernel::read_from(&self.proc_path("version")).ok()?
			.release()
			.map(str::to_string)
	}

	/// The process ids present right now.
	pub fn pids(&self) -> io::Result<Vec<u32>> {
		process::pids_in(&self.proc_root)
	}

	/// The used fraction of physical memory, in `[0, 1]`.
	pub fn memory_utilization(&self) -> Option<f64> {
		let memory = Memory::read_from(&self.proc_path("meminfo")).ok()?;
		let used = memory.utilization();
		if used.is_none() {
			warn!("meminfo misses MemTotal or MemFree");
		}
		used
	}

	/// The system uptime in whole seconds.
	pub fn uptime(&self) -> Option<u64> {
		Uptime::read_from(&self.proc_path("uptime")).ok()?
			.seconds()
	}

	/// One sample of the aggregate cpu counters.
	///
	/// Keep the sample around and compare it against a later one to
	/// get the utilization, see [`cpu_utilization`].
	///
	/// [`cpu_utilization`]: Self::cpu_utilization
	pub fn cpu_times(&self) -> Option<cpu::Times> {
		let stat = Stat::read_from(&self.proc_path("stat")).ok()?;
		let times = stat.times();
		if times.is_none() {
			warn!("stat record misses the aggregate cpu line");
		}
		times
	}

	/// The fraction of cpu ticks spent active since an earlier
	/// sample taken with [`cpu_times`], at least one scheduler tick
	/// ago.
	///
	/// [`cpu_times`]: Self::cpu_times
	pub fn cpu_utilization(&self, earlier: &cpu::Times) -> Option<f64> {
		self.cpu_times()?.utilization_since(earlier)
	}

	/// How many processes were created since boot.
	pub fn total_processes(&self) -> Option<u64> {
		Stat::read_from(&self.proc_path("stat")).ok()?
			.total_processes()
	}

	/// How many processes are runnable right now.
	pub fn running_processes(&self) -> Option<u64> {
		Stat::read_from(&self.proc_path("stat")).ok()?
			.running_processes()
	}

	/// The executable a process was started with.
	///
	/// Returns `None` once the process exited or when the record is
	/// empty, as it is for kernel threads.
	pub fn command(&self, pid: u32) -> Option<String> {
		self.pid_record(process::Cmdline::read_in(&self.proc_root, pid), pid)?
			.first()
			.map(str::to_string)
	}

	/// The mapped memory of a process in whole decimal megabytes.
	///
	/// Defaults to 0 when the process exited or its record carries
	/// no `VmSize`, a vanished process must not abort a whole
	/// refresh cycle.
	pub fn ram_mb(&self, pid: u32) -> u64 {
		self.pid_record(process::Status::read_in(&self.proc_root, pid), pid)
			.and_then(|status| status.ram_mb())
			.unwrap_or(0)
	}

	/// The real uid owning a process.
	pub fn uid(&self, pid: u32) -> Option<u32> {
		self.pid_record(process::Status::read_in(&self.proc_root, pid), pid)?
			.uid()
	}

	/// The username owning a process, the uid resolved through the
	/// identity table.
	///
	/// Returns `None` if the uid matches no entry.
	pub fn user(&self, pid: u32) -> Option<String> {
		let uid = self.uid(pid)?;
		Users::read_from(&self.passwd_path).ok()?
			.name_by_uid(uid)
			.map(str::to_string)
	}

	/// All ticks a process spent on a cpu since it started.
	pub fn active_ticks(&self, pid: u32) -> Option<u64> {
		self.pid_record(process::Stat::read_in(&self.proc_root, pid), pid)?
			.active_ticks()
	}

	/// Seconds a process has been alive.
	pub fn process_uptime(&self, pid: u32) -> Option<u64> {
		let stat = self.pid_record(process::Stat::read_in(&self.proc_root, pid), pid)?;
		let uptime = Uptime::read_from(&self.proc_path("uptime")).ok()?;
		let age = stat.age_secs(uptime.uptime()?.as_secs_f64(), clock_ticks())?;
		Some(age as u64)
	}

	/// The fraction of one cpu a process used over its lifetime.
	///
	/// Returns `None` for a process so young that no wall time
	/// elapsed yet, never NaN or infinity.
	pub fn process_cpu_utilization(&self, pid: u32) -> Option<f64> {
		let stat = self.pid_record(process::Stat::read_in(&self.proc_root, pid), pid)?;
		let uptime = Uptime::read_from(&self.proc_path("uptime")).ok()?;
		stat.cpu_utilization(uptime.uptime()?.as_secs_f64(), clock_ticks())
	}

}

impl Default for Metrics {
	fn default() -> Self {
		Self::new()
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	use std::fs;
	use std::path::Path;

	use tempfile::TempDir;

	fn write(path: &Path, content: &str) {
		fs::write(path, content).unwrap();
	}

	// a proc tree with one fully populated process (pid 1), one
	// half gone process (pid 33, directory without records) and a
	// few entries that are no processes at all
	fn fixture() -> (TempDir, Metrics) {
		let dir = tempfile::tempdir().unwrap();
		let proc = dir.path().join("proc");
		fs::create_dir(&proc).unwrap();

		write(&proc.join("version"),
			"Linux version 5.4.0-42-generic (buildd@lgw01) (gcc 9.3.0) #46-Ubuntu SMP\n");
		write(&proc.join("uptime"), "450.00 900.00\n");
		write(&proc.join("meminfo"),
			"MemTotal:       8000 kB\nMemFree:        2000 kB\nMemAvailable:   4000 kB\n");
		write(&proc.join("stat"), "\
cpu  100 0 100 700 100 0 0 0 0 0
cpu0 100 0 100 700 100 0 0 0 0 0
ctxt 500
btime 1700000000
processes 42
procs_running 2
procs_blocked 0
");

		for name in ["1", "2", "33", "self", "abc"] {
			fs::create_dir(proc.join(name)).unwrap();
		}
		write(&proc.join("1").join("stat"),
			"1 (init) S 0 1 1 0 -1 4194304 0 0 0 0 2000 1500 500 500 20 0 1 0 0 10000000 500\n");
		write(&proc.join("1").join("status"),
			"Name:\tinit\nPid:\t1\nUid:\t1000\t1000\t1000\t1000\nVmSize:\t  204800 kB\n");
		write(&proc.join("1").join("cmdline"), "/sbin/init\0splash\0");
		write(&proc.join("2").join("status"), "Name:\tkthreadd\nPid:\t2\nUid:\t0\t0\t0\t0\n");

		let passwd = dir.path().join("passwd");
		write(&passwd, "root:x:0:0:root:/root:/bin/bash\nalice:x:1000:1000::/home/alice:/bin/bash\n");
		let os_release = dir.path().join("os-release");
		write(&os_release, "NAME=\"Ubuntu\"\nPRETTY_NAME=\"Ubuntu 20.04.1 LTS\"\n");

		let metrics = Metrics::at(&proc, &passwd, &os_release);
		(dir, metrics)
	}

	#[test]
	fn system_identity() {
		let (_dir, metrics) = fixture();
		assert_eq!(metrics.operating_system().unwrap(), "Ubuntu 20.04.1 LTS");
		assert_eq!(metrics.kernel().unwrap(), "5.4.0-42-generic");
	}

	#[test]
	fn digit_directories_are_pids() {
		let (_dir, metrics) = fixture();
		let mut pids = metrics.pids().unwrap();
		pids.sort();
		assert_eq!(pids, [1, 2, 33]);
	}

	#[test]
	fn system_metrics() {
		let (_dir, metrics) = fixture();
		assert_eq!(metrics.uptime().unwrap(), 450);
		let used = metrics.memory_utilization().unwrap();
		assert!((used - 0.75).abs() < 1e-9);
		assert_eq!(metrics.total_processes().unwrap(), 42);
		assert_eq!(metrics.running_processes().unwrap(), 2);
	}

	#[test]
	fn cpu_utilization_between_samples() {
		let (dir, metrics) = fixture();
		let earlier = metrics.cpu_times().unwrap();
		assert_eq!(earlier.total_ticks(), 1000);

		// 30 more active ticks, 70 more idle
		write(&dir.path().join("proc").join("stat"),
			"cpu  120 0 110 770 100 0 0 0 0 0\n");
		let usage = metrics.cpu_utilization(&earlier).unwrap();
		assert!((usage - 0.3).abs() < 1e-9);
	}

	#[test]
	fn per_process_metrics() {
		let (_dir, metrics) = fixture();
		assert_eq!(metrics.command(1).unwrap(), "/sbin/init");
		assert_eq!(metrics.ram_mb(1), 204);
		assert_eq!(metrics.uid(1).unwrap(), 1000);
		assert_eq!(metrics.user(1).unwrap(), "alice");
		assert_eq!(metrics.active_ticks(1).unwrap(), 4500);
		// started at tick 0, so its age is the system uptime
		assert_eq!(metrics.process_uptime(1).unwrap(), 450);
		let usage = metrics.process_cpu_utilization(1).unwrap();
		assert!(usage > 0.0 && usage.is_finite());
	}

	#[test]
	fn vanished_process_is_unavailable_not_fatal() {
		let (_dir, metrics) = fixture();
		// pid 33 was listed but its records are already gone
		assert!(metrics.command(33).is_none());
		assert_eq!(metrics.ram_mb(33), 0);
		assert!(metrics.uid(33).is_none());
		assert!(metrics.user(33).is_none());
		assert!(metrics.active_ticks(33).is_none());
		assert!(metrics.process_uptime(33).is_none());
		assert!(metrics.process_cpu_utilization(33).is_none());
		// and the other pids still answer
		assert_eq!(metrics.ram_mb(1), 204);
	}

	#[test]
	fn kernel_thread_without_vm_size() {
		let (_dir, metrics) = fixture();
		assert_eq!(metrics.ram_mb(2), 0);
		assert_eq!(metrics.user(2).unwrap(), "root");
	}

}
