
use std::str::FromStr;
use std::fmt;

use byte_parser::{StrParser, ParseIterator};

/// A memory amount as /proc reports it, for example `204800 kB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
	feature = "serde",
	derive(serde1::Serialize, serde1::Deserialize),
	serde(crate = "serde1")
)]
pub struct Size {
	kb: u64
}

impl Size {

	/// Creates a size from a kilobyte count.
	pub fn from_kb(kb: u64) -> Self {
		Self {kb}
	}

	/// The size in kilobytes.
	pub fn kb(&self) -> u64 {
		self.kb
	}

	/// The size in whole megabytes.
	/// Uses the decimal convention (1 mB == 1000 kB) and truncates.
	pub fn mb(&self) -> u64 {
		self.kb / 1000
	}

}

impl FromStr for Size {
	type Err = ();
	fn from_str(s: &str) -> Result<Self, ()> {
		let mut iter = StrParser::new(s.trim());
		let kb = parse_u64(&mut iter)
			.ok_or(())?;
		// the records read here only ever carry a kB unit
		// some (HugePages counts) carry none
		let unit = iter.record().consume_to_str().trim();
		match unit {
			"kB" | "kb" | "" => Ok(Self {kb}),
			_ => Err(())
		}
	}
}

impl fmt::Display for Size {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} kB", self.kb)
	}
}

// parses the leading digits of a slice
// Panics if Iterator contains not valid utf8
fn parse_u64<'s, I>(iter: &mut I) -> Option<u64>
where I: ParseIterator<'s> {

	let mut iter = iter.record();

	iter.while_byte_fn(u8::is_ascii_digit)
		.consume_at_least(1)
		.ok()?;

	iter.to_str()
		.parse().ok()
}

/// Kernel clock ticks per second, as reported by `sysconf(_SC_CLK_TCK)`.
/// Falls back to 100 if the platform reports nothing usable.
pub fn clock_ticks() -> u64 {
	let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
	if ticks > 0 {
		ticks as u64
	} else {
		100
	}
}
