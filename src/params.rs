use std::{
	fmt,
	num::ParseIntError,
	path::{Path, PathBuf},
	str::FromStr,
};

use serde::de::{self, Deserialize, Deserializer, Visitor};

use crate::consts::*;

#[derive(Debug, Clone)]
pub struct Params {
	/// File containing one function prototype per line
	pub prototypes: PathBuf,

	/// Port of the first prototype
	pub port_base: PortNumber,

	/// Prefix of every generated port name
	pub port_prefix: String,

	/// Type name of the generated port enum
	pub enum_name: String,

	/// Destinations of the generated artifacts
	pub output: OutputPaths,
}

impl Default for Params {
	fn default() -> Self {
		Self {
			prototypes: PROTOTYPES_PATH.into(),
			port_base: Default::default(),
			port_prefix: PORT_PREFIX.to_string(),
			enum_name: PORT_ENUM_NAME.to_string(),
			output: Default::default(),
		}
	}
}

/// A 16 bit I/O port number the guest sends to in order to trap into the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortNumber(u16);

impl PortNumber {
	pub const fn new(port: u16) -> Self {
		Self(port)
	}

	pub fn get(self) -> u16 {
		self.0
	}

	/// Returns the port `offset` positions after `self`, if it is still a valid port.
	pub fn checked_offset(self, offset: usize) -> Option<Self> {
		let offset = u16::try_from(offset).ok()?;
		self.0.checked_add(offset).map(Self)
	}
}

impl Default for PortNumber {
	fn default() -> Self {
		Self(PORT_NUMBER_START)
	}
}

impl fmt::Display for PortNumber {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{:X}", self.0)
	}
}

impl FromStr for PortNumber {
	type Err = ParseIntError;

	/// Accepts `0x`-prefixed hexadecimal as well as decimal numbers.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		let port = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
			Some(hex) => u16::from_str_radix(hex, 16)?,
			None => s.parse()?,
		};
		Ok(Self(port))
	}
}

impl<'de> Deserialize<'de> for PortNumber {
	/// Takes either a TOML integer (`0x510`, `1296`) or a string (`'0x510'`).
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct PortVisitor;

		impl Visitor<'_> for PortVisitor {
			type Value = PortNumber;

			fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
				formatter.write_str("a 16 bit port number or a string containing one")
			}

			fn visit_i64<E: de::Error>(self, v: i64) -> Result<PortNumber, E> {
				u16::try_from(v)
					.map(PortNumber)
					.map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
			}

			fn visit_u64<E: de::Error>(self, v: u64) -> Result<PortNumber, E> {
				u16::try_from(v)
					.map(PortNumber)
					.map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
			}

			fn visit_str<E: de::Error>(self, v: &str) -> Result<PortNumber, E> {
				PortNumber::from_str(v).map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
			}
		}

		deserializer.deserialize_any(PortVisitor)
	}
}

/// File locations of the generated artifacts.
///
/// Every file name is relative to `dir` unless it is absolute.
#[derive(Debug, Clone)]
pub struct OutputPaths {
	pub dir: PathBuf,
	pub kernel_ibv: PathBuf,
	pub host_functions: PathBuf,
	pub port_enum: PathBuf,
	pub port_macros: PathBuf,
	pub structs: PathBuf,
	pub dispatch_cases: PathBuf,
}

impl OutputPaths {
	/// Default file names placed into `dir`.
	pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
		Self {
			dir: dir.into(),
			..Default::default()
		}
	}

	pub fn resolve(&self, file: &Path) -> PathBuf {
		self.dir.join(file)
	}
}

impl Default for OutputPaths {
	fn default() -> Self {
		Self {
			dir: PathBuf::from("."),
			kernel_ibv: IBV_GEN_PATH.into(),
			host_functions: UHYVE_HOST_FCNS_GEN_PATH.into(),
			port_enum: UHYVE_IBV_HEADER_GEN_PATH.into(),
			port_macros: INCLUDE_STDDEF_GEN_PATH.into(),
			structs: UHYVE_IBV_HEADER_STRUCTS_GEN_PATH.into(),
			dispatch_cases: UHYVE_CASES_GEN_PATH.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_port_number_from_str() {
		assert_eq!(PortNumber::from_str("0x510").unwrap(), PortNumber::new(0x510));
		assert_eq!(PortNumber::from_str("0X5ff").unwrap(), PortNumber::new(0x5ff));
		assert_eq!(PortNumber::from_str("1296").unwrap(), PortNumber::new(0x510));
		assert!(PortNumber::from_str("0x10000").is_err());
		assert!(PortNumber::from_str("port").is_err());
	}

	#[test]
	fn test_port_number_display() {
		assert_eq!(PortNumber::new(0x5ab).to_string(), "0x5AB");
		assert_eq!(PortNumber::default().to_string(), "0x510");
	}

	#[test]
	fn test_port_number_offset() {
		let base = PortNumber::new(0xfffe);
		assert_eq!(base.checked_offset(1), Some(PortNumber::new(0xffff)));
		assert_eq!(base.checked_offset(2), None);
		assert_eq!(base.checked_offset(usize::MAX), None);
	}

	#[test]
	fn test_output_paths_resolve() {
		let paths = OutputPaths::in_dir("/tmp/gen");
		assert_eq!(
			paths.resolve(&paths.port_macros),
			PathBuf::from("/tmp/gen/GEN-include-hermit-stddef.h")
		);
		assert_eq!(
			paths.resolve(Path::new("/abs/file.c")),
			PathBuf::from("/abs/file.c")
		);
	}
}
