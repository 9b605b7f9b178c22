//! Assignment of I/O ports to functions.
//!
//! Ports are handed out densely in input order starting at a base port, so a
//! function's port only depends on its position in the prototype file.
//! Appending prototypes keeps every existing port; inserting, removing or
//! reordering earlier lines shifts all ports after that point.

use std::fmt;

use crate::{
	error::{GeneratorError, Result},
	params::PortNumber,
};

/// `UHYVE_PORT_` + upper-cased function name.
pub fn port_name(prefix: &str, function: &str) -> String {
	format!("{prefix}{}", function.to_uppercase())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
	pub function: String,
	pub name: String,
	pub number: PortNumber,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelAssignment {
	ports: Vec<Port>,
}

impl ChannelAssignment {
	pub fn new<'a>(
		functions: impl IntoIterator<Item = &'a str>,
		base: PortNumber,
		prefix: &str,
	) -> Result<Self> {
		let functions = functions.into_iter().collect::<Vec<_>>();
		let count = functions.len();
		let ports = functions
			.into_iter()
			.enumerate()
			.map(|(idx, function)| -> Result<Port> {
				let number = base
					.checked_offset(idx)
					.ok_or(GeneratorError::PortOverflow { base, count })?;
				trace!("{function} -> {number}");
				Ok(Port {
					function: function.to_string(),
					name: port_name(prefix, function),
					number,
				})
			})
			.collect::<Result<Vec<_>>>()?;
		Ok(Self { ports })
	}

	pub fn get(&self, function: &str) -> Option<&Port> {
		self.ports.iter().find(|port| port.function == function)
	}

	pub fn iter(&self) -> impl Iterator<Item = &Port> {
		self.ports.iter()
	}

	pub fn len(&self) -> usize {
		self.ports.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ports.is_empty()
	}

	/// The `typedef enum` form of the assignment.
	pub fn port_enum<'a>(&'a self, enum_name: &'a str) -> PortEnum<'a> {
		PortEnum {
			ports: self,
			enum_name,
		}
	}

	/// The `#define` form of the assignment.
	pub fn port_macros(&self) -> PortMacros<'_> {
		PortMacros { ports: self }
	}
}

pub struct PortEnum<'a> {
	ports: &'a ChannelAssignment,
	enum_name: &'a str,
}

impl fmt::Display for PortEnum<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "typedef enum {{")?;
		for port in self.ports.iter() {
			writeln!(f, "\t{} = {},", port.name, port.number)?;
		}
		writeln!(f, "}} {};", self.enum_name)
	}
}

pub struct PortMacros<'a> {
	ports: &'a ChannelAssignment,
}

impl fmt::Display for PortMacros<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for port in self.ports.iter() {
			writeln!(f, "#define {} {}", port.name, port.number)?;
		}
		Ok(())
	}
}
