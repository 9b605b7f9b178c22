//! Parsing of C function prototypes.
//!
//! The accepted grammar is deliberately small:
//! `<return type> <name>(<param type> <param name>, ...)`. Types are kept as
//! the verbatim token sequence of the input, joined by single spaces.

use std::{fmt, str::FromStr};

use crate::{
	consts::{RESERVED_FUNCTION_NAMES, RESERVED_PARAM_NAMES},
	error::ParseErrorKind,
};

/// How a value of a given C type crosses the guest/host boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape {
	/// Copied by value.
	Value,
	/// Passed by (translated) address.
	Pointer,
	/// `**` or deeper. Never marshalled automatically.
	DoublePointer,
}

impl TypeShape {
	pub fn classify(ty: &str) -> Self {
		match ty.matches('*').count() {
			0 => Self::Value,
			1 => Self::Pointer,
			_ => Self::DoublePointer,
		}
	}
}

/// Shape of a function's return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
	Void,
	Value,
	Pointer,
	DoublePointer,
}

impl ReturnShape {
	pub fn classify(ty: &str) -> Self {
		if ty == "void" {
			return Self::Void;
		}
		match TypeShape::classify(ty) {
			TypeShape::Value => Self::Value,
			TypeShape::Pointer => Self::Pointer,
			TypeShape::DoublePointer => Self::DoublePointer,
		}
	}
}

/// Strips the outermost `*` of a pointer type: `struct ibv_mr *` becomes `struct ibv_mr`.
pub fn pointee(ty: &str) -> &str {
	match ty.rfind('*') {
		Some(idx) => ty[..idx].trim_end(),
		None => ty,
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
	pub ty: String,
	pub name: String,
}

impl Parameter {
	pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			ty: ty.into(),
			name: name.into(),
		}
	}

	pub fn shape(&self) -> TypeShape {
		TypeShape::classify(&self.ty)
	}
}

impl fmt::Display for Parameter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.ty, self.name)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
	pub ret: String,
	pub name: String,
	pub params: Vec<Parameter>,
}

impl FunctionSignature {
	pub fn ret_shape(&self) -> ReturnShape {
		ReturnShape::classify(&self.ret)
	}

	pub fn returns_void(&self) -> bool {
		self.ret_shape() == ReturnShape::Void
	}

	/// Name of the marshalling record type shared by guest and host.
	pub fn record_name(&self) -> String {
		format!("uhyve_{}_t", self.name)
	}

	/// Name of the host function handling this prototype's port.
	pub fn dispatcher_name(&self) -> String {
		format!("call_{}", self.name)
	}

	/// Comma separated parameter list as written in a C prototype.
	pub fn param_list(&self) -> String {
		if self.params.is_empty() {
			return "void".to_string();
		}
		self.params
			.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join(", ")
	}
}

impl fmt::Display for FunctionSignature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}({})", self.ret, self.name, self.param_list())
	}
}

impl FromStr for FunctionSignature {
	type Err = ParseErrorKind;

	fn from_str(line: &str) -> Result<Self, Self::Err> {
		let line = line.trim();
		let (head, rest) = line
			.split_once('(')
			.ok_or(ParseErrorKind::MissingOpenParen)?;
		let params = rest
			.strip_suffix(')')
			.ok_or(ParseErrorKind::MissingCloseParen)?;
		if head.contains(')') || params.contains(['(', ')']) {
			return Err(ParseErrorKind::UnexpectedParen);
		}

		let (ret, name) = split_declaration(head).ok_or(ParseErrorKind::MissingReturnType)?;
		check_identifier(&name)?;
		check_unreserved(&name, &RESERVED_FUNCTION_NAMES)?;

		Ok(Self {
			ret,
			name,
			params: parse_params(params)?,
		})
	}
}

fn parse_params(params: &str) -> Result<Vec<Parameter>, ParseErrorKind> {
	let params = params.trim();
	if params.is_empty() || params == "void" {
		return Ok(Vec::new());
	}

	params
		.split(',')
		.map(|param| {
			if param.trim().is_empty() {
				return Err(ParseErrorKind::EmptyParameter);
			}
			let (ty, name) =
				split_declaration(param).ok_or(ParseErrorKind::MissingParameterName)?;
			check_identifier(&name)?;
			check_unreserved(&name, &RESERVED_PARAM_NAMES)?;
			Ok(Parameter { ty, name })
		})
		.collect()
}

/// Splits `<type> <name>` at the last whitespace.
///
/// Stars glued to the front of the name (`char *buf`) belong to the type.
/// Returns `None` if there is no type in front of the name.
fn split_declaration(decl: &str) -> Option<(String, String)> {
	let tokens = decl.split_whitespace().collect::<Vec<_>>();
	let (&last, type_tokens) = tokens.split_last()?;

	let name = last.trim_start_matches('*');
	let stars = &last[..last.len() - name.len()];

	let mut ty = type_tokens.join(" ");
	if !stars.is_empty() {
		if !ty.is_empty() {
			ty.push(' ');
		}
		ty.push_str(stars);
	}
	if type_tokens.is_empty() {
		return None;
	}

	Some((ty, name.to_string()))
}

fn check_identifier(ident: &str) -> Result<(), ParseErrorKind> {
	let mut chars = ident.chars();
	let valid = chars
		.next()
		.is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
		&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
	if valid {
		Ok(())
	} else {
		Err(ParseErrorKind::InvalidIdentifier)
	}
}

fn check_unreserved(ident: &str, reserved: &[&str]) -> Result<(), ParseErrorKind> {
	if reserved.contains(&ident) {
		Err(ParseErrorKind::ReservedName)
	} else {
		Ok(())
	}
}
