use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::params::PortNumber;

pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Reasons a prototype line can be rejected by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
	/// No `(` separating the name from the parameter list.
	MissingOpenParen,
	/// The line does not end in `)`.
	MissingCloseParen,
	/// Only a single token in front of the `(`.
	MissingReturnType,
	/// A parameter between two commas is empty.
	EmptyParameter,
	/// A parameter only consists of a type.
	MissingParameterName,
	/// A function or parameter name is not a C identifier.
	InvalidIdentifier,
	/// A parenthesis besides the pair around the parameter list.
	UnexpectedParen,
	/// A name the generated code uses for something else.
	ReservedName,
}

impl fmt::Display for ParseErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let msg = match self {
			Self::MissingOpenParen => "missing `(`",
			Self::MissingCloseParen => "line does not end with `)`",
			Self::MissingReturnType => "missing return type or function name",
			Self::EmptyParameter => "empty parameter",
			Self::MissingParameterName => "parameter without a name",
			Self::InvalidIdentifier => "invalid identifier",
			Self::UnexpectedParen => "unexpected parenthesis",
			Self::ReservedName => "name is reserved by the generated code",
		};
		f.write_str(msg)
	}
}

#[derive(Error, Debug)]
pub enum GeneratorError {
	#[error("line {line}: {kind}: `{text}`")]
	Parse {
		line: usize,
		text: String,
		kind: ParseErrorKind,
	},

	#[error("function `{name}` on line {second} was already declared on line {first}")]
	DuplicateFunction {
		name: String,
		first: usize,
		second: usize,
	},

	#[error(
		"functions `{first}` on line {first_line} and `{second}` on line {second_line} would share a port name"
	)]
	PortNameCollision {
		first: String,
		first_line: usize,
		second: String,
		second_line: usize,
	},

	#[error("{count} ports starting at {base} do not fit into the 16 bit port range")]
	PortOverflow { base: PortNumber, count: usize },

	#[error("{}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error(transparent)]
	Config(#[from] toml::de::Error),
}

impl GeneratorError {
	pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
		let path = path.into();
		move |source| Self::Io { path, source }
	}

	/// The input line the error refers to, if any.
	pub fn line(&self) -> Option<usize> {
		match self {
			Self::Parse { line, .. } => Some(*line),
			Self::DuplicateFunction { second, .. } => Some(*second),
			Self::PortNameCollision { second_line, .. } => Some(*second_line),
			_ => None,
		}
	}
}
