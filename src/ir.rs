//! A tiny C syntax tree.
//!
//! The generators decide *what* has to happen to each parameter and build
//! [`Stmt`]s and [`Expr`]s. The [`fmt::Display`] implementations in this module
//! decide how it is printed.

use std::fmt;

use crate::{consts::*, signature::Parameter};

/// A marshalling case the generator leaves to a human.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
	/// A `**` parameter. Neither side translates the addresses behind it.
	DoublePointerParam { name: String },
	/// A `**` return value.
	DoublePointerReturn { ty: String },
	/// The guest receives pointers inside the returned value verbatim.
	ReturnedPointers,
	/// Pointers nested in a pointee copied back to the guest are host addresses.
	NestedReturnPointers,
	/// The object the host function returned is never freed.
	HostReturnLifetime,
}

impl fmt::Display for Unresolved {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::DoublePointerParam { name } => {
				write!(f, "TODO: Take care of ** parameter {name}.")
			}
			Self::DoublePointerReturn { ty } => write!(f, "TODO: Take care of {ty} return value."),
			Self::ReturnedPointers => f.write_str("TODO: Fix pointers in returned data structures."),
			Self::NestedReturnPointers => {
				f.write_str("TODO: Convert ptrs contained in return value.")
			}
			Self::HostReturnLifetime => {
				write!(f, "TODO: Delete {HOST_RET} data structure.")
			}
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
	Ident(String),
	/// `base.field`, or `base->field` if `deref` is set.
	Field {
		base: Box<Expr>,
		field: String,
		deref: bool,
	},
	AddrOf(Box<Expr>),
	Deref(Box<Expr>),
	/// `lhs + rhs`
	Add(Box<Expr>, Box<Expr>),
	Paren(Box<Expr>),
	Cast {
		ty: String,
		expr: Box<Expr>,
	},
	Call {
		func: String,
		args: Vec<Expr>,
	},
	/// `sizeof(...)` of a type or expression given as text.
	SizeOf(String),
	/// Host view of a guest physical address: `guest_mem+(size_t)expr`.
	GuestToHost(Box<Expr>),
	/// Inline marker in place of an expression.
	Unresolved(Unresolved),
}

impl Expr {
	pub fn ident(name: impl Into<String>) -> Self {
		Self::Ident(name.into())
	}

	pub fn member(base: &str, field: &str) -> Self {
		Self::ident(base).dot(field)
	}

	pub fn arrow(base: &str, field: &str) -> Self {
		Self::ident(base).deref_field(field)
	}

	/// `self.field`
	pub fn dot(self, field: &str) -> Self {
		Self::Field {
			base: Box::new(self),
			field: field.to_string(),
			deref: false,
		}
	}

	/// `self->field`
	pub fn deref_field(self, field: &str) -> Self {
		Self::Field {
			base: Box::new(self),
			field: field.to_string(),
			deref: true,
		}
	}

	pub fn paren(self) -> Self {
		Self::Paren(Box::new(self))
	}

	pub fn add(lhs: Expr, rhs: Expr) -> Self {
		Self::Add(Box::new(lhs), Box::new(rhs))
	}

	pub fn cast(ty: impl Into<String>, expr: Expr) -> Self {
		Self::Cast {
			ty: ty.into(),
			expr: Box::new(expr),
		}
	}

	pub fn call(func: impl Into<String>, args: Vec<Expr>) -> Self {
		Self::Call {
			func: func.into(),
			args,
		}
	}

	/// Guest virtual to guest physical: `(ty) virt_to_phys((size_t) expr)`.
	pub fn virt_to_phys(ty: impl Into<String>, expr: Expr) -> Self {
		Self::cast(
			ty,
			Self::call(GUEST_VIRT_TO_PHYS_FN, vec![Self::cast("size_t", expr)]),
		)
	}

	pub fn guest_to_host(expr: Expr) -> Self {
		Self::GuestToHost(Box::new(expr))
	}
}

impl fmt::Display for Expr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Ident(name) => f.write_str(name),
			Self::Field { base, field, deref } => {
				let op = if *deref { "->" } else { "." };
				write!(f, "{base}{op}{field}")
			}
			Self::AddrOf(expr) => write!(f, "&{expr}"),
			Self::Deref(expr) => write!(f, "*{expr}"),
			Self::Add(lhs, rhs) => write!(f, "{lhs} + {rhs}"),
			Self::Paren(expr) => write!(f, "({expr})"),
			Self::Cast { ty, expr } => write!(f, "({ty}) {expr}"),
			Self::Call { func, args } => {
				write!(f, "{func}(")?;
				for (i, arg) in args.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{arg}")?;
				}
				f.write_str(")")
			}
			Self::SizeOf(what) => write!(f, "sizeof({what})"),
			Self::GuestToHost(expr) => write!(f, "{HOST_GUEST_MEM}+(size_t){expr}"),
			Self::Unresolved(marker) => write!(f, "/* {marker} */"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
	/// `ty name;` or `ty name = init;`
	Decl {
		ty: String,
		name: String,
		init: Option<Expr>,
	},
	Assign {
		target: Expr,
		value: Expr,
	},
	Expr(Expr),
	Return(Expr),
	Unresolved(Unresolved),
	Blank,
}

impl Stmt {
	pub fn decl(ty: impl Into<String>, name: impl Into<String>, init: Option<Expr>) -> Self {
		Self::Decl {
			ty: ty.into(),
			name: name.into(),
			init,
		}
	}

	pub fn assign(target: Expr, value: Expr) -> Self {
		Self::Assign { target, value }
	}

	/// The marker attached to this statement or to one of its call arguments.
	pub fn unresolved(&self) -> Vec<&Unresolved> {
		fn in_expr<'a>(expr: &'a Expr, out: &mut Vec<&'a Unresolved>) {
			match expr {
				Expr::Unresolved(marker) => out.push(marker),
				Expr::Call { args, .. } => args.iter().for_each(|arg| in_expr(arg, out)),
				Expr::AddrOf(expr)
				| Expr::Deref(expr)
				| Expr::Paren(expr)
				| Expr::Cast { expr, .. }
				| Expr::Field { base: expr, .. }
				| Expr::GuestToHost(expr) => in_expr(expr, out),
				Expr::Add(lhs, rhs) => {
					in_expr(lhs, out);
					in_expr(rhs, out);
				}
				Expr::Ident(_) | Expr::SizeOf(_) => {}
			}
		}

		let mut out = Vec::new();
		match self {
			Self::Unresolved(marker) => out.push(marker),
			Self::Decl { init: Some(expr), .. } | Self::Expr(expr) | Self::Return(expr) => {
				in_expr(expr, &mut out)
			}
			Self::Assign { target, value } => {
				in_expr(target, &mut out);
				in_expr(value, &mut out);
			}
			Self::Decl { init: None, .. } | Self::Blank => {}
		}
		out
	}
}

impl fmt::Display for Stmt {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Decl { ty, name, init } => {
				write!(f, "{ty} {name}")?;
				if let Some(init) = init {
					write!(f, " = {init}")?;
				}
				f.write_str(";")
			}
			Self::Assign { target, value } => write!(f, "{target} = {value};"),
			Self::Expr(expr) => write!(f, "{expr};"),
			Self::Return(expr) => write!(f, "return {expr};"),
			Self::Unresolved(marker) => write!(f, "// {marker}"),
			Self::Blank => Ok(()),
		}
	}
}

/// A C function definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
	pub ret: String,
	pub name: String,
	pub params: Vec<Parameter>,
	pub body: Vec<Stmt>,
}

impl Function {
	/// Every marker in the function body, in order.
	pub fn unresolved(&self) -> Vec<&Unresolved> {
		self.body.iter().flat_map(Stmt::unresolved).collect()
	}
}

impl fmt::Display for Function {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}(", self.ret, self.name)?;
		if self.params.is_empty() {
			f.write_str("void")?;
		}
		for (i, param) in self.params.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{param}")?;
		}
		f.write_str(") {\n")?;
		for stmt in &self.body {
			match stmt {
				Stmt::Blank => writeln!(f)?,
				stmt => writeln!(f, "\t{stmt}")?,
			}
		}
		f.write_str("}\n")
	}
}
