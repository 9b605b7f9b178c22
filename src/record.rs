//! Marshalling records: the packed structs both sides of the boundary read
//! from the same guest memory.

use std::fmt;

use crate::{consts::RET_FIELD, signature::FunctionSignature};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
	Parameter,
	Return,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
	pub ty: String,
	pub name: String,
	pub role: FieldRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarshallingRecord {
	pub name: String,
	pub fields: Vec<Field>,
}

impl MarshallingRecord {
	/// One field per parameter, followed by `ret` unless the function returns `void`.
	///
	/// Pointer parameters keep their pointer type; the guest stores a guest
	/// physical address in them.
	pub fn new(sig: &FunctionSignature) -> Self {
		let mut fields = sig
			.params
			.iter()
			.map(|param| Field {
				ty: param.ty.clone(),
				name: param.name.clone(),
				role: FieldRole::Parameter,
			})
			.collect::<Vec<_>>();

		if !sig.returns_void() {
			fields.push(Field {
				ty: sig.ret.clone(),
				name: RET_FIELD.to_string(),
				role: FieldRole::Return,
			});
		}

		Self {
			name: sig.record_name(),
			fields,
		}
	}

	pub fn ret(&self) -> Option<&Field> {
		self.fields.iter().find(|field| field.role == FieldRole::Return)
	}

	fn with_role(&self, role: FieldRole) -> impl Iterator<Item = &Field> {
		self.fields.iter().filter(move |field| field.role == role)
	}
}

impl fmt::Display for MarshallingRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "typedef struct {{")?;
		for (heading, role) in [
			("Parameters", FieldRole::Parameter),
			("Return value", FieldRole::Return),
		] {
			let mut fields = self.with_role(role).peekable();
			if fields.peek().is_some() {
				writeln!(f, "\t// {heading}:")?;
			}
			for field in fields {
				writeln!(f, "\t{} {};", field.ty, field.name)?;
			}
		}
		writeln!(f, "}} __attribute__((packed)) {};", self.name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(line: &str) -> MarshallingRecord {
		MarshallingRecord::new(&line.parse().unwrap())
	}

	#[test]
	fn test_rereg_mr_record() {
		let record = record("int ibv_rereg_mr(struct ibv_mr * mr, int flags, struct ibv_pd * pd)");
		assert_eq!(record.fields.len(), 4);
		assert_eq!(record.ret().unwrap().ty, "int");
		assert_eq!(
			record.to_string(),
			"typedef struct {
	// Parameters:
	struct ibv_mr * mr;
	int flags;
	struct ibv_pd * pd;
	// Return value:
	int ret;
} __attribute__((packed)) uhyve_ibv_rereg_mr_t;
"
		);
	}

	#[test]
	fn test_void_record_has_no_ret() {
		let record = record("void ibv_ack_async_event(struct ibv_async_event * event)");
		assert_eq!(record.fields.len(), 1);
		assert!(record.ret().is_none());
		assert!(!record.to_string().contains("Return value"));
	}

	#[test]
	fn test_record_without_parameters() {
		let record = record("int ibv_fork_init(void)");
		assert_eq!(
			record.to_string(),
			"typedef struct {
	// Return value:
	int ret;
} __attribute__((packed)) uhyve_ibv_fork_init_t;
"
		);
	}

	#[test]
	fn test_field_count() {
		for (line, params) in [
			("int a(int x)", 1),
			("void b(int x, char * y)", 2),
			("char ** c(struct s ** x, int y, long z)", 3),
			("void d()", 0),
		] {
			let sig: FunctionSignature = line.parse().unwrap();
			let expected = params + usize::from(!sig.returns_void());
			assert_eq!(MarshallingRecord::new(&sig).fields.len(), expected, "{line}");
		}
	}
}
