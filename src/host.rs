//! Host side dispatchers.
//!
//! When the guest sends to a port, the hypervisor finds the guest physical
//! address of the marshalling record in the I/O data of the exit. The
//! dispatcher maps the record into the host's view of guest memory, relocates
//! every pointer argument by `guest_mem` and calls the real implementation.

use std::fmt;

use crate::{
	consts::*,
	ir::{Expr, Function, Stmt, Unresolved},
	signature::{FunctionSignature, Parameter, ReturnShape, TypeShape},
};

pub fn host_dispatcher(sig: &FunctionSignature) -> Function {
	let record_ptr = format!("{} *", sig.record_name());
	let io_data = Expr::add(
		Expr::cast("size_t", Expr::ident(HOST_KVM_RUN)),
		Expr::arrow(HOST_KVM_RUN, "io").dot("data_offset"),
	);
	let mut body = vec![
		Stmt::decl(
			"unsigned",
			HOST_DATA,
			Some(Expr::Deref(Box::new(
				Expr::cast("unsigned *", io_data.paren()).paren(),
			))),
		),
		Stmt::decl(
			&record_ptr,
			HOST_ARGS,
			Some(Expr::cast(
				&record_ptr,
				Expr::add(Expr::ident(HOST_GUEST_MEM), Expr::ident(HOST_DATA)).paren(),
			)),
		),
		Stmt::Blank,
	];

	let call = Expr::call(&sig.name, sig.params.iter().map(host_argument).collect());
	let host_ret = || Expr::ident(HOST_RET);
	let ret_field = || Expr::arrow(HOST_ARGS, RET_FIELD);

	match sig.ret_shape() {
		ReturnShape::Void => body.push(Stmt::Expr(call)),
		ReturnShape::Value => {
			body.push(Stmt::decl(&sig.ret, HOST_RET, Some(call)));
			body.push(Stmt::assign(ret_field(), host_ret()));
		}
		ReturnShape::Pointer => {
			// `args->ret` holds the guest physical address of the scratch
			// buffer the guest stub allocated.
			body.push(Stmt::decl(&sig.ret, HOST_RET, Some(call)));
			body.push(Stmt::Expr(Expr::call(
				HOST_COPY_FN,
				vec![
					Expr::guest_to_host(ret_field()),
					host_ret(),
					Expr::SizeOf(format!("*{HOST_RET}")),
				],
			)));
			body.push(Stmt::Unresolved(Unresolved::NestedReturnPointers));
			body.push(Stmt::Unresolved(Unresolved::HostReturnLifetime));
		}
		ReturnShape::DoublePointer => {
			body.push(Stmt::decl(&sig.ret, HOST_RET, Some(call)));
			body.push(Stmt::Unresolved(Unresolved::DoublePointerReturn {
				ty: sig.ret.clone(),
			}));
		}
	}

	Function {
		ret: "void".to_string(),
		name: sig.dispatcher_name(),
		params: vec![
			Parameter::new("struct kvm_run *", HOST_KVM_RUN),
			Parameter::new("uint8_t *", HOST_GUEST_MEM),
		],
		body,
	}
}

fn host_argument(param: &Parameter) -> Expr {
	let field = Expr::arrow(HOST_ARGS, &param.name);
	match param.shape() {
		TypeShape::Value => field,
		TypeShape::Pointer => Expr::cast(&param.ty, Expr::guest_to_host(field).paren()),
		TypeShape::DoublePointer => Expr::Unresolved(Unresolved::DoublePointerParam {
			name: param.name.clone(),
		}),
	}
}

/// The `case` of the hypervisor's I/O exit `switch` that routes a port to its dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCase {
	pub port: String,
	pub call: Stmt,
}

impl DispatchCase {
	pub fn new(sig: &FunctionSignature, port: &str) -> Self {
		Self {
			port: port.to_string(),
			call: Stmt::Expr(Expr::call(
				sig.dispatcher_name(),
				vec![Expr::ident(HOST_KVM_RUN), Expr::ident(HOST_GUEST_MEM)],
			)),
		}
	}
}

impl fmt::Display for DispatchCase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "\t\t\tcase {}:", self.port)?;
		writeln!(f, "\t\t\t\t{}", self.call)?;
		writeln!(f, "\t\t\t\tbreak;")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dispatcher(line: &str) -> Function {
		host_dispatcher(&line.parse().unwrap())
	}

	#[test]
	fn test_rereg_mr_dispatcher() {
		let dispatcher =
			dispatcher("int ibv_rereg_mr(struct ibv_mr * mr, int flags, struct ibv_pd * pd)");
		assert_eq!(
			dispatcher.to_string(),
			"void call_ibv_rereg_mr(struct kvm_run * run, uint8_t * guest_mem) {
	unsigned data = *((unsigned *) ((size_t) run + run->io.data_offset));
	uhyve_ibv_rereg_mr_t * args = (uhyve_ibv_rereg_mr_t *) (guest_mem + data);

	int host_ret = ibv_rereg_mr((struct ibv_mr *) (guest_mem+(size_t)args->mr), args->flags, (struct ibv_pd *) (guest_mem+(size_t)args->pd));
	args->ret = host_ret;
}
"
		);
		assert!(dispatcher.unresolved().is_empty());
	}

	#[test]
	fn test_void_dispatcher_writes_nothing_back() {
		let dispatcher =
			dispatcher("void ibv_ack_cq_events(struct ibv_cq * cq, unsigned int nevents)");
		let text = dispatcher.to_string();
		assert!(text.contains(
			"\tibv_ack_cq_events((struct ibv_cq *) (guest_mem+(size_t)args->cq), args->nevents);\n"
		));
		assert!(!text.contains("host_ret"));
		assert!(!text.contains("args->ret"));
	}

	#[test]
	fn test_pointer_return_is_copied_into_scratch() {
		let dispatcher =
			dispatcher("struct ibv_context * ibv_open_device(struct ibv_device * device)");
		let text = dispatcher.to_string();
		assert!(text.contains(
			"\tstruct ibv_context * host_ret = ibv_open_device((struct ibv_device *) (guest_mem+(size_t)args->device));\n"
		));
		assert!(text.contains("\tmemcpy(guest_mem+(size_t)args->ret, host_ret, sizeof(*host_ret));\n"));
		assert_eq!(
			dispatcher.unresolved(),
			[
				&Unresolved::NestedReturnPointers,
				&Unresolved::HostReturnLifetime
			]
		);
	}

	#[test]
	fn test_double_pointers_are_unresolved() {
		let dispatcher = dispatcher("struct ibv_device ** ibv_get_device_list(int ** num_devices)");
		let text = dispatcher.to_string();
		assert!(text.contains(
			"ibv_get_device_list(/* TODO: Take care of ** parameter num_devices. */);"
		));
		assert!(!text.contains("args->num_devices"));
		assert!(!text.contains("memcpy"));
		assert!(text.contains("\t// TODO: Take care of struct ibv_device ** return value.\n"));
	}

	#[test]
	fn test_dispatcher_without_parameters() {
		let dispatcher = dispatcher("int ibv_fork_init(void)");
		assert!(
			dispatcher
				.to_string()
				.contains("\tint host_ret = ibv_fork_init();\n")
		);
	}

	#[test]
	fn test_dispatch_case() {
		let sig = "int ibv_rereg_mr(struct ibv_mr * mr, int flags, struct ibv_pd * pd)"
			.parse()
			.unwrap();
		assert_eq!(
			DispatchCase::new(&sig, "UHYVE_PORT_IBV_REREG_MR").to_string(),
			"\t\t\tcase UHYVE_PORT_IBV_REREG_MR:\n\t\t\t\tcall_ibv_rereg_mr(run, guest_mem);\n\t\t\t\tbreak;\n"
		);
	}
}
