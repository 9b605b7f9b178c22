//! Guest side stubs.
//!
//! A stub has the prototype of the function it replaces. It fills the
//! marshalling record with guest physical addresses and sends the record's
//! address to the function's port, which blocks until the host has handled
//! the call.

use crate::{
	consts::*,
	ir::{Expr, Function, Stmt, Unresolved},
	signature::{FunctionSignature, ReturnShape, TypeShape, pointee},
};

pub fn guest_stub(sig: &FunctionSignature, port: &str) -> Function {
	let mut body = vec![Stmt::decl(sig.record_name(), GUEST_ARGS, None)];

	for param in &sig.params {
		let field = Expr::member(GUEST_ARGS, &param.name);
		let arg = Expr::ident(&param.name);
		body.push(match param.shape() {
			TypeShape::Value => Stmt::assign(field, arg),
			TypeShape::Pointer => Stmt::assign(field, Expr::virt_to_phys(&param.ty, arg)),
			TypeShape::DoublePointer => Stmt::Unresolved(Unresolved::DoublePointerParam {
				name: param.name.clone(),
			}),
		});
	}

	// The host copies a pointer-shaped result into memory the guest provides.
	match sig.ret_shape() {
		ReturnShape::Pointer => {
			let scratch = Expr::call(
				GUEST_ALLOC_FN,
				vec![Expr::SizeOf(pointee(&sig.ret).to_string())],
			);
			body.push(Stmt::Blank);
			body.push(Stmt::assign(
				Expr::member(GUEST_ARGS, RET_FIELD),
				Expr::virt_to_phys(&sig.ret, scratch),
			));
		}
		ReturnShape::DoublePointer => {
			body.push(Stmt::Blank);
			body.push(Stmt::Unresolved(Unresolved::DoublePointerReturn {
				ty: sig.ret.clone(),
			}));
		}
		ReturnShape::Void | ReturnShape::Value => {}
	}

	body.push(Stmt::Blank);
	body.push(Stmt::Expr(Expr::call(
		GUEST_SEND_FN,
		vec![
			Expr::ident(port),
			Expr::virt_to_phys("unsigned", Expr::AddrOf(Box::new(Expr::ident(GUEST_ARGS)))),
		],
	)));

	body.push(Stmt::Blank);
	body.push(Stmt::Unresolved(Unresolved::ReturnedPointers));
	if !sig.returns_void() {
		body.push(Stmt::Return(Expr::member(GUEST_ARGS, RET_FIELD)));
	}

	Function {
		ret: sig.ret.clone(),
		name: sig.name.clone(),
		params: sig.params.clone(),
		body,
	}
}
