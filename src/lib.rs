//! # uhyve-ibv-gen
//!
//! Generates the code that forwards calls from a Hermit guest to a host
//! library through Uhyve I/O port exits. For every C prototype of the input
//! this produces a packed marshalling record, a guest stub sending the record
//! to a dedicated port, and a host dispatcher calling the real function.
//! Ports are assigned densely in input order.
//!
//! Cases the generator can't marshal on its own (`**` parameters, pointers
//! inside returned values) end up as `TODO` comments in the generated code.

#![warn(rust_2018_idioms)]

#[macro_use]
extern crate log;

pub mod args;
pub mod consts;
pub mod error;
pub mod generator;
pub mod guest;
pub mod host;
pub mod ir;
pub mod params;
pub mod ports;
pub mod record;
pub mod signature;

pub use error::{GeneratorError, Result};
pub use generator::{Artifact, Artifacts, Generator};
pub use params::Params;

/// Reads `params.prototypes` and writes all artifacts.
pub fn run(params: Params) -> Result<Artifacts> {
	Generator::new(params).run()
}
