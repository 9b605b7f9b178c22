#![warn(rust_2018_idioms)]

use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::Parser;
use serde::Deserialize;

use crate::{
	consts::PROTOTYPES_PATH,
	error::{GeneratorError, Result},
	params::{OutputPaths, Params, PortNumber},
};

/// Used by clap to derive CLI parameters for the generator.
#[derive(Parser, Debug)]
#[clap(version, author, about)]
pub struct Args {
	#[clap(flatten, next_help_heading = "Input OPTIONS")]
	pub input_args: InputArgs,

	#[clap(flatten, next_help_heading = "Port OPTIONS")]
	pub port_args: PortArgs,

	#[clap(flatten, next_help_heading = "Output OPTIONS")]
	pub output_args: OutputArgs,
}

/// The contents of a `--config` file.
///
/// Note that the field names are relevant for the TOML's tables. Values given
/// on the command line take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
	pub ports: PortArgs,
	pub output: OutputArgs,
}

impl GeneratorConfig {
	pub fn from_file(path: &Path) -> Result<Self> {
		debug!("Loading config {}", path.display());
		let config = fs::read_to_string(path).map_err(GeneratorError::io(path))?;
		Ok(toml::from_str(&config)?)
	}
}

#[derive(Parser, Debug)]
pub struct InputArgs {
	/// File containing one function prototype per line
	#[clap(value_parser, default_value = PROTOTYPES_PATH)]
	pub prototypes: PathBuf,

	/// TOML file with port and output settings
	#[clap(short, long, value_name = "FILE")]
	pub config: Option<PathBuf>,
}

/// Arguments for the assignment of ports to functions.
#[derive(Default, Parser, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortArgs {
	/// Port of the first prototype, decimal or 0x-prefixed hex
	///
	/// [default: 0x510]
	#[clap(short = 'b', long, env = "IBV_GEN_PORT_BASE")]
	pub port_base: Option<PortNumber>,

	/// Prefix of the generated port names
	///
	/// [default: UHYVE_PORT_]
	#[clap(long)]
	pub port_prefix: Option<String>,

	/// Type name of the generated port enum
	///
	/// [default: uhyve_ibv_t]
	#[clap(long)]
	pub enum_name: Option<String>,
}

impl PortArgs {
	fn apply(self, params: &mut Params) {
		let Self {
			port_base,
			port_prefix,
			enum_name,
		} = self;
		if let Some(port_base) = port_base {
			params.port_base = port_base;
		}
		if let Some(port_prefix) = port_prefix {
			params.port_prefix = port_prefix;
		}
		if let Some(enum_name) = enum_name {
			params.enum_name = enum_name;
		}
	}
}

/// Arguments for the locations of the generated files.
///
/// File names are relative to the output directory.
#[derive(Default, Parser, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputArgs {
	/// Directory the generated files are written to
	///
	/// [default: .]
	#[clap(short = 'o', long = "output-dir", value_name = "DIR", env = "IBV_GEN_OUTPUT_DIR")]
	pub dir: Option<PathBuf>,

	/// Marshalling records and guest stubs
	#[clap(long, value_name = "FILE")]
	pub kernel_ibv: Option<PathBuf>,

	/// Host dispatchers
	#[clap(long, value_name = "FILE")]
	pub host_functions: Option<PathBuf>,

	/// Port enum header
	#[clap(long, value_name = "FILE")]
	pub port_enum: Option<PathBuf>,

	/// Port macros
	#[clap(long, value_name = "FILE")]
	pub port_macros: Option<PathBuf>,

	/// Marshalling records header
	#[clap(long, value_name = "FILE")]
	pub structs: Option<PathBuf>,

	/// Cases of the hypervisor's I/O exit switch
	#[clap(long, value_name = "FILE")]
	pub dispatch_cases: Option<PathBuf>,
}

impl OutputArgs {
	fn apply(self, paths: &mut OutputPaths) {
		let Self {
			dir,
			kernel_ibv,
			host_functions,
			port_enum,
			port_macros,
			structs,
			dispatch_cases,
		} = self;
		for (value, target) in [
			(dir, &mut paths.dir),
			(kernel_ibv, &mut paths.kernel_ibv),
			(host_functions, &mut paths.host_functions),
			(port_enum, &mut paths.port_enum),
			(port_macros, &mut paths.port_macros),
			(structs, &mut paths.structs),
			(dispatch_cases, &mut paths.dispatch_cases),
		] {
			if let Some(value) = value {
				*target = value;
			}
		}
	}
}

impl From<GeneratorConfig> for Params {
	fn from(config: GeneratorConfig) -> Self {
		let GeneratorConfig { ports, output } = config;
		let mut params = Self::default();
		ports.apply(&mut params);
		output.apply(&mut params.output);
		params
	}
}

impl Args {
	/// Layers the command line on top of the config file on top of the defaults.
	pub fn into_params(self) -> Result<Params> {
		let Args {
			input_args: InputArgs { prototypes, config },
			port_args,
			output_args,
		} = self;

		let mut params = match config {
			Some(config) => Params::from(GeneratorConfig::from_file(&config)?),
			None => Params::default(),
		};
		params.prototypes = prototypes;
		port_args.apply(&mut params);
		output_args.apply(&mut params.output);
		Ok(params)
	}
}
