use std::{
	collections::HashMap,
	fs,
	path::{Path, PathBuf},
};

use crate::{
	error::{GeneratorError, Result},
	guest::guest_stub,
	host::{DispatchCase, host_dispatcher},
	params::{OutputPaths, Params},
	ports::ChannelAssignment,
	record::MarshallingRecord,
	signature::FunctionSignature,
};

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prototype {
	/// 1-based line number in the input.
	pub line: usize,
	pub signature: FunctionSignature,
}

/// Parses every prototype in `input`, in order.
///
/// Whitespace-only lines are skipped and don't take up a port. The first
/// malformed line or repeated function name fails the whole input. Port names
/// are upper-cased, so names differing only in case are rejected as well.
pub fn parse_prototypes(input: &str) -> Result<Vec<Prototype>> {
	let mut seen: HashMap<String, (String, usize)> = HashMap::new();
	let mut prototypes = Vec::new();

	for (idx, text) in input.lines().enumerate() {
		let line = idx + 1;
		if text.trim().is_empty() {
			debug!("Skipping empty line {line}");
			continue;
		}

		let signature = text
			.parse::<FunctionSignature>()
			.map_err(|kind| GeneratorError::Parse {
				line,
				text: text.trim().to_string(),
				kind,
			})?;

		let port_key = signature.name.to_uppercase();
		if let Some((first, first_line)) = seen.get(&port_key) {
			return Err(if *first == signature.name {
				GeneratorError::DuplicateFunction {
					name: signature.name,
					first: *first_line,
					second: line,
				}
			} else {
				GeneratorError::PortNameCollision {
					first: first.clone(),
					first_line: *first_line,
					second: signature.name,
					second_line: line,
				}
			});
		}
		seen.insert(port_key, (signature.name.clone(), line));

		trace!("line {line}: {signature}");
		prototypes.push(Prototype { line, signature });
	}

	Ok(prototypes)
}

/// The files produced by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
	/// Marshalling records and guest stubs, for the kernel.
	KernelIbv,
	/// Host dispatchers, for the hypervisor.
	HostFunctions,
	/// `typedef enum` of all ports.
	PortEnum,
	/// `#define` of all ports.
	PortMacros,
	/// Marshalling records only.
	Structs,
	/// `case` entries of the hypervisor's I/O exit `switch`.
	DispatchCases,
}

impl Artifact {
	pub const ALL: [Self; 6] = [
		Self::KernelIbv,
		Self::HostFunctions,
		Self::PortEnum,
		Self::PortMacros,
		Self::Structs,
		Self::DispatchCases,
	];

	pub fn path(self, paths: &OutputPaths) -> PathBuf {
		let file: &Path = match self {
			Self::KernelIbv => &paths.kernel_ibv,
			Self::HostFunctions => &paths.host_functions,
			Self::PortEnum => &paths.port_enum,
			Self::PortMacros => &paths.port_macros,
			Self::Structs => &paths.structs,
			Self::DispatchCases => &paths.dispatch_cases,
		};
		paths.resolve(file)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
	pub kernel_ibv: String,
	pub host_functions: String,
	pub port_enum: String,
	pub port_macros: String,
	pub structs: String,
	pub dispatch_cases: String,
}

impl Artifacts {
	pub fn get(&self, artifact: Artifact) -> &str {
		match artifact {
			Artifact::KernelIbv => &self.kernel_ibv,
			Artifact::HostFunctions => &self.host_functions,
			Artifact::PortEnum => &self.port_enum,
			Artifact::PortMacros => &self.port_macros,
			Artifact::Structs => &self.structs,
			Artifact::DispatchCases => &self.dispatch_cases,
		}
	}

	/// Overwrites every artifact file.
	///
	/// Files are written one after another; if one write fails, the ones
	/// before it have already been replaced.
	pub fn write_to(&self, paths: &OutputPaths) -> Result<()> {
		fs::create_dir_all(&paths.dir).map_err(GeneratorError::io(&paths.dir))?;
		for artifact in Artifact::ALL {
			let path = artifact.path(paths);
			debug!("Writing {artifact:?} to {}", path.display());
			fs::write(&path, self.get(artifact)).map_err(GeneratorError::io(&path))?;
		}
		Ok(())
	}
}

#[derive(Debug, Clone, Default)]
pub struct Generator {
	params: Params,
}

impl Generator {
	pub fn new(params: Params) -> Self {
		Self { params }
	}

	pub fn params(&self) -> &Params {
		&self.params
	}

	/// Generates all artifacts for the prototypes in `input` without touching the file system.
	pub fn generate(&self, input: &str) -> Result<Artifacts> {
		let prototypes = parse_prototypes(input)?;
		self.generate_from(&prototypes)
	}

	pub fn generate_from(&self, prototypes: &[Prototype]) -> Result<Artifacts> {
		let ports = ChannelAssignment::new(
			prototypes.iter().map(|proto| proto.signature.name.as_str()),
			self.params.port_base,
			&self.params.port_prefix,
		)?;

		let mut artifacts = Artifacts::default();
		for (proto, port) in prototypes.iter().zip(ports.iter()) {
			let sig = &proto.signature;
			let record = MarshallingRecord::new(sig);

			artifacts.structs.push_str(&format!("{record}\n"));
			artifacts
				.kernel_ibv
				.push_str(&format!("{record}\n{}\n", guest_stub(sig, &port.name)));
			artifacts
				.host_functions
				.push_str(&format!("{}\n", host_dispatcher(sig)));
			artifacts
				.dispatch_cases
				.push_str(&DispatchCase::new(sig, &port.name).to_string());
		}
		artifacts.port_enum = ports.port_enum(&self.params.enum_name).to_string();
		artifacts.port_macros = ports.port_macros().to_string();

		Ok(artifacts)
	}

	/// Reads the prototype file, generates every artifact and writes them.
	pub fn run(&self) -> Result<Artifacts> {
		let input_path = &self.params.prototypes;
		info!("Reading prototypes from {}", input_path.display());
		let input = fs::read_to_string(input_path).map_err(GeneratorError::io(input_path))?;

		let prototypes = parse_prototypes(&input)?;
		let artifacts = self.generate_from(&prototypes)?;
		artifacts.write_to(&self.params.output)?;

		info!(
			"Generated {} functions starting at port {} into {}",
			prototypes.len(),
			self.params.port_base,
			self.params.output.dir.display()
		);
		Ok(artifacts)
	}
}
