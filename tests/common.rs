use std::{
	fs,
	path::{Path, PathBuf},
};

use ibvgenlib::{
	Artifacts, Generator,
	params::{OutputPaths, Params},
};
use tempfile::TempDir;

/// Path of a prototype file in `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
	[env!("CARGO_MANIFEST_DIR"), "tests", "data", name]
		.iter()
		.collect()
}

pub fn read_fixture(name: &str) -> String {
	fs::read_to_string(fixture_path(name)).unwrap()
}

/// Params reading `prototypes` and writing into `out_dir`.
pub fn params_for(prototypes: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> Params {
	Params {
		prototypes: prototypes.as_ref().to_path_buf(),
		output: OutputPaths::in_dir(out_dir.as_ref()),
		..Default::default()
	}
}

/// Runs the whole pipeline on a fixture in a fresh temporary directory.
pub fn run_fixture(name: &str) -> (TempDir, Artifacts) {
	env_logger::try_init().ok();
	let out_dir = tempfile::tempdir().unwrap();
	let artifacts = Generator::new(params_for(fixture_path(name), out_dir.path()))
		.run()
		.unwrap();
	(out_dir, artifacts)
}
