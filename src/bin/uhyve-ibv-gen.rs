#![warn(rust_2018_idioms)]

use std::process;

use clap::Parser;
use ibvgenlib::args::Args;
use log::error;

fn run_generator() -> i32 {
	env_logger::init();

	let args = Args::parse();
	let result = args.into_params().and_then(ibvgenlib::run);

	match result {
		Ok(_) => 0,
		Err(err) => {
			error!("{err}");
			1
		}
	}
}

fn main() {
	process::exit(run_generator())
}
