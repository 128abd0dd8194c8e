#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "cdbdoc", about = "Starfield component database (.cdb) material tools")]
struct Cli {
	/// Raise log verbosity (-v info, -vv debug, -vvv trace).
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbose: u8,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Header, load counters and object totals.
	Info(cmd::info::Args),
	/// Raw chunk listing.
	Chunks(cmd::chunks::Args),
	/// Class definitions.
	Classes(cmd::classes::Args),
	/// Objects belonging to material paths.
	Find(cmd::find::Args),
	/// Material JSON documents.
	Dump(cmd::dump::Args),
	/// Persistent ids of resource paths.
	Hash(cmd::hash::Args),
}

fn main() {
	let cli = Cli::parse();
	setup_logging(cli.verbose);

	if let Err(err) = run(cli.command) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run(command: Commands) -> cdbdoc::cdb::Result<()> {
	match command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Chunks(args) => cmd::chunks::run(args),
		Commands::Classes(args) => cmd::classes::run(args),
		Commands::Find(args) => cmd::find::run(args),
		Commands::Dump(args) => cmd::dump::run(args),
		Commands::Hash(args) => cmd::hash::run(args),
	}
}

fn setup_logging(verbosity: u8) {
	let level = match verbosity {
		0 => LevelFilter::WARN,
		1 => LevelFilter::INFO,
		2 => LevelFilter::DEBUG,
		_ => LevelFilter::TRACE,
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbosity >= 2)
		.init();
}
