use clap::{Parser, ValueEnum};
use colored::*;
use env_logger::Env;
use helix::project::{read_lines, read_project, write_project, PROJECT_EXTENSION};
use helix::*;
use log::debug;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "helix", version, about = "Resolves a set of mathematical statements and reports what each one plots or declares")]
struct Cli {
	/// Project file, or plain statements one per line with `--format lines`.
	file: PathBuf,

	/// Defaults to `hx` for `.hx` files and `lines` otherwise.
	#[arg(long, value_enum)]
	format: Option<Format>,

	/// Replaces the text of statement N and resolves again, e.g. `--edit 2="a = 4"`. Repeatable.
	#[arg(long, value_parser = parse_edit)]
	edit: Vec<(u32, String)>,

	/// Prints the project in `key:value` form after the last pass.
	#[arg(long)]
	save: bool,

	#[arg(long, value_enum, env = "HELIX_LOG_LEVEL")]
	log_level: Option<LogLevel>,

	#[arg(short, long)]
	debug: bool,

	#[arg(long)]
	no_color: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
	Hx,
	Lines,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
	Error,
	Warn,
	Info,
	Debug,
	Trace,
}

impl From<LogLevel> for log::LevelFilter {
	fn from(level: LogLevel) -> Self {
		match level {
			LogLevel::Error => log::LevelFilter::Error,
			LogLevel::Warn => log::LevelFilter::Warn,
			LogLevel::Info => log::LevelFilter::Info,
			LogLevel::Debug => log::LevelFilter::Debug,
			LogLevel::Trace => log::LevelFilter::Trace,
		}
	}
}

fn parse_edit(arg: &str) -> Result<(u32, String), String> {
	let (index, text) = arg.split_once('=').ok_or("expected `N=TEXT`")?;
	let index = index.trim().parse().map_err(|_| format!("`{}` is not a statement number", index))?;
	Ok((index, text.to_string()))
}

fn print_rows(rows: &[Row], resolver: &Resolver, color: bool) {
	for row in rows {
		let id = StatementId(row.id);
		println!("{} {}", format!("{:>4}", id.to_string()).dimmed(), row.text);
		let outcome = match resolver.outcome(id) {
			Some(outcome) => outcome,
			None => continue,
		};
		match (&outcome.status, outcome.label.kind) {
			(Err(error), _) => println!("{}", error.snippet(&row.text, color)),
			(Ok(()), LabelKind::Value) => println!("    {}", outcome.label.message.green()),
			(Ok(()), _) => {
				let kind = outcome.binding.as_ref().and_then(|b| b.plot_kind).map_or("", PlotKind::name);
				println!("    {} {} {}", swatch(row.colour), outcome.label.message, format!("[{}]", kind).dimmed());
			},
		}
	}
}

fn swatch(colour: Option<Rgb>) -> ColoredString {
	match colour {
		Some(Rgb(r, g, b)) => "■".truecolor(r, g, b),
		None => "■".normal(),
	}
}

/// Every branch of a solution list is drawn on its own.
fn print_plots(resolution: &Resolution) {
	let branches: Vec<Binding> = resolution.plots.iter().flat_map(|plot| plot.binding.split()).collect();
	for branch in &branches {
		let dimension = branch.plot_kind.map_or(0, PlotKind::dimension);
		debug!("plot {} {}d {:016x}: {}", branch.owner, dimension, branch.get_signature().0, branch);
	}
	println!("{} plottable", branches.len());
}

fn run(cli: Cli) -> Result<(), String> {
	let color = !cli.no_color;
	let input = std::fs::read_to_string(&cli.file)
		.map_err(|err| format!("can't read `{}`: {}", cli.file.display(), err))?;
	let format = cli.format.unwrap_or_else(|| {
		match cli.file.extension().and_then(|e| e.to_str()) {
			Some(PROJECT_EXTENSION) => Format::Hx,
			_ => Format::Lines,
		}
	});
	let mut project = match format {
		Format::Hx => read_project(&input).map_err(|err| err.to_string())?,
		Format::Lines => read_lines(&input),
	};

	let context = Context::default();
	let mut resolver = Resolver::new(&context);
	let resolution = resolver.update(&mut project.rows, Change::Reset);
	print_rows(&project.rows, &resolver, color);
	print_plots(&resolution);

	for (index, text) in cli.edit {
		let row = project.rows.iter_mut()
			.find(|row| row.id == index)
			.ok_or_else(|| format!("there is no statement {}", index))?;
		row.text = text;
		let resolution = resolver.update(&mut project.rows, Change::Edited(StatementId(index)));
		println!();
		println!(
			"{} {}: re-resolved {}",
			"edit".bold(),
			StatementId(index),
			resolution.reparsed.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
		);
		print_rows(&project.rows, &resolver, color);
		print_plots(&resolution);
	}

	if cli.save {
		println!();
		print!("{}", write_project(&project));
	}
	Ok(())
}

fn main() {
	let cli = Cli::parse();

	let mut logger = env_logger::Builder::from_env(Env::default().filter_or("HELIX_LOG", "warn"));
	match (cli.debug, cli.log_level) {
		(true, _) => { logger.filter_level(log::LevelFilter::Debug); },
		(false, Some(level)) => { logger.filter_level(level.into()); },
		(false, None) => {},
	}
	logger.init();

	if cli.no_color {
		colored::control::set_override(false);
	}

	if let Err(err) = run(cli) {
		eprintln!("{} {}", "error:".red().bold(), err);
		std::process::exit(1);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn swatch_takes_statement_colour() {
		colored::control::set_override(true);
		assert_eq!(swatch(Some(Rgb(3, 247, 235))).to_string(), "\u{1b}[38;2;3;247;235m■\u{1b}[0m");
		assert_eq!(swatch(None).to_string(), "■");
	}

	#[test]
	fn edits_are_numbered() {
		assert_eq!(parse_edit("2=a = 4"), Ok((2, "a = 4".to_string())));
		assert!(parse_edit("a = 4").is_err());
	}
}
