//! Project files: `key:value` lines. `text:` starts a statement, `colour:`, `locked:`, `hidden:` and `contoured:`
//! set flags of the statement above them, any other key is a viewer setting kept as is.

use crate::binding::Rgb;
use crate::statement::Row;
use log::debug;
use thiserror::Error;

pub const PROJECT_EXTENSION: &str = "hx";
const DELIMITER: char = ':';

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Project {
	pub settings: Vec<(String, String)>,
	pub rows: Vec<Row>,
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ProjectError {
	#[error("line {line}: `{key}` comes before any `text:` line")]
	NoStatement {
		line: usize,
		key: String,
	},
	#[error("line {line}: bad value `{value}` for `{key}`")]
	BadValue {
		line: usize,
		key: String,
		value: String,
	},
}

fn flag(line: usize, key: &str, value: &str) -> Result<bool, ProjectError> {
	match value.trim() {
		"0" | "false" => Ok(false),
		"1" | "true" => Ok(true),
		_ => Err(ProjectError::BadValue { line, key: key.to_string(), value: value.to_string() }),
	}
}

fn colour(line: usize, value: &str) -> Result<Rgb, ProjectError> {
	let bad = || ProjectError::BadValue { line, key: "colour".to_string(), value: value.to_string() };
	let channels = value.split_whitespace()
		.map(|c| c.parse::<u8>().map_err(|_| bad()))
		.collect::<Result<Vec<_>, _>>()?;
	match channels.as_slice() {
		[r, g, b] => Ok(Rgb(*r, *g, *b)),
		_ => Err(bad()),
	}
}

pub fn read_project(input: &str) -> Result<Project, ProjectError> {
	let mut project = Project::default();
	for (index, line) in input.lines().enumerate() {
		let line_no = index + 1;
		let (key, value) = match line.split_once(DELIMITER) {
			Some(pair) => pair,
			None => {
				if !line.trim().is_empty() {
					debug!("skipping line {} without `{}`", line_no, DELIMITER);
				}
				continue;
			},
		};

		if key == "text" {
			let id = project.rows.len() as u32 + 1;
			project.rows.push(Row::new(id, value));
			continue;
		}
		let row = match (key, project.rows.last_mut()) {
			("colour" | "locked" | "hidden" | "contoured", Some(row)) => row,
			("colour" | "locked" | "hidden" | "contoured", None) => {
				return Err(ProjectError::NoStatement { line: line_no, key: key.to_string() });
			},
			_ => {
				project.settings.push((key.to_string(), value.to_string()));
				continue;
			},
		};
		match key {
			"colour" => row.colour = Some(colour(line_no, value)?),
			"locked" => row.locked = flag(line_no, key, value)?,
			"hidden" => row.hidden = flag(line_no, key, value)?,
			_ => row.contoured = flag(line_no, key, value)?,
		}
	}
	Ok(project)
}

/// One statement per non-empty line.
pub fn read_lines(input: &str) -> Project {
	Project {
		settings: vec![],
		rows: input.lines()
			.filter(|line| !line.trim().is_empty())
			.enumerate()
			.map(|(index, line)| Row::new(index as u32 + 1, line))
			.collect(),
	}
}

pub fn write_project(project: &Project) -> String {
	let mut result = String::new();
	for (key, value) in &project.settings {
		result += &format!("{}{}{}\n", key, DELIMITER, value);
	}
	for row in &project.rows {
		result += &format!("text{}{}\n", DELIMITER, row.text);
		if let Some(colour) = row.colour {
			result += &format!("colour{}{}\n", DELIMITER, colour);
		}
		for (key, value) in &[("locked", row.locked), ("hidden", row.hidden), ("contoured", row.contoured)] {
			if *value {
				result += &format!("{}{}1\n", key, DELIMITER);
			}
		}
	}
	result
}
