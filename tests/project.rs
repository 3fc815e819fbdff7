use helix::project::*;
use helix::*;

const PROJECT: &str = "\
theme:dark
text:a = 2
locked:1
text:y = a x
colour:3 247 235
contoured:0
a line without delimiter
text:z = x y
contoured:1
hidden:true
";

#[test]
fn reads_rows_and_settings() {
	let project = read_project(PROJECT).unwrap();
	assert_eq!(project.settings, vec![("theme".to_string(), "dark".to_string())]);
	assert_eq!(project.rows.len(), 3);

	assert_eq!(project.rows[0].text, "a = 2");
	assert!(project.rows[0].locked);
	assert_eq!(project.rows[1].colour, Some(Rgb(3, 247, 235)));
	assert!(!project.rows[1].contoured);
	assert!(project.rows[2].contoured && project.rows[2].hidden);
	assert_eq!(project.rows.iter().map(|row| row.id).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn writes_what_it_reads() {
	let project = read_project(PROJECT).unwrap();
	let written = write_project(&project);
	assert_eq!(read_project(&written).unwrap(), project);
	assert!(written.starts_with("theme:dark\ntext:a = 2\nlocked:1\n"));
}

#[test]
fn rejects_bad_lines() {
	assert_eq!(
		read_project("hidden:1\ntext:a = 1\n"),
		Err(ProjectError::NoStatement { line: 1, key: "hidden".to_string() }),
	);
	assert!(matches!(read_project("text:y = x\ncolour:1 2\n"), Err(ProjectError::BadValue { line: 2, .. })));
	assert!(matches!(read_project("text:y = x\nlocked:yes\n"), Err(ProjectError::BadValue { line: 2, .. })));
}

#[test]
fn plain_lines() {
	let project = read_lines("a = 1\n\ny = a x\n");
	assert_eq!(project.rows.len(), 2);
	assert_eq!(project.rows[1], Row::new(2, "y = a x"));
}

#[test]
fn resolves_a_loaded_project() {
	let mut project = read_project(PROJECT).unwrap();
	let context = Context::default();
	let resolution = Resolver::new(&context).update(&mut project.rows, Change::Reset);

	assert_eq!(project.rows[1].label, Some(Label::none("y = 2*x")));
	assert_eq!(project.rows[1].colour, Some(Rgb(3, 247, 235)));
	// the surface is hidden
	assert_eq!(resolution.plots.len(), 1);
}
