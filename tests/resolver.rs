use helix::*;
use proptest::prelude::*;
use std::rc::Rc;

fn rows(texts: &[&str]) -> Vec<Row> {
	texts.iter().enumerate().map(|(i, text)| Row::new(i as u32 + 1, text)).collect()
}

fn labels(rows: &[Row]) -> Vec<String> {
	rows.iter().map(|row| row.label.as_ref().map_or(String::new(), |l| l.message.clone())).collect()
}

fn label(rows: &[Row], id: u32) -> Label {
	rows.iter().find(|row| row.id == id).and_then(|row| row.label.clone()).unwrap()
}

fn edit(rows: &mut [Row], id: u32, text: &str) {
	if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
		row.text = text.to_string();
	}
}

#[test]
fn substitutes_declarations() {
	let context = Context::default();
	let mut resolver = Resolver::new(&context);
	let mut rows = rows(&["a = 3", "f(x) = x/a", "y = f(2x)"]);
	let resolution = resolver.update(&mut rows, Change::Reset);

	assert_eq!(label(&rows, 1), Label::value("a = 3"));
	assert_eq!(label(&rows, 2), Label::value("f(x) = x/3"));
	assert_eq!(label(&rows, 3), Label::none("y = 2*x/3"));
	assert_eq!(resolution.plots.len(), 1);
	assert_eq!(resolution.plots[0].binding.owner, StatementId(3));
	assert!(resolver.binding(StatementId(3)).unwrap().dependencies.contains("f"));
}

#[test]
fn failing_edit_leaves_others_untouched() {
	let context = Context::default();
	let mut resolver = Resolver::new(&context);
	let mut rows = rows(&["a = 3", "f(x) = x/a"]);
	resolver.update(&mut rows, Change::Reset);
	let before = resolver.binding(StatementId(2)).cloned().unwrap();

	rows.push(Row::new(3, "a = ("));
	let resolution = resolver.update(&mut rows, Change::Edited(StatementId(3)));

	assert!(label(&rows, 3).is_error());
	assert_eq!(label(&rows, 2), Label::value("f(x) = x/3"));
	assert_eq!(resolution.reparsed.into_iter().collect::<Vec<_>>(), vec![StatementId(3)]);
	assert!(Rc::ptr_eq(&before, resolver.binding(StatementId(2)).unwrap()));
}

#[test]
fn edits_propagate_to_dependents() {
	let context = Context::default();
	let mut resolver = Resolver::new(&context);
	let mut rows = rows(&["a = 2", "b = a + 1", "y = b x", "z = x y"]);
	resolver.update(&mut rows, Change::Reset);
	assert_eq!(label(&rows, 3), Label::none("y = 3*x"));
	let surface = resolver.binding(StatementId(4)).cloned().unwrap();

	edit(&mut rows, 1, "a = 5");
	let resolution = resolver.update(&mut rows, Change::Edited(StatementId(1)));

	assert_eq!(label(&rows, 2), Label::value("b = 6"));
	assert_eq!(label(&rows, 3), Label::none("y = 6*x"));
	assert!(resolution.reparsed.contains(&StatementId(3)));
	assert!(!resolution.reparsed.contains(&StatementId(4)));
	assert!(Rc::ptr_eq(&surface, resolver.binding(StatementId(4)).unwrap()));
}

#[test]
fn removed_declaration_unbinds_dependents() {
	let context = Context::default();
	let mut resolver = Resolver::new(&context);
	let mut rows = rows(&["a = 2", "y = a x"]);
	resolver.update(&mut rows, Change::Reset);

	edit(&mut rows, 1, "b = 2");
	resolver.update(&mut rows, Change::Edited(StatementId(1)));
	assert_eq!(label(&rows, 2), Label::error("Unbound: a"));

	rows.remove(0);
	let resolution = resolver.update(&mut rows, Change::Edited(StatementId(2)));
	assert_eq!(label(&rows, 2), Label::error("Unbound: a"));
	assert!(resolver.outcome(StatementId(1)).is_none());
	assert!(resolution.plots.is_empty());
}

#[test]
fn wrong_argument_count_is_reported() {
	let context = Context::default();
	let mut resolver = Resolver::new(&context);
	let mut rows = rows(&["g(a, b) = a + b", "y = g(x)", "c = 2", "c(1)"]);
	let resolution = resolver.update(&mut rows, Change::Reset);

	assert_eq!(label(&rows, 2), Label::error("`g` expects 2 argument(s), got 1"));
	assert_eq!(label(&rows, 4), Label::error("`c` is a variable, not a function"));
	assert!(resolution.plots.is_empty());
}

#[test]
fn cycles_are_unresolvable() {
	let context = Context::default();
	let mut resolver = Resolver::new(&context);
	let mut rows = rows(&["a = b", "b = a", "c = 1"]);
	resolver.update(&mut rows, Change::Reset);

	assert_eq!(label(&rows, 1), Label::error("Unresolvable."));
	assert_eq!(label(&rows, 2), Label::error("Unresolvable."));
	assert_eq!(label(&rows, 3), Label::value("c = 1"));
}

#[test]
fn duplicates_poison_the_name() {
	let context = Context::default();
	let mut resolver = Resolver::new(&context);
	let mut rows = rows(&["c = 1", "c = 2", "y = c x"]);
	resolver.update(&mut rows, Change::Reset);

	assert_eq!(label(&rows, 1), Label::error("multiple definitions of `c`"));
	assert_eq!(label(&rows, 2), Label::error("multiple definitions of `c`"));
	assert_eq!(label(&rows, 3), Label::error("Unbound: c"));

	edit(&mut rows, 2, "d = 2");
	let resolution = resolver.update(&mut rows, Change::Edited(StatementId(2)));
	assert_eq!(label(&rows, 1), Label::value("c = 1"));
	assert_eq!(label(&rows, 2), Label::value("d = 2"));
	assert_eq!(label(&rows, 3), Label::none("y = x"));
	assert_eq!(resolution.plots.len(), 1);
}

#[test]
fn duplicate_added_later() {
	let context = Context::default();
	let mut resolver = Resolver::new(&context);
	let mut rows = rows(&["c = 1", "y = c x"]);
	resolver.update(&mut rows, Change::Reset);

	rows.push(Row::new(3, "c = 5"));
	resolver.update(&mut rows, Change::Edited(StatementId(3)));
	assert_eq!(label(&rows, 1), Label::error("multiple definitions of `c`"));
	assert_eq!(label(&rows, 3), Label::error("multiple definitions of `c`"));
	assert_eq!(label(&rows, 2), Label::error("Unbound: c"));
}

#[test]
fn unbound_calls_are_not_plotted() {
	let context = Context::default();
	let mut resolver = Resolver::new(&context);
	let mut rows = rows(&["f(x)", "y = x"]);
	let resolution = resolver.update(&mut rows, Change::Reset);

	assert_eq!(label(&rows, 1), Label::error("Unbound: f"));
	assert_eq!(resolution.plots.len(), 1);
	assert_eq!(resolution.plots[0].binding.owner, StatementId(2));
}

#[test]
fn values_and_truths() {
	let context = Context::default();
	let mut resolver = Resolver::new(&context);
	let mut rows = rows(&["x^2 = 4", "1 < 2", "a = 2", "a > 3"]);
	let resolution = resolver.update(&mut rows, Change::Reset);

	assert_eq!(label(&rows, 1), Label::value("x = -2, 2"));
	assert_eq!(label(&rows, 2), Label::value("true"));
	assert_eq!(label(&rows, 4), Label::value("false"));
	assert_eq!(resolver.binding(StatementId(1)).unwrap().split().len(), 2);
	assert!(resolution.plots.is_empty());
}

#[test]
fn plot_flags_and_colours() {
	let context = Context::default();
	let mut resolver = Resolver::new(&context);
	let mut rows = rows(&["y = x", "z = x y", "z^2 = x^2 + y^2", "a = 1"]);
	rows[0].hidden = true;
	rows[1].contoured = true;
	let resolution = resolver.update(&mut rows, Change::Reset);

	assert_eq!(label(&rows, 1), Label::none("y = x"));
	assert_eq!(resolution.plots.len(), 2);
	assert!(resolution.plots[0].contoured);
	assert_eq!(resolution.plots[1].binding.split().len(), 2);

	assert!(rows[..3].iter().all(|row| row.colour.is_some()));
	assert_eq!(rows[3].colour, None);
	assert_eq!(rows[1].colour, Some(context.palette.pick(1)));

	rows[0].cancelled = true;
	rows[0].hidden = false;
	let colours: Vec<_> = rows.iter().map(|row| row.colour).collect();
	let resolution = resolver.update(&mut rows, Change::Edited(StatementId(1)));
	assert_eq!(resolution.plots.len(), 2);
	assert_eq!(rows.iter().map(|row| row.colour).collect::<Vec<_>>(), colours);
}

#[test]
fn reset_is_idempotent() {
	let context = Context::default();
	let mut resolver = Resolver::new(&context);
	let mut rows = rows(&["a = 2", "f(t) = a t", "(f(t), t^2)", "y = f(x) + 1", "c = 1", "c = 2", "q = ("]);

	let first = resolver.update(&mut rows, Change::Reset);
	let first_labels = labels(&rows);
	let second = resolver.update(&mut rows, Change::Reset);

	assert_eq!(labels(&rows), first_labels);
	let signatures = |resolution: &Resolution| {
		resolution.plots.iter().map(|plot| plot.binding.get_signature()).collect::<Vec<_>>()
	};
	assert_eq!(signatures(&first), signatures(&second));
}

const POOL: &[&str] = &[
	"a = 2",
	"a = 3",
	"b = a + 1",
	"c = b^2",
	"y = a x + b",
	"z = c x y",
	"f(x) = x^2 + a",
	"y = f(x)",
	"x^2 = b",
	"a = b",
	"q = (",
	"(cos(t), a sin(t))",
	"x^2 + y^2 = c",
	"g(x) = f(x) - 1",
];

proptest! {
	#[test]
	fn incremental_matches_full_resolution(
		initial in prop::collection::vec(0..POOL.len(), 1..7),
		target in 0usize..7,
		replacement in 0..POOL.len(),
	) {
		let context = Context::default();
		let texts: Vec<&str> = initial.iter().map(|i| POOL[*i]).collect();
		let target = (target % texts.len()) as u32 + 1;

		let mut incremental = rows(&texts);
		let mut resolver = Resolver::new(&context);
		resolver.update(&mut incremental, Change::Reset);
		edit(&mut incremental, target, POOL[replacement]);
		resolver.update(&mut incremental, Change::Edited(StatementId(target)));

		let mut full = rows(&texts);
		edit(&mut full, target, POOL[replacement]);
		Resolver::new(&context).update(&mut full, Change::Reset);

		prop_assert_eq!(labels(&incremental), labels(&full));
	}
}
