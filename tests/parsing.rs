use helix::expr::*;
use helix::number::Number;
use helix::parsing::*;
use helix::SymbolTable;

fn expr(text: &str) -> Expression {
	parse_expression(text, &SymbolTable::default()).unwrap()
}

fn term(text: &str) -> Term {
	parse(text, &SymbolTable::default()).unwrap()
}

fn error(text: &str) -> ParseError {
	parse(text, &SymbolTable::default()).unwrap_err()
}

macro_rules! same {
	($a:expr, $b:expr) => {
		assert_eq!(expr($a), expr($b));
	};
}

#[test]
fn implicit_multiplication() {
	same!("2x", "2*x");
	same!("x y", "x*y");
	same!("2 x y", "2*x*y");
	same!("x(y+1)", "x*(y+1)");
	same!("2 sin(x)", "2*sin(x)");
}

#[test]
fn precedence() {
	same!("a^b^c", "a^(b^c)");
	same!("a**b", "a^b");
	same!("-x^2", "-(x^2)");
	same!("sin^2(x)", "sin(x)^2");
	same!("a + b*c", "a + (b*c)");
}

#[test]
fn names() {
	assert_eq!(expr("x"), Expression::reserved(Reserved::X));
	assert_eq!(expr("t"), Expression::reserved(Reserved::T));
	assert_eq!(expr("abc"), Expression::symbol("abc"));
	assert_eq!(expr("α"), Expression::symbol("α"));
	assert_eq!(expr("pi"), Expression(ExpressionMeta::Constant { name: "pi".to_string() }));
	assert_eq!(expr("1.5"), Expression::number(Number::rational(3, 2)));
	assert!(matches!(expr("sin(x)").0, ExpressionMeta::Function { function: Builtin::Sin, .. }));
	assert!(matches!(expr("f(x, y)").0, ExpressionMeta::Call { ref name, ref args } if name == "f" && args.len() == 2));
}

#[test]
fn relations() {
	assert_eq!(term("x == 1"), term("x = 1"));
	assert_eq!(term("1 ≤ x"), term("1 <= x"));
	assert_eq!(term("y ≥ 2"), term("y >= 2"));

	match term("0 < x <= 1") {
		Term::Relation(atoms) => {
			assert_eq!(atoms.len(), 2);
			assert_eq!(atoms[0].op, RelOp::Lt);
			assert_eq!(atoms[1].op, RelOp::Le);
			assert_eq!(atoms[0].right, atoms[1].left);
		},
		other => panic!("{:?}", other),
	}
	assert!(matches!(term("a < b = c"), Term::Relation(atoms) if atoms.len() == 2));
}

#[test]
fn tuples() {
	assert!(matches!(term("cos(t), sin(t)"), Term::Tuple(items) if items.len() == 2));
	assert!(matches!(term("(cos(t), sin(t), t)"), Term::Tuple(items) if items.len() == 3));
	assert!(matches!(term("x + 1"), Term::Expression(_)));
}

#[test]
fn errors() {
	assert_eq!(error(""), ParseError::Empty);
	assert_eq!(error("   "), ParseError::Empty);
	assert!(matches!(error("x +"), ParseError::Syntax { .. }));
	assert!(matches!(error("a = ("), ParseError::Syntax { .. }));
	assert!(matches!(error("a < b < c < d"), ParseError::TooManyRelations { .. }));
	assert!(matches!(error("a < b > c"), ParseError::InvalidStructure { .. }));
	assert!(matches!(error("x != 1"), ParseError::InvalidStructure { .. }));
	assert!(matches!(error("x ≠ 1"), ParseError::InvalidStructure { .. }));
	assert!(matches!(error("x > 1 & y < 2"), ParseError::InvalidStructure { .. }));
	assert!(matches!(error("(1, 2, 3, 4)"), ParseError::InvalidStructure { .. }));
	assert!(matches!(error("sin(1, 2)"), ParseError::Arity { found: 2, .. }));
}

#[test]
fn error_spans() {
	let text = "a < b < c < d";
	let span = error(text).span().cloned().unwrap();
	assert_eq!(&text[span.0], "<");

	let text = "y = sin(x, 1)";
	let span = error(text).span().cloned().unwrap();
	assert_eq!(&text[span.0], "sin(x, 1)");
}
