use helix::expr::Reserved;
use helix::*;

fn binding(text: &str) -> Binding {
	interpret(text, StatementId(1), &SymbolTable::default()).unwrap()
}

fn error(text: &str) -> ClassifyError {
	match interpret(text, StatementId(1), &SymbolTable::default()) {
		Err(BindingError::Classify(err)) => err,
		other => panic!("`{}` classified as {:?}", text, other),
	}
}

#[test]
fn declarations() {
	let a = binding("a = 3");
	assert_eq!(a.name, Some(Name::Variable("a".to_string())));
	assert!(a.is_declaration());
	assert_eq!(a.to_string(), "a = 3");

	let f = binding("f(x) = x^2");
	assert!(f.is_declaration());
	assert_eq!(f.declared_name(), Some("f"));
	assert_eq!(f.to_string(), "f(x) = x^2");

	// solved for the only free name
	assert_eq!(binding("3a = 1").to_string(), "a = 1/3");
	assert_eq!(binding("b + 1 = 2b").to_string(), "b = 1");
}

#[test]
fn plots() {
	let cases = [
		("y = 2x + 1", PlotKind::Line2D),
		("2x + 1", PlotKind::Line2D),
		("sin(x)", PlotKind::Line2D),
		("x + y = 1", PlotKind::Line2D),
		("x^2 + y^2 = 1", PlotKind::Implicit2D),
		("x < y", PlotKind::Implicit2D),
		("z = x y", PlotKind::Surface),
		("x y", PlotKind::Surface),
		("z^2 = x^2 + y^2", PlotKind::Surface),
		("(cos(t), sin(t))", PlotKind::Parametric2D),
		("cos(t), sin(t), t", PlotKind::Parametric3D),
		("(u, v, u v)", PlotKind::ParametricSurface),
	];
	for (text, kind) in &cases {
		assert_eq!(binding(text).plot_kind, Some(*kind), "{}", text);
	}

	assert_eq!(binding("exp(y) = x").plot_kind, Some(PlotKind::Line2D));
	assert_eq!(binding("y = 2x + 1").to_string(), "y = 2*x + 1");
	assert_eq!(binding("x + y = 1").name, Some(Name::Coordinate(Reserved::Y)));
	assert_eq!(binding("x^2 + y^2 = 1").name, None);
}

#[test]
fn values() {
	let truth = binding("1 < 2");
	assert_eq!(truth.plot_kind, None);
	assert_eq!(truth.name, None);

	let roots = binding("x^2 = 4");
	assert_eq!(roots.plot_kind, None);
	assert_eq!(roots.name, Some(Name::Coordinate(Reserved::X)));
	assert_eq!(roots.to_string(), "x = -2, 2");
	assert_eq!(roots.split().len(), 2);

	let cone = binding("z^2 = x^2 + y^2");
	assert!(matches!(&cone.body, Body::Solutions(items) if items.len() == 2));
}

#[test]
fn operators() {
	assert_eq!(binding("y = diff(x^3, x)").to_string(), "y = 3*x^2");
	assert_eq!(binding("y = diff(x^3, x, 2)").to_string(), "y = 6*x");
	assert_eq!(binding("a = integrate(2x, x, 0, 1)").to_string(), "a = 1");
	assert_eq!(binding("y = integrate(cos(x), x)").to_string(), "y = sin(x)");
	assert!(matches!(error("y = diff(x^2, 0)"), ClassifyError::BadOperator(_)));
	assert!(matches!(error("y = integrate(x, x, 1)"), ClassifyError::BadOperator(_)));
}

#[test]
fn extreme_numbers() {
	assert_eq!(binding("y = (-4611686018427387904) * 2").plot_kind, Some(PlotKind::Line2D));
	assert_ne!(binding("x^4294967297 = 8").to_string(), "x = 8");
	assert_eq!(binding("a = diff(5, x, 1000)").to_string(), "a = 0");
	assert!(matches!(error("a = diff(5, x, 400000000)"), ClassifyError::BadOperator(_)));
}

#[test]
fn errors() {
	assert_eq!(error("(x, t)"), ClassifyError::MixedCoordinates);
	assert_eq!(error("(t, u)"), ClassifyError::ParametricShape { components: 2, parameters: 2 });
	assert_eq!(error("t + 1"), ClassifyError::ParametricShape { components: 1, parameters: 1 });
	assert_eq!(error("f(x, x) = x"), ClassifyError::DuplicateParameter("x".to_string()));
	assert_eq!(error("f(2) = 1"), ClassifyError::InvalidParameter("2".to_string()));
	assert_eq!(error("f(x) = x + y"), ClassifyError::CoordinateInDeclaration("y".to_string()));
	assert_eq!(error("pi = 3"), ClassifyError::ReservedNameCollision("pi".to_string()));
	assert_eq!(error("sin = 3"), ClassifyError::ReservedNameCollision("sin".to_string()));
	assert_eq!(error("t = 3"), ClassifyError::ReservedNameCollision("t".to_string()));
	assert_eq!(error("u = x"), ClassifyError::ReservedNameCollision("u".to_string()));
	assert_eq!(error("sin(x) = x^2"), ClassifyError::ReservedNameCollision("sin".to_string()));
	assert_eq!(error("exp(a) = 2a"), ClassifyError::ReservedNameCollision("exp".to_string()));
	assert_eq!(error("a + b = 1"), ClassifyError::TooManyFreeVariables(vec!["a".to_string(), "b".to_string()]));
	assert_eq!(error("a^2 = -1"), ClassifyError::NoSolutions("a".to_string()));
	assert_eq!(error("sin(x) + x = 1"), ClassifyError::Unsolvable("x".to_string()));
	assert_eq!(error("z < x"), ClassifyError::Unsolvable("z".to_string()));
	assert_eq!(error("x z"), ClassifyError::Unsolvable("z".to_string()));
}

#[test]
fn parse_errors_pass_through() {
	let err = interpret("a = (", StatementId(1), &SymbolTable::default()).unwrap_err();
	assert!(matches!(err, BindingError::Parse(_)));
	assert!(err.label().is_error());
}
