use crate::algebra::{evaluate_operators, simplify};
use crate::expr::*;
use crate::statement::StatementId;
use crate::utils::apply::*;
use itertools::Itertools;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {} {}", self.0, self.1, self.2)
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PlotKind {
	/// `y = f(x)`.
	Line2D,
	/// Relation in `x` and `y` that can not be solved for `y`.
	Implicit2D,
	/// `(f(t), g(t))`.
	Parametric2D,
	/// `z = f(x, y)`.
	Surface,
	/// `(f(t), g(t), h(t))`.
	Parametric3D,
	/// `(f(u, v), g(u, v), h(u, v))`.
	ParametricSurface,
}

impl PlotKind {
	/// Number of axes the plotting side needs.
	pub fn dimension(self) -> u8 {
		match self {
			PlotKind::Line2D | PlotKind::Implicit2D | PlotKind::Parametric2D => 2,
			PlotKind::Surface | PlotKind::Parametric3D | PlotKind::ParametricSurface => 3,
		}
	}

	pub fn is_surface(self) -> bool {
		matches!(self, PlotKind::Surface | PlotKind::ParametricSurface)
	}

	pub fn name(self) -> &'static str {
		match self {
			PlotKind::Line2D => "line",
			PlotKind::Implicit2D => "implicit",
			PlotKind::Parametric2D => "parametric line",
			PlotKind::Surface => "surface",
			PlotKind::Parametric3D => "parametric curve",
			PlotKind::ParametricSurface => "parametric surface",
		}
	}
}

/// What a binding is bound to.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Name {
	/// `a = 3`.
	Variable(String),
	/// `f(x, y) = x*y`.
	Function {
		name: String,
		params: Vec<Variable>,
	},
	/// Solved coordinate: `y` of a line, `z` of a surface, `x` of a labelled value.
	Coordinate(Reserved),
	/// Parameters of a parametric tuple.
	Parametric(Vec<Reserved>),
}

impl Name {
	/// Name other statements can refer to.
	pub fn declared(&self) -> Option<&str> {
		match self {
			Name::Variable(name) | Name::Function { name, .. } => Some(name),
			Name::Coordinate(_) | Name::Parametric(_) => None,
		}
	}
}

impl fmt::Display for Name {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Name::Variable(name) => write!(f, "{}", name),
			Name::Function { name, params } => write!(f, "{}({})", name, params.iter().join(", ")),
			Name::Coordinate(r) => write!(f, "{}", r.name()),
			Name::Parametric(params) => write!(f, "({})", params.iter().map(|p| p.name()).join(", ")),
		}
	}
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Body {
	Expression(Expression),
	/// Components of a parametric statement.
	Tuple(Vec<Expression>),
	/// Branches of an isolated coordinate, fanned out by `Binding::split`.
	Solutions(Vec<Expression>),
}

impl Body {
	pub fn expressions(&self) -> &[Expression] {
		match self {
			Body::Expression(e) => std::slice::from_ref(e),
			Body::Tuple(items) | Body::Solutions(items) => items,
		}
	}

	pub fn try_map<E, F>(self, mut f: F) -> Result<Body, E>
	where
		F: FnMut(Expression) -> Result<Expression, E>,
	{
		Ok(match self {
			Body::Expression(e) => Body::Expression(f(e)?),
			Body::Tuple(items) => Body::Tuple(items.into_iter().map(f).collect::<Result<_, _>>()?),
			Body::Solutions(items) => Body::Solutions(items.into_iter().map(f).collect::<Result<_, _>>()?),
		})
	}
}

impl fmt::Display for Body {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Body::Expression(Expression(ExpressionMeta::Lambda { body, .. })) => write!(f, "{}", body),
			Body::Expression(e) => write!(f, "{}", e),
			Body::Tuple(items) => write!(f, "({})", items.iter().join(", ")),
			Body::Solutions(items) => write!(f, "{}", items.iter().join(", ")),
		}
	}
}

/// Content hash, used by the plotting side to reuse cached geometry across passes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Signature(pub u64);

/// Classified statement, possibly with declarations of other statements substituted into its body.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Binding {
	/// `None` for relations without a declared identifier.
	pub name: Option<Name>,
	pub body: Body,
	pub plot_kind: Option<PlotKind>,
	/// Every name ever substituted into `body`. Only grows.
	pub dependencies: BTreeSet<String>,
	pub owner: StatementId,
	pub colour: Option<Rgb>,
}

impl Binding {
	pub fn new(name: Option<Name>, body: Body, plot_kind: Option<PlotKind>, owner: StatementId) -> Self {
		Binding {
			name,
			body,
			plot_kind,
			dependencies: BTreeSet::new(),
			owner,
			colour: None,
		}
	}

	/// Variable or function definition. Never plotted.
	pub fn is_declaration(&self) -> bool {
		self.plot_kind.is_none() && self.declared_name().is_some()
	}

	pub fn declared_name(&self) -> Option<&str> {
		self.name.as_ref().and_then(Name::declared)
	}

	/// Free user names in the body, function applications included.
	pub fn free_names(&self) -> BTreeSet<String> {
		self.body.expressions().iter().flat_map(Expression::free_names).collect()
	}

	/// No derivative or integral was left unevaluated.
	pub fn is_valid(&self) -> bool {
		!self.body.expressions().iter().any(Expression::has_operators)
	}

	/// Substitutes the declaration `source` into this binding. The name is recorded in `dependencies` only if the body
	/// actually referred to it.
	pub fn substitute(&self, source: &Binding) -> Result<Binding, SubstituteError> {
		let name = match source.declared_name() {
			Some(name) if self.free_names().contains(name) => name,
			_ => return Ok(self.clone()),
		};

		let body = match (&source.name, &source.body) {
			(Some(Name::Function { params, .. }), Body::Expression(Expression(ExpressionMeta::Lambda { body, .. }))) => {
				self.body.clone().try_map(|e| e.apply_function(name, params, body))?
			},
			(_, Body::Expression(value)) => self.body.clone().try_map(|e| e.apply_variable(name, value))?,
			_ => return Err(SubstituteError::NotAVariable(name.to_string())),
		};

		Ok(Binding {
			body: body.try_map(|e| Ok::<_, SubstituteError>(simplify(evaluate_operators(e))))?,
			dependencies: self.dependencies.clone().also_mut(|d| { d.insert(name.to_string()); }),
			..self.clone()
		})
	}

	/// One binding per branch of a solution list, the binding itself otherwise.
	pub fn split(&self) -> Vec<Binding> {
		match &self.body {
			Body::Solutions(items) => items.iter()
				.map(|item| Binding { body: Body::Expression(item.clone()), ..self.clone() })
				.collect(),
			_ => vec![self.clone()],
		}
	}

	pub fn get_signature(&self) -> Signature {
		let mut hasher = DefaultHasher::new();
		self.name.hash(&mut hasher);
		self.body.hash(&mut hasher);
		self.plot_kind.hash(&mut hasher);
		self.colour.hash(&mut hasher);
		self.owner.hash(&mut hasher);
		Signature(hasher.finish())
	}
}

impl fmt::Display for Binding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.name {
			Some(name) => write!(f, "{} = {}", name, self.body),
			None => write!(f, "{}", self.body),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::number::Number;

	fn variable(name: &str, value: Expression) -> Binding {
		Binding::new(Some(Name::Variable(name.to_string())), Body::Expression(value), None, StatementId(0))
	}

	#[test]
	fn substitution_records_dependencies() {
		let target = Binding::new(
			Some(Name::Coordinate(Reserved::Y)),
			Body::Expression(Expression::product(vec![Expression::symbol("a"), Expression::reserved(Reserved::X)])),
			Some(PlotKind::Line2D),
			StatementId(1),
		);
		let resolved = target.substitute(&variable("a", Expression::int(2))).unwrap();
		assert_eq!(resolved.to_string(), "y = 2*x");
		assert!(resolved.dependencies.contains("a"));

		let untouched = resolved.substitute(&variable("b", Expression::int(5))).unwrap();
		assert!(!untouched.dependencies.contains("b"));
	}

	#[test]
	fn split_fans_out_solutions() {
		let binding = Binding::new(
			Some(Name::Coordinate(Reserved::X)),
			Body::Solutions(vec![Expression::int(-2), Expression::int(2)]),
			None,
			StatementId(0),
		);
		let parts = binding.split();
		assert_eq!(parts.len(), 2);
		assert_eq!(parts[1].body, Body::Expression(Expression::number(Number::int(2))));
		assert_ne!(parts[0].get_signature(), parts[1].get_signature());
	}
}
