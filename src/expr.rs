use crate::number::Number;
use crate::utils::apply::*;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::fmt;
use thiserror::Error;

/// Coordinate and parametric names that cannot be declared by the user.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Reserved {
	X,
	Y,
	Z,
	T,
	U,
	V,
}

impl Reserved {
	/// Horizontal, vertical and depth axes.
	pub const COORDINATES: [Reserved; 3] = [Reserved::X, Reserved::Y, Reserved::Z];
	pub const PARAMETERS: [Reserved; 3] = [Reserved::T, Reserved::U, Reserved::V];

	pub fn name(self) -> &'static str {
		match self {
			Reserved::X => "x",
			Reserved::Y => "y",
			Reserved::Z => "z",
			Reserved::T => "t",
			Reserved::U => "u",
			Reserved::V => "v",
		}
	}

	pub fn from_name(name: &str) -> Option<Self> {
		Self::COORDINATES.iter().chain(Self::PARAMETERS.iter()).copied().find(|r| r.name() == name)
	}

	pub fn is_coordinate(self) -> bool {
		matches!(self, Reserved::X | Reserved::Y | Reserved::Z)
	}
}

/// Named symbol of an expression: either one of the reserved triples or a user name.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Variable {
	Reserved(Reserved),
	Free(String),
}

impl Variable {
	pub fn free(name: &str) -> Self {
		Variable::Free(name.to_string())
	}

	pub fn name(&self) -> &str {
		match self {
			Variable::Reserved(r) => r.name(),
			Variable::Free(name) => name,
		}
	}
}

impl fmt::Display for Variable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Built-in functions known to the symbol table.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Builtin {
	Sin,
	Cos,
	Tan,
	Asin,
	Acos,
	Atan,
	Sinh,
	Cosh,
	Tanh,
	Exp,
	Log,
	Sqrt,
	Abs,
	Diff,
	Integrate,
}

impl Builtin {
	pub fn name(self) -> &'static str {
		match self {
			Builtin::Sin => "sin",
			Builtin::Cos => "cos",
			Builtin::Tan => "tan",
			Builtin::Asin => "asin",
			Builtin::Acos => "acos",
			Builtin::Atan => "atan",
			Builtin::Sinh => "sinh",
			Builtin::Cosh => "cosh",
			Builtin::Tanh => "tanh",
			Builtin::Exp => "exp",
			Builtin::Log => "log",
			Builtin::Sqrt => "sqrt",
			Builtin::Abs => "abs",
			Builtin::Diff => "diff",
			Builtin::Integrate => "integrate",
		}
	}

	/// Accepted argument counts, inclusive.
	pub fn arity(self) -> (usize, usize) {
		match self {
			Builtin::Diff => (2, 3),
			Builtin::Integrate => (2, 4),
			_ => (1, 1),
		}
	}

	/// Calls that are rewritten into derivative/integral operators instead of being evaluated.
	pub fn is_operator(self) -> bool {
		matches!(self, Builtin::Diff | Builtin::Integrate)
	}

	pub fn eval(self, x: f64) -> Option<f64> {
		Some(match self {
			Builtin::Sin => x.sin(),
			Builtin::Cos => x.cos(),
			Builtin::Tan => x.tan(),
			Builtin::Asin => x.asin(),
			Builtin::Acos => x.acos(),
			Builtin::Atan => x.atan(),
			Builtin::Sinh => x.sinh(),
			Builtin::Cosh => x.cosh(),
			Builtin::Tanh => x.tanh(),
			Builtin::Exp => x.exp(),
			Builtin::Log => x.ln(),
			Builtin::Sqrt => x.sqrt(),
			Builtin::Abs => x.abs(),
			Builtin::Diff | Builtin::Integrate => return None,
		})
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RelOp {
	Eq,
	Lt,
	Le,
	Gt,
	Ge,
}

/// Direction of a comparison inside a chain. Equality is neutral.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
	Ascending,
	Descending,
	Neutral,
}

impl RelOp {
	pub fn direction(self) -> Direction {
		match self {
			RelOp::Lt | RelOp::Le => Direction::Ascending,
			RelOp::Gt | RelOp::Ge => Direction::Descending,
			RelOp::Eq => Direction::Neutral,
		}
	}

	pub fn holds(self, left: f64, right: f64) -> bool {
		match self {
			RelOp::Eq => left == right,
			RelOp::Lt => left < right,
			RelOp::Le => left <= right,
			RelOp::Gt => left > right,
			RelOp::Ge => left >= right,
		}
	}

	pub fn symbol(self) -> &'static str {
		match self {
			RelOp::Eq => "=",
			RelOp::Lt => "<",
			RelOp::Le => "<=",
			RelOp::Gt => ">",
			RelOp::Ge => ">=",
		}
	}
}

/// Generic expression node. `Arg` is either `Expression` or the span-carrying `ExpressionParsing`, so the same shape serves both parsing and the engine.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ExpressionMeta<Arg> {
	/// `1`, `0.25`.
	Literal {
		value: Number,
	},

	/// `x`, `a`, `radius`.
	Symbol {
		variable: Variable,
	},

	/// `pi`, `e`. Replaced by its numeric value during post-processing.
	Constant {
		name: String,
	},

	/// `sin(x)`.
	Function {
		function: Builtin,
		args: Vec<Arg>,
	},

	/// Application of a user function, `f(x, 2)`.
	Call {
		name: String,
		args: Vec<Arg>,
	},

	Sum {
		terms: Vec<Arg>,
	},

	Product {
		factors: Vec<Arg>,
	},

	Power {
		base: Box<Arg>,
		exponent: Box<Arg>,
	},

	/// One comparison atom, `left op right`.
	Relation {
		op: RelOp,
		left: Box<Arg>,
		right: Box<Arg>,
	},

	/// Conjunction of the atoms of a decomposed relation chain, `a < b <= c`.
	Chain {
		links: Vec<Arg>,
	},

	/// Parametric components, `(cos(t), sin(t))`.
	Tuple {
		items: Vec<Arg>,
	},

	/// Body of a function declaration, `(x, y) -> x*y`.
	Lambda {
		params: Vec<Variable>,
		body: Box<Arg>,
	},

	Derivative {
		body: Box<Arg>,
		variable: Variable,
		order: u32,
	},

	/// Indefinite when `bounds` is empty, definite when it holds `[lower, upper]`.
	Integral {
		body: Box<Arg>,
		variable: Variable,
		bounds: Vec<Arg>,
	},
}

impl<Arg> ExpressionMeta<Arg> {
	/// Rebuilds the node with every direct child mapped through `f`.
	pub fn try_map_args<B, E, F>(self, mut f: F) -> Result<ExpressionMeta<B>, E>
	where
		F: FnMut(Arg) -> Result<B, E>,
	{
		use ExpressionMeta::*;

		Ok(match self {
			Literal { value } => Literal { value },
			Symbol { variable } => Symbol { variable },
			Constant { name } => Constant { name },
			Function { function, args } => Function { function, args: map_vec(args, &mut f)? },
			Call { name, args } => Call { name, args: map_vec(args, &mut f)? },
			Sum { terms } => Sum { terms: map_vec(terms, &mut f)? },
			Product { factors } => Product { factors: map_vec(factors, &mut f)? },
			Power { base, exponent } => Power { base: map_box(base, &mut f)?, exponent: map_box(exponent, &mut f)? },
			Relation { op, left, right } => Relation { op, left: map_box(left, &mut f)?, right: map_box(right, &mut f)? },
			Chain { links } => Chain { links: map_vec(links, &mut f)? },
			Tuple { items } => Tuple { items: map_vec(items, &mut f)? },
			Lambda { params, body } => Lambda { params, body: map_box(body, &mut f)? },
			Derivative { body, variable, order } => Derivative { body: map_box(body, &mut f)?, variable, order },
			Integral { body, variable, bounds } => Integral { body: map_box(body, &mut f)?, variable, bounds: map_vec(bounds, &mut f)? },
		})
	}

	pub fn map_args<B, F: FnMut(Arg) -> B>(self, mut f: F) -> ExpressionMeta<B> {
		match self.try_map_args(|arg| Ok::<_, Infallible>(f(arg))) {
			Ok(node) => node,
			Err(never) => match never {},
		}
	}

	pub fn args(&self) -> Vec<&Arg> {
		use ExpressionMeta::*;

		match self {
			Literal { .. } | Symbol { .. } | Constant { .. } => vec![],
			Function { args, .. } | Call { args, .. } => args.iter().collect(),
			Sum { terms } => terms.iter().collect(),
			Product { factors } => factors.iter().collect(),
			Chain { links } => links.iter().collect(),
			Tuple { items } => items.iter().collect(),
			Power { base, exponent } => vec![&**base, &**exponent],
			Relation { left, right, .. } => vec![&**left, &**right],
			Lambda { body, .. } | Derivative { body, .. } => vec![&**body],
			Integral { body, bounds, .. } => std::iter::once(&**body).chain(bounds.iter()).collect(),
		}
	}
}

fn map_vec<A, B, E>(args: Vec<A>, f: &mut impl FnMut(A) -> Result<B, E>) -> Result<Vec<B>, E> {
	args.into_iter().map(|arg| f(arg)).collect()
}

fn map_box<A, B, E>(arg: Box<A>, f: &mut impl FnMut(A) -> Result<B, E>) -> Result<Box<B>, E> {
	f(*arg).map(Box::new)
}

/// Expression without any additional information.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Expression(pub ExpressionMeta<Expression>);

/// Failure while substituting a declaration into another body.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SubstituteError {
	#[error("`{name}` expects {expected} argument(s), got {found}")]
	Arity {
		name: String,
		expected: usize,
		found: usize,
	},
	#[error("`{0}` is a variable, not a function")]
	NotAFunction(String),
	#[error("`{0}` is a function, not a variable")]
	NotAVariable(String),
}

impl Expression {
	pub fn number(value: Number) -> Self {
		ExpressionMeta::Literal { value }.apply(Expression)
	}

	pub fn int(value: i64) -> Self {
		Self::number(Number::int(value))
	}

	pub fn variable(variable: Variable) -> Self {
		ExpressionMeta::Symbol { variable }.apply(Expression)
	}

	pub fn reserved(reserved: Reserved) -> Self {
		Self::variable(Variable::Reserved(reserved))
	}

	pub fn symbol(name: &str) -> Self {
		Self::variable(Variable::free(name))
	}

	pub fn function(function: Builtin, arg: Expression) -> Self {
		ExpressionMeta::Function { function, args: vec![arg] }.apply(Expression)
	}

	pub fn call(name: &str, args: Vec<Expression>) -> Self {
		ExpressionMeta::Call { name: name.to_string(), args }.apply(Expression)
	}

	pub fn sum(mut terms: Vec<Expression>) -> Self {
		if terms.len() > 1 {
			ExpressionMeta::Sum { terms }.apply(Expression)
		} else {
			terms.pop().unwrap_or_else(|| Self::int(0))
		}
	}

	pub fn product(mut factors: Vec<Expression>) -> Self {
		if factors.len() > 1 {
			ExpressionMeta::Product { factors }.apply(Expression)
		} else {
			factors.pop().unwrap_or_else(|| Self::int(1))
		}
	}

	pub fn power(base: Expression, exponent: Expression) -> Self {
		ExpressionMeta::Power { base: Box::new(base), exponent: Box::new(exponent) }.apply(Expression)
	}

	pub fn neg(expr: Expression) -> Self {
		Self::product(vec![Self::number(Number::MINUS_ONE), expr])
	}

	pub fn sub(left: Expression, right: Expression) -> Self {
		Self::sum(vec![left, Self::neg(right)])
	}

	pub fn div(left: Expression, right: Expression) -> Self {
		Self::product(vec![left, Self::power(right, Self::number(Number::MINUS_ONE))])
	}

	pub fn relation(op: RelOp, left: Expression, right: Expression) -> Self {
		ExpressionMeta::Relation { op, left: Box::new(left), right: Box::new(right) }.apply(Expression)
	}

	pub fn as_number(&self) -> Option<Number> {
		match &self.0 {
			ExpressionMeta::Literal { value } => Some(*value),
			_ => None,
		}
	}

	pub fn as_variable(&self) -> Option<&Variable> {
		match &self.0 {
			ExpressionMeta::Symbol { variable } => Some(variable),
			_ => None,
		}
	}

	pub fn is_zero(&self) -> bool {
		self.as_number().map_or(false, Number::is_zero)
	}

	/// Every variable that is not bound by a lambda or a definite integral inside this expression.
	pub fn free_variables(&self) -> BTreeSet<Variable> {
		let mut result = BTreeSet::new();
		collect_free(self, &mut result, &mut BTreeSet::new());
		result
	}

	/// Free non-reserved names, including the names of applied user functions.
	pub fn free_names(&self) -> BTreeSet<String> {
		fn calls(expr: &Expression, result: &mut BTreeSet<String>) {
			if let ExpressionMeta::Call { name, .. } = &expr.0 {
				result.insert(name.clone());
			}
			for arg in expr.0.args() {
				calls(arg, result);
			}
		}

		let mut result: BTreeSet<String> = self.free_variables()
			.into_iter()
			.filter_map(|v| match v {
				Variable::Free(name) => Some(name),
				Variable::Reserved(_) => None,
			})
			.collect();
		calls(self, &mut result);
		result
	}

	pub fn free_reserved(&self) -> BTreeSet<Reserved> {
		self.free_variables()
			.into_iter()
			.filter_map(|v| match v {
				Variable::Reserved(r) => Some(r),
				Variable::Free(_) => None,
			})
			.collect()
	}

	/// How many times `variable` occurs free.
	pub fn occurrences(&self, variable: &Variable) -> usize {
		match &self.0 {
			ExpressionMeta::Symbol { variable: v } => (v == variable) as usize,
			ExpressionMeta::Lambda { params, .. } if params.contains(variable) => 0,
			ExpressionMeta::Integral { variable: v, bounds, .. } if v == variable && !bounds.is_empty() => {
				bounds.iter().map(|b| b.occurrences(variable)).sum()
			},
			node => node.args().into_iter().map(|arg| arg.occurrences(variable)).sum(),
		}
	}

	pub fn contains(&self, variable: &Variable) -> bool {
		self.occurrences(variable) > 0
	}

	pub fn calls(&self, name: &str) -> bool {
		match &self.0 {
			ExpressionMeta::Call { name: n, .. } if n == name => true,
			node => node.args().into_iter().any(|arg| arg.calls(name)),
		}
	}

	/// Whether an unevaluated derivative or integral is left anywhere in the tree.
	pub fn has_operators(&self) -> bool {
		match &self.0 {
			ExpressionMeta::Derivative { .. } | ExpressionMeta::Integral { .. } => true,
			ExpressionMeta::Function { function, .. } if function.is_operator() => true,
			node => node.args().into_iter().any(Expression::has_operators),
		}
	}

	pub fn substitute(&self, variable: &Variable, value: &Expression) -> Expression {
		let mut map = BTreeMap::new();
		map.insert(variable.clone(), value.clone());
		self.substitute_all(&map)
	}

	/// Simultaneous substitution, respecting the variables bound by lambdas and definite integrals.
	pub fn substitute_all(&self, map: &BTreeMap<Variable, Expression>) -> Expression {
		match &self.0 {
			ExpressionMeta::Symbol { variable } => match map.get(variable) {
				Some(value) => value.clone(),
				None => self.clone(),
			},
			ExpressionMeta::Lambda { params, body } => {
				let inner: BTreeMap<_, _> = map.iter()
					.filter(|(k, _)| !params.contains(k))
					.map(|(k, v)| (k.clone(), v.clone()))
					.collect();
				ExpressionMeta::Lambda { params: params.clone(), body: Box::new(body.substitute_all(&inner)) }
					.apply(Expression)
			},
			ExpressionMeta::Integral { body, variable, bounds } if !bounds.is_empty() && map.contains_key(variable) => {
				let mut inner = map.clone();
				inner.remove(variable);
				ExpressionMeta::Integral {
					body: Box::new(body.substitute_all(&inner)),
					variable: variable.clone(),
					bounds: bounds.iter().map(|b| b.substitute_all(map)).collect(),
				}.apply(Expression)
			},
			node => node.clone().map_args(|arg| arg.substitute_all(map)).apply(Expression),
		}
	}

	/// Replaces every application of the user function `name` with `body`, its parameters bound to the call arguments.
	pub fn apply_function(&self, name: &str, params: &[Variable], body: &Expression) -> Result<Expression, SubstituteError> {
		if let ExpressionMeta::Lambda { params: own, .. } = &self.0 {
			if own.contains(&Variable::free(name)) {
				return Ok(self.clone());
			}
		}
		let node = self.0.clone().try_map_args(|arg| arg.apply_function(name, params, body))?;
		match node {
			ExpressionMeta::Call { name: n, args } if n == name => {
				if args.len() != params.len() {
					return Err(SubstituteError::Arity { name: n, expected: params.len(), found: args.len() });
				}
				let map = params.iter().cloned().zip(args).collect();
				Ok(body.substitute_all(&map))
			},
			ExpressionMeta::Symbol { variable: Variable::Free(n) } if n == name => Err(SubstituteError::NotAVariable(n)),
			node => Ok(Expression(node)),
		}
	}

	/// Substitutes the value of the variable `name`, refusing to treat it as a function.
	pub fn apply_variable(&self, name: &str, value: &Expression) -> Result<Expression, SubstituteError> {
		if self.calls(name) {
			return Err(SubstituteError::NotAFunction(name.to_string()));
		}
		Ok(self.substitute(&Variable::free(name), value))
	}

	/// Returns the expression with the sign pulled out: `(true, x)` for `-x`.
	pub fn split_sign(&self) -> (bool, Expression) {
		match &self.0 {
			ExpressionMeta::Literal { value } if value.is_negative() => (true, Expression::number(-*value)),
			ExpressionMeta::Product { factors } => match factors.first().and_then(Expression::as_number) {
				Some(c) if c.is_negative() => {
					let c = -c;
					let mut rest: Vec<Expression> = factors[1..].to_vec();
					if !c.is_one() {
						rest.insert(0, Expression::number(c));
					}
					(true, Expression::product(rest))
				},
				_ => (false, self.clone()),
			},
			_ => (false, self.clone()),
		}
	}
}

fn collect_free(expr: &Expression, result: &mut BTreeSet<Variable>, bound: &mut BTreeSet<Variable>) {
	match &expr.0 {
		ExpressionMeta::Symbol { variable } => {
			if !bound.contains(variable) {
				result.insert(variable.clone());
			}
		},
		ExpressionMeta::Lambda { params, body } => {
			let added: Vec<_> = params.iter().filter(|p| bound.insert((*p).clone())).cloned().collect();
			collect_free(body, result, bound);
			for p in added {
				bound.remove(&p);
			}
		},
		ExpressionMeta::Integral { body, variable, bounds } if !bounds.is_empty() => {
			for b in bounds {
				collect_free(b, result, bound);
			}
			let added = bound.insert(variable.clone());
			collect_free(body, result, bound);
			if added {
				bound.remove(variable);
			}
		},
		node => {
			for arg in node.args() {
				collect_free(arg, result, bound);
			}
		},
	}
}

const PREC_RELATION: u8 = 0;
const PREC_SUM: u8 = 1;
const PREC_PRODUCT: u8 = 2;
const PREC_POWER: u8 = 3;
const PREC_ATOM: u8 = 4;

impl Expression {
	fn precedence(&self) -> u8 {
		match &self.0 {
			ExpressionMeta::Literal { value } => match value {
				Number::Rational(_, 1) if !value.is_negative() => PREC_ATOM,
				Number::Float(f) if *f >= 0.0 => PREC_ATOM,
				_ => PREC_PRODUCT,
			},
			ExpressionMeta::Sum { .. } => PREC_SUM,
			ExpressionMeta::Product { .. } => PREC_PRODUCT,
			ExpressionMeta::Power { exponent, .. } => match exponent.as_number() {
				Some(e) if e.is_negative() => PREC_PRODUCT,
				_ => PREC_POWER,
			},
			ExpressionMeta::Relation { .. } | ExpressionMeta::Chain { .. } => PREC_RELATION,
			_ => PREC_ATOM,
		}
	}

	fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
		if self.precedence() < min {
			write!(f, "(")?;
			self.fmt_node(f)?;
			write!(f, ")")
		} else {
			self.fmt_node(f)
		}
	}

	fn fmt_node(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		use ExpressionMeta::*;

		match &self.0 {
			Literal { value } => write!(f, "{}", value),
			Symbol { variable } => write!(f, "{}", variable),
			Constant { name } => write!(f, "{}", name),
			Function { function, args } => write!(f, "{}({})", function.name(), args.iter().join(", ")),
			Call { name, args } => write!(f, "{}({})", name, args.iter().join(", ")),
			Sum { terms } => {
				for (index, term) in terms.iter().enumerate() {
					let (negative, magnitude) = term.split_sign();
					match (index, negative) {
						(0, false) => term.fmt_prec(f, PREC_SUM + 1)?,
						(0, true) => {
							write!(f, "-")?;
							magnitude.fmt_prec(f, PREC_PRODUCT)?;
						},
						(_, false) => {
							write!(f, " + ")?;
							term.fmt_prec(f, PREC_SUM + 1)?;
						},
						(_, true) => {
							write!(f, " - ")?;
							magnitude.fmt_prec(f, PREC_PRODUCT)?;
						},
					}
				}
				Ok(())
			},
			Product { factors } => fmt_product(factors, f),
			Power { base, exponent } => match exponent.as_number() {
				Some(e) if e == Number::rational(1, 2) => write!(f, "sqrt({})", base),
				Some(e) if e.is_negative() => fmt_product(std::slice::from_ref(self), f),
				_ => {
					base.fmt_prec(f, PREC_ATOM)?;
					write!(f, "^")?;
					exponent.fmt_prec(f, PREC_ATOM)
				},
			},
			Relation { op, left, right } => write!(f, "{} {} {}", left, op.symbol(), right),
			Chain { links } => {
				let mut previous: Option<&Expression> = None;
				for (index, link) in links.iter().enumerate() {
					match (&link.0, previous) {
						(Relation { op, left, right }, Some(prev)) if **left == *prev => {
							write!(f, " {} {}", op.symbol(), right)?;
							previous = Some(right);
						},
						(Relation { right, .. }, _) => {
							if index > 0 {
								write!(f, ", ")?;
							}
							write!(f, "{}", link)?;
							previous = Some(right);
						},
						_ => {
							write!(f, "{}", link)?;
							previous = None;
						},
					}
				}
				Ok(())
			},
			Tuple { items } => write!(f, "({})", items.iter().join(", ")),
			Lambda { params, body } => write!(f, "({}) -> {}", params.iter().join(", "), body),
			Derivative { body, variable, order } => match order {
				1 => write!(f, "diff({}, {})", body, variable),
				_ => write!(f, "diff({}, {}, {})", body, variable, order),
			},
			Integral { body, variable, bounds } => match bounds.as_slice() {
				[lower, upper] => write!(f, "integrate({}, {}, {}, {})", body, variable, lower, upper),
				_ => write!(f, "integrate({}, {})", body, variable),
			},
		}
	}
}

fn fmt_product(factors: &[Expression], f: &mut fmt::Formatter<'_>) -> fmt::Result {
	let mut coefficient = Number::ONE;
	let mut numerator = Vec::new();
	let mut denominator = Vec::new();
	for factor in factors {
		match &factor.0 {
			ExpressionMeta::Literal { value } if value.is_exact() => coefficient = coefficient * *value,
			ExpressionMeta::Power { base, exponent } => match exponent.as_number() {
				Some(e) if e.is_negative() => {
					let e = -e;
					denominator.push(if e.is_one() { (**base).clone() } else { Expression::power((**base).clone(), Expression::number(e)) });
				},
				_ => numerator.push(factor.clone()),
			},
			_ => numerator.push(factor.clone()),
		}
	}

	if coefficient.is_negative() {
		write!(f, "-")?;
		coefficient = -coefficient;
	}
	if let Number::Rational(n, d) = coefficient {
		if n != 1 || numerator.is_empty() {
			numerator.insert(0, Expression::int(n));
		}
		if d != 1 {
			denominator.insert(0, Expression::int(d));
		}
	}

	for (index, factor) in numerator.iter().enumerate() {
		if index > 0 {
			write!(f, "*")?;
		}
		factor.fmt_prec(f, PREC_PRODUCT + 1)?;
	}
	match denominator.as_slice() {
		[] => Ok(()),
		[single] => {
			write!(f, "/")?;
			single.fmt_prec(f, PREC_POWER)
		},
		many => write!(f, "/({})", many.iter().map(|d| {
			if d.precedence() <= PREC_PRODUCT { format!("({})", d) } else { d.to_string() }
		}).join("*")),
	}
}

impl fmt::Display for Expression {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.fmt_node(f)
	}
}
