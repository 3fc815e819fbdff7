//! Binding Classifier: decides what a parsed statement declares or plots.

use crate::algebra::{evaluate_operators, post_process, rewrite_operators, solve, truth_value, CalculusError};
use crate::binding::*;
use crate::context::SymbolTable;
use crate::expr::*;
use crate::parsing::{parse, Comparison, Term};
use crate::report::BindingError;
use crate::statement::StatementId;
use crate::utils::apply::*;
use itertools::Itertools;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ClassifyError {
	#[error("cartesian and parametric coordinates can not be mixed")]
	MixedCoordinates,
	#[error("{components} component(s) with {parameters} parameter(s) is not a parametric plot")]
	ParametricShape {
		components: usize,
		parameters: usize,
	},
	#[error("duplicate parameter `{0}`")]
	DuplicateParameter(String),
	#[error("`{0}` can not be a parameter")]
	InvalidParameter(String),
	#[error("`{0}` is not a parameter of this function")]
	CoordinateInDeclaration(String),
	#[error("`{0}` is reserved")]
	ReservedNameCollision(String),
	#[error("too many free variables: {}", .0.iter().join(", "))]
	TooManyFreeVariables(Vec<String>),
	#[error("can not solve for `{0}`")]
	Unsolvable(String),
	#[error("no solutions for `{0}`")]
	NoSolutions(String),
	#[error("{0}")]
	BadOperator(#[from] CalculusError),
}

/// Parses and classifies statement text into a raw binding.
pub fn interpret(text: &str, owner: StatementId, symbols: &SymbolTable) -> Result<Binding, BindingError> {
	let term = parse(text, symbols)?;
	Ok(classify(term, owner, symbols)?)
}

pub fn classify(term: Term, owner: StatementId, symbols: &SymbolTable) -> Result<Binding, ClassifyError> {
	let binding = match rewrite_term(term)? {
		Term::Tuple(items) => classify_tuple(items, owner)?,
		Term::Expression(expr) => classify_expression(expr, owner)?,
		Term::Relation(atoms) => classify_relation(atoms, owner, symbols)?,
	};
	let body = binding.body.clone().try_map(|e| post_process(e, symbols))?;
	Ok(Binding { body, ..binding })
}

/// Definite integrals bind their variable, so operators are rewritten before coordinates are counted.
fn rewrite_term(term: Term) -> Result<Term, CalculusError> {
	let rewrite = |e| rewrite_operators(e).map(evaluate_operators);
	Ok(match term {
		Term::Expression(e) => Term::Expression(rewrite(e)?),
		Term::Tuple(items) => Term::Tuple(items.into_iter().map(rewrite).collect::<Result<_, _>>()?),
		Term::Relation(atoms) => Term::Relation(atoms.into_iter()
			.map(|c| Ok(Comparison { left: rewrite(c.left)?, right: rewrite(c.right)?, op: c.op }))
			.collect::<Result<_, CalculusError>>()?),
	})
}

fn split_reserved(expr: &Expression) -> Result<(BTreeSet<Reserved>, BTreeSet<Reserved>), ClassifyError> {
	let (coordinates, parameters): (BTreeSet<_>, BTreeSet<_>) = expr.free_reserved()
		.into_iter()
		.partition(|r| r.is_coordinate());
	if !coordinates.is_empty() && !parameters.is_empty() {
		return Err(ClassifyError::MixedCoordinates);
	}
	Ok((coordinates, parameters))
}

fn classify_tuple(items: Vec<Expression>, owner: StatementId) -> Result<Binding, ClassifyError> {
	let whole = ExpressionMeta::Tuple { items: items.clone() }.apply(Expression);
	let (coordinates, parameters) = split_reserved(&whole)?;
	let kind = match (items.len(), parameters.len()) {
		(2, 1) if coordinates.is_empty() => PlotKind::Parametric2D,
		(3, 1) if coordinates.is_empty() => PlotKind::Parametric3D,
		(3, 2) if coordinates.is_empty() => PlotKind::ParametricSurface,
		(components, parameters) => return Err(ClassifyError::ParametricShape { components, parameters }),
	};
	Ok(Binding::new(
		Some(Name::Parametric(parameters.into_iter().collect())),
		Body::Tuple(items),
		Some(kind),
		owner,
	))
}

fn classify_expression(expr: Expression, owner: StatementId) -> Result<Binding, ClassifyError> {
	let (coordinates, parameters) = split_reserved(&expr)?;
	if !parameters.is_empty() {
		return Err(ClassifyError::ParametricShape { components: 1, parameters: parameters.len() });
	}
	let (name, kind) = match coordinates.iter().copied().collect::<Vec<_>>().as_slice() {
		[] | [Reserved::X] => (Reserved::Y, PlotKind::Line2D),
		[Reserved::X, Reserved::Y] => (Reserved::Z, PlotKind::Surface),
		[.., last] => return Err(ClassifyError::Unsolvable(last.name().to_string())),
	};
	Ok(Binding::new(Some(Name::Coordinate(name)), Body::Expression(expr), Some(kind), owner))
}

fn classify_relation(atoms: Vec<Comparison>, owner: StatementId, symbols: &SymbolTable) -> Result<Binding, ClassifyError> {
	let whole = match atoms.as_slice() {
		[single] => single.to_expression(),
		_ => ExpressionMeta::Chain { links: atoms.iter().map(Comparison::to_expression).collect() }.apply(Expression),
	};

	let Comparison { op, left, right } = match atoms.as_slice() {
		[single] if single.op == RelOp::Eq => single.clone(),
		_ => return classify_inequality(whole, owner, symbols),
	};
	debug_assert_eq!(op, RelOp::Eq);

	match &left.0 {
		ExpressionMeta::Call { name, args } => return declare_function(name, args, right, owner),
		ExpressionMeta::Constant { name } => return Err(ClassifyError::ReservedNameCollision(name.clone())),
		ExpressionMeta::Symbol { variable: Variable::Reserved(r) } if !r.is_coordinate() => {
			return Err(ClassifyError::ReservedNameCollision(r.name().to_string()));
		},
		// `sin(x) = x^2` redefines `sin`, `exp(y) = x` is a relation
		ExpressionMeta::Function { function, args } if redefines(args, &right) => {
			return Err(ClassifyError::ReservedNameCollision(function.name().to_string()));
		},
		ExpressionMeta::Symbol { variable: Variable::Free(name) } if right.free_reserved().is_empty() => {
			if symbols.is_defined(name) {
				return Err(ClassifyError::ReservedNameCollision(name.clone()));
			}
			return Ok(Binding::new(Some(Name::Variable(name.clone())), Body::Expression(right), None, owner));
		},
		_ => {},
	}

	let (coordinates, parameters) = split_reserved(&whole)?;
	if !parameters.is_empty() {
		return Err(ClassifyError::ParametricShape { components: 1, parameters: parameters.len() });
	}

	let solve_for = |reserved: Reserved| {
		solve(&left, &right, &Variable::Reserved(reserved))
			.map_err(|_| ClassifyError::Unsolvable(reserved.name().to_string()))
	};

	if coordinates.contains(&Reserved::Z) {
		let mut solutions = solve_for(Reserved::Z)?;
		let body = match solutions.len() {
			0 => return Err(ClassifyError::NoSolutions("z".to_string())),
			1 => Body::Expression(solutions.remove(0)),
			_ => Body::Solutions(solutions),
		};
		return Ok(Binding::new(Some(Name::Coordinate(Reserved::Z)), body, Some(PlotKind::Surface), owner));
	}

	if coordinates.contains(&Reserved::Y) {
		return Ok(match solve_for(Reserved::Y).ok() {
			Some(mut solutions) if solutions.len() == 1 => Binding::new(
				Some(Name::Coordinate(Reserved::Y)),
				Body::Expression(solutions.remove(0)),
				Some(PlotKind::Line2D),
				owner,
			),
			_ => Binding::new(None, Body::Expression(whole), Some(PlotKind::Implicit2D), owner),
		});
	}

	if coordinates.contains(&Reserved::X) {
		let solutions = solve_for(Reserved::X)?;
		if solutions.is_empty() {
			return Err(ClassifyError::NoSolutions("x".to_string()));
		}
		return Ok(Binding::new(Some(Name::Coordinate(Reserved::X)), Body::Solutions(solutions), None, owner));
	}

	let free: Vec<String> = whole.free_names().into_iter().collect();
	match free.as_slice() {
		[] => Ok(Binding::new(None, Body::Expression(whole), None, owner)),
		[name] => {
			let name = name.clone();
			let mut solutions = solve(&left, &right, &Variable::Free(name.clone()))
				.map_err(|_| ClassifyError::Unsolvable(name.clone()))?;
			match solutions.len() {
				0 => Err(ClassifyError::NoSolutions(name)),
				1 => Ok(Binding::new(Some(Name::Variable(name)), Body::Expression(solutions.remove(0)), None, owner)),
				_ => Err(ClassifyError::Unsolvable(name)),
			}
		},
		_ => Err(ClassifyError::TooManyFreeVariables(free)),
	}
}

/// Whether `args` are plain symbols that all appear in `body`, as in a function declaration.
fn redefines(args: &[Expression], body: &Expression) -> bool {
	!args.is_empty() && args.iter().all(|arg| arg.as_variable().map_or(false, |v| body.contains(v)))
}

fn classify_inequality(whole: Expression, owner: StatementId, symbols: &SymbolTable) -> Result<Binding, ClassifyError> {
	let (coordinates, parameters) = split_reserved(&whole)?;
	if !parameters.is_empty() {
		return Err(ClassifyError::ParametricShape { components: 1, parameters: parameters.len() });
	}
	if coordinates.contains(&Reserved::Z) {
		return Err(ClassifyError::Unsolvable("z".to_string()));
	}
	let kind = match truth_value(&whole, symbols) {
		Some(_) => None,
		None => Some(PlotKind::Implicit2D),
	};
	Ok(Binding::new(None, Body::Expression(whole), kind, owner))
}

/// `name(params) = body`.
fn declare_function(name: &str, args: &[Expression], body: Expression, owner: StatementId) -> Result<Binding, ClassifyError> {
	let mut params: Vec<Variable> = Vec::with_capacity(args.len());
	for arg in args {
		let param = arg.as_variable().ok_or_else(|| ClassifyError::InvalidParameter(arg.to_string()))?;
		if params.contains(param) {
			return Err(ClassifyError::DuplicateParameter(param.to_string()));
		}
		params.push(param.clone());
	}
	if let Some(reserved) = body.free_reserved().into_iter().find(|r| !params.contains(&Variable::Reserved(*r))) {
		return Err(ClassifyError::CoordinateInDeclaration(reserved.name().to_string()));
	}

	Ok(Binding::new(
		Some(Name::Function { name: name.to_string(), params: params.clone() }),
		Body::Expression(ExpressionMeta::Lambda { params, body: Box::new(body) }.apply(Expression)),
		None,
		owner,
	))
}
