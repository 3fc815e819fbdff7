use crate::context::SymbolTable;
use crate::expr::*;
use crate::number::Number;
use crate::utils::apply::*;
use crate::utils::span::{GlobalSpan, Spanned};
use itertools::Itertools;
use std::ops::Range;
use thiserror::Error;

/// Expression with the byte range it was parsed from, kept for error reporting.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExpressionParsing {
	span: Range<usize>,
	node: ExpressionMeta<ExpressionParsing>,
}

impl ExpressionParsing {
	fn new(span: Range<usize>, node: ExpressionMeta<ExpressionParsing>) -> Self {
		ExpressionParsing { span, node }
	}

	fn literal(span: Range<usize>, value: Number) -> Self {
		Self::new(span, ExpressionMeta::Literal { value })
	}

	fn negate(span: Range<usize>, expr: ExpressionParsing) -> Self {
		let minus = Self::literal(span.start..span.start + 1, Number::MINUS_ONE);
		Self::new(span, ExpressionMeta::Product { factors: vec![minus, expr] })
	}

	fn reciprocal(expr: ExpressionParsing) -> Self {
		let span = expr.span.clone();
		let exponent = Self::literal(span.clone(), Number::MINUS_ONE);
		Self::new(span, ExpressionMeta::Power { base: Box::new(expr), exponent: Box::new(exponent) })
	}
}

/// Comparison operator as written, before validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Comparator {
	Eq,
	NotEq,
	Lt,
	Le,
	Gt,
	Ge,
}

impl Comparator {
	fn rel_op(self) -> Option<RelOp> {
		match self {
			Comparator::Eq => Some(RelOp::Eq),
			Comparator::Lt => Some(RelOp::Lt),
			Comparator::Le => Some(RelOp::Le),
			Comparator::Gt => Some(RelOp::Gt),
			Comparator::Ge => Some(RelOp::Ge),
			Comparator::NotEq => None,
		}
	}
}

/// `first op1 e1 op2 e2 ...`
#[derive(Clone, Debug)]
pub struct RawChain {
	first: ExpressionParsing,
	links: Vec<(Spanned<Comparator>, ExpressionParsing)>,
}

/// Top level shape of a statement straight out of the grammar.
#[derive(Clone, Debug)]
pub enum RawStatement {
	Tuple {
		span: Range<usize>,
		items: Vec<ExpressionParsing>,
	},
	Chains {
		first: RawChain,
		rest: Vec<(GlobalSpan, RawChain)>,
	},
}

peg::parser!(
	grammar grammar() for str {
		pub rule statement() -> RawStatement
			= _ start:position!() items:tuple_items() end:position!() _ { RawStatement::Tuple { span: start..end, items } }
			/ _ start:position!() "(" _ items:tuple_items() _ ")" end:position!() _ { RawStatement::Tuple { span: start..end, items } }
			/ _ first:chain() rest:(_ c:connective() _ ch:chain() { (c, ch) })* _ { RawStatement::Chains { first, rest } }

		rule tuple_items() -> Vec<ExpressionParsing>
			= first:sum() rest:(_ "," _ s:sum() { s })+ {
				let mut items = vec![first];
				items.extend(rest);
				items
			}

		rule chain() -> RawChain
			= first:sum() links:(_ op:comparator() _ e:sum() { (op, e) })* { RawChain { first, links } }

		rule comparator() -> Spanned<Comparator>
			= start:position!() op:comparator_token() end:position!() { Spanned::new(op, GlobalSpan(start..end)) }

		rule comparator_token() -> Comparator
			= ("<=" / "≤") { Comparator::Le }
			/ (">=" / "≥") { Comparator::Ge }
			/ ("!=" / "≠") { Comparator::NotEq }
			/ ("==" / "=") { Comparator::Eq }
			/ "<" { Comparator::Lt }
			/ ">" { Comparator::Gt }

		rule connective() -> GlobalSpan
			= start:position!() ("&&" / "&" / "||" / "|" / "∧" / "∨") end:position!() { GlobalSpan(start..end) }

		pub rule sum() -> ExpressionParsing
			= start:position!() first:signed() rest:(_ op:$("+" / "-") _ t:product() { (op, t) })* end:position!() {
				if rest.is_empty() {
					first
				} else {
					let mut terms = vec![first];
					for (op, term) in rest {
						terms.push(if op == "-" { ExpressionParsing::negate(term.span.clone(), term) } else { term });
					}
					ExpressionParsing::new(start..end, ExpressionMeta::Sum { terms })
				}
			}

		rule signed() -> ExpressionParsing
			= start:position!() "-" _ p:product() end:position!() { ExpressionParsing::negate(start..end, p) }
			/ "+" _ p:product() { p }
			/ product()

		rule product() -> ExpressionParsing
			= start:position!() first:power() rest:factor_tail()* end:position!() {
				if rest.is_empty() {
					first
				} else {
					let mut factors = vec![first];
					for (divide, factor) in rest {
						factors.push(if divide { ExpressionParsing::reciprocal(factor) } else { factor });
					}
					ExpressionParsing::new(start..end, ExpressionMeta::Product { factors })
				}
			}

		// Juxtaposition is implicit multiplication: `2x`, `x y`, `(x+1)(x-1)`.
		rule factor_tail() -> (bool, ExpressionParsing)
			= _ "*" _ p:unary() { (false, p) }
			/ _ "/" _ p:unary() { (true, p) }
			/ _ p:power() { (false, p) }

		rule unary() -> ExpressionParsing
			= start:position!() "-" _ p:unary() end:position!() { ExpressionParsing::negate(start..end, p) }
			/ power()

		rule power() -> ExpressionParsing
			= start:position!() base:atom() exponent:(_ ("^" / "**") _ e:unary() { e })? end:position!() {
				match exponent {
					Some(e) => ExpressionParsing::new(start..end, ExpressionMeta::Power { base: Box::new(base), exponent: Box::new(e) }),
					None => base,
				}
			}

		rule atom() -> ExpressionParsing
			= "(" _ e:sum() _ ")" { e }
			/ number()
			/ function_power()
			/ call()
			/ symbol()

		// `sin^2(x)` is `sin(x)^2`.
		rule function_power() -> ExpressionParsing
			= start:position!() name:identifier() _ ("^" / "**") _ e:exponent_atom() "(" _ args:sum() ** (_ "," _) _ ")" end:position!() {
				let call = ExpressionParsing::new(start..end, ExpressionMeta::Call { name, args });
				ExpressionParsing::new(start..end, ExpressionMeta::Power { base: Box::new(call), exponent: Box::new(e) })
			}

		rule exponent_atom() -> ExpressionParsing
			= number()
			/ start:position!() "-" n:number() end:position!() { ExpressionParsing::negate(start..end, n) }

		rule call() -> ExpressionParsing
			= start:position!() name:identifier() "(" _ args:sum() ** (_ "," _) _ ")" end:position!() {
				ExpressionParsing::new(start..end, ExpressionMeta::Call { name, args })
			}

		rule symbol() -> ExpressionParsing
			= start:position!() name:identifier() end:position!() {
				ExpressionParsing::new(start..end, ExpressionMeta::Symbol { variable: Variable::Free(name) })
			}

		rule number() -> ExpressionParsing
			= start:position!() n:$(['0'..='9']+ ("." ['0'..='9']*)? / "." ['0'..='9']+) end:position!() {?
				Number::parse_decimal(n)
					.map(|value| ExpressionParsing::literal(start..end, value))
					.ok_or("number")
			}

		rule identifier() -> String
			= n:$(['a'..='z' | 'A'..='Z' | '_' | 'α'..='ω'] ['a'..='z' | 'A'..='Z' | '_' | '0'..='9' | 'α'..='ω']*) {
				String::from(n)
			}

		rule _() = quiet!{[' ' | '\n' | '\t']*}
	}
);

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseError {
	#[error("empty statement")]
	Empty,
	#[error("syntax error, expected {expected}")]
	Syntax {
		expected: String,
		span: GlobalSpan,
	},
	#[error("too many relations")]
	TooManyRelations {
		span: GlobalSpan,
	},
	#[error("invalid structure: {message}")]
	InvalidStructure {
		message: String,
		span: GlobalSpan,
	},
	#[error("`{name}` takes {expected} argument(s), got {found}")]
	Arity {
		name: String,
		expected: String,
		found: usize,
		span: GlobalSpan,
	},
}

impl ParseError {
	pub fn span(&self) -> Option<&GlobalSpan> {
		match self {
			ParseError::Empty => None,
			ParseError::Syntax { span, .. }
			| ParseError::TooManyRelations { span }
			| ParseError::InvalidStructure { span, .. }
			| ParseError::Arity { span, .. } => Some(span),
		}
	}

	fn structure(message: &str, span: Range<usize>) -> Self {
		ParseError::InvalidStructure { message: message.to_string(), span: GlobalSpan(span) }
	}
}

/// One atomic comparison of a decomposed relation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comparison {
	pub op: RelOp,
	pub left: Expression,
	pub right: Expression,
}

impl Comparison {
	pub fn to_expression(&self) -> Expression {
		Expression::relation(self.op, self.left.clone(), self.right.clone())
	}
}

/// A parsed statement: a single expression, one or two comparison atoms, or a parametric tuple.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Term {
	Expression(Expression),
	Relation(Vec<Comparison>),
	Tuple(Vec<Expression>),
}

impl Term {
	/// The whole statement as one expression tree.
	pub fn to_expression(&self) -> Expression {
		match self {
			Term::Expression(e) => e.clone(),
			Term::Relation(atoms) => match atoms.as_slice() {
				[single] => single.to_expression(),
				atoms => ExpressionMeta::Chain { links: atoms.iter().map(Comparison::to_expression).collect() }
					.apply(Expression),
			},
			Term::Tuple(items) => ExpressionMeta::Tuple { items: items.clone() }.apply(Expression),
		}
	}
}

/// Parses statement text into a term, resolving names against the symbol table.
pub fn parse(text: &str, symbols: &SymbolTable) -> Result<Term, ParseError> {
	if text.trim().is_empty() {
		return Err(ParseError::Empty);
	}
	let raw = grammar::statement(text).map_err(|err| syntax_error(err, text))?;
	decompose(raw, symbols)
}

/// Parses a bare arithmetic expression, without relations or tuples.
pub fn parse_expression(text: &str, symbols: &SymbolTable) -> Result<Expression, ParseError> {
	if text.trim().is_empty() {
		return Err(ParseError::Empty);
	}
	let raw = grammar::sum(text.trim()).map_err(|err| syntax_error(err, text.trim()))?;
	resolve_names(raw, symbols)
}

fn syntax_error(err: peg::error::ParseError<peg::str::LineCol>, text: &str) -> ParseError {
	let offset = err.location.offset;
	let end = text[offset..].chars().next().map_or(offset, |c| offset + c.len_utf8());
	ParseError::Syntax {
		expected: err.expected.tokens().sorted().dedup().join(", "),
		span: GlobalSpan(offset..end),
	}
}

fn decompose(raw: RawStatement, symbols: &SymbolTable) -> Result<Term, ParseError> {
	let RawChain { first, links } = match raw {
		RawStatement::Tuple { span, items } => {
			if !(2..=3).contains(&items.len()) {
				return Err(ParseError::structure("parametric tuples have 2 or 3 components", span));
			}
			return items.into_iter()
				.map(|item| resolve_names(item, symbols))
				.collect::<Result<_, _>>()
				.map(Term::Tuple);
		},
		RawStatement::Chains { first, rest } => {
			if let Some((span, _)) = rest.into_iter().next() {
				return Err(ParseError::structure("boolean connectives are not supported", span.0));
			}
			first
		},
	};

	let mut ops = Vec::with_capacity(links.len());
	let mut direction = Direction::Neutral;
	for (comparator, _) in &links {
		let op = comparator.inner.rel_op()
			.ok_or_else(|| ParseError::structure("`≠` is not supported", comparator.span.0.clone()))?;
		match (direction, op.direction()) {
			(_, Direction::Neutral) => {},
			(Direction::Neutral, d) => direction = d,
			(current, d) if current == d => {},
			_ => return Err(ParseError::structure("comparisons point in opposite directions", comparator.span.0.clone())),
		}
		ops.push(op);
	}
	if let Some((comparator, _)) = links.get(2) {
		return Err(ParseError::TooManyRelations { span: comparator.span.clone() });
	}

	let mut terms = vec![resolve_names(first, symbols)?];
	for (_, expr) in links {
		terms.push(resolve_names(expr, symbols)?);
	}
	if ops.is_empty() {
		return Ok(Term::Expression(terms.remove(0)));
	}
	Ok(Term::Relation(
		ops.into_iter()
			.zip(terms.iter().tuple_windows())
			.map(|(op, (left, right))| Comparison { op, left: left.clone(), right: right.clone() })
			.collect()
	))
}

/// Drops the span information and resolves identifiers: reserved coordinates, constants, built-in functions and user calls.
fn resolve_names(expr: ExpressionParsing, symbols: &SymbolTable) -> Result<Expression, ParseError> {
	let ExpressionParsing { span, node } = expr;
	let node = node.try_map_args(|arg| resolve_names(arg, symbols))?;

	Ok(match node {
		ExpressionMeta::Symbol { variable: Variable::Free(name) } => resolve_identifier(name, symbols),
		ExpressionMeta::Call { name, args } => {
			if let Some(function) = symbols.function(&name) {
				let (min, max) = function.arity();
				if args.len() < min || args.len() > max {
					let expected = if min == max { min.to_string() } else { format!("{} to {}", min, max) };
					return Err(ParseError::Arity { name, expected, found: args.len(), span: GlobalSpan(span) });
				}
				ExpressionMeta::Function { function, args }.apply(Expression)
			} else if symbols.reserved(&name).is_some() || symbols.constant(&name).is_some() {
				// `x(y + 1)` reads as a product
				if args.len() != 1 {
					return Err(ParseError::structure(&format!("`{}` is not a function", name), span));
				}
				let mut factors = vec![resolve_identifier(name, symbols)];
				factors.extend(args);
				Expression::product(factors)
			} else {
				ExpressionMeta::Call { name, args }.apply(Expression)
			}
		},
		node => Expression(node),
	})
}

fn resolve_identifier(name: String, symbols: &SymbolTable) -> Expression {
	if let Some(reserved) = symbols.reserved(&name) {
		Expression::reserved(reserved)
	} else if symbols.constant(&name).is_some() {
		ExpressionMeta::Constant { name }.apply(Expression)
	} else {
		Expression::variable(Variable::Free(name))
	}
}
