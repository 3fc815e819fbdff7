//! Explicit engine context: the symbol table and the default plot palette.
//!
//! Built once at startup and handed by reference to the parser, the classifier and the resolver.

use crate::binding::Rgb;
use crate::expr::{Builtin, Reserved};
use std::collections::BTreeMap;

/// Reserved coordinate names plus the names already taken by built-in functions and constants.
#[derive(Clone, Debug)]
pub struct SymbolTable {
	functions: BTreeMap<String, Builtin>,
	constants: BTreeMap<String, f64>,
}

impl SymbolTable {
	pub fn new() -> Self {
		SymbolTable {
			functions: BTreeMap::new(),
			constants: BTreeMap::new(),
		}
	}

	pub fn insert_function(&mut self, name: &str, function: Builtin) {
		self.functions.insert(name.to_string(), function);
	}

	pub fn insert_constant(&mut self, name: &str, value: f64) {
		self.constants.insert(name.to_string(), value);
	}

	pub fn reserved(&self, name: &str) -> Option<Reserved> {
		Reserved::from_name(name)
	}

	pub fn function(&self, name: &str) -> Option<Builtin> {
		self.functions.get(name).copied()
	}

	pub fn constant(&self, name: &str) -> Option<f64> {
		self.constants.get(name).copied()
	}

	/// Whether `name` can not be declared by the user.
	pub fn is_defined(&self, name: &str) -> bool {
		self.reserved(name).is_some() || self.functions.contains_key(name) || self.constants.contains_key(name)
	}
}

impl Default for SymbolTable {
	fn default() -> Self {
		let mut table = SymbolTable::new();
		for function in &[
			Builtin::Sin, Builtin::Cos, Builtin::Tan,
			Builtin::Asin, Builtin::Acos, Builtin::Atan,
			Builtin::Sinh, Builtin::Cosh, Builtin::Tanh,
			Builtin::Exp, Builtin::Log, Builtin::Sqrt, Builtin::Abs,
			Builtin::Diff, Builtin::Integrate,
		] {
			table.insert_function(function.name(), *function);
		}
		table.insert_function("ln", Builtin::Log);
		table.insert_constant("pi", std::f64::consts::PI);
		table.insert_constant("π", std::f64::consts::PI);
		table.insert_constant("e", std::f64::consts::E);
		table
	}
}

/// Colours handed out to statements that have none yet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Palette(pub Vec<Rgb>);

impl Palette {
	/// Colour for the `index`-th statement that asked for one, cycling through the palette.
	pub fn pick(&self, index: usize) -> Rgb {
		match self.0.len() {
			0 => Rgb(255, 255, 255),
			len => self.0[index % len],
		}
	}
}

impl Default for Palette {
	fn default() -> Self {
		Palette(vec![
			Rgb(224, 82, 99),
			Rgb(3, 247, 235),
			Rgb(100, 87, 166),
			Rgb(99, 193, 50),
			Rgb(249, 200, 70),
		])
	}
}

#[derive(Clone, Debug, Default)]
pub struct Context {
	pub symbols: SymbolTable,
	pub palette: Palette,
}
