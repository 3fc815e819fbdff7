//! Expression-binding engine: parses free-form mathematical statements, classifies them into declarations and plots,
//! and resolves every statement against the others, incrementally after each edit.

pub mod algebra;
pub mod binding;
pub mod classify;
pub mod context;
pub mod expr;
pub mod number;
pub mod parsing;
pub mod project;
pub mod report;
pub mod resolver;
pub mod statement;
pub mod utils;

pub use binding::{Binding, Body, Name, PlotKind, Rgb, Signature};
pub use classify::{classify, interpret, ClassifyError};
pub use context::{Context, Palette, SymbolTable};
pub use parsing::{parse, ParseError, Term};
pub use report::BindingError;
pub use resolver::{Change, Outcome, Plot, Resolution, Resolver};
pub use statement::{Label, LabelKind, Row, Statement, StatementId};
