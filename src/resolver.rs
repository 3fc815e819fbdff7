//! Resolver: keeps the resolved state of every statement and brings it up to date after an edit, re-resolving only
//! the statements the edit can affect.
//!
//! One pass:
//! 1. invalidation: names declared or referenced by the edited statement are followed through the graph of names
//!    and statements, every statement reached is affected;
//! 2. affected statements are parsed and classified again from their raw text;
//! 3. declarations sharing a name are all rejected and the name is excluded from substitution;
//! 4. fixpoint: declarations without free names are substituted into everything else, until none is left ready;
//! 5. whatever is still not closed gets an error, the rest a label and, if plottable, a place in the output.

use crate::algebra::truth_value;
use crate::binding::*;
use crate::classify::interpret;
use crate::context::Context;
use crate::report::{success_label, BindingError};
use crate::statement::*;
use crate::utils::id::IdGenerator;
use itertools::Itertools;
use log::{debug, trace, warn};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Change {
	/// Text or flags of one statement changed, or the statement was just added.
	Edited(StatementId),
	/// Resolve everything from scratch.
	Reset,
}

/// Resolved state of one statement.
#[derive(Clone, Debug)]
pub struct Outcome {
	/// Kept on errors too, so that later edits still see what the statement declared and referred to.
	pub binding: Option<Rc<Binding>>,
	pub status: Result<(), BindingError>,
	pub label: Label,
}

impl Outcome {
	fn failed(binding: Option<Binding>, error: BindingError) -> Self {
		Outcome {
			binding: binding.map(Rc::new),
			label: error.label(),
			status: Err(error),
		}
	}

	fn resolved(binding: Rc<Binding>, label: Label) -> Self {
		Outcome {
			binding: Some(binding),
			status: Ok(()),
			label,
		}
	}

	/// Declaration that resolved without errors.
	fn declaration(&self) -> Option<&Rc<Binding>> {
		self.binding.as_ref().filter(|b| self.status.is_ok() && b.is_declaration())
	}
}

/// Plottable binding handed to the plotting side.
#[derive(Clone, Debug)]
pub struct Plot {
	pub binding: Rc<Binding>,
	/// Draw the surface as contours.
	pub contoured: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Resolution {
	pub plots: Vec<Plot>,
	/// Statements parsed and resolved again by this pass.
	pub reparsed: BTreeSet<StatementId>,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
enum Node {
	Root,
	Statement(StatementId),
	Symbol(String),
}

/// A pass runs through `&mut self`, so passes can not overlap.
pub struct Resolver<'a> {
	context: &'a Context,
	outcomes: BTreeMap<StatementId, Outcome>,
	colours_assigned: usize,
}

impl<'a> Resolver<'a> {
	pub fn new(context: &'a Context) -> Self {
		Resolver {
			context,
			outcomes: BTreeMap::new(),
			colours_assigned: 0,
		}
	}

	pub fn outcome(&self, id: StatementId) -> Option<&Outcome> {
		self.outcomes.get(&id)
	}

	pub fn binding(&self, id: StatementId) -> Option<&Rc<Binding>> {
		self.outcomes.get(&id).and_then(|o| o.binding.as_ref())
	}

	pub fn update<S: Statement>(&mut self, statements: &mut [S], change: Change) -> Resolution {
		let ids: BTreeSet<StatementId> = statements.iter().map(Statement::id).collect();
		let removed = self.outcomes.keys().any(|id| !ids.contains(id));
		let edited = match change {
			Change::Edited(id) if ids.contains(&id) && !removed => Some(id),
			_ => None,
		};

		let mut fresh: BTreeMap<StatementId, Result<Binding, BindingError>> = BTreeMap::new();
		let affected = match edited {
			Some(id) => {
				let mut seeds = BTreeSet::new();
				if let Some(old) = self.binding(id) {
					seeds.extend(old.declared_name().map(str::to_string));
					if !old.is_declaration() {
						seeds.extend(old.dependencies.iter().cloned());
					}
				}
				if let Some(statement) = statements.iter_mut().find(|s| s.id() == id) {
					let parsed = self.interpret(statement);
					if let Ok(new) = &parsed {
						seeds.extend(new.declared_name().map(str::to_string));
					}
					fresh.insert(id, parsed);
				}
				let mut affected = self.invalidate(id, &seeds);
				affected.extend(ids.iter().filter(|id| !self.outcomes.contains_key(*id)));
				affected
			},
			None => {
				self.outcomes.clear();
				ids.clone()
			},
		};
		debug!("affected statements: {}", affected.iter().join(", "));

		for statement in statements.iter_mut() {
			let id = statement.id();
			if affected.contains(&id) && !fresh.contains_key(&id) {
				let parsed = self.interpret(statement);
				fresh.insert(id, parsed);
			}
		}
		for id in &affected {
			self.outcomes.remove(id);
		}

		let results = self.resolve(fresh);
		self.outcomes.extend(results);

		for statement in statements.iter_mut() {
			if let Some(outcome) = self.outcomes.get(&statement.id()) {
				statement.label(outcome.label.clone());
			}
		}

		let plots = statements.iter()
			.filter(|s| !s.is_hidden() && !s.has_cancelled_plot())
			.filter_map(|s| {
				let outcome = self.outcomes.get(&s.id())?;
				let binding = outcome.binding.as_ref().filter(|_| outcome.status.is_ok())?;
				let kind = binding.plot_kind?;
				Some(Plot { binding: binding.clone(), contoured: kind.is_surface() && s.is_contoured() })
			})
			.collect();

		Resolution { plots, reparsed: affected }
	}

	fn interpret<S: Statement>(&mut self, statement: &mut S) -> Result<Binding, BindingError> {
		let mut binding = interpret(statement.text(), statement.id(), &self.context.symbols)?;
		binding.colour = match (statement.colour(), binding.plot_kind) {
			(Some(colour), _) => Some(colour),
			(None, Some(_)) => {
				let colour = self.context.palette.pick(self.colours_assigned);
				self.colours_assigned += 1;
				statement.set_colour(colour);
				Some(colour)
			},
			(None, None) => None,
		};
		Ok(binding)
	}

	/// Statements reachable from the edited one and from `seeds` through declared and referenced names.
	fn invalidate(&self, changed: StatementId, seeds: &BTreeSet<String>) -> BTreeSet<StatementId> {
		let mut ids: IdGenerator<Node> = IdGenerator::default();
		let mut statements: BTreeMap<u32, StatementId> = BTreeMap::new();
		let root = ids.get_or_add_id(Node::Root);
		let changed_node = ids.get_or_add_id(Node::Statement(changed));
		statements.insert(changed_node, changed);

		let mut edges = vec![(root, changed_node)];
		for seed in seeds {
			edges.push((root, ids.get_or_add_id(Node::Symbol(seed.clone()))));
		}
		for (id, outcome) in &self.outcomes {
			let binding = match &outcome.binding {
				Some(binding) => binding,
				None => continue,
			};
			let node = ids.get_or_add_id(Node::Statement(*id));
			statements.insert(node, *id);

			let referenced = binding.declared_name().map(str::to_string)
				.into_iter()
				.chain(binding.dependencies.iter().cloned())
				.chain(binding.free_names());
			for name in referenced {
				edges.push((ids.get_or_add_id(Node::Symbol(name)), node));
			}
			// only declared names propagate further
			if let (true, Some(name)) = (binding.is_declaration(), binding.declared_name()) {
				edges.push((node, ids.get_or_add_id(Node::Symbol(name.to_string()))));
			}
		}

		let mut graph = DiGraph::<(), ()>::with_capacity(ids.len(), edges.len());
		for _ in 0..ids.len() {
			graph.add_node(());
		}
		graph.extend_with_edges(edges);

		let mut affected = BTreeSet::new();
		let mut bfs = Bfs::new(&graph, NodeIndex::new(root as usize));
		while let Some(node) = bfs.next(&graph) {
			if let Some(id) = statements.get(&(node.index() as u32)) {
				affected.insert(*id);
			}
		}
		affected
	}

	/// Duplicate detection, fixpoint substitution and finalization of the freshly parsed statements.
	fn resolve(&mut self, fresh: BTreeMap<StatementId, Result<Binding, BindingError>>) -> BTreeMap<StatementId, Outcome> {
		let mut results = BTreeMap::new();

		let mut owners: BTreeMap<String, Vec<StatementId>> = BTreeMap::new();
		for binding in fresh.values().filter_map(|p| p.as_ref().ok()) {
			if let (true, Some(name)) = (binding.is_declaration(), binding.declared_name()) {
				owners.entry(name.to_string()).or_default().push(binding.owner);
			}
		}
		for (id, outcome) in &self.outcomes {
			if let Some(name) = outcome.declaration().and_then(|b| b.declared_name()) {
				owners.entry(name.to_string()).or_default().push(*id);
			}
		}
		let poisoned: BTreeSet<String> = owners.into_iter()
			.filter(|(_, owners)| owners.len() > 1)
			.map(|(name, _)| name)
			.collect();
		if !poisoned.is_empty() {
			debug!("multiple definitions: {}", poisoned.iter().join(", "));
		}

		// carried declarations are already closed and only have to be substituted
		let mut ready: Vec<Rc<Binding>> = Vec::new();
		for outcome in self.outcomes.values_mut() {
			let declaration = match outcome.declaration() {
				Some(declaration) => declaration.clone(),
				None => continue,
			};
			match declaration.declared_name() {
				Some(name) if poisoned.contains(name) => {
					let error = BindingError::MultipleDefinitions(name.to_string());
					outcome.label = error.label();
					outcome.status = Err(error);
				},
				_ => ready.push(declaration),
			}
		}

		let mut pending: BTreeMap<StatementId, Binding> = BTreeMap::new();
		let mut targets: BTreeMap<StatementId, Binding> = BTreeMap::new();
		for (id, parsed) in fresh {
			match parsed {
				Err(error) => {
					results.insert(id, Outcome::failed(None, error));
				},
				Ok(binding) => match binding.declared_name().filter(|_| binding.is_declaration()) {
					Some(name) if poisoned.contains(name) => {
						let error = BindingError::MultipleDefinitions(name.to_string());
						results.insert(id, Outcome::failed(Some(binding), error));
					},
					Some(_) => {
						pending.insert(id, binding);
					},
					None => {
						targets.insert(id, binding);
					},
				},
			}
		}

		let mut iteration = 0;
		loop {
			iteration += 1;
			debug!("fixpoint iteration {}: {} ready, {} pending", iteration, ready.len(), pending.len());

			for source in &ready {
				let mut failed = Vec::new();
				for (id, target) in pending.iter_mut().chain(targets.iter_mut()) {
					match target.substitute(source) {
						Ok(substituted) => {
							if substituted != *target {
								trace!("{}: substituted {} into {}", id, source, substituted);
							}
							*target = substituted;
						},
						Err(error) => failed.push((*id, error)),
					}
				}
				for (id, error) in failed {
					warn!("substituting {} into {} failed: {}", source, id, error);
					let binding = pending.remove(&id).or_else(|| targets.remove(&id));
					results.insert(id, Outcome::failed(binding, BindingError::EngineFailure(error)));
				}
			}

			let closed: Vec<StatementId> = pending.iter()
				.filter(|(_, b)| b.free_names().is_empty())
				.map(|(id, _)| *id)
				.collect();
			if closed.is_empty() {
				break;
			}
			ready = closed.into_iter()
				.filter_map(|id| pending.remove(&id))
				.map(|binding| {
					let binding = Rc::new(binding);
					results.insert(binding.owner, Outcome::resolved(binding.clone(), success_label(&binding, None)));
					binding
				})
				.collect();
		}

		if !pending.is_empty() {
			log_cycles(&pending);
		}
		for (id, binding) in pending {
			results.insert(id, Outcome::failed(Some(binding), BindingError::Unresolvable));
		}

		for (id, binding) in targets {
			let free = binding.free_names();
			let outcome = if !free.is_empty() {
				Outcome::failed(Some(binding), BindingError::UnboundSymbols(free))
			} else if !binding.is_valid() {
				Outcome::failed(Some(binding), BindingError::InvalidAtoms)
			} else {
				// a relation left without coordinates after substitution is a value, not a plot
				let truth = match (&binding.name, &binding.body) {
					(None, Body::Expression(e)) if e.free_reserved().is_empty() => truth_value(e, &self.context.symbols),
					_ => None,
				};
				let binding = match truth {
					Some(_) => Binding { plot_kind: None, ..binding },
					None => binding,
				};
				let label = success_label(&binding, truth);
				Outcome::resolved(Rc::new(binding), label)
			};
			results.insert(id, outcome);
		}

		results
	}
}

fn log_cycles(pending: &BTreeMap<StatementId, Binding>) {
	let mut graph = DiGraph::<&str, ()>::new();
	let nodes: BTreeMap<&str, NodeIndex> = pending.values()
		.filter_map(Binding::declared_name)
		.map(|name| (name, graph.add_node(name)))
		.collect();
	for binding in pending.values() {
		let from = match binding.declared_name().and_then(|name| nodes.get(name)) {
			Some(from) => *from,
			None => continue,
		};
		for name in binding.free_names() {
			if let Some(to) = nodes.get(name.as_str()) {
				graph.add_edge(from, *to, ());
			}
		}
	}

	for component in tarjan_scc(&graph) {
		let cyclic = component.len() > 1 || component.iter().any(|n| graph.contains_edge(*n, *n));
		if cyclic {
			warn!("cyclic declarations: {}", component.iter().map(|n| graph[*n]).sorted().join(", "));
		}
	}
}
