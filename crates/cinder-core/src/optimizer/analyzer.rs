//! Optimization analysis: definite assignment, filter-cache staleness and
//! short-circuit-aware placeholder caching in a single walk.
//!
//! The walk only annotates nodes and records alias definitions per block.
//! Definitions are spliced into each block's statement list once all of its
//! statements have been visited, so no statement list is edited while it is
//! being iterated.

use super::assignment::AssignedSet;
use super::filter_cache::{FilterEpochs, FilterUse};
use super::resolution::{alias_name, Evaluation};
use super::{AnalysisReport, ResolutionRecord};
use crate::ast::{
    Access, Assign, BinOp, Block, ExprKey, Filter, Function, IfNode, Node, NodeKind, Placeholder,
    Resolution, Scope, Template,
};
use crate::config::AnalyzerOptions;
use crate::errors::{AnalyzerError, AnalyzerWarning};
use crate::names::{NameId, NameTable};
use crate::span::Span;
use crate::visitor::{walk_assign, AssignedNames, DeclaredNames, Visitor};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use std::mem;
use tracing::{debug, trace, warn};

/// Analysis state of one block: a function body or one branch of an `if`
#[derive(Debug, Default)]
struct Frame {
    assigned: AssignedSet,
    /// Aliases usable here: inherited from the block's scope plus those introduced
    aliases: IndexMap<ExprKey, String>,
    introduced: Vec<ExprKey>,
    assigned_here: IndexSet<String>,
    /// Alias definitions to insert before the statement being visited
    pending: Vec<Node>,
    scoped: bool,
}

impl Frame {
    fn enter(scope: &Scope, assigned: AssignedSet) -> Self {
        Frame {
            assigned,
            aliases: scope.aliased_expression_map.clone(),
            scoped: true,
            ..Frame::default()
        }
    }

    /// Write names and aliases introduced by the block back into its scope
    fn commit(self, scope: &mut Scope) -> AssignedSet {
        let Frame {
            assigned,
            aliases,
            introduced,
            assigned_here,
            ..
        } = self;
        scope.local_identifiers.extend(assigned_here);
        for key in introduced {
            if let Some(alias) = aliases.get(&key) {
                let alias = alias.clone();
                scope.register_alias(key, alias);
            }
        }
        assigned
    }
}

/// State reset at every function boundary
#[derive(Debug, Default)]
struct FunctionState {
    in_function: bool,
    current: Frame,
    enclosing: Vec<Frame>,
    /// Names assigned anywhere in the function; never aliased
    assigned_anywhere: FxHashSet<NameId>,
    /// Names the function's scopes declare without an alias behind them
    declared: FxHashSet<NameId>,
    /// Alias name -> the computation it caches, for collision checks
    alias_keys: FxHashMap<String, ExprKey>,
    epochs: FilterEpochs,
}

pub struct OptimizationAnalyzer<'a> {
    options: &'a AnalyzerOptions,
    names: NameTable,
    globals: FxHashSet<NameId>,
    state: FunctionState,
    evaluation: Evaluation,
    report: AnalysisReport,
}

impl<'a> OptimizationAnalyzer<'a> {
    pub fn new(options: &'a AnalyzerOptions) -> Self {
        Self {
            options,
            names: NameTable::new(),
            globals: FxHashSet::default(),
            state: FunctionState::default(),
            evaluation: Evaluation::Unconditional,
            report: AnalysisReport::default(),
        }
    }

    /// Analyze and annotate `root` in place
    ///
    /// On error the tree may be partially annotated and must be discarded.
    pub fn analyze(mut self, root: &mut Node) -> Result<AnalysisReport, AnalyzerError> {
        self.visit_node(root)?;
        Ok(self.report)
    }

    fn analyze_statements(&mut self, body: &mut Vec<Node>) -> Result<(), AnalyzerError> {
        let mut insertions = Vec::new();
        for (index, statement) in body.iter_mut().enumerate() {
            self.evaluation = Evaluation::Unconditional;
            self.visit_node(statement)?;
            let pending = mem::take(&mut self.state.current.pending);
            if !pending.is_empty() {
                insertions.push((index, pending));
            }
        }
        if !insertions.is_empty() {
            insert_before(body, insertions);
        }
        Ok(())
    }

    /// Analyze one branch against a private copy of the assigned set
    fn analyze_branch(
        &mut self,
        block: &mut Block,
        assigned: AssignedSet,
    ) -> Result<AssignedSet, AnalyzerError> {
        let parent = mem::replace(&mut self.state.current, Frame::enter(&block.scope, assigned));
        self.state.enclosing.push(parent);

        self.analyze_statements(&mut block.body)?;

        let parent = self.state.enclosing.pop().unwrap_or_default();
        let frame = mem::replace(&mut self.state.current, parent);
        Ok(frame.commit(&mut block.scope))
    }

    fn lookup_alias(&self, key: &ExprKey) -> Option<String> {
        std::iter::once(&self.state.current)
            .chain(self.state.enclosing.iter().rev())
            .find_map(|frame| frame.aliases.get(key).cloned())
    }

    fn is_visible_alias(&self, name: &str) -> bool {
        std::iter::once(&self.state.current)
            .chain(self.state.enclosing.iter().rev())
            .any(|frame| frame.aliases.values().any(|alias| alias == name))
    }

    fn can_alias(&self, name: NameId) -> bool {
        self.state.in_function
            && self.state.current.scoped
            && !self.state.assigned_anywhere.contains(&name)
    }

    fn is_user_name(&self, name: &str) -> bool {
        self.names.lookup(name).is_some_and(|id| {
            self.state.assigned_anywhere.contains(&id)
                || self.state.declared.contains(&id)
                || self.globals.contains(&id)
        })
    }

    /// Alias name for `key`, unique among this function's aliases and variables
    fn fresh_alias_name(&mut self, key: &ExprKey) -> String {
        let base = alias_name(key);
        let mut candidate = base.clone();
        let mut suffix = 1;
        loop {
            let taken = self
                .state
                .alias_keys
                .get(&candidate)
                .is_some_and(|existing| existing != key);
            if !taken && !self.is_user_name(&candidate) {
                break;
            }
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        self.state
            .alias_keys
            .insert(candidate.clone(), key.clone());
        candidate
    }

    /// Existing alias for `key`, or a new one defined before the current statement
    fn alias_for(&mut self, key: ExprKey, value: impl FnOnce() -> Node) -> String {
        if let Some(alias) = self.lookup_alias(&key) {
            return alias;
        }
        let alias = self.fresh_alias_name(&key);
        debug!(alias = %alias, expr = %key, "introducing alias");

        let definition = Node::assign(alias.clone(), value());
        let frame = &mut self.state.current;
        frame.aliases.insert(key.clone(), alias.clone());
        frame.introduced.push(key);
        frame.pending.push(definition);
        alias
    }

    /// Variable whose current value a filter reads directly
    fn direct_read(&mut self, expr: &Node) -> Option<String> {
        match &expr.kind {
            NodeKind::Identifier(name) => Some(name.clone()),
            NodeKind::Placeholder(placeholder) => {
                let id = self.names.intern(&placeholder.name);
                self.state
                    .assigned_anywhere
                    .contains(&id)
                    .then(|| placeholder.name.clone())
            }
            _ => None,
        }
    }

    /// Alias a filter operand resolved to, if any
    fn aliased_operand(&self, expr: &Node) -> Option<String> {
        match &expr.kind {
            NodeKind::Placeholder(Placeholder {
                resolution:
                    Some(Resolution {
                        access: Access::Alias(alias),
                        ..
                    }),
                ..
            }) => Some(alias.clone()),
            NodeKind::Identifier(name) if self.is_visible_alias(name) => Some(name.clone()),
            _ => None,
        }
    }

    fn check_filter_epoch(&mut self, name: &str, span: Span) -> Result<(), AnalyzerError> {
        let id = self.names.intern(name);
        if let FilterUse::Stale {
            previous_epoch,
            epoch,
        } = self.state.epochs.record_filter(id)
        {
            self.emit_warning(AnalyzerWarning::stale_filter_cache(
                name,
                span,
                previous_epoch,
                epoch,
            ))?;
        }
        Ok(())
    }

    fn emit_warning(&mut self, warning: AnalyzerWarning) -> Result<(), AnalyzerError> {
        if self.options.warnings_as_errors {
            return Err(AnalyzerError::Warning(warning));
        }
        if self.options.enable_warnings {
            warn!(name = %warning.name, span = %warning.span, "{}", warning.message);
            self.report.warnings.push(warning);
        } else {
            debug!(name = %warning.name, "warning discarded: {}", warning.message);
        }
        Ok(())
    }
}

impl Visitor for OptimizationAnalyzer<'_> {
    type Error = AnalyzerError;

    fn visit_template(&mut self, template: &mut Template) -> Result<(), AnalyzerError> {
        self.globals = template
            .global_placeholders
            .iter()
            .map(|name| self.names.intern(name))
            .collect();
        for node in &mut template.body {
            self.evaluation = Evaluation::Unconditional;
            self.visit_node(node)?;
        }
        Ok(())
    }

    fn visit_function(&mut self, function: &mut Function, _span: Span) -> Result<(), AnalyzerError> {
        debug!(function = %function.name, "analyzing function");
        let assigned_anywhere = AssignedNames::collect(&mut function.body)
            .iter()
            .map(|name| self.names.intern(name))
            .collect();
        let DeclaredNames { locals, aliases } = DeclaredNames::collect(&mut function.body);
        let declared = locals.iter().map(|name| self.names.intern(name)).collect();
        let mut seed = AssignedSet::new();
        for name in &function.body.scope.local_identifiers {
            seed.insert(self.names.intern(name));
        }

        let state = FunctionState {
            in_function: true,
            current: Frame::enter(&function.body.scope, seed),
            assigned_anywhere,
            declared,
            alias_keys: aliases.into_iter().collect(),
            ..FunctionState::default()
        };
        let outer = mem::replace(&mut self.state, state);
        let outer_evaluation = self.evaluation;

        self.analyze_statements(&mut function.body.body)?;

        let finished = mem::replace(&mut self.state, outer);
        finished.current.commit(&mut function.body.scope);
        self.evaluation = outer_evaluation;
        Ok(())
    }

    fn visit_if(&mut self, if_node: &mut IfNode, span: Span) -> Result<(), AnalyzerError> {
        self.visit_node(&mut if_node.condition)?;

        let base = self.state.current.assigned.fork();
        let then_assigned = self.analyze_branch(&mut if_node.then_branch, base.fork())?;
        let else_assigned = match &mut if_node.else_branch {
            Some(else_branch) => self.analyze_branch(else_branch, base.fork())?,
            None => base,
        };

        let promoted = self
            .state
            .current
            .assigned
            .join([then_assigned, else_assigned]);
        trace!(
            span = %span,
            promoted = ?promoted.iter().filter_map(|id| self.names.resolve(*id)).collect::<Vec<_>>(),
            "joined conditional"
        );
        Ok(())
    }

    fn visit_assign(&mut self, assign: &mut Assign, _span: Span) -> Result<(), AnalyzerError> {
        walk_assign(self, assign)?;

        let id = self.names.intern(&assign.target);
        let frame = &mut self.state.current;
        frame.assigned.insert(id);
        frame.assigned_here.insert(assign.target.clone());
        if self.options.cache_resolved_placeholders {
            self.state.epochs.record_assign(id);
        }
        Ok(())
    }

    fn visit_placeholder(
        &mut self,
        placeholder: &mut Placeholder,
        span: Span,
    ) -> Result<(), AnalyzerError> {
        let id = self.names.intern(&placeholder.name);
        let assigned = self.state.current.assigned.contains(id);
        if self.options.static_analysis && !assigned && !self.globals.contains(&id) {
            return Err(AnalyzerError::SemanticAnalyzer {
                name: placeholder.name.clone(),
                span,
            });
        }

        let cache_eligible = self.evaluation.is_unconditional();
        let access = if assigned && self.options.directly_access_defined_variables {
            Access::Local(placeholder.name.clone())
        } else if cache_eligible && self.options.cache_resolved_placeholders && self.can_alias(id)
        {
            let name = placeholder.name.clone();
            let alias = self.alias_for(ExprKey::Placeholder(name.clone()), || {
                Node::new(
                    NodeKind::Placeholder(Placeholder {
                        name,
                        resolution: Some(Resolution {
                            cache_eligible: true,
                            access: Access::Dynamic,
                        }),
                    }),
                    span,
                )
            });
            Access::Alias(alias)
        } else {
            Access::Dynamic
        };

        let resolution = Resolution {
            cache_eligible,
            access,
        };
        self.report.resolutions.push(ResolutionRecord {
            name: placeholder.name.clone(),
            span,
            resolution: resolution.clone(),
        });
        placeholder.resolution = Some(resolution);
        Ok(())
    }

    fn visit_binop(&mut self, binop: &mut BinOp, _span: Span) -> Result<(), AnalyzerError> {
        let outer = self.evaluation;
        self.visit_node(&mut binop.left)?;
        self.evaluation = outer.right_operand(binop.op);
        let result = self.visit_node(&mut binop.right);
        self.evaluation = outer;
        result
    }

    fn visit_filter(&mut self, filter: &mut Filter, span: Span) -> Result<(), AnalyzerError> {
        self.visit_node(&mut filter.expr)?;

        if self.options.cache_resolved_placeholders {
            if let Some(name) = self.direct_read(&filter.expr) {
                self.check_filter_epoch(&name, span)?;
            }
        }

        if !self.options.caches_filters()
            || !self.evaluation.is_unconditional()
            || !self.state.in_function
            || !self.state.current.scoped
        {
            return Ok(());
        }
        if let Some(source) = self.aliased_operand(&filter.expr) {
            let key = ExprKey::filtered(filter.filter.clone(), ExprKey::Identifier(source.clone()));
            let filter_name = filter.filter.clone();
            let alias = self.alias_for(key, || {
                Node::new(
                    NodeKind::Filter(Filter {
                        expr: Box::new(Node::identifier(source)),
                        filter: filter_name,
                        cached_as: None,
                    }),
                    span,
                )
            });
            filter.cached_as = Some(alias);
        }
        Ok(())
    }
}

/// Splice alias definitions in front of the statements that first needed them
fn insert_before(body: &mut Vec<Node>, insertions: Vec<(usize, Vec<Node>)>) {
    let extra: usize = insertions.iter().map(|(_, nodes)| nodes.len()).sum();
    let mut rewritten = Vec::with_capacity(body.len() + extra);
    let mut insertions = insertions.into_iter().peekable();
    for (index, node) in mem::take(body).into_iter().enumerate() {
        if let Some((_, definitions)) = insertions.next_if(|(at, _)| *at == index) {
            rewritten.extend(definitions);
        }
        rewritten.push(node);
    }
    *body = rewritten;
}
