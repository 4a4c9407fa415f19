//! Transition resolution and emission ordering.

use std::collections::HashSet;

use weft_core::config::{ActionType, Config};
use weft_core::{Action, Variables};

use crate::TRACING_TARGET;
use crate::arena::{VertexArena, VertexId, VertexKind};
use crate::dag::Dag;
use crate::error::{GraphError, GraphResult};
use crate::record::{ActionElement, ActionRecord, EmissionRecord};
use crate::scaffold::Scaffold;

/// Walks the finished graph depth-first from `start` and resolves every
/// transition.
///
/// Records follow traversal order, children visited in ascending id order.
/// `end` is skipped during the walk and emitted last, after the kill node.
///
/// Errors of an ordinary action go, in order of precedence, to its
/// interpolated `forceError`, the join of its enclosing fork/join pair, the
/// error handler, the kill node and finally `end`. The error handler itself
/// falls back to the kill node or `end`.
pub fn resolve(
    arena: &VertexArena,
    dag: &Dag,
    scaffold: &Scaffold,
    config: &Config,
) -> GraphResult<Vec<EmissionRecord>> {
    Resolver {
        arena,
        dag,
        scaffold,
        config,
    }
    .run()
}

struct Resolver<'a> {
    arena: &'a VertexArena,
    dag: &'a Dag,
    scaffold: &'a Scaffold,
    config: &'a Config,
}

impl Resolver<'_> {
    fn run(&self) -> GraphResult<Vec<EmissionRecord>> {
        let final_target = self.scaffold.kill.unwrap_or(self.scaffold.end);
        let error_target = self.scaffold.error_handler.unwrap_or(final_target);

        let mut records = Vec::new();
        for id in self.depth_first() {
            let Some(vertex) = self.arena.get(id) else {
                return Err(GraphError::synthesis(format!("vertex {id} is not in the arena")));
            };

            match &vertex.kind {
                VertexKind::Start => records.push(EmissionRecord::Start {
                    to: self.name(self.transition(id)?),
                }),
                VertexKind::End | VertexKind::Kill { .. } => {}
                VertexKind::Fork(_) => records.push(EmissionRecord::Fork {
                    name: vertex.name.clone(),
                    paths: self
                        .dag
                        .outgoing(id)
                        .into_iter()
                        .map(|target| self.name(target))
                        .collect(),
                }),
                VertexKind::Join(_) => records.push(EmissionRecord::Join {
                    name: vertex.name.clone(),
                    to: self.name(self.transition(id)?),
                }),
                VertexKind::Action(action) => {
                    let fallback = if Some(id) == self.scaffold.error_handler {
                        final_target
                    } else {
                        error_target
                    };
                    records.push(EmissionRecord::Action(
                        self.action_record(id, action, fallback)?,
                    ));
                }
            }
        }

        if let Some(kill) = self.scaffold.kill
            && let Some(VertexKind::Kill { message }) = self.kind(kill)
        {
            records.push(EmissionRecord::Kill {
                name: self.name(kill),
                message: message.clone(),
            });
        }
        records.push(EmissionRecord::End {
            name: self.name(self.scaffold.end),
        });

        tracing::debug!(
            target: TRACING_TARGET,
            records = records.len(),
            "resolved transitions"
        );

        Ok(records)
    }

    /// Preorder depth-first traversal from `start`.
    fn depth_first(&self) -> Vec<VertexId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![self.scaffold.start];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            stack.extend(self.dag.outgoing(id).into_iter().rev());
        }
        order
    }

    /// Returns the unique successor of a non-fork vertex.
    fn transition(&self, id: VertexId) -> GraphResult<VertexId> {
        match self.dag.outgoing(id).as_slice() {
            [next] => Ok(*next),
            targets => Err(GraphError::synthesis(format!(
                "{} has {} outgoing transitions, expected exactly one",
                self.name(id),
                targets.len()
            ))),
        }
    }

    fn action_record(
        &self,
        id: VertexId,
        action: &Action,
        fallback: VertexId,
    ) -> GraphResult<ActionRecord> {
        let action_type = self.config.action_type(&action.action_type).ok_or_else(|| {
            GraphError::UnknownActionType {
                action: action.name.clone(),
                action_type: action.action_type.clone(),
            }
        })?;

        let transition = self.name(self.transition(id)?);
        let ok = action.force_ok.clone().unwrap_or(transition);

        let error = match &action.force_error {
            Some(template) => Variables::new()
                .with_values(&action_type.default_interpolations)
                .with_value("okTransition", ok.as_str())
                .interpolate(template),
            None => self.name(self.enclosing_join(id).unwrap_or(fallback)),
        };

        Ok(ActionRecord {
            name: action.name.clone(),
            tag: action_type.tag.clone(),
            xmlns: action_type.xmlns.clone(),
            elements: action_elements(action_type, action),
            ok,
            error,
        })
    }

    /// Finds the join closing the innermost fork/join pair around `id`.
    ///
    /// Walks backward along first incoming edges collecting forks and
    /// forward along first outgoing edges collecting joins. The first fork
    /// whose pair was also seen going forward encloses the vertex.
    fn enclosing_join(&self, id: VertexId) -> Option<VertexId> {
        if self.dag.in_degree(id) == 0 || self.dag.out_degree(id) == 0 {
            return None;
        }

        let mut forks = Vec::new();
        let mut current = id;
        while let Some(&previous) = self.dag.incoming(current).first() {
            if let Some(VertexKind::Fork(pair)) = self.kind(previous) {
                forks.push(*pair);
            }
            current = previous;
        }

        let mut joins = Vec::new();
        current = id;
        while let Some(&next) = self.dag.outgoing(current).first() {
            if let Some(VertexKind::Join(pair)) = self.kind(next) {
                joins.push((*pair, next));
            }
            current = next;
        }

        forks.iter().find_map(|fork| {
            joins
                .iter()
                .find(|(pair, _)| pair == fork)
                .map(|(_, join)| *join)
        })
    }

    fn kind(&self, id: VertexId) -> Option<&VertexKind> {
        self.arena.get(id).map(|vertex| &vertex.kind)
    }

    fn name(&self, id: VertexId) -> String {
        self.arena.name(id).to_owned()
    }
}

/// Builds the children of an action's wrapping element.
///
/// The action type's default arguments come first, interpolated with the
/// type's default interpolations, the action's named arguments and its
/// positional arguments as list variables. Positional arguments not expanded
/// that way follow verbatim. The merged configuration is inserted at the
/// type's configuration position, or appended when the position is past the
/// last argument, and omitted when empty.
fn action_elements(action_type: &ActionType, action: &Action) -> Vec<ActionElement> {
    let variables = Variables::new()
        .with_values(&action_type.default_interpolations)
        .with_values(&action.named_args)
        .with_lists(&action.positional_args);

    let expanded: HashSet<&str> = action_type
        .default_args
        .values()
        .flatten()
        .filter_map(|value| variables.list_reference(value))
        .collect();

    let mut elements: Vec<_> = variables
        .interpolate_args(&action_type.default_args)
        .into_iter()
        .map(|(name, values)| ActionElement::Argument { name, values })
        .collect();
    elements.extend(
        action
            .positional_args
            .iter()
            .filter(|(name, _)| !expanded.contains(name.as_str()))
            .map(|(name, values)| ActionElement::Argument {
                name: name.clone(),
                values: values.clone(),
            }),
    );

    let mut configuration = action_type.properties.clone();
    configuration.extend(
        action
            .configuration_properties
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    if !configuration.is_empty() {
        let position = action_type.configuration_position.min(elements.len());
        elements.insert(position, ActionElement::Configuration(configuration));
    }

    elements
}
