//! Merging of configuration documents.

use indexmap::IndexMap;

use super::{ActionType, Config};
use crate::TRACING_TARGET;
use crate::error::{CoreError, CoreResult};

/// Folds several configuration documents into one.
///
/// Action types are grouped by name, keeping the order in which names are
/// first seen. A name declared once is kept as is. Otherwise the definitions
/// are ordered low-precedence first and combined so that higher-precedence
/// values win: property and interpolation maps are overlaid, default
/// argument lists are concatenated, and the configuration position comes
/// from the last definition. All definitions must agree on `tag` and `xmlns`.
///
/// The kill name and message are each taken from the first document that
/// sets them.
pub fn merge(configs: impl IntoIterator<Item = Config>) -> CoreResult<Config> {
    let mut groups: IndexMap<String, Vec<ActionType>> = IndexMap::new();
    let mut kill_name = None;
    let mut kill_message = None;

    for config in configs {
        kill_name = kill_name.or(config.kill_name);
        kill_message = kill_message.or(config.kill_message);
        for action_type in config.action_types {
            groups
                .entry(action_type.name.clone())
                .or_default()
                .push(action_type);
        }
    }

    let action_types = groups
        .into_values()
        .map(merge_action_types)
        .collect::<CoreResult<Vec<_>>>()?;

    tracing::debug!(
        target: TRACING_TARGET,
        action_types = action_types.len(),
        kill_name = ?kill_name,
        "merged configuration"
    );

    Ok(Config {
        action_types,
        kill_name,
        kill_message,
    })
}

/// Combines every definition of one action type.
fn merge_action_types(mut definitions: Vec<ActionType>) -> CoreResult<ActionType> {
    // Stable: low-precedence definitions first, declaration order otherwise.
    definitions.sort_by_key(|definition| !definition.low_precedence);

    let mut iter = definitions.into_iter();
    let Some(mut merged) = iter.next() else {
        return Ok(ActionType::default());
    };

    for definition in iter {
        if definition.tag != merged.tag {
            return Err(conflict(&merged.name, "tag"));
        }
        if definition.xmlns != merged.xmlns {
            return Err(conflict(&merged.name, "xmlns"));
        }

        for (key, values) in definition.default_args {
            merged.default_args.entry(key).or_default().extend(values);
        }
        merged.properties.extend(definition.properties);
        merged
            .default_interpolations
            .extend(definition.default_interpolations);
        merged.configuration_position = definition.configuration_position;
        merged.low_precedence &= definition.low_precedence;
    }

    Ok(merged)
}

fn conflict(name: &str, field: &'static str) -> CoreError {
    tracing::error!(
        target: TRACING_TARGET,
        action_type = %name,
        field,
        "conflicting action type definitions"
    );
    CoreError::ConfigurationConflict {
        name: name.to_owned(),
        field,
    }
}
