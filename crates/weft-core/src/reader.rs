//! YAML document loading.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::TRACING_TARGET;
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::workflow::Workflow;

/// Reads a workflow document.
pub fn read_workflow(path: impl AsRef<Path>) -> CoreResult<Workflow> {
    let workflow: Workflow = read_document(path.as_ref())?;
    tracing::debug!(
        target: TRACING_TARGET,
        workflow = %workflow.name,
        actions = workflow.actions.len(),
        "loaded workflow"
    );
    Ok(workflow)
}

/// Reads a configuration document, marking it low-precedence if requested.
pub fn read_config(path: impl AsRef<Path>, low_precedence: bool) -> CoreResult<Config> {
    let config: Config = read_document(path.as_ref())?;
    tracing::debug!(
        target: TRACING_TARGET,
        path = %path.as_ref().display(),
        action_types = config.action_types.len(),
        low_precedence,
        "loaded configuration"
    );
    Ok(if low_precedence {
        config.into_low_precedence()
    } else {
        config
    })
}

fn read_document<T: DeserializeOwned>(path: &Path) -> CoreResult<T> {
    let contents = fs::read_to_string(path).map_err(|source| CoreError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| CoreError::Parse {
        path: path.to_owned(),
        source,
    })
}
