//! Batch compilation of workflow documents.

use std::path::{Path, PathBuf};

use anyhow::Context;
use weft_core::config::{Config, merge};
use weft_core::reader::{read_config, read_workflow};
use weft_graph::WorkflowCompiler;
use weft_oozie::{WorkflowXml, dot};

use crate::TRACING_TARGET_PIPELINE;

/// Reads and merges every configuration source.
pub fn load_config<'a>(
    sources: impl IntoIterator<Item = (&'a PathBuf, bool)>,
) -> anyhow::Result<Config> {
    let documents = sources
        .into_iter()
        .map(|(path, low_precedence)| {
            read_config(path, low_precedence)
                .with_context(|| format!("failed to load configuration {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let config = merge(documents).context("failed to merge configuration")?;

    tracing::info!(
        target: TRACING_TARGET_PIPELINE,
        action_types = config.action_types.len(),
        kill = config.kill().is_some(),
        "loaded configuration"
    );

    Ok(config)
}

/// Options shared by every workflow of a run.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    /// Merged configuration.
    pub config: &'a Config,
    /// Output root directory.
    pub output: &'a Path,
    /// Graphviz format, when Graphviz output is enabled.
    pub graphviz: Option<&'a str>,
    /// Timestamp written into every document of the run.
    pub timestamp: &'a str,
}

impl Batch<'_> {
    /// Compiles every input in order, stopping at the first failure.
    pub fn run(&self, inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
        inputs
            .iter()
            .map(|input| {
                self.compile(input)
                    .with_context(|| format!("failed to compile {}", input.display()))
            })
            .collect()
    }

    /// Compiles one workflow document and returns the written XML path.
    pub fn compile(&self, input: &Path) -> anyhow::Result<PathBuf> {
        let workflow = read_workflow(input)?;
        let directory = self.output.join(&workflow.name);
        let compiler = WorkflowCompiler::new(self.config);

        let dependencies = compiler.dependency_graph(&workflow)?;
        if self.graphviz.is_some() {
            let path = directory.join(format!("{}-input.dot", workflow.name));
            dot::export(&path, dependencies.arena(), dependencies.dag(), self.graphviz);
        }

        let compiled = compiler.compile_graph(&workflow, dependencies)?;
        if self.graphviz.is_some() {
            let path = directory.join(format!("{}.dot", workflow.name));
            dot::export(&path, compiled.arena(), compiled.graph(), self.graphviz);
        }

        let path = WorkflowXml::from_compiled(&compiled, self.timestamp).write_file(self.output)?;

        tracing::info!(
            target: TRACING_TARGET_PIPELINE,
            input = %input.display(),
            workflow = %workflow.name,
            output = %path.display(),
            "compiled workflow"
        );

        Ok(path)
    }
}
