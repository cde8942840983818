//! Ordered registry of the tools bound to an agent.

use std::fmt;
use std::sync::Arc;

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::ToolDefinition;
use super::validation::validate_arguments;
use crate::error::BridgeError;

/// Tools an agent may call, keyed by unique name.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be unique.
    pub fn add(&mut self, tool: Arc<dyn Tool>) -> Result<(), BridgeError> {
        if self.get(tool.name()).is_some() {
            return Err(BridgeError::InvalidArgument(format!(
                "Tool already registered: {}",
                tool.name()
            )));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Builder form of [`ToolSet::add`].
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Result<Self, BridgeError> {
        self.add(tool)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions sent to the agent platform when the agent is created.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters().schema.clone(),
            })
            .collect()
    }

    /// Run a tool call requested by the agent. Always yields an output: a
    /// failure becomes an `Error: ...` string so the run can continue.
    pub async fn call(&self, name: &str, raw_arguments: &str, ctx: &ToolExecutionContext) -> String {
        match self.try_call(name, raw_arguments, ctx).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "Tool call failed");
                e.to_reply()
            }
        }
    }

    async fn try_call(
        &self,
        name: &str,
        raw_arguments: &str,
        ctx: &ToolExecutionContext,
    ) -> Result<String, BridgeError> {
        let tool = self.get(name).ok_or_else(|| BridgeError::ToolExecution {
            tool_name: name.to_string(),
            message: "unknown tool".into(),
        })?;

        let args = ToolArguments::parse(raw_arguments)?;
        validate_arguments(args.raw(), &tool.parameters().schema).map_err(|message| {
            BridgeError::ToolExecution {
                tool_name: name.to_string(),
                message,
            }
        })?;

        tracing::debug!(tool = name, call_id = ?ctx.call_id, "Executing tool");
        tool.execute(&args, ctx).await
    }
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.names())
            .finish()
    }
}
