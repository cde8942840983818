//! The [`Tool`] seam the agent calls through, plus [`AgentTool`] for closures.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;

use super::arguments::ToolArguments;
use super::types::AgentToolParameters;
use crate::error::BridgeError;

/// Identifiers of the run step that requested a tool call.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    pub thread_id: Option<String>,
    pub run_id: Option<String>,
    pub call_id: Option<String>,
}

/// A function the agent may call. `execute` returns the text submitted as the tool output.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> &AgentToolParameters;

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<String, BridgeError>;
}

type Body = Box<
    dyn Fn(ToolArguments, ToolExecutionContext) -> BoxFuture<'static, Result<String, BridgeError>>
        + Send
        + Sync,
>;

pub struct AgentTool {
    name: String,
    description: String,
    parameters: AgentToolParameters,
    body: Body,
}

impl AgentTool {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
        body: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, BridgeError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            body: Box::new(move |args, ctx| body(args, ctx).boxed()),
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<String, BridgeError> {
        (self.body)(args.clone(), ctx.clone()).await
    }
}

impl fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentTool").field("name", &self.name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn closure_sees_arguments_and_call_id() {
        let tool = AgentTool::new(
            "echo",
            "Echo the prompt",
            AgentToolParameters::object().string("prompt", "Text", true).build(),
            |args, ctx| async move {
                let prompt = args.get_str("prompt")?;
                Ok(format!("{}:{prompt}", ctx.call_id.unwrap_or_default()))
            },
        );
        let ctx = ToolExecutionContext {
            call_id: Some("call_7".into()),
            ..Default::default()
        };
        let args = ToolArguments::parse(r#"{"prompt":"hi"}"#).unwrap();

        assert_eq!(tool.execute(&args, &ctx).await.unwrap(), "call_7:hi");
        assert_eq!(format!("{tool:?}"), "AgentTool { name: \"echo\", .. }");
    }
}
