//! Tool system for agent function calling.

pub mod arguments;
pub mod database;
pub mod tool;
pub mod toolset;
pub mod types;
pub mod validation;

pub use arguments::ToolArguments;
pub use database::{
    database_questions_tool, default_instructions, DatabaseAnswer, DatabaseQuestions,
    ToolInvocationState, DATABASE_TOOL_NAME, DEFAULT_TOPICS,
};
pub use tool::{AgentTool, Tool, ToolExecutionContext};
pub use toolset::ToolSet;
pub use types::{AgentToolParameters, ToolDefinition};
