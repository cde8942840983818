//! Configuration (layered: code > env > `.env` file).

use std::fmt;
use std::path::PathBuf;

use crate::error::BridgeError;
use crate::util::poll::PollPolicy;

const DEFAULT_AGENT_NAME: &str = "myADBGenieAgent";
const DEFAULT_FILES_DIR: &str = "files";
const DEFAULT_API_VERSION: &str = "2024-12-01-preview";

/// Connection settings for the data Q&A backend.
#[derive(Clone, Default)]
pub struct GenieSettings {
    pub host: String,
    pub token: String,
    pub space_id: String,
}

impl fmt::Debug for GenieSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenieSettings")
            .field("host", &self.host)
            .field("token", &"..")
            .field("space_id", &self.space_id)
            .finish()
    }
}

/// Connection settings for the hosted agent platform.
#[derive(Clone)]
pub struct PlatformSettings {
    /// Base URL of the project's agents API.
    pub endpoint: String,
    pub api_token: String,
    pub api_version: String,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_token: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl fmt::Debug for PlatformSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformSettings")
            .field("endpoint", &self.endpoint)
            .field("api_token", &"..")
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Identity of the conversational agent and its thread.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub model: String,
    pub name: String,
    /// Existing agent to reuse. Created when absent or not found.
    pub agent_id: Option<String>,
    /// Persisted thread to reuse instead of creating a new one.
    pub thread_id: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: String::new(),
            name: DEFAULT_AGENT_NAME.to_string(),
            agent_id: None,
            thread_id: None,
        }
    }
}

/// Full bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub genie: GenieSettings,
    pub platform: PlatformSettings,
    pub agent: AgentSettings,
    /// Directory that receives images produced by the agent.
    pub files_dir: PathBuf,
    pub poll: PollPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            genie: GenieSettings::default(),
            platform: PlatformSettings::default(),
            agent: AgentSettings::default(),
            files_dir: PathBuf::from(DEFAULT_FILES_DIR),
            poll: PollPolicy::default(),
        }
    }
}

impl BridgeConfig {
    /// Load from process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, BridgeError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BridgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("DATABRICKS_HOST") {
            config.genie.host = host;
        }
        if let Some(token) = get("DATABRICKS_TOKEN") {
            config.genie.token = token;
        }
        if let Some(space_id) = get("DATABRICKS_SPACE_ID") {
            config.genie.space_id = space_id;
        }

        if let Some(endpoint) = get("PROJECT_ENDPOINT") {
            config.platform.endpoint = endpoint;
        } else if let Some(conn) = get("PROJECT_CONNECTION_STRING") {
            config.platform.endpoint = ProjectConnection::parse(&conn)?.endpoint();
        }
        if let Some(token) = get("PROJECT_API_TOKEN") {
            config.platform.api_token = token;
        }
        if let Some(version) = get("PROJECT_API_VERSION") {
            config.platform.api_version = version;
        }

        if let Some(model) = get("MODEL_DEPLOYMENT_NAME") {
            config.agent.model = model;
        }
        if let Some(name) = get("AGENT_NAME") {
            config.agent.name = name;
        }
        config.agent.agent_id = get("AGENT_ID");
        config.agent.thread_id = get("THREAD_ID");

        if let Some(dir) = get("FILES_DIR") {
            config.files_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn with_genie(mut self, genie: GenieSettings) -> Self {
        self.genie = genie;
        self
    }

    pub fn with_platform(mut self, platform: PlatformSettings) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_agent(mut self, agent: AgentSettings) -> Self {
        self.agent = agent;
        self
    }

    pub fn with_files_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.files_dir = dir.into();
        self
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Check the settings needed to talk to the data backend.
    pub fn validate_genie(&self) -> Result<(), BridgeError> {
        require("DATABRICKS_HOST", &self.genie.host)?;
        require("DATABRICKS_TOKEN", &self.genie.token)?;
        require("DATABRICKS_SPACE_ID", &self.genie.space_id)
    }

    /// Check everything needed for a full agent session.
    pub fn validate(&self) -> Result<(), BridgeError> {
        self.validate_genie()?;
        require("PROJECT_CONNECTION_STRING", &self.platform.endpoint)?;
        require("PROJECT_API_TOKEN", &self.platform.api_token)?;
        if self.agent.agent_id.is_none() {
            require("MODEL_DEPLOYMENT_NAME", &self.agent.model)?;
        }
        Ok(())
    }
}

fn require(key: &str, value: &str) -> Result<(), BridgeError> {
    if value.trim().is_empty() {
        return Err(BridgeError::Configuration(format!("Missing {key}")));
    }
    Ok(())
}

/// Parsed `<host>;<subscription_id>;<resource_group>;<project_name>` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConnection {
    pub host: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub project_name: String,
}

impl ProjectConnection {
    pub fn parse(raw: &str) -> Result<Self, BridgeError> {
        let parts: Vec<&str> = raw.split(';').map(str::trim).collect();
        match parts.as_slice() {
            [host, sub, rg, project]
                if [host, sub, rg, project].iter().all(|p| !p.is_empty()) =>
            {
                Ok(Self {
                    host: host.to_string(),
                    subscription_id: sub.to_string(),
                    resource_group: rg.to_string(),
                    project_name: project.to_string(),
                })
            }
            _ => Err(BridgeError::Configuration(
                "PROJECT_CONNECTION_STRING must be <host>;<subscription_id>;<resource_group>;<project_name>"
                    .into(),
            )),
        }
    }

    /// Agents API base URL for this project.
    pub fn endpoint(&self) -> String {
        let host = self
            .host
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        format!(
            "https://{host}/agents/v1.0/subscriptions/{}/resourceGroups/{}/providers/Microsoft.MachineLearningServices/workspaces/{}",
            self.subscription_id, self.resource_group, self.project_name
        )
    }
}
