//! Core message, profile and request types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Model used when neither the request nor the profile names one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Name of the profile that always exists and cannot be removed.
pub const DEFAULT_PROFILE: &str = "default";

/// Model-name prefixes of the reasoning model family.
///
/// Only these models accept a `reasoning_effort` parameter.
pub const REASONING_MODEL_PREFIXES: &[&str] = &["o1", "o3"];

/// Whether `model` belongs to the reasoning model family.
#[must_use]
pub fn is_reasoning_model(model: &str) -> bool {
    REASONING_MODEL_PREFIXES
        .iter()
        .any(|prefix| model.starts_with(prefix))
}

/// The role of a message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions framing the conversation.
    System,
    /// The person using the extension.
    User,
    /// The model.
    Assistant,
}

/// One message of the conversation sent to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Who is speaking.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl PromptMessage {
    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// How much hidden reasoning a reasoning model should spend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    /// Fast, shallow reasoning.
    Low,
    /// The endpoint's balanced default.
    #[default]
    Medium,
    /// Slow, thorough reasoning.
    High,
}

impl ReasoningEffort {
    /// Wire representation used by the completion endpoint.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A named bundle of model choice and prompt templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Prompt templates sent as user messages ahead of the page content.
    #[serde(default)]
    pub custom_prompts: Vec<String>,
    /// Reasoning effort, used only with reasoning models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningEffort>,
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            model: default_model(),
            custom_prompts: Vec::new(),
            reasoning: None,
        }
    }
}

/// Read-only configuration snapshot taken at the start of a request.
///
/// The driver never mutates it; a fresh snapshot is taken for the next
/// request, so edits made in the options page apply from then on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Bearer token for the completion endpoint.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Profile used when a request names none (or an unknown one).
    #[serde(default = "default_profile_name")]
    pub default_profile: String,
    /// Raise log verbosity to include prompts and received records.
    #[serde(default)]
    pub debug: bool,
    /// Profiles by name.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

fn default_profile_name() -> String {
    DEFAULT_PROFILE.into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            default_profile: default_profile_name(),
            debug: false,
            profiles: BTreeMap::from([(DEFAULT_PROFILE.to_string(), Profile::default())]),
        }
    }
}

impl Settings {
    /// The configured API key, if it is set and not blank.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Look up a profile by exact name.
    #[must_use]
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Resolve the profile for a request.
    ///
    /// Falls back to the default profile, then to [`Profile::default`].
    #[must_use]
    pub fn resolve_profile(&self, name: Option<&str>) -> Profile {
        name.and_then(|n| self.profile(n))
            .or_else(|| self.profile(&self.default_profile))
            .cloned()
            .unwrap_or_default()
    }
}

/// One streaming completion request, ready for a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation, in order.
    pub messages: Vec<PromptMessage>,
    /// Sent only when set; the driver sets it for reasoning models only.
    pub reasoning_effort: Option<ReasoningEffort>,
}

/// A request to summarize content, as sent by a UI surface.
///
/// Either `messages` is already assembled, or `content` (plus optional
/// `instructions`) is assembled with the profile's prompt templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    /// Pre-assembled conversation.
    #[serde(default)]
    pub messages: Vec<PromptMessage>,
    /// Page or selection text to summarize.
    #[serde(default)]
    pub content: Option<String>,
    /// Extra instructions typed by the user.
    #[serde(default)]
    pub instructions: Option<String>,
    /// Model override.
    #[serde(default)]
    pub model: Option<String>,
    /// Profile name.
    #[serde(default)]
    pub profile: Option<String>,
    /// Reasoning effort override.
    #[serde(default)]
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Page the content came from; completed summaries are remembered per URL.
    #[serde(default)]
    pub url: Option<String>,
}

/// A request to generate text for a form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillFormRequest {
    /// What the user wants written.
    pub prompt: String,
    /// Visible page text, given to the model as context.
    #[serde(default)]
    pub context: Option<String>,
    /// Profile name.
    #[serde(default)]
    pub profile: Option<String>,
}

/// Inbound command from a UI surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Summarize page or selection content.
    Summarize(SummarizeRequest),
    /// Generate text for an editable field.
    FillForm(FillFormRequest),
    /// Sent periodically by an open popup; produces no output.
    KeepAlive,
    /// The page behind a surface changed; its remembered summary is stale.
    Forget {
        /// Page URL to drop.
        url: String,
    },
}
