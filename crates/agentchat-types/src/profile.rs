use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Production agent server shared by every branded page
pub const DEFAULT_BASE_URL: &str = "https://aspect-agent-server-1018338671074.europe-west1.run.app";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("unknown agent profile '{0}' (built-in profiles: freeda, aspect)")]
    Unknown(String),

    #[error("profile field '{0}' cannot be empty")]
    EmptyField(&'static str),
}

/// Per-agent configuration injected into the chat client.
///
/// Every branded page differs only in these values; the client logic is shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProfile {
    /// Name sent to the server to scope conversations and knowledge bases
    pub agent_name: String,
    pub display_name: String,
    /// Prepended to every local-store key, e.g. "freeda_"
    pub storage_prefix: String,
    pub base_url: String,
    /// Alternative step lists; one is picked at random per message
    pub thinking_steps: Vec<Vec<String>>,
    pub use_knowledge_base: bool,
    pub quick_questions: Vec<String>,
    pub welcome: String,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            agent_name: "Agent".to_string(),
            display_name: "Agent".to_string(),
            storage_prefix: "agent_".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            thinking_steps: vec![steps(&[
                "Processing your request",
                "Analyzing information",
                "Preparing response",
                "Ensuring accuracy",
            ])],
            use_knowledge_base: false,
            quick_questions: Vec::new(),
            welcome: "How can I help you today?".to_string(),
        }
    }
}

fn steps(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl AgentProfile {
    /// Menopause-wellness companion
    pub fn freeda() -> Self {
        Self {
            agent_name: "Freeda 2.0".to_string(),
            display_name: "Freeda.ai".to_string(),
            storage_prefix: "freeda_".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            thinking_steps: vec![
                steps(&[
                    "Understanding your question with care",
                    "Accessing trusted medical knowledge",
                    "Considering your unique needs",
                    "Preparing personalized guidance",
                    "Ensuring accuracy and empathy",
                ]),
                steps(&[
                    "Analyzing symptom patterns",
                    "Reviewing wellness research",
                    "Connecting to practical solutions",
                    "Crafting supportive advice",
                ]),
                steps(&[
                    "Processing your health query",
                    "Consulting evidence-based resources",
                    "Tailoring recommendations for you",
                    "Preparing helpful insights",
                ]),
                steps(&[
                    "Evaluating your wellness question",
                    "Gathering menopause expertise",
                    "Formulating compassionate guidance",
                    "Ensuring clarity and support",
                ]),
            ],
            use_knowledge_base: true,
            quick_questions: steps(&[
                "What are common menopause symptoms?",
                "How can I manage hot flashes?",
                "Tips for better sleep during menopause",
            ]),
            welcome: "Hi, I'm Freeda, your menopause companion. How are you feeling today?"
                .to_string(),
        }
    }

    /// Business-intelligence assistant
    pub fn aspect() -> Self {
        Self {
            agent_name: "Aspect".to_string(),
            display_name: "Aspect Insight".to_string(),
            storage_prefix: "aspect_".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            thinking_steps: vec![
                steps(&[
                    "Understanding your business question",
                    "Accessing financial data",
                    "Analyzing metrics and trends",
                    "Preparing insights",
                    "Ensuring accuracy",
                ]),
                steps(&[
                    "Processing your query",
                    "Consulting business intelligence",
                    "Calculating key metrics",
                    "Crafting your report",
                ]),
                steps(&[
                    "Evaluating your request",
                    "Gathering sales and inventory data",
                    "Formulating recommendations",
                    "Preparing actionable insights",
                ]),
                steps(&[
                    "Analyzing business patterns",
                    "Reviewing performance data",
                    "Connecting to best practices",
                    "Building your response",
                ]),
            ],
            use_knowledge_base: false,
            quick_questions: steps(&[
                "Show me this week's sales summary",
                "Which products are running low on stock?",
                "How is our cash flow this month?",
            ]),
            welcome: "Welcome to Aspect Insight. Ask me about your sales, inventory or finances."
                .to_string(),
        }
    }

    /// Look up a built-in profile by name
    pub fn builtin(name: &str) -> Result<Self, ProfileError> {
        match name.to_lowercase().as_str() {
            "freeda" | "freeda2" | "freeda-2.0" => Ok(Self::freeda()),
            "aspect" => Ok(Self::aspect()),
            _ => Err(ProfileError::Unknown(name.to_string())),
        }
    }

    /// Reject profiles that could not address the server or the local store
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.agent_name.trim().is_empty() {
            return Err(ProfileError::EmptyField("agent_name"));
        }
        if self.storage_prefix.is_empty() {
            return Err(ProfileError::EmptyField("storage_prefix"));
        }
        if self.base_url.trim().is_empty() {
            return Err(ProfileError::EmptyField("base_url"));
        }
        Ok(())
    }
}
