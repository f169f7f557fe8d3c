use std::env;
use std::time::Duration;

use query::ContextLimits;

/// Environment-driven service settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub bind_addr: String,
    pub llm_api_base: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    pub llm_timeout: Duration,
    pub context_limits: ContextLimits,
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = ContextLimits::default();
        Self {
            neo4j_uri: env_or("APP_NEO4J_URI", "bolt://localhost:7687"),
            neo4j_user: env_or("APP_NEO4J_USER", "neo4j"),
            neo4j_password: env_or("APP_NEO4J_PASSWORD", "neo4j"),
            bind_addr: env_or("APP_BIND_ADDR", "0.0.0.0:8000"),
            llm_api_base: env_or("APP_LLM_API_BASE", "https://api.openai.com/v1"),
            llm_api_key: env::var("APP_LLM_API_KEY").ok().filter(|v| !v.is_empty()),
            llm_model: env_or("APP_LLM_MODEL", "gpt-4o-mini"),
            llm_temperature: env_f32("APP_LLM_TEMPERATURE", 0.2),
            llm_max_tokens: env_u32("APP_LLM_MAX_TOKENS", 600),
            llm_timeout: Duration::from_secs(env_u64("APP_LLM_TIMEOUT_SECONDS", 30)),
            context_limits: ContextLimits {
                max_reactions: env_usize("APP_RAG_CONTEXT_MAX_REACTIONS", defaults.max_reactions),
                max_compounds: env_usize("APP_RAG_CONTEXT_MAX_COMPOUNDS", defaults.max_compounds),
                max_enzymes: env_usize("APP_RAG_CONTEXT_MAX_ENZYMES", defaults.max_enzymes),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn env_f32(key: &str, default: f32) -> f32 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<f32>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
        .unwrap_or(default)
}
