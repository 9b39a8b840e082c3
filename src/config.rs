use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureOpenAiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub chat_deployment: String,
    pub embedding_deployment: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentIntelligenceConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_poll_attempts() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    pub dir: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_max_embed_chars")]
    pub max_embed_chars: usize,
}

fn default_top_k() -> usize {
    4
}

fn default_max_embed_chars() -> usize {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub enable_cors: bool,
    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,
}

fn default_session_timeout() -> u64 {
    3600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub azure_openai: AzureOpenAiConfig,
    pub document_intelligence: DocumentIntelligenceConfig,
    pub knowledge_base: KnowledgeBaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            println!(
                "Warning: Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(crate::CarelineError::Config(
                "No config file found. Please create config.toml or config.example.toml"
                    .to_string(),
            ))
        }
    }

    /// Secrets are never required to live in the config file; environment
    /// variables take precedence when set.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("AZURE_OPENAI_API_KEY") {
            self.azure_openai.api_key = key;
        }
        if let Ok(endpoint) = std::env::var("AZURE_OPENAI_ENDPOINT") {
            self.azure_openai.endpoint = endpoint;
        }
        if let Ok(key) = std::env::var("AZURE_DOCUMENT_INTELLIGENCE_KEY") {
            self.document_intelligence.api_key = key;
        }
        if let Ok(endpoint) = std::env::var("AZURE_DOCUMENT_INTELLIGENCE_ENDPOINT") {
            self.document_intelligence.endpoint = endpoint;
        }
    }

    /// Get knowledge base directory
    pub fn knowledge_base_dir(&self) -> &str {
        &self.knowledge_base.dir
    }

    /// Get retrieval top-k
    pub fn top_k(&self) -> usize {
        self.knowledge_base.top_k
    }

    /// Get maximum characters per passage sent for embedding
    pub fn max_embed_chars(&self) -> usize {
        self.knowledge_base.max_embed_chars
    }

    /// Get session expiry timeout in seconds
    pub fn session_timeout_secs(&self) -> u64 {
        self.server.session_timeout_secs
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            azure_openai: AzureOpenAiConfig {
                endpoint: "https://your-resource.openai.azure.com".to_string(),
                api_key: String::new(),
                api_version: "2024-02-01".to_string(),
                chat_deployment: "gpt-4o".to_string(),
                embedding_deployment: "text-embedding-ada-002".to_string(),
                request_timeout_secs: 30,
            },
            document_intelligence: DocumentIntelligenceConfig {
                endpoint: "https://your-resource.cognitiveservices.azure.com".to_string(),
                api_key: String::new(),
                api_version: "2024-02-29-preview".to_string(),
                poll_interval_ms: 1000,
                max_poll_attempts: 10,
            },
            knowledge_base: KnowledgeBaseConfig {
                dir: "knowledge_base".to_string(),
                top_k: 4,
                max_embed_chars: 5000,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                enable_cors: false,
                session_timeout_secs: 3600,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                backtrace: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.knowledge_base.top_k, 4);
        assert_eq!(parsed.knowledge_base.max_embed_chars, 5000);
        assert_eq!(parsed.server.port, 8000);
    }

    #[test]
    fn test_optional_fields_take_defaults() {
        let toml_str = r#"
            [azure_openai]
            endpoint = "https://example.openai.azure.com"
            api_key = "secret"
            api_version = "2024-02-01"
            chat_deployment = "gpt-4o"
            embedding_deployment = "text-embedding-ada-002"

            [document_intelligence]
            endpoint = "https://example.cognitiveservices.azure.com"
            api_key = "secret"
            api_version = "2024-02-29-preview"

            [knowledge_base]
            dir = "kb"

            [server]
            host = "0.0.0.0"
            port = 9000

            [logging]
            level = "debug"
            backtrace = false
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.knowledge_base.top_k, 4);
        assert_eq!(config.document_intelligence.max_poll_attempts, 10);
        assert_eq!(config.server.session_timeout_secs, 3600);
        assert!(!config.server.enable_cors);
    }
}
