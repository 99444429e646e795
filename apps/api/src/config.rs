use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_API_VERSION: &str = "2024-02-15-preview";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub azure_openai_endpoint: String,
    pub azure_openai_api_key: String,
    pub azure_openai_deployment: String,
    pub azure_openai_api_version: String,
    pub llm_timeout_secs: u64,
    pub upload_dir: PathBuf,
    pub template_dir: PathBuf,
    /// Directory holding the pdfium shared library. `None` = system lookup.
    pub pdfium_lib_dir: Option<PathBuf>,
    pub soffice_bin: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            app_name: optional_env("APP_NAME").unwrap_or_else(|| "ResumeGPT".to_string()),
            azure_openai_endpoint: require_env("AZURE_OPENAI_ENDPOINT")?,
            azure_openai_api_key: require_env("AZURE_OPENAI_API_KEY")?,
            azure_openai_deployment: require_env("AZURE_OPENAI_DEPLOYMENT_NAME")?,
            azure_openai_api_version: optional_env("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            llm_timeout_secs: optional_env("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|| "120".to_string())
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            upload_dir: optional_env("UPLOAD_DIR")
                .unwrap_or_else(|| "uploads".to_string())
                .into(),
            template_dir: optional_env("TEMPLATE_DIR")
                .unwrap_or_else(|| "templates".to_string())
                .into(),
            pdfium_lib_dir: optional_env("PDFIUM_LIB_DIR").map(PathBuf::from),
            soffice_bin: optional_env("SOFFICE_BIN").unwrap_or_else(|| "soffice".to_string()),
            port: optional_env("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Configuration pointing at scratch directories, with dummy credentials.
    #[cfg(test)]
    pub fn for_tests(upload_dir: PathBuf, template_dir: PathBuf) -> Self {
        Config {
            app_name: "ResumeGPT".to_string(),
            azure_openai_endpoint: "https://example.openai.azure.com".to_string(),
            azure_openai_api_key: "test-key".to_string(),
            azure_openai_deployment: "gpt-4o".to_string(),
            azure_openai_api_version: DEFAULT_API_VERSION.to_string(),
            llm_timeout_secs: 5,
            upload_dir,
            template_dir,
            pdfium_lib_dir: None,
            soffice_bin: "soffice".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
