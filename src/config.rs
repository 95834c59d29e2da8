use anyhow::{Context, Result};
use reqwest::Url;
use std::env;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_VAR: &str = "DOCUMATE_API_URL";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the document service, always ending in `/`.
    pub api_base_url: Url,
}

impl Config {
    pub fn new(api_base_url: &str) -> Result<Self> {
        let mut url = Url::parse(api_base_url)
            .with_context(|| format!("invalid service URL: {}", api_base_url))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("service URL cannot be used as a base: {}", api_base_url);
        }
        // Url::join drops the last path segment unless the base ends in '/'.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Config { api_base_url: url })
    }

    /// Reads the service URL from the environment (after `.env`), falling back to the default.
    pub fn from_env() -> Result<Self> {
        let url = env::var(API_URL_VAR).unwrap_or(DEFAULT_API_URL.to_string());
        Self::new(&url)
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base_url
            .join(path)
            .with_context(|| format!("invalid endpoint path: {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = Config::new("http://localhost:8000").unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:8000/");
        assert_eq!(
            config.endpoint("upload").unwrap().as_str(),
            "http://localhost:8000/upload"
        );
    }

    #[test]
    fn test_path_prefix_is_kept() {
        let config = Config::new("https://docs.example.com/api").unwrap();
        assert_eq!(
            config.endpoint("query").unwrap().as_str(),
            "https://docs.example.com/api/query"
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(Config::new("not a url").is_err());
        assert!(Config::new("mailto:someone@example.com").is_err());
    }
}
