use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub email_address: String,
    pub app_password: String,
    pub imap_host: String,
    pub serper_api_key: String,
    pub serper_base_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            email_address: std::env::var("EMAIL_ADDRESS")
                .map_err(|_| anyhow::anyhow!("EMAIL_ADDRESS environment variable required"))
                .and_then(|addr| {
                    if addr.trim().is_empty() {
                        anyhow::bail!("EMAIL_ADDRESS cannot be empty");
                    }
                    if !addr.contains('@') {
                        anyhow::bail!("EMAIL_ADDRESS must be a valid email address");
                    }
                    Ok(addr)
                })?,
            app_password: std::env::var("APP_PASSWORD")
                .map_err(|_| anyhow::anyhow!("APP_PASSWORD environment variable required"))
                .and_then(|pass| {
                    if pass.trim().is_empty() {
                        anyhow::bail!("APP_PASSWORD cannot be empty");
                    }
                    Ok(pass)
                })?,
            imap_host: std::env::var("IMAP_HOST")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "imap.gmail.com".to_string()),
            serper_api_key: std::env::var("SERPER_API_KEY")
                .map_err(|_| anyhow::anyhow!("SERPER_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("SERPER_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            serper_base_url: std::env::var("SERPER_BASE_URL")
                .unwrap_or_else(|_| "https://google.serper.dev".to_string())
                .parse::<url::Url>()
                .map_err(|_| anyhow::anyhow!("SERPER_BASE_URL must be a valid URL"))
                .and_then(|url| {
                    if url.scheme() != "http" && url.scheme() != "https" {
                        anyhow::bail!("SERPER_BASE_URL must start with http:// or https://");
                    }
                    Ok(url.to_string().trim_end_matches('/').to_string())
                })?,
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("OPENAI_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string())
                .parse::<url::Url>()
                .map_err(|_| anyhow::anyhow!("OPENAI_BASE_URL must be a valid URL"))
                .and_then(|url| {
                    if url.scheme() != "http" && url.scheme() != "https" {
                        anyhow::bail!("OPENAI_BASE_URL must start with http:// or https://");
                    }
                    Ok(url.to_string().trim_end_matches('/').to_string())
                })?,
            model: std::env::var("MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Mailbox address: {}", config.email_address);
        tracing::debug!("IMAP host: {}", config.imap_host);
        tracing::debug!("Serper base URL: {}", config.serper_base_url);
        tracing::debug!("OpenAI base URL: {}", config.openai_base_url);
        tracing::debug!("Model: {}", config.model);
        tracing::debug!("Server port: {}", config.port);

        Ok(config)
    }
}
