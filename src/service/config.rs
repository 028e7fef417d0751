use std::{env, sync::Arc};

use crate::config::Config;

const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "http://localhost:3000",
    "https://yamahastore.netlify.app",
];

pub trait ConfigService: Send + Sync {
    fn port(&self) -> u16;
    fn values(&self) -> &Config;
}

pub struct ConfigServiceImpl {
    config: Arc<Config>,
}

impl ConfigServiceImpl {
    fn strip_wrapping_quotes(value: &str) -> &str {
        let bytes = value.as_bytes();
        if let (Some(&first), Some(&last)) = (bytes.first(), bytes.last()) {
            if bytes.len() >= 2
                && ((first == b'"' && last == b'"') || (first == b'\'' && last == b'\''))
            {
                return &value[1..value.len() - 1];
            }
        }
        value
    }

    fn env_nonempty(key: &str) -> Option<String> {
        env::var(key).ok().and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return None;
            }
            let normalized = Self::strip_wrapping_quotes(trimmed).trim();
            if normalized.is_empty() {
                None
            } else {
                Some(normalized.to_string())
            }
        })
    }

    fn env_u16(key: &str) -> Option<u16> {
        Self::env_nonempty(key).and_then(|value| value.parse::<u16>().ok())
    }

    fn env_usize(key: &str) -> Option<usize> {
        Self::env_nonempty(key).and_then(|value| value.parse::<usize>().ok())
    }

    fn env_list(key: &str) -> Option<Vec<String>> {
        Self::env_nonempty(key).map(|value| Self::split_list(&value))
    }

    fn split_list(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .map(|item| item.to_string())
            .collect()
    }

    pub fn new() -> Self {
        let port = Self::env_u16("PORT").unwrap_or(5000);
        let jwt_secret = Self::env_nonempty("JWT_SECRET");
        let google_client_id = Self::env_nonempty("AUTH_GOOGLE_CLIENT_ID");
        let google_tokeninfo_url = Self::env_nonempty("GOOGLE_TOKENINFO_URL")
            .unwrap_or_else(|| "https://oauth2.googleapis.com/tokeninfo".to_string());
        let cors_allowed_origins = Self::env_list("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| {
            DEFAULT_CORS_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect()
        });
        let allowed_email_domains = Self::env_list("ALLOWED_EMAIL_DOMAINS")
            .map(|domains| {
                domains
                    .into_iter()
                    .map(|domain| domain.trim_start_matches('@').to_ascii_lowercase())
                    .collect()
            })
            .unwrap_or_else(|| vec!["gmail.com".to_string()]);
        let max_upload_bytes = Self::env_usize("MAX_UPLOAD_BYTES").unwrap_or(5 * 1024 * 1024);

        let cloudinary_cloud_name = Self::env_nonempty("CLOUDINARY_CLOUD_NAME");
        let cloudinary_api_key = Self::env_nonempty("CLOUDINARY_API_KEY");
        let cloudinary_api_secret = Self::env_nonempty("CLOUDINARY_API_SECRET");

        let admin_email = Self::env_nonempty("ADMIN_EMAIL").map(|value| value.to_lowercase());
        let admin_password = Self::env_nonempty("ADMIN_PASSWORD");
        let admin_name = Self::env_nonempty("ADMIN_NAME");

        Self {
            config: Arc::new(Config {
                port,
                jwt_secret,
                google_client_id,
                google_tokeninfo_url,
                cors_allowed_origins,
                allowed_email_domains,
                max_upload_bytes,
                cloudinary_cloud_name,
                cloudinary_api_key,
                cloudinary_api_secret,
                admin_email,
                admin_password,
                admin_name,
            }),
        }
    }

    #[cfg(test)]
    pub fn from_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl ConfigService for ConfigServiceImpl {
    fn port(&self) -> u16 {
        self.config.port
    }

    fn values(&self) -> &Config {
        &self.config
    }
}
