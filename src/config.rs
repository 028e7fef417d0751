#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: Option<String>,
    pub google_client_id: Option<String>,
    pub google_tokeninfo_url: String,
    pub cors_allowed_origins: Vec<String>,
    pub allowed_email_domains: Vec<String>,
    pub max_upload_bytes: usize,

    // Asset store credentials. Uploads fail with a 500 until all three are set.
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_api_key: Option<String>,
    pub cloudinary_api_secret: Option<String>,

    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: Option<String>,
}

impl Config {
    pub fn email_domain_allowed(&self, email: &str) -> bool {
        let Some((_, domain)) = email.rsplit_once('@') else {
            return false;
        };
        self.allowed_email_domains
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(domain))
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            jwt_secret: Some("test-secret".to_string()),
            google_client_id: Some("test-client.apps.googleusercontent.com".to_string()),
            google_tokeninfo_url: "http://localhost/tokeninfo".to_string(),
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
            allowed_email_domains: vec!["gmail.com".to_string()],
            max_upload_bytes: 5 * 1024 * 1024,
            cloudinary_cloud_name: None,
            cloudinary_api_key: None,
            cloudinary_api_secret: None,
            admin_email: None,
            admin_password: None,
            admin_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_domain_allow_list_is_case_insensitive() {
        let config = Config::default();
        assert!(config.email_domain_allowed("ana@gmail.com"));
        assert!(config.email_domain_allowed("ana@GMAIL.com"));
        assert!(!config.email_domain_allowed("ana@yahoo.com"));
        assert!(!config.email_domain_allowed("ana@gmail.com.evil.io"));
        assert!(!config.email_domain_allowed("no-at-sign"));
    }
}
