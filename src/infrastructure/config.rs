use std::env;

/// Page size used when a listing request carries no `limit`
pub const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub default_page_size: i64,
    /// Bootstrap administrator, created at startup when both are set
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://mangatheque.db?mode=rwc".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(Vec::new),
            default_page_size: env::var("DEFAULT_PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|size: &i64| *size > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            admin_email: env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty()),
            seed_demo: env::var("SEED_DEMO")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &["DEFAULT_PAGE_SIZE", "CORS_ALLOWED_ORIGINS", "SEED_DEMO", "ADMIN_EMAIL"];

    fn clear() {
        for var in VARS {
            // SAFETY: env-mutating tests are serialized
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear();
        let config = Config::from_env();
        assert_eq!(config.default_page_size, DEFAULT_PAGE_SIZE);
        assert!(config.cors_allowed_origins.is_empty());
        assert!(!config.seed_demo);
        assert!(config.admin_email.is_none());
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear();
        // SAFETY: env-mutating tests are serialized
        unsafe {
            env::set_var("DEFAULT_PAGE_SIZE", "25");
            env::set_var("CORS_ALLOWED_ORIGINS", "http://localhost:3000, ,https://manga.example");
            env::set_var("SEED_DEMO", "1");
        }

        let config = Config::from_env();
        assert_eq!(config.default_page_size, 25);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000", "https://manga.example"]
        );
        assert!(config.seed_demo);

        // SAFETY: env-mutating tests are serialized
        unsafe { env::set_var("DEFAULT_PAGE_SIZE", "0") };
        assert_eq!(Config::from_env().default_page_size, DEFAULT_PAGE_SIZE);
        clear();
    }
}
