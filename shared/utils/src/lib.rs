pub mod config;
pub mod logging;

pub use config::*;
pub use logging::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.connection_timeout().as_secs(), 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file_path.is_none());
    }

    #[test]
    fn test_config_load_without_files_uses_defaults() {
        let config = AppConfig::load().unwrap();
        assert!(!config.database.postgres_url.is_empty());
        assert!(config.database.max_connections > 0);
        assert!(!config.logging.format.is_empty());
    }

    #[test]
    fn test_init_logging_installs_once() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "text".to_string(),
            file_path: None,
        };

        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_err());

        crate::log_info!("store ready", backend = "memory");
        crate::log_debug!("cache miss");
        crate::log_warn!("slow query", elapsed_ms = 1200u64);
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        crate::log_error!(err, "store operation failed", operation = "test");
    }
}
