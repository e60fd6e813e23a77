#[cfg(test)]
pub mod test {
    use confique::Config;

    #[derive(Config, Debug, PartialEq)]
    pub struct ServiceConfig {
        /// Service name used in logs.
        #[config(default = "billing")]
        pub name: String,

        /// Listen port.
        #[config(default = 8080)]
        pub port: u16,

        /// Enable debug mode.
        #[config(default = false)]
        pub debug: bool,

        /// Database settings.
        #[config(nested)]
        pub database: DbConfig,
    }

    #[derive(Config, Debug, PartialEq)]
    pub struct DbConfig {
        /// Connection string URL.
        pub url: Option<String>,

        /// Connection pool size.
        #[config(default = 5)]
        pub pool_size: usize,
    }

    /// No defaults: loading fails unless a file supplies `token`.
    #[derive(Config, Debug)]
    pub struct TokenConfig {
        pub token: String,
    }

    #[test]
    fn service_config_defaults() {
        let config = ServiceConfig::builder().load().unwrap();
        assert_eq!(config.name, "billing");
        assert_eq!(config.port, 8080);
        assert!(!config.debug);
        assert_eq!(config.database.url, None);
        assert_eq!(config.database.pool_size, 5);
    }
}
