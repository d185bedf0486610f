use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an unparseable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing/validation core is decoupled from the real environment so tests
/// can drive it with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("JOGJASTAY_ENV", "development"));
    let bind_addr = parse_addr("JOGJASTAY_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("JOGJASTAY_LOG_LEVEL", "info");
    let hotels_path = PathBuf::from(or_default("JOGJASTAY_HOTELS_PATH", "./config/hotels.yaml"));
    let store_path = lookup("JOGJASTAY_STORE_PATH").ok().map(PathBuf::from);
    let bootstrap_admin_email = lookup("JOGJASTAY_BOOTSTRAP_ADMIN_EMAIL").ok();
    let search_radius_km = parse_f64("JOGJASTAY_SEARCH_RADIUS_KM", "5")?;
    let review_feed_limit = parse_usize("JOGJASTAY_REVIEW_FEED_LIMIT", "8")?;

    if search_radius_km <= 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "JOGJASTAY_SEARCH_RADIUS_KM".to_string(),
            reason: "radius must be positive".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        hotels_path,
        store_path,
        bootstrap_admin_email,
        search_radius_km,
        review_feed_limit,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_known_values() {
        assert_eq!(parse_environment("development"), Environment::Development);
        assert_eq!(parse_environment("test"), Environment::Test);
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_succeeds_on_empty_environment() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should suffice");
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.hotels_path.to_string_lossy(), "./config/hotels.yaml");
        assert!(cfg.store_path.is_none());
        assert!(cfg.bootstrap_admin_email.is_none());
        assert!((cfg.search_radius_km - 5.0).abs() < f64::EPSILON);
        assert_eq!(cfg.review_feed_limit, 8);
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("JOGJASTAY_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "JOGJASTAY_BIND_ADDR"),
            "expected InvalidEnvVar(JOGJASTAY_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_with_non_numeric_radius() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("JOGJASTAY_SEARCH_RADIUS_KM", "five");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "JOGJASTAY_SEARCH_RADIUS_KM"),
            "expected InvalidEnvVar(JOGJASTAY_SEARCH_RADIUS_KM), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_non_positive_radius() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("JOGJASTAY_SEARCH_RADIUS_KM", "0");
        assert!(build_app_config(lookup_from_map(&map)).is_err());
    }

    #[test]
    fn build_app_config_reads_overrides() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("JOGJASTAY_ENV", "production");
        map.insert("JOGJASTAY_BIND_ADDR", "127.0.0.1:8088");
        map.insert("JOGJASTAY_STORE_PATH", "/var/lib/jogjastay/store.json");
        map.insert("JOGJASTAY_BOOTSTRAP_ADMIN_EMAIL", "arin@gmail.com");
        map.insert("JOGJASTAY_SEARCH_RADIUS_KM", "2.5");
        map.insert("JOGJASTAY_REVIEW_FEED_LIMIT", "4");
        let cfg = build_app_config(lookup_from_map(&map)).expect("valid overrides");
        assert_eq!(cfg.env, Environment::Production);
        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:8088");
        assert_eq!(
            cfg.store_path.as_deref().unwrap().to_string_lossy(),
            "/var/lib/jogjastay/store.json"
        );
        assert_eq!(cfg.bootstrap_admin_email.as_deref(), Some("arin@gmail.com"));
        assert!((cfg.search_radius_km - 2.5).abs() < f64::EPSILON);
        assert_eq!(cfg.review_feed_limit, 4);
    }
}
