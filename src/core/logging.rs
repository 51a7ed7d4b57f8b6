//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// # Example
/// ```
/// sceneopt::core::logging::init();
/// log::info!("Optimizer started");
/// ```
pub fn init() {
    let _ = try_init();
}

/// Initialize logging, reporting whether a logger was already installed.
///
/// Benches and tests call this repeatedly; only the first call installs.
pub fn try_init() -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .is_test(cfg!(test))
    .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_repeatable() {
        init();
        init();
        // Second explicit install must fail rather than panic
        assert!(try_init().is_err());
    }
}
