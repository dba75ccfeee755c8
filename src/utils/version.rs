/// Returns the CLI version: `KODIPACK_CLI_VERSION` when set and non-empty,
/// otherwise the compile-time package version.
pub fn get_version() -> String {
    if let Ok(v) = std::env::var("KODIPACK_CLI_VERSION") {
        if !v.trim().is_empty() {
            return v;
        }
    }

    option_env!("CARGO_PKG_VERSION").unwrap_or("0.0.0").to_string()
}
