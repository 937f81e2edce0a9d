//! `version` command

/// Program name, version and the platform it was built for
pub fn version_line() -> String {
    format!(
        "{} {} ({}-{})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::ARCH,
        std::env::consts::OS
    )
}

/// Handle the version command
pub fn handle_version_command() {
    println!("{}", version_line());
}
