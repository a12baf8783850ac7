/// Binary name
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// "name version", as printed at startup
pub fn print() -> String {
    format!("{NAME} {VERSION}")
}
