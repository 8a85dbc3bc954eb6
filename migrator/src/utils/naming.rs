use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the random suffix appended to generated package names
pub const PACKAGE_SUFFIX_LEN: usize = 8;

/// Random alphanumeric string of `len` characters
pub fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Export package name for `content_name`: `<content-name>-<suffix>`
pub fn package_name(content_name: &str) -> String {
    format!("{}-{}", content_name, random_token(PACKAGE_SUFFIX_LEN))
}

/// Identifier that keeps concurrent runs out of each other's working directory
pub fn run_id() -> String {
    random_token(12).to_ascii_lowercase()
}
