/// Normalizes an email for comparison and storage: trimmed and lower-cased.
/// Two inputs that normalize to the same value are the same identity.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
