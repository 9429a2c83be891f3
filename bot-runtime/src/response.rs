//! User-facing reply formatting and the fixed boundary texts.

/// Generic reply sent when a handler fails; the real error only goes to
/// the logs.
pub const GENERIC_FAILURE: &str = "❌ An error occurred. Please try again.";

/// Reply for a button whose identifier no longer resolves (e.g. a stale
/// keyboard from before a restart).
pub const UNKNOWN_BUTTON: &str = "Unknown button. Please open the menu again.";

pub fn success(message: &str) -> String {
    format!("✅ {}", message)
}

pub fn error(message: &str) -> String {
    format!("❌ {}", message)
}

pub fn info(message: &str) -> String {
    format!("ℹ️ {}", message)
}

pub fn unknown_command(command: &str) -> String {
    format!("Unknown command: /{}", command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(success("saved"), "✅ saved");
        assert_eq!(error("failed"), "❌ failed");
        assert_eq!(info("note"), "ℹ️ note");
    }

    #[test]
    fn test_unknown_command_names_the_command() {
        assert_eq!(unknown_command("nope"), "Unknown command: /nope");
    }
}
