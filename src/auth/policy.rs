// Vaultline — Password Strength Policy
//
// A master password is Strong when it has at least eight characters and
// mixes ASCII uppercase, lowercase, digits and punctuation. Anything else is
// Weak. The rendered message is sent back to the client on REGISTER and
// CHANGE_PASS, whether or not the password is accepted.

use std::fmt;

/// Minimum number of characters for a Strong password.
const MIN_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    Strong,
    Weak,
}

impl PasswordStrength {
    /// Classify a candidate password.
    pub fn evaluate(password: &str) -> Self {
        let mut has_upper = false;
        let mut has_lower = false;
        let mut has_digit = false;
        let mut has_special = false;

        for c in password.chars() {
            if c.is_ascii_digit() {
                has_digit = true;
            } else if c.is_ascii_uppercase() {
                has_upper = true;
            } else if c.is_ascii_lowercase() {
                has_lower = true;
            } else if c.is_ascii_punctuation() {
                has_special = true;
            }
        }

        if password.chars().count() >= MIN_LENGTH
            && has_upper
            && has_lower
            && has_digit
            && has_special
        {
            Self::Strong
        } else {
            Self::Weak
        }
    }

    pub fn is_strong(self) -> bool {
        self == Self::Strong
    }
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strong => write!(f, "Password strength: Strong"),
            Self::Weak => write!(
                f,
                "Password strength: Weak - Consider using a longer password with uppercase, \
                 lowercase, digits, and special characters."
            ),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_password_is_strong() {
        assert_eq!(PasswordStrength::evaluate("Abcdef1!"), PasswordStrength::Strong);
        assert_eq!(PasswordStrength::evaluate("Str0ng!Pw"), PasswordStrength::Strong);
    }

    #[test]
    fn test_lowercase_only_is_weak() {
        assert_eq!(PasswordStrength::evaluate("abcdefgh"), PasswordStrength::Weak);
    }

    #[test]
    fn test_short_password_is_weak_even_with_all_classes() {
        assert_eq!(PasswordStrength::evaluate("Ab1!xyz"), PasswordStrength::Weak);
    }

    #[test]
    fn test_each_missing_class_makes_it_weak() {
        for candidate in ["abcdef1!", "ABCDEF1!", "Abcdefg!", "Abcdefg1"] {
            assert!(
                !PasswordStrength::evaluate(candidate).is_strong(),
                "{} should be weak",
                candidate
            );
        }
    }

    #[test]
    fn test_empty_password_is_weak() {
        assert!(!PasswordStrength::evaluate("").is_strong());
    }

    #[test]
    fn test_messages() {
        assert_eq!(PasswordStrength::Strong.to_string(), "Password strength: Strong");
        let weak = PasswordStrength::Weak.to_string();
        assert!(weak.starts_with("Password strength: Weak"));
        assert!(weak.contains("special characters."));
    }
}
