//! Input validation utilities
//!
//! Every check returns the message to show in the form. Nothing here
//! touches the network.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{ClientError, ClientResult};

/// Minimum password length accepted by the backend
pub const MIN_PASSWORD_LENGTH: usize = 8;

fn invalid(message: &str) -> ClientError {
    ClientError::Validation(message.to_string())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Validate email
pub fn validate_email(email: &str) -> ClientResult<()> {
    if is_blank(email) {
        return Err(invalid("Email is required"));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email regex")
    });

    if !regex.is_match(email.trim()) {
        return Err(invalid("Invalid email address"));
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> ClientResult<()> {
    if password.is_empty() {
        return Err(invalid("Password is required"));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(invalid("Password must be at least 8 characters long"));
    }

    Ok(())
}

/// Validate a password and its confirmation
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> ClientResult<()> {
    if password.is_empty() || confirmation.is_empty() {
        return Err(invalid("All fields are required"));
    }

    validate_password(password)?;

    if password != confirmation {
        return Err(invalid("Passwords do not match"));
    }

    Ok(())
}

/// Validate the login form
pub fn validate_login(email: &str, password: &str) -> ClientResult<()> {
    if is_blank(email) || password.is_empty() {
        return Err(invalid("Please fill in all fields"));
    }

    Ok(())
}

/// Validate the fields sent to the registration endpoint
pub fn validate_registration(name: &str, email: &str, password: &str) -> ClientResult<()> {
    if is_blank(name) || is_blank(email) || password.is_empty() {
        return Err(invalid("Please fill in all fields"));
    }

    validate_email(email)?;
    validate_password(password)
}

/// Validate the full registration form, including the confirmation field
pub fn validate_registration_form(
    name: &str,
    email: &str,
    password: &str,
    confirmation: &str,
) -> ClientResult<()> {
    validate_registration(name, email, password)?;

    if password != confirmation {
        return Err(invalid("Passwords do not match"));
    }

    Ok(())
}

/// Validate the profile form
pub fn validate_profile(name: &str, email: &str) -> ClientResult<()> {
    if is_blank(name) {
        return Err(invalid("Name is required"));
    }

    validate_email(email)
}

/// Validate a mobile-money phone number
pub fn validate_phone(phone: &str) -> ClientResult<()> {
    if is_blank(phone) {
        return Err(invalid("Please enter your phone number"));
    }

    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX
        .get_or_init(|| Regex::new(r"^\+?[0-9 ]{6,20}$").expect("Failed to compile phone regex"));

    if !regex.is_match(phone.trim()) {
        return Err(invalid("Invalid phone number"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: ClientResult<()>) -> String {
        result.unwrap_err().user_message()
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane@example.com").is_ok());
        assert_eq!(message(validate_email("")), "Email is required");
        assert_eq!(message(validate_email("jane@example")), "Invalid email address");
        assert_eq!(message(validate_email("ja ne@example.com")), "Invalid email address");
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("12345678").is_ok());
        assert_eq!(
            message(validate_password("1234567")),
            "Password must be at least 8 characters long"
        );
    }

    #[test]
    fn test_registration_form_checks_confirmation() {
        assert!(
            validate_registration_form("Jane", "jane@example.com", "secret123", "secret123")
                .is_ok()
        );
        assert_eq!(
            message(validate_registration_form(
                "Jane",
                "jane@example.com",
                "secret123",
                "secret124"
            )),
            "Passwords do not match"
        );
        assert_eq!(
            message(validate_registration("", "jane@example.com", "secret123")),
            "Please fill in all fields"
        );
    }

    #[test]
    fn test_password_confirmation() {
        assert_eq!(
            message(validate_password_confirmation("", "")),
            "All fields are required"
        );
        assert_eq!(
            message(validate_password_confirmation("short", "short")),
            "Password must be at least 8 characters long"
        );
        assert!(validate_password_confirmation("long enough", "long enough").is_ok());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+243 812 345 678").is_ok());
        assert_eq!(message(validate_phone("  ")), "Please enter your phone number");
        assert_eq!(message(validate_phone("call me")), "Invalid phone number");
    }

    #[test]
    fn test_validate_login_requires_both_fields() {
        assert!(validate_login("jane@example.com", "x").is_ok());
        assert_eq!(message(validate_login("jane@example.com", "")), "Please fill in all fields");
    }
}
