//! Account form validation: signup, login and settings.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::FieldErrors;
use crate::profile::TECH_CAREERS;

/// Reject empty or whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn known_tech_career(value: &str) -> Result<(), ValidationError> {
    if TECH_CAREERS.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("tech_career"))
    }
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    #[validate(custom(function = "not_blank", message = "Full name is required."))]
    pub full_name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Phone number cannot be blank."))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(custom(function = "not_blank", message = "Password is required."))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SettingsForm {
    #[validate(custom(function = "not_blank", message = "Display name is required."))]
    pub display_name: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "Bio must be at most 500 characters."))]
    pub bio: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "known_tech_career", message = "Select a tech career from the list."))]
    pub tech_career: Option<String>,
}

macro_rules! field_checked {
    ($($form:ty),*) => {$(
        impl $form {
            /// Run the derived rules, collecting failures per field.
            pub fn check(&self) -> Result<(), FieldErrors> {
                self.validate().map_err(FieldErrors::from)
            }
        }
    )*};
}

field_checked!(SignupForm, LoginForm, SettingsForm);

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupForm {
        SignupForm {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password: "secret1".into(),
            phone_number: None,
        }
    }

    #[test]
    fn signup_valid() {
        assert!(signup().check().is_ok());
    }

    #[test]
    fn signup_password_boundary() {
        let mut form = signup();
        form.password = "12345".into();
        assert!(form.check().unwrap_err().contains("password"));
        form.password = "123456".into();
        assert!(form.check().is_ok());
    }

    #[test]
    fn signup_reports_every_bad_field() {
        let form = SignupForm {
            full_name: " ".into(),
            email: "nope".into(),
            password: "x".into(),
            phone_number: Some("".into()),
        };
        let errors = form.check().unwrap_err();
        assert!(errors.contains("fullName"));
        assert!(errors.contains("email"));
        assert!(errors.contains("password"));
        assert!(errors.contains("phoneNumber"));
        assert_eq!(
            errors.message_for("password"),
            Some("Password must be at least 6 characters.")
        );
    }

    #[test]
    fn login_requires_password() {
        let form = LoginForm {
            email: "ada@example.com".into(),
            password: String::new(),
        };
        assert!(form.check().unwrap_err().contains("password"));
    }

    #[test]
    fn settings_bio_limit_and_career() {
        let mut form = SettingsForm {
            display_name: "Ada".into(),
            bio: Some("b".repeat(500)),
            tech_career: Some("Data Scientist".into()),
        };
        assert!(form.check().is_ok());

        form.bio = Some("b".repeat(501));
        form.tech_career = Some("Wizard".into());
        let errors = form.check().unwrap_err();
        assert!(errors.contains("bio"));
        assert!(errors.contains("techCareer"));
    }
}
