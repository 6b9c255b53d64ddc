//! Form Validation
//!
//! Field-level checks for the auth screens. Errors stay with the form
//! that produced them and are shown next to the offending input.

use super::state::{IndividualType, UserRole};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static EMAIL_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

static PHONE_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[+]?[(]?[0-9]{3}[)]?[-\s.]?[0-9]{3}[-\s.]?[0-9]{4,6}$").ok()
});

pub const MIN_PASSWORD: usize = 6;
pub const MIN_RESET_PASSWORD: usize = 12;
pub const OTP_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Email,
    EmailOrPhone,
    Password,
    ConfirmPassword,
    UserType,
    IndividualType,
    Otp,
}

/// First error per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    fn add(&mut self, field: Field, message: &str) {
        self.0.entry(field).or_insert_with(|| message.to_string());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(value.trim()))
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.as_ref().is_some_and(|re| re.is_match(value.trim()))
}

/// Sign-up identifier, split into the two shapes the backend accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contact {
    Email(String),
    Phone(String),
}

impl Contact {
    /// Anything with an `@` is an email; phones keep only digits and `+`
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.contains('@') {
            Self::Email(value.to_string())
        } else {
            Self::Phone(
                value
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '+')
                    .collect(),
            )
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if !is_valid_email(&self.email) {
            errors.add(Field::Email, "Please enter a valid email");
        }
        if self.password.chars().count() < MIN_PASSWORD {
            errors.add(Field::Password, "Password must be at least 6 characters");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub email_or_phone: String,
    pub password: String,
    pub confirm_password: String,
    pub user_type: Option<UserRole>,
    pub individual_type: Option<IndividualType>,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if !is_valid_email(&self.email_or_phone) && !is_valid_phone(&self.email_or_phone) {
            errors.add(Field::EmailOrPhone, "Please enter a valid email or phone number");
        }
        if self.password.chars().count() < MIN_PASSWORD {
            errors.add(Field::Password, "Password must be at least 6 characters");
        }
        if self.confirm_password.chars().count() < MIN_PASSWORD {
            errors.add(Field::ConfirmPassword, "Password must be at least 6 characters");
        }
        if self.password != self.confirm_password {
            errors.add(Field::ConfirmPassword, "Passwords don't match");
        }
        match self.user_type {
            None => errors.add(Field::UserType, "Please select a user type"),
            Some(UserRole::Tokenizer) if self.individual_type.is_none() => {
                errors.add(
                    Field::IndividualType,
                    "Individual type is required for tokenizers",
                );
            }
            Some(_) => {}
        }
        errors.into_result()
    }

    /// Individual type is only sent for tokenizers
    pub fn individual_type_for_request(&self) -> Option<IndividualType> {
        match self.user_type {
            Some(UserRole::Tokenizer) => self.individual_type,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if !is_valid_email(&self.email) {
            errors.add(Field::Email, "Please enter a valid email");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OtpForm {
    pub otp: String,
}

impl OtpForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.otp.chars().count() != OTP_LEN || !self.otp.chars().all(|c| c.is_ascii_digit()) {
            errors.add(Field::Otp, "OTP must be 6 digits");
        }
        errors.into_result()
    }

    /// Append a digit, ignoring anything past six
    pub fn push_digit(&mut self, c: char) {
        if c.is_ascii_digit() && self.otp.len() < OTP_LEN {
            self.otp.push(c);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        let pw = &self.password;
        if pw.chars().count() < MIN_RESET_PASSWORD {
            errors.add(Field::Password, "Password must be at least 12 characters");
        } else if !pw.chars().any(|c| c.is_ascii_digit()) {
            errors.add(Field::Password, "Password must include at least 1 number");
        } else if !pw.chars().any(|c| c.is_ascii_uppercase()) {
            errors.add(Field::Password, "Password must include at least 1 uppercase letter");
        } else if pw.chars().all(|c| c.is_ascii_alphanumeric()) {
            errors.add(Field::Password, "Password must include at least 1 special symbol");
        }
        if self.confirm_password.chars().count() < MIN_PASSWORD {
            errors.add(Field::ConfirmPassword, "Password must be at least 6 characters");
        }
        if self.password != self.confirm_password {
            errors.add(Field::ConfirmPassword, "Passwords don't match");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("user@example.com", true)]
    #[case("a@b.co", true)]
    #[case("no-at-sign.com", false)]
    #[case("spaces in@mail.com", false)]
    #[case("missing@tld", false)]
    fn test_email(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(is_valid_email(input), ok);
    }

    #[rstest]
    #[case("555-123-4567", true)]
    #[case("+1(555)1234567", false)]
    #[case("(555) 123-4567", true)]
    #[case("5551234567", true)]
    #[case("12345", false)]
    fn test_phone(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(is_valid_phone(input), ok);
    }

    #[test]
    fn test_sign_in() {
        let form = SignInForm {
            email: "bad".into(),
            password: "123".into(),
        };
        let errs = form.validate().unwrap_err();
        assert_eq!(errs.get(Field::Email), Some("Please enter a valid email"));
        assert_eq!(
            errs.get(Field::Password),
            Some("Password must be at least 6 characters")
        );

        let ok = SignInForm {
            email: "a@b.co".into(),
            password: "secret1".into(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_sign_up_tokenizer_needs_individual_type() {
        let mut form = SignUpForm {
            email_or_phone: "555-123-4567".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            user_type: Some(UserRole::Tokenizer),
            individual_type: None,
        };
        let errs = form.validate().unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs.get(Field::IndividualType).is_some());

        form.individual_type = Some(IndividualType::Broker);
        assert!(form.validate().is_ok());

        form.user_type = Some(UserRole::Investor);
        assert_eq!(form.individual_type_for_request(), None);
    }

    #[test]
    fn test_sign_up_mismatch() {
        let form = SignUpForm {
            email_or_phone: "a@b.co".into(),
            password: "secret1".into(),
            confirm_password: "secret2".into(),
            user_type: Some(UserRole::Investor),
            individual_type: None,
        };
        let errs = form.validate().unwrap_err();
        assert_eq!(errs.get(Field::ConfirmPassword), Some("Passwords don't match"));
    }

    #[test]
    fn test_contact_parse() {
        assert_eq!(Contact::parse(" a@b.co "), Contact::Email("a@b.co".into()));
        assert_eq!(
            Contact::parse("+1 (555) 123-4567"),
            Contact::Phone("+15551234567".into())
        );
    }

    #[test]
    fn test_otp() {
        let mut form = OtpForm::default();
        for c in "12a3456789".chars() {
            form.push_digit(c);
        }
        assert_eq!(form.otp, "123456");
        assert!(form.validate().is_ok());

        let short = OtpForm { otp: "123".into() };
        assert_eq!(
            short.validate().unwrap_err().get(Field::Otp),
            Some("OTP must be 6 digits")
        );
    }

    #[rstest]
    #[case("Short1!", Some("Password must be at least 12 characters"))]
    #[case("NoDigitsHere!!", Some("Password must include at least 1 number"))]
    #[case("lowercase123!", Some("Password must include at least 1 uppercase letter"))]
    #[case("NoSymbols1234", Some("Password must include at least 1 special symbol"))]
    #[case("Str0ng!Passw0rd", None)]
    fn test_reset_password_rules(#[case] pw: &str, #[case] expected: Option<&str>) {
        let form = ResetPasswordForm {
            password: pw.into(),
            confirm_password: pw.into(),
        };
        match expected {
            Some(msg) => assert_eq!(form.validate().unwrap_err().get(Field::Password), Some(msg)),
            None => assert!(form.validate().is_ok()),
        }
    }
}
