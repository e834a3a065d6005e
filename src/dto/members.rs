use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    dto::{max_len, provided, require},
    entity::{members::MemberGender, parse_enum},
    error::{AppError, AppResult},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinRequest {
    pub username: String,
    pub password: String,
    pub phone: String,
    pub email: String,
    pub zip_code: String,
    pub city: String,
    pub street: String,
    /// `MALE` or `FEMALE`.
    pub gender: String,
}

impl JoinRequest {
    pub fn validate(&self) -> AppResult<MemberGender> {
        require("username", &self.username)?;
        max_len("username", &self.username, 20)?;
        require("phone", &self.phone)?;
        max_len("phone", &self.phone, 14)?;
        max_len("email", &self.email, 30)?;
        require("zip_code", &self.zip_code)?;
        require("city", &self.city)?;
        require("street", &self.street)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        parse_enum("gender", &self.gender)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateMemberRequest {
    pub password: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
}

/// Address parts of an update, present only when all three were given.
pub struct AddressChange<'a> {
    pub zip_code: &'a str,
    pub city: &'a str,
    pub street: &'a str,
}

impl UpdateMemberRequest {
    pub fn new_password(&self) -> AppResult<Option<&str>> {
        match provided(&self.password) {
            Some(password) => {
                validate_password(password)?;
                Ok(Some(password))
            }
            None => Ok(None),
        }
    }

    pub fn address(&self) -> Option<AddressChange<'_>> {
        Some(AddressChange {
            zip_code: provided(&self.zip_code)?,
            city: provided(&self.city)?,
            street: provided(&self.street)?,
        })
    }
}

fn validate_email(email: &str) -> AppResult<()> {
    let valid = email
        .trim()
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::validation("email is not a valid address"));
    }
    Ok(())
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < 8 {
        return Err(AppError::validation(
            "password must be at least 8 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join() -> JoinRequest {
        JoinRequest {
            username: "kim".into(),
            password: "password123".into(),
            phone: "01012345678".into(),
            email: "kim@example.com".into(),
            zip_code: "12345".into(),
            city: "Seoul".into(),
            street: "Teheran-ro 1".into(),
            gender: "female".into(),
        }
    }

    #[test]
    fn join_parses_gender_case_insensitively() {
        assert_eq!(join().validate().unwrap(), MemberGender::Female);
    }

    #[test]
    fn join_rejects_unknown_gender_and_bad_email() {
        let mut req = join();
        req.gender = "OTHER".into();
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));

        let mut req = join();
        req.email = "not-an-email".into();
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn address_requires_all_three_parts() {
        let partial = UpdateMemberRequest {
            zip_code: Some("54321".into()),
            city: Some("Busan".into()),
            street: Some("  ".into()),
            ..Default::default()
        };
        assert!(partial.address().is_none());

        let full = UpdateMemberRequest {
            street: Some("Haeundae 2".into()),
            ..partial
        };
        let address = full.address().unwrap();
        assert_eq!(address.city, "Busan");
    }

    #[test]
    fn blank_password_means_unchanged() {
        let req = UpdateMemberRequest {
            password: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(req.new_password().unwrap(), None);

        let short = UpdateMemberRequest {
            password: Some("short".into()),
            ..Default::default()
        };
        assert!(short.new_password().is_err());
    }
}
