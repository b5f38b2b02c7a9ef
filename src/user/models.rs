use crate::{errors::ApiError, http::ApiResponder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", deny_unknown_fields)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "lowercase")
)]
pub enum UserRole {
    Admin,
    User,
    Owner,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
            UserRole::Owner => "owner",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub password: String,
}

impl ApiResponder for User {
    fn unit() -> &'static str {
        "user"
    }
    fn article() -> &'static str {
        "A"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserCreateData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
    pub role: UserRole,
}

impl UserCreateData {
    /// Field checks shared by signup and admin user creation. Runs before
    /// any persistence write.
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_name(&self.name)?;
        validate_address(self.address.as_deref())?;
        validate_password(&self.password)?;
        validate_email(&self.email)?;

        Ok(())
    }
}

pub fn validate_name(name: &str) -> Result<(), ApiError> {
    let len = name.chars().count();

    if !(20..=60).contains(&len) {
        return Err(ApiError::InvalidName);
    }

    Ok(())
}

pub fn validate_address(address: Option<&str>) -> Result<(), ApiError> {
    if let Some(address) = address {
        if address.chars().count() > 400 {
            return Err(ApiError::InvalidAddress);
        }
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    let len = password.chars().count();
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_special = password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c));

    if !(8..=16).contains(&len) || !has_uppercase || !has_special {
        return Err(ApiError::InvalidPassword);
    }

    Ok(())
}

// local@domain.tld with no whitespace anywhere and a dotted domain.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.chars().any(char::is_whitespace) {
        return Err(ApiError::InvalidEmail);
    }

    let (local, domain) = email.split_once('@').ok_or(ApiError::InvalidEmail)?;
    if local.is_empty() || domain.contains('@') {
        return Err(ApiError::InvalidEmail);
    }

    let (host, tld) = domain.rsplit_once('.').ok_or(ApiError::InvalidEmail)?;
    if host.is_empty() || tld.is_empty() {
        return Err(ApiError::InvalidEmail);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_data() -> UserCreateData {
        UserCreateData {
            name: "A reasonably long account name".into(),
            email: "account@example.com".into(),
            password: "Sup3rS3cret!".into(),
            address: None,
            role: UserRole::User,
        }
    }

    #[test]
    fn test_name_length_boundaries() {
        validate_name(&"a".repeat(19)).unwrap_err();
        validate_name(&"a".repeat(20)).unwrap();
        validate_name(&"a".repeat(60)).unwrap();
        validate_name(&"a".repeat(61)).unwrap_err();
    }

    #[test]
    fn test_address_is_optional_but_bounded() {
        validate_address(None).unwrap();
        validate_address(Some("")).unwrap();
        validate_address(Some(&"a".repeat(400))).unwrap();
        validate_address(Some(&"a".repeat(401))).unwrap_err();
    }

    #[test]
    fn test_password_rules() {
        validate_password("Sup3rS3cret!").unwrap();
        validate_password("short!A").unwrap_err();
        validate_password("alllowercase1!").unwrap_err();
        validate_password("NOSPECIALCHAR1").unwrap_err();
        validate_password(&format!("Aa!{}", "a".repeat(14))).unwrap_err();
    }

    #[test]
    fn test_email_shape() {
        validate_email("account@example.com").unwrap();
        validate_email("account@example").unwrap_err();
        validate_email("@example.com").unwrap_err();
        validate_email("account@@example.com").unwrap_err();
        validate_email("acc ount@example.com").unwrap_err();
        validate_email("account@.com").unwrap_err();
        validate_email("account@example.").unwrap_err();
    }

    #[test]
    fn test_create_data_validate() {
        create_data().validate().unwrap();

        let mut data = create_data();
        data.name = "Too short".into();
        assert!(matches!(data.validate(), Err(ApiError::InvalidName)));

        let mut data = create_data();
        data.email = "not-an-email".into();
        assert!(matches!(data.validate(), Err(ApiError::InvalidEmail)));
    }

    #[test]
    fn test_role_is_a_closed_set() {
        let role: UserRole = serde_json::from_str(r#""owner""#).unwrap();
        assert_eq!(role, UserRole::Owner);

        serde_json::from_str::<UserRole>(r#""superadmin""#).unwrap_err();
    }
}
