use serde::Serialize;

use crate::{
    auth::repo_types::User,
    binder::{Bindable, Field, Rule},
    id::RecordId,
};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Request body for user registration.
#[derive(Debug, Default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

const REGISTER_FIELDS: &[Field<RegisterRequest>] = &[
    Field::string(
        "email",
        true,
        |r: &RegisterRequest| r.email.as_str(),
        |r: &mut RegisterRequest, v| r.email = normalize_email(&v),
        &[Rule::Required, Rule::Email],
    ),
    Field::string(
        "password",
        true,
        |r: &RegisterRequest| r.password.as_str(),
        |r: &mut RegisterRequest, v| r.password = v,
        &[Rule::Required, Rule::MinLen(MIN_PASSWORD_LEN)],
    ),
];

impl Bindable for RegisterRequest {
    fn fields() -> &'static [Field<Self>] {
        REGISTER_FIELDS
    }
}

/// Request body for sign-in.
#[derive(Debug, Default)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

const SIGN_IN_FIELDS: &[Field<SignInRequest>] = &[
    Field::string(
        "email",
        true,
        |r: &SignInRequest| r.email.as_str(),
        |r: &mut SignInRequest, v| r.email = normalize_email(&v),
        &[Rule::Required],
    ),
    Field::string(
        "password",
        true,
        |r: &SignInRequest| r.password.as_str(),
        |r: &mut SignInRequest, v| r.password = v,
        &[Rule::Required],
    ),
];

impl Bindable for SignInRequest {
    fn fields() -> &'static [Field<Self>] {
        SIGN_IN_FIELDS
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Response returned after register or sign-in.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: RecordId,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}
