use log::{info, warn};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::models::{LoginForm, RegisterForm, Role, Session};
use crate::services::api::{ApiClient, ClientError};
use crate::services::JwtService;

const LOGIN_PATH: &str = "/accounts/login/";
const REGISTER_PATH: &str = "/accounts/register/";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AuthError {
    /// The API explained why (unknown user, wrong password, taken username...).
    #[error("{0}")]
    Rejected(String),
    /// Transport failure or a reply we could not read.
    #[error("Something went wrong")]
    Unavailable,
}

impl From<ClientError> for AuthError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rejected { message, .. } => AuthError::Rejected(message),
            other => {
                warn!("authentication call failed: {}", other);
                AuthError::Unavailable
            }
        }
    }
}

/// Login reply. The refresh token the API also returns is ignored: a refused
/// access token sends the user back to the login page instead.
#[derive(Debug, Deserialize)]
struct LoginReply {
    access: String,
    role: String,
    id: i64,
    username: String,
}

pub struct AuthService;

impl AuthService {
    pub async fn login(api: &ApiClient, credentials: &LoginForm) -> Result<Session, AuthError> {
        let body = json!({
            "username": credentials.username.trim(),
            "password": credentials.password,
        });

        let reply: LoginReply = api
            .execute(Method::POST, LOGIN_PATH, None, Some(&body))
            .await?
            .json()?;

        let role = Role::from_wire(&reply.role);
        if role == Role::Unknown {
            warn!("user {} logged in with unrecognized role {:?}", reply.username, reply.role);
        }
        info!("✓ {} logged in as {}", reply.username, role.label());

        Ok(Session {
            expires_at: JwtService::expires_at(&reply.access),
            token: reply.access,
            role,
            username: reply.username,
            user_id: reply.id,
        })
    }

    /// Returns the API's confirmation message.
    pub async fn register(api: &ApiClient, form: &RegisterForm) -> Result<String, AuthError> {
        let body = serde_json::to_value(form).map_err(|_| AuthError::Unavailable)?;

        let reply = api
            .execute(Method::POST, REGISTER_PATH, None, Some(&body))
            .await?;

        info!("✓ registered {} as {}", form.username, form.role);
        Ok(reply
            .body
            .get("message")
            .and_then(|message| message.as_str())
            .unwrap_or("User registered successfully")
            .to_string())
    }
}
