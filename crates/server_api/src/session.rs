use std::collections::HashMap;

use anyhow::bail;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::{
    domain::Role,
    error::{ApiError, ErrorCode},
    protocol::{LoginRequest, LoginResponse},
};
use tracing::{info, warn};

use crate::password::{hash_password, is_encoded_hash, verify_password};

/// One row of the account directory as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl AccountConfig {
    pub fn plain(email: &str, password: &str, role: Role, display_name: Option<&str>) -> Self {
        Self {
            email: email.to_string(),
            password: Some(password.to_string()),
            password_hash: None,
            role,
            display_name: display_name.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
struct Account {
    email: String,
    password_hash: String,
    role: Role,
    display_name: String,
}

/// Static email/password/role table. Only salted hashes are kept in memory.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    accounts: HashMap<String, Account>,
}

impl Directory {
    pub fn from_config(entries: &[AccountConfig]) -> anyhow::Result<Self> {
        let mut accounts = HashMap::with_capacity(entries.len());
        for entry in entries {
            let email = entry.email.trim();
            if email.is_empty() {
                bail!("account entry with an empty email");
            }
            let password_hash = match (&entry.password_hash, &entry.password) {
                (Some(hash), _) if is_encoded_hash(hash) => hash.clone(),
                (Some(_), _) => bail!("account {email} has a malformed password_hash"),
                (None, Some(plain)) if !plain.is_empty() => hash_password(plain),
                (None, _) => bail!("account {email} needs a password or password_hash"),
            };
            let account = Account {
                email: email.to_string(),
                password_hash,
                role: entry.role,
                display_name: entry
                    .display_name
                    .clone()
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| email.to_string()),
            };
            if accounts.insert(email.to_lowercase(), account).is_some() {
                bail!("account {email} is listed twice");
            }
        }
        Ok(Self { accounts })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn authenticate(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let account = self.accounts.get(&email.trim().to_lowercase());
        match account {
            Some(account) if verify_password(password, &account.password_hash) => {
                info!(email = %account.email, role = %account.role, "login succeeded");
                Ok(Session {
                    authenticated: true,
                    role: Some(account.role),
                    email: Some(account.email.clone()),
                    display_name: Some(account.display_name.clone()),
                })
            }
            _ => {
                warn!(email = %email.trim(), "login rejected");
                Err(ApiError::new(
                    ErrorCode::Unauthorized,
                    "invalid email or password",
                ))
            }
        }
    }
}

/// Who is calling. An unauthenticated session carries no role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub authenticated: bool,
    pub role: Option<Role>,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn logout(&mut self) {
        *self = Self::anonymous();
    }

    /// Fails with `unauthorized` for anonymous callers and `forbidden` when
    /// the caller's role is not among `roles`.
    pub fn require(&self, roles: &[Role]) -> Result<Role, ApiError> {
        let Some(role) = self.role.filter(|_| self.authenticated) else {
            return Err(ApiError::new(ErrorCode::Unauthorized, "login required"));
        };
        if !roles.contains(&role) {
            return Err(ApiError::new(
                ErrorCode::Forbidden,
                format!("role {role} may not perform this action"),
            ));
        }
        Ok(role)
    }

    pub fn require_authenticated(&self) -> Result<Role, ApiError> {
        self.require(Role::ALL)
    }

    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    name: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 bearer tokens that carry the session's role.
#[derive(Clone)]
pub struct SessionKeys {
    secret: String,
    ttl_seconds: i64,
}

impl SessionKeys {
    pub fn new(secret: impl Into<String>, ttl_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds,
        }
    }

    pub fn issue(&self, session: &Session) -> Result<(String, DateTime<Utc>), ApiError> {
        let role = session.require_authenticated()?;
        let now = Utc::now();
        let expires_at = Duration::try_seconds(self.ttl_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| ApiError::new(ErrorCode::Internal, "session ttl out of range"))?;
        let claims = Claims {
            sub: session.email.clone().unwrap_or_default(),
            role,
            name: session.display_name().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::new(ErrorCode::Internal, format!("token mint failed: {e}")))?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .unwrap_or(expires_at);
        Ok((token, expires_at))
    }

    pub fn verify(&self, token: &str) -> Result<Session, ApiError> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| ApiError::new(ErrorCode::Unauthorized, format!("invalid token: {e}")))?;
        let claims = decoded.claims;
        Ok(Session {
            authenticated: true,
            role: Some(claims.role),
            email: Some(claims.sub),
            display_name: Some(claims.name),
        })
    }
}

/// Checks credentials against the directory and mints a bearer token.
pub fn login(
    directory: &Directory,
    keys: &SessionKeys,
    request: &LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let session = directory.authenticate(&request.email, &request.password)?;
    let (token, expires_at) = keys.issue(&session)?;
    let role = session.require_authenticated()?;
    Ok(LoginResponse {
        token,
        role,
        display_name: session.display_name().to_string(),
        expires_at,
    })
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
