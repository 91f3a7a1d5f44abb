//! Authentication and authorization

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::AgentId;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (agent ID)
    pub sub: String,
    /// User's roles
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    /// Parses the subject as an agent identifier
    pub fn agent_id(&self) -> Result<AgentId, AuthError> {
        self.sub
            .parse()
            .map_err(|_| AuthError::InvalidSubject(self.sub.clone()))
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Subject is not an agent id: {0}")]
    InvalidSubject(String),
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

/// Creates a new JWT token
pub fn create_token(
    agent_id: AgentId,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: agent_id.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        if e.to_string().contains("ExpiredSignature") {
            AuthError::TokenExpired
        } else {
            AuthError::InvalidToken
        }
    })?;

    Ok(token_data.claims)
}

/// Checks if user has required role
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims.roles.iter().any(|r| r == required_role || r == "admin")
}

/// Permission definitions
pub mod permissions {
    pub const KYC_READ: &str = "kyc:read";
    pub const KYC_WRITE: &str = "kyc:write";
    pub const KYC_DECIDE: &str = "kyc:decide";
    pub const TICKET_READ: &str = "ticket:read";
    pub const TICKET_WRITE: &str = "ticket:write";
    pub const LOAN_READ: &str = "loan:read";
    pub const LOAN_WRITE: &str = "loan:write";
    pub const QUEUE_CLAIM: &str = "queue:claim";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let agent = AgentId::new_v7();
        let token = create_token(agent, vec!["kyc:decide".to_string()], "secret", 60).unwrap();
        let claims = validate_token(&token, "secret").unwrap();

        assert_eq!(claims.agent_id().unwrap(), agent);
        assert!(has_role(&claims, "kyc:decide"));
        assert!(!has_role(&claims, "queue:claim"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token =
            create_token(AgentId::new_v7(), vec![], "secret", 60).unwrap();
        assert!(validate_token(&token, "other").is_err());
    }

    #[test]
    fn test_admin_overrides_roles() {
        let claims = Claims {
            sub: AgentId::new_v7().to_string(),
            roles: vec!["admin".to_string()],
            exp: 0,
            iat: 0,
        };
        assert!(has_role(&claims, permissions::KYC_DECIDE));
    }
}
