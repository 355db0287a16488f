//! Access tokens for the FCM HTTP v1 API
//!
//! Production uses a Google service account key file; tests hand the client
//! a fixed token instead.

use shabbat_common::services::BoxFuture;
use std::path::Path;
use yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator};

use crate::error::FirebaseError;

pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Source of bearer tokens for FCM requests.
pub trait AccessTokenProvider: Send + Sync {
    fn access_token(&self) -> BoxFuture<'_, String, FirebaseError>;
}

/// Obtains an OAuth2 access token for Firebase Cloud Messaging from a
/// service account key file.
pub async fn get_firebase_auth_token(key_path: &str) -> Result<String, FirebaseError> {
    let sa_key = read_service_account_key(Path::new(key_path))
        .await
        .map_err(|e| FirebaseError::AuthError(format!("Cannot read {}: {}", key_path, e)))?;

    let auth = ServiceAccountAuthenticator::builder(sa_key)
        .build()
        .await
        .map_err(|e| FirebaseError::AuthError(e.to_string()))?;

    let token = auth
        .token(&[FCM_SCOPE])
        .await
        .map_err(|e| FirebaseError::AuthError(e.to_string()))?;

    token
        .token()
        .map(str::to_string)
        .ok_or_else(|| FirebaseError::AuthError("No token available".to_string()))
}

#[derive(Debug, Clone)]
pub struct ServiceAccountTokenProvider {
    key_path: String,
}

impl ServiceAccountTokenProvider {
    pub fn new(key_path: impl Into<String>) -> Self {
        Self {
            key_path: key_path.into(),
        }
    }
}

impl AccessTokenProvider for ServiceAccountTokenProvider {
    fn access_token(&self) -> BoxFuture<'_, String, FirebaseError> {
        Box::pin(get_firebase_auth_token(&self.key_path))
    }
}

/// Always returns the same token.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider(pub String);

impl AccessTokenProvider for StaticTokenProvider {
    fn access_token(&self) -> BoxFuture<'_, String, FirebaseError> {
        let token = self.0.clone();
        Box::pin(async move { Ok(token) })
    }
}
