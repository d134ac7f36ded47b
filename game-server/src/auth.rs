use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use game_types::PlayerId;

const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
const KEY_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleIdClaims {
    pub aud: String,
    pub iss: String,
    pub exp: u64,
    pub sub: String,           // Stable Google account id
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwksKey {
    pub kid: String,
    pub kty: String,
    pub n: Option<String>,
    pub e: Option<String>,
    pub x5c: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<JwksKey>,
}

/// A caller whose bearer token was accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPlayer {
    pub id: PlayerId,
    pub email: String,
    pub display_name: String,
}

pub struct AuthService {
    client: Client,
    jwks_cache: Arc<RwLock<HashMap<String, (DecodingKey, SystemTime)>>>,
    client_id: String,
    dev_mode: bool,
}

impl AuthService {
    pub fn new(client_id: String) -> Self {
        Self {
            client: Client::new(),
            jwks_cache: Arc::new(RwLock::new(HashMap::new())),
            client_id,
            dev_mode: false,
        }
    }

    /// Accepts unsigned tokens; never use outside local development
    pub fn new_dev_mode() -> Self {
        Self {
            client: Client::new(),
            jwks_cache: Arc::new(RwLock::new(HashMap::new())),
            client_id: "dev".to_string(),
            dev_mode: true,
        }
    }

    /// Resolves an optional `Authorization` header. No header means a guest.
    pub async fn authenticate(
        &self,
        auth_header: Option<String>,
    ) -> Result<Option<AuthenticatedPlayer>, AuthError> {
        let Some(auth_header) = auth_header else {
            return Ok(None);
        };
        let token = auth_header
            .strip_prefix("Bearer ")
            .unwrap_or(&auth_header)
            .trim();
        if token.is_empty() {
            return Ok(None);
        }
        self.validate_token(token).await.map(Some)
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedPlayer, AuthError> {
        if self.dev_mode {
            return self.validate_dev_token(token);
        }

        let header = decode_header(token).map_err(|e| {
            tracing::warn!("Failed to decode JWT header: {:?}", e);
            AuthError::InvalidToken
        })?;
        let kid = header.kid.ok_or_else(|| {
            tracing::warn!("JWT header missing 'kid' field");
            AuthError::InvalidToken
        })?;

        let decoding_key = self.get_decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        let token_data =
            decode::<GoogleIdClaims>(token, &decoding_key, &validation).map_err(|e| {
                tracing::warn!("Google ID token rejected: {:?}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken,
                }
            })?;

        Ok(Self::claims_to_player(token_data.claims))
    }

    fn claims_to_player(claims: GoogleIdClaims) -> AuthenticatedPlayer {
        let email = claims.email.unwrap_or_default();
        let display_name = claims
            .name
            .or_else(|| email.split('@').next().map(str::to_string))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Player".to_string());

        AuthenticatedPlayer {
            id: claims.sub,
            email,
            display_name,
        }
    }

    async fn get_decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cache = self.jwks_cache.read().await;
            if let Some((key, cached_time)) = cache.get(kid) {
                let elapsed = cached_time.elapsed().unwrap_or(KEY_CACHE_TTL);
                if elapsed < KEY_CACHE_TTL {
                    return Ok(key.clone());
                }
                tracing::debug!("Cached key for kid '{}' is stale, refetching", kid);
            }
        }

        let response = self
            .client
            .get(GOOGLE_JWKS_URL)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to fetch JWKS: {:?}", e);
                AuthError::JwksFetchError
            })?;

        if !response.status().is_success() {
            tracing::warn!("JWKS fetch returned status: {}", response.status());
            return Err(AuthError::JwksFetchError);
        }

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            tracing::warn!("Failed to parse JWKS JSON: {:?}", e);
            AuthError::JwksFetchError
        })?;

        let jwks_key = jwks.keys.iter().find(|key| key.kid == kid).ok_or_else(|| {
            tracing::warn!("Key with kid '{}' not found in Google JWKS", kid);
            AuthError::KeyNotFound
        })?;

        let decoding_key = if let (Some(n), Some(e)) = (&jwks_key.n, &jwks_key.e) {
            DecodingKey::from_rsa_components(n, e).map_err(|e| {
                tracing::warn!("Failed to create decoding key from RSA components: {:?}", e);
                AuthError::InvalidKey
            })?
        } else if let Some(cert) = jwks_key.x5c.as_ref().and_then(|x5c| x5c.first()) {
            let cert_der = base64::engine::general_purpose::STANDARD
                .decode(cert)
                .map_err(|_| AuthError::InvalidKey)?;
            DecodingKey::from_rsa_der(&cert_der)
        } else {
            tracing::warn!("JWKS key has neither n,e components nor x5c certificate");
            return Err(AuthError::InvalidKey);
        };

        {
            let mut cache = self.jwks_cache.write().await;
            cache.insert(kid.to_string(), (decoding_key.clone(), SystemTime::now()));
        }

        Ok(decoding_key)
    }

    /// Dev tokens: an unsigned JWT, a `{player_id, email, name}` JSON object,
    /// or `player_id:email:name`
    fn validate_dev_token(&self, token: &str) -> Result<AuthenticatedPlayer, AuthError> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() == 3 {
            let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
                .decode(parts[1].trim_end_matches('='))
                .map_err(|e| {
                    tracing::warn!("Failed to decode JWT payload in dev mode: {:?}", e);
                    AuthError::InvalidToken
                })?;

            #[derive(Deserialize)]
            struct DevJwtClaims {
                sub: String,
                email: Option<String>,
                name: Option<String>,
            }

            let claims: DevJwtClaims = serde_json::from_slice(&payload).map_err(|e| {
                tracing::warn!("Failed to parse JWT claims in dev mode: {:?}", e);
                AuthError::InvalidToken
            })?;

            return Ok(AuthenticatedPlayer {
                id: claims.sub,
                email: claims.email.unwrap_or_else(|| "dev@example.com".to_string()),
                display_name: claims.name.unwrap_or_else(|| "Dev Player".to_string()),
            });
        }

        if token.starts_with('{') && token.ends_with('}') {
            #[derive(Deserialize)]
            struct DevClaims {
                player_id: String,
                email: String,
                name: String,
            }

            let claims: DevClaims =
                serde_json::from_str(token).map_err(|_| AuthError::InvalidToken)?;
            return Ok(AuthenticatedPlayer {
                id: claims.player_id,
                email: claims.email,
                display_name: claims.name,
            });
        }

        match token.splitn(3, ':').collect::<Vec<_>>().as_slice() {
            [id, email, name] if !id.is_empty() => Ok(AuthenticatedPlayer {
                id: id.to_string(),
                email: email.to_string(),
                display_name: name.to_string(),
            }),
            _ => Err(AuthError::InvalidToken),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Failed to fetch JWKS")]
    JwksFetchError,
    #[error("Key not found")]
    KeyNotFound,
    #[error("Invalid key")]
    InvalidKey,
}
