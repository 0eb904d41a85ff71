//! JWKS (JSON Web Key Set) fetching and caching
//!
//! Provides production-ready JWKS support for asymmetric JWT validation:
//! - Fetches JWK Sets from provider URIs (Google, GitHub, Auth0, etc.)
//! - Caches keys with configurable TTL
//! - Thread-safe concurrent access
//! - Automatic key rotation support
//!
//! Supports RSA (RS256/384/512) and ECDSA (ES256/384) algorithms.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::DecodingKey;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// JWKS fetch error
#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    /// HTTP request to JWKS endpoint failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JWKS response was invalid or malformed
    #[error("Invalid JWKS response: {0}")]
    InvalidResponse(String),

    /// Requested key ID not found in JWKS
    #[error("Key not found: {kid}")]
    KeyNotFound {
        /// The key ID that was not found
        kid: String,
    },

    /// Key type is not supported (only RSA and EC are supported)
    #[error("Unsupported key type: {kty}")]
    UnsupportedKeyType {
        /// The unsupported key type
        kty: String,
    },

    /// Key format is invalid or incomplete
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Base64 decoding of key parameters failed
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

/// JSON Web Key (JWK) structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    /// Key Type (RSA, EC, oct, OKP)
    pub kty: String,

    /// Key ID (optional, used for key selection)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Public Key Use (sig, enc)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "use")]
    pub key_use: Option<String>,

    /// Algorithm (RS256, ES256, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    // RSA parameters (kty = "RSA")
    /// RSA modulus (base64url encoded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// RSA exponent (base64url encoded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,

    // ECDSA parameters (kty = "EC")
    /// Elliptic Curve name (P-256, P-384, P-521)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,

    /// ECDSA X coordinate (base64url encoded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    /// ECDSA Y coordinate (base64url encoded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl Jwk {
    /// Convert JWK to jsonwebtoken DecodingKey
    pub fn to_decoding_key(&self) -> Result<DecodingKey, JwksError> {
        match self.kty.as_str() {
            "RSA" => self.to_rsa_key(),
            "EC" => self.to_ec_key(),
            _ => Err(JwksError::UnsupportedKeyType {
                kty: self.kty.clone(),
            }),
        }
    }

    /// Convert RSA JWK to DecodingKey
    fn to_rsa_key(&self) -> Result<DecodingKey, JwksError> {
        let n = self
            .n
            .as_ref()
            .ok_or_else(|| JwksError::InvalidKeyFormat("RSA key missing 'n' parameter".into()))?;
        let e = self
            .e
            .as_ref()
            .ok_or_else(|| JwksError::InvalidKeyFormat("RSA key missing 'e' parameter".into()))?;

        // Decode base64url (RFC 4648 ยง5 - URL-safe base64 without padding)
        let _n_bytes = URL_SAFE_NO_PAD.decode(n)?;
        let _e_bytes = URL_SAFE_NO_PAD.decode(e)?;

        // Convert to DecodingKey using RSA components
        DecodingKey::from_rsa_components(n, e)
            .map_err(|e| JwksError::InvalidKeyFormat(format!("Failed to create RSA key: {}", e)))
    }

    /// Convert ECDSA JWK to DecodingKey
    fn to_ec_key(&self) -> Result<DecodingKey, JwksError> {
        let x = self
            .x
            .as_ref()
            .ok_or_else(|| JwksError::InvalidKeyFormat("EC key missing 'x' parameter".into()))?;
        let y = self
            .y
            .as_ref()
            .ok_or_else(|| JwksError::InvalidKeyFormat("EC key missing 'y' parameter".into()))?;

        // Use jsonwebtoken's from_ec_components which accepts base64url-encoded strings directly
        // The library handles all DER/ASN.1 encoding internally.
        DecodingKey::from_ec_components(x, y)
            .map_err(|e| JwksError::InvalidKeyFormat(format!("Failed to create EC key: {}", e)))
    }
}

/// JSON Web Key Set (JWKS) response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwkSet {
    /// Array of JWKs
    pub keys: Vec<Jwk>,
}

/// Cached JWKS data
#[derive(Clone)]
struct CachedJwks {
    /// Parsed keys indexed by kid
    keys: HashMap<String, DecodingKey>,
    /// When the cache entry was created
    fetched_at: Instant,
    /// TTL for this cache entry
    ttl: Duration,
}

impl CachedJwks {
    /// Check if cache entry is expired
    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.ttl
    }
}

/// JWKS cache with automatic fetching and TTL management
pub struct JwksCache {
    /// JWKS URI to fetch from
    uri: String,

    /// HTTP client for fetching
    client: reqwest::Client,

    /// Cached keys
    cache: Arc<RwLock<Option<CachedJwks>>>,

    /// Cache TTL (default: 1 hour)
    ttl: Duration,
}

impl std::fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksCache")
            .field("uri", &self.uri)
            .field("ttl", &self.ttl)
            .field("cache", &"<cached keys>")
            .finish()
    }
}

impl JwksCache {
    /// Create new JWKS cache
    pub fn new(uri: String) -> Self {
        Self::with_ttl(uri, Duration::from_secs(3600))
    }

    /// Create new JWKS cache with custom TTL
    pub fn with_ttl(uri: String, ttl: Duration) -> Self {
        Self {
            uri,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            cache: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    /// Get decoding key by kid, fetching if necessary
    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        // Fast path: check cache with read lock
        {
            let cache = self.cache.read();
            if let Some(cached) = cache.as_ref() {
                if !cached.is_expired() {
                    if let Some(key) = cached.keys.get(kid) {
                        debug!(kid = %kid, "JWKS cache hit");
                        return Ok(key.clone());
                    }
                } else {
                    debug!(kid = %kid, "JWKS cache expired");
                }
            }
        }

        // Cache miss or expired - fetch new JWKS
        info!(uri = %self.uri, "Fetching JWKS");
        let jwk_set = self.fetch_jwks().await?;

        // Parse all keys and build cache
        let mut keys = HashMap::new();
        for jwk in jwk_set.keys {
            let key_id = jwk.kid.clone().unwrap_or_else(|| {
                // Generate synthetic kid if not present
                format!("synthetic_{}", fastrand::u64(..))
            });

            match jwk.to_decoding_key() {
                Ok(key) => {
                    debug!(kid = %key_id, kty = %jwk.kty, alg = ?jwk.alg, "Parsed JWK");
                    keys.insert(key_id, key);
                }
                Err(e) => {
                    warn!(kid = %key_id, error = %e, "Failed to parse JWK");
                }
            }
        }

        if keys.is_empty() {
            return Err(JwksError::InvalidResponse(
                "No valid keys found in JWKS".to_string(),
            ));
        }

        // Update cache with write lock
        {
            let mut cache = self.cache.write();
            *cache = Some(CachedJwks {
                keys: keys.clone(),
                fetched_at: Instant::now(),
                ttl: self.ttl,
            });
        }

        info!(num_keys = keys.len(), "JWKS cache updated");

        // Return requested key
        keys.get(kid)
            .cloned()
            .ok_or_else(|| JwksError::KeyNotFound {
                kid: kid.to_string(),
            })
    }

    /// Fetch JWKS from provider URI
    async fn fetch_jwks(&self) -> Result<JwkSet, JwksError> {
        let response = self.client.get(&self.uri).send().await?;

        if !response.status().is_success() {
            return Err(JwksError::InvalidResponse(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let jwk_set: JwkSet = response
            .json()
            .await
            .map_err(|e| JwksError::InvalidResponse(format!("Failed to parse JWKS JSON: {}", e)))?;

        Ok(jwk_set)
    }

    /// Manually refresh the cache
    pub async fn refresh(&self) -> Result<(), JwksError> {
        info!(uri = %self.uri, "Manually refreshing JWKS cache");
        let jwk_set = self.fetch_jwks().await?;

        let mut keys = HashMap::new();
        for jwk in jwk_set.keys {
            let key_id = jwk
                .kid
                .clone()
                .unwrap_or_else(|| format!("synthetic_{}", fastrand::u64(..)));

            if let Ok(key) = jwk.to_decoding_key() {
                keys.insert(key_id, key);
            }
        }

        let mut cache = self.cache.write();
        *cache = Some(CachedJwks {
            keys,
            fetched_at: Instant::now(),
            ttl: self.ttl,
        });

        Ok(())
    }

    /// Clear the cache
    pub fn clear(&self) {
        let mut cache = self.cache.write();
        *cache = None;
    }
}
