//! Writing and reading the view state token.
//!
//! Token layout: `base64url(nonce || ciphertext)` where the ciphertext is the
//! XChaCha20-Poly1305 seal of the JSON render artifact under the session key,
//! with the session id as associated data.

use std::collections::HashMap;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ViewStateError;
use super::key::{SessionKey, SessionKeyStore};
use super::session::SessionId;
use crate::view::ViewArtifact;

/// Form field carrying the view state token.
pub const VIEW_STATE_FIELD: &str = "navbridge.RENDER";

const NONCE_LEN: usize = 24;

/// Payload of a view state token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderArtifact {
    pub artifact: ViewArtifact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

impl RenderArtifact {
    pub fn new(artifact: ViewArtifact) -> Self {
        Self {
            artifact,
            state: None,
        }
    }

    pub fn with_state(artifact: ViewArtifact, state: Value) -> Self {
        Self {
            artifact,
            state: Some(state),
        }
    }
}

/// Source of request parameters, e.g. a decoded form body.
pub trait RequestParameters {
    fn parameter(&self, name: &str) -> Option<&str>;
}

impl RequestParameters for HashMap<String, String> {
    fn parameter(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Writes view state during render and validates it on postback.
#[derive(Debug, Clone)]
pub struct ViewStateProtocol {
    keys: Arc<SessionKeyStore>,
}

impl ViewStateProtocol {
    pub fn new(keys: Arc<SessionKeyStore>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &Arc<SessionKeyStore> {
        &self.keys
    }

    /// Seal `render` into a token bound to `session`.
    pub fn write(
        &self,
        session: &SessionId,
        render: &RenderArtifact,
    ) -> Result<String, ViewStateError> {
        let plaintext = serde_json::to_vec(render)?;
        let key = self.keys.key_for(session);
        let sealed = seal(&key, session, &plaintext)?;
        tracing::debug!(
            session = %session,
            artifact = %render.artifact,
            "Wrote view state"
        );
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Hidden form field markup carrying `token`.
    ///
    /// The token alphabet is URL safe base64 and needs no attribute escaping.
    pub fn hidden_field(&self, token: &str) -> String {
        format!(
            r#"<input type="hidden" name="{}" value="{}"/>"#,
            VIEW_STATE_FIELD, token
        )
    }

    /// Restore the render artifact posted back by `session`.
    ///
    /// Returns `Ok(None)` when the request carries no view state field.
    ///
    /// # Errors
    /// Returns `ViewStateError::Tampered` when the field is present but does
    /// not authenticate under this session's key.
    pub fn read(
        &self,
        session: &SessionId,
        params: &impl RequestParameters,
    ) -> Result<Option<RenderArtifact>, ViewStateError> {
        let Some(token) = params.parameter(VIEW_STATE_FIELD) else {
            return Ok(None);
        };
        self.decode(session, token).map(Some)
    }

    /// Validate a raw token for `session`.
    pub fn decode(
        &self,
        session: &SessionId,
        token: &str,
    ) -> Result<RenderArtifact, ViewStateError> {
        let result = self.try_decode(session, token);
        if result.is_none() {
            tracing::warn!(session = %session, "Rejected tampered view state");
        }
        result.ok_or(ViewStateError::Tampered)
    }

    fn try_decode(&self, session: &SessionId, token: &str) -> Option<RenderArtifact> {
        let key = self.keys.existing_key(session)?;
        let sealed = URL_SAFE_NO_PAD.decode(token).ok()?;
        let plaintext = open(&key, session, &sealed)?;
        serde_json::from_slice(&plaintext).ok()
    }
}

fn seal(key: &SessionKey, session: &SessionId, plaintext: &[u8]) -> Result<Vec<u8>, ViewStateError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(
            XNonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad: session.as_str().as_bytes(),
            },
        )
        .map_err(|_| ViewStateError::Encrypt)?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

fn open(key: &SessionKey, session: &SessionId, sealed: &[u8]) -> Option<Vec<u8>> {
    if sealed.len() < NONCE_LEN {
        return None;
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    cipher
        .decrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: session.as_str().as_bytes(),
            },
        )
        .ok()
}
