//! Test fixtures and constants.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crypto_box::aead::OsRng;
use crypto_box::SecretKey;

use secretsync::core::remote::{InMemory, RemotePublicKey};

/// Key id reported by fixture keys.
pub const KEY_ID: &str = "568250167242549743";

/// A configuration covering every target kind.
pub const FULL_CONFIG: &str = r#"
repos:
  - owner: acme
    name: api
    deleteUnspecified: true
    secrets:
      FOO: bar
      TOKEN:
        fromEnv: SECRETSYNC_TEST_TOKEN
    environments:
      production:
        secrets:
          DB_URL: postgres://prod
orgs:
  - name: acme
    secrets:
      SHARED:
        value: shared
        visibility: selected
        repositories: [api, web]
"#;

/// A synthetic platform keypair.
pub struct Keypair {
    pub public: RemotePublicKey,
    pub secret: SecretKey,
}

impl Keypair {
    pub fn generate() -> Self {
        let secret = SecretKey::generate(&mut OsRng);
        let public = RemotePublicKey {
            key_id: KEY_ID.to_string(),
            key: BASE64.encode(secret.public_key().as_bytes()),
        };
        Self { public, secret }
    }

    /// Open a base64 sealed value produced for this keypair.
    pub fn open(&self, sealed: &str) -> String {
        let ciphertext = BASE64.decode(sealed).expect("sealed value is base64");
        let plaintext = self.secret.unseal(&ciphertext).expect("sealed for this key");
        String::from_utf8(plaintext).expect("plaintext is utf-8")
    }
}

/// An in-memory remote answering every public-key request with `keypair`.
pub fn remote(keypair: &Keypair) -> InMemory {
    InMemory::new().with_default_key(keypair.public.clone())
}
