use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use secrecy::{ExposeSecret, Secret};
use std::sync::OnceLock;

/// Plaintext password; redacted from `Debug` output.
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub fn new(password: String) -> Self {
        Self(Secret::new(password))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }
}

/// PHC-formatted Argon2 hash
#[derive(Debug, Clone)]
pub struct PasswordHashString(String);

impl PasswordHashString {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Hash a password with Argon2id and a random salt.
pub fn hash_password(password: &Password) -> Result<PasswordHashString, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(PasswordHashString::new(password_hash))
}

/// Verify a password against a stored hash. `Err` on mismatch or an
/// unparseable hash.
pub fn verify_password(
    password: &Password,
    password_hash: &PasswordHashString,
) -> Result<(), anyhow::Error> {
    let parsed_hash = PasswordHash::new(password_hash.as_str())
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| anyhow::anyhow!("Password verification failed"))
}

/// Burn the same work as a real verification so unknown emails cannot be told
/// apart from wrong passwords by response time.
pub fn verify_against_dummy(password: &Password) {
    static DUMMY: OnceLock<Option<PasswordHashString>> = OnceLock::new();

    let dummy = DUMMY.get_or_init(|| {
        hash_password(&Password::new("case-service-dummy-password".to_string())).ok()
    });

    if let Some(hash) = dummy {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_argon2() {
        let hash = hash_password(&Password::new("admin123".to_string())).unwrap();
        assert!(hash.as_str().starts_with("$argon2"));
    }

    #[test]
    fn test_verify_password_correct_and_incorrect() {
        let password = Password::new("admin123".to_string());
        let hash = hash_password(&password).unwrap();

        assert!(verify_password(&password, &hash).is_ok());
        assert!(verify_password(&Password::new("admin124".to_string()), &hash).is_err());
    }

    #[test]
    fn test_salts_differ() {
        let password = Password::new("admin123".to_string());
        let a = hash_password(&password).unwrap();
        let b = hash_password(&password).unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_garbage_hash_is_rejected() {
        let result = verify_password(
            &Password::new("admin123".to_string()),
            &PasswordHashString::new("not-a-hash".to_string()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_does_not_leak_plaintext() {
        let rendered = format!("{:?}", Password::new("hunter2".to_string()));
        assert!(!rendered.contains("hunter2"));
    }
}
