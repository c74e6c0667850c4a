/*!
Password hashing and checking.

Passwords are hashed with Argon2 (default parameters, fresh random salt per
password) and stored as PHC strings, so the salt and parameters travel with
the hash. Verification goes through `argon2`'s own comparison, which doesn't
leak timing information about where a guess went wrong.
*/
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

use crate::store::{DbError, Store};
use crate::user::User;

/// How a login attempt went, short of an error.
#[derive(Debug)]
pub enum LoginResult {
    /// Credentials check out; here's who they belong to.
    Ok(User),
    BadPassword,
    NoSuchUser,
}

#[derive(Debug)]
pub enum RegisterResult {
    /// The new user has this id.
    Registered(i64),
    UnameTaken,
}

#[derive(Debug)]
pub enum AuthError {
    Db(DbError),
    Hash(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AuthError::Db(e) => write!(f, "{}", e),
            AuthError::Hash(s) => write!(f, "Password hashing error: {}", s),
        }
    }
}

impl From<DbError> for AuthError {
    fn from(e: DbError) -> AuthError { AuthError::Db(e) }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}

/**
Check `password` against a stored PHC string.

A stored hash that won't even parse is an error rather than a mismatch;
it means the row was written by something other than `hash_password()`.
*/
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AuthError::Hash(format!("Unparseable stored hash: {}", &e)))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/*
Argon2 is slow on purpose, so the async entry points below do it on the
blocking pool rather than stall the runtime.
*/
async fn hash_blocking(password: &str) -> Result<String, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password)).await
        .map_err(|e| AuthError::Hash(format!("Hashing task failed: {}", &e)))?
}

async fn verify_blocking(password: &str, hash: &str) -> Result<bool, AuthError> {
    let (password, hash) = (password.to_owned(), hash.to_owned());
    tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await
        .map_err(|e| AuthError::Hash(format!("Verification task failed: {}", &e)))?
}

/// Hash `password` and insert a new user with it.
pub async fn register(
    store: &Store,
    name: &str,
    email: &str,
    uname: &str,
    password: &str,
) -> Result<RegisterResult, AuthError> {
    log::trace!("auth::register( {:?}, {:?}, {:?}, [ password ] ) called.", name, email, uname);

    let hash = hash_blocking(password).await?;
    match store.insert_user(name, email, uname, &hash).await? {
        Some(id) => {
            log::info!("Registered user {:?} (id {}).", uname, id);
            Ok(RegisterResult::Registered(id))
        },
        None => Ok(RegisterResult::UnameTaken),
    }
}

pub async fn check_password(
    store: &Store,
    uname: &str,
    password: &str,
) -> Result<LoginResult, AuthError> {
    log::trace!("auth::check_password( {:?}, [ password ] ) called.", uname);

    let u = match store.get_user_by_uname(uname).await? {
        Some(u) => u,
        None => { return Ok(LoginResult::NoSuchUser); },
    };

    if verify_blocking(password, &u.hash).await? {
        Ok(LoginResult::Ok(u))
    } else {
        Ok(LoginResult::BadPassword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::fresh_store;
    use crate::tests::ensure_logging;

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("toot").unwrap();
        let b = hash_password("toot").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2"));
        assert!(verify_password("toot", &a).unwrap());
        assert!(verify_password("toot", &b).unwrap());
        assert!(!verify_password("Toot", &a).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("toot", "plaintext-password").is_err());
    }

    #[tokio::test]
    async fn hashing_runs_off_the_runtime_thread() {
        let a = hash_blocking("toot").await.unwrap();
        assert!(verify_blocking("toot", &a).await.unwrap());
        assert!(!verify_blocking("Toot", &a).await.unwrap());
        assert!(verify_blocking("toot", "plaintext-password").await.is_err());
    }

    #[tokio::test]
    async fn register_then_check() {
        ensure_logging();
        let (_dir, db) = fresh_store().await;

        match register(&db, "Root", "root@instituto.test", "root", "toot").await.unwrap() {
            RegisterResult::Registered(_) => {},
            x => panic!("expected Registered, got {:?}", &x),
        }
        match register(&db, "Impostor", "x@instituto.test", "root", "other").await.unwrap() {
            RegisterResult::UnameTaken => {},
            x => panic!("expected UnameTaken, got {:?}", &x),
        }

        match check_password(&db, "root", "toot").await.unwrap() {
            LoginResult::Ok(u) => {
                assert_eq!(u.name, "Root");
                assert_ne!(u.hash, "toot");
            },
            x => panic!("expected Ok, got {:?}", &x),
        }
        assert!(matches!(
            check_password(&db, "root", "wrong").await.unwrap(),
            LoginResult::BadPassword
        ));
        assert!(matches!(
            check_password(&db, "nobody", "toot").await.unwrap(),
            LoginResult::NoSuchUser
        ));
    }
}
