/*!
Application users.

These are the people allowed to log in and manage records, not the
students being managed.
*/
use serde::Serialize;

/// A row of the `users` table, password hash and all.
#[derive(Clone, Debug)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub uname: String,
    /// Argon2 PHC string; never the password itself.
    pub hash: String,
}

impl User {
    /// Strip the password hash, leaving what's safe to hang on to for the
    /// rest of the request.
    pub fn into_current(self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            name: self.name,
            email: self.email,
            uname: self.uname,
        }
    }
}

/**
The logged-in user making the current request.

The login gate puts one of these in the request's extensions after it has
checked the session, so any handler behind the gate can take an
`Extension<CurrentUser>`.
*/
#[derive(Clone, Debug, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub uname: String,
}
