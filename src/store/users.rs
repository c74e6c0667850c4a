/*!
`Store` methods for the `users` table.

```sql
CREATE TABLE users (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    name     TEXT NOT NULL,
    email    TEXT NOT NULL,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL
);
```

Users are only ever inserted and read; nothing in the application updates or
deletes them.
*/
use rusqlite::{params, OptionalExtension, Row};

use super::{is_unique_violation, DbError, Store};
use crate::user::User;

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        uname: row.get("username")?,
        hash: row.get("password")?,
    })
}

impl Store {
    /**
    Insert a new user and return the id SQLite assigned it.

    Returns `Ok(None)` if `uname` is already taken. The `UNIQUE` constraint
    does the checking, so two registrations racing for the same name can't
    both get in.
    */
    pub async fn insert_user(
        &self,
        name: &str,
        email: &str,
        uname: &str,
        hash: &str,
    ) -> Result<Option<i64>, DbError> {
        log::trace!(
            "Store::insert_user( {:?}, {:?}, {:?}, [ hash ] ) called.",
            name, email, uname
        );

        let (name, email, uname, hash) = (
            name.to_owned(), email.to_owned(), uname.to_owned(), hash.to_owned()
        );

        self.interact(move |conn| {
            match conn.execute(
                "INSERT INTO users (name, email, username, password)
                    VALUES (?1, ?2, ?3, ?4)",
                params![&name, &email, &uname, &hash]
            ) {
                Ok(_) => {
                    let id = conn.last_insert_rowid();
                    log::trace!("Inserted user {:?} with id {}.", &uname, id);
                    Ok(Some(id))
                },
                Err(e) if is_unique_violation(&e) => {
                    log::trace!("User name {:?} already exists.", &uname);
                    Ok(None)
                },
                Err(e) => Err(e.into()),
            }
        }).await
    }

    pub async fn get_user_by_uname(
        &self,
        uname: &str
    ) -> Result<Option<User>, DbError> {
        log::trace!("Store::get_user_by_uname( {:?} ) called.", uname);

        let uname = uname.to_owned();
        self.interact(move |conn| {
            let u = conn.query_row(
                "SELECT id, name, email, username, password
                    FROM users WHERE username = ?1",
                params![&uname],
                user_from_row
            ).optional()?;
            Ok(u)
        }).await
    }

    pub async fn get_user_by_id(
        &self,
        id: i64
    ) -> Result<Option<User>, DbError> {
        log::trace!("Store::get_user_by_id( {} ) called.", id);

        self.interact(move |conn| {
            let u = conn.query_row(
                "SELECT id, name, email, username, password
                    FROM users WHERE id = ?1",
                params![id],
                user_from_row
            ).optional()?;
            Ok(u)
        }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::fresh_store;
    use crate::tests::ensure_logging;

    static USERS: &[(&str, &str, &str)] = &[
        ("Thelma Admin", "thelma@instituto.test", "thelma"),
        ("Dan Profe", "dan@instituto.test", "dan"),
    ];

    #[tokio::test]
    async fn insert_and_fetch_users() {
        ensure_logging();
        let (_dir, db) = fresh_store().await;

        let mut ids = Vec::new();
        for (name, email, uname) in USERS.iter() {
            let id = db.insert_user(name, email, uname, "not-a-real-hash")
                .await.unwrap().unwrap();
            ids.push(id);
        }
        assert_ne!(ids[0], ids[1]);

        for ((name, email, uname), id) in USERS.iter().zip(ids.iter()) {
            let u = db.get_user_by_uname(uname).await.unwrap().unwrap();
            assert_eq!(
                (*name, *email, *uname, *id),
                (u.name.as_str(), u.email.as_str(), u.uname.as_str(), u.id)
            );
            let by_id = db.get_user_by_id(*id).await.unwrap().unwrap();
            assert_eq!(by_id.uname, u.uname);
        }

        assert!(db.get_user_by_uname("nobody").await.unwrap().is_none());
        assert!(db.get_user_by_id(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_uname_is_refused() {
        ensure_logging();
        let (_dir, db) = fresh_store().await;

        let first = db.insert_user("Ana", "ana@a.test", "ana", "h1").await.unwrap();
        assert!(first.is_some());
        let second = db.insert_user("Otra Ana", "ana@b.test", "ana", "h2").await.unwrap();
        assert!(second.is_none());

        assert_eq!(db.count_rows("users").await.unwrap(), 1);
        let u = db.get_user_by_uname("ana").await.unwrap().unwrap();
        assert_eq!(u.email, "ana@a.test");
        assert_eq!(u.hash, "h1");
    }
}
