/*!
Database interaction module.

Everything lives in a single SQLite file. The tables are created on startup
if they don't already exist:

```sql
CREATE TABLE users (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    name     TEXT NOT NULL,
    email    TEXT NOT NULL,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL      /* argon2 PHC string */
);

CREATE TABLE estudiantes (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre           TEXT NOT NULL,
    apellidos        TEXT NOT NULL,
    fecha_nacimiento TEXT NOT NULL
);

CREATE TABLE cursos (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    descripcion TEXT NOT NULL,
    horas       INTEGER NOT NULL
);

CREATE TABLE inscripciones (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    fecha         TEXT NOT NULL,
    estudiante_id INTEGER NOT NULL,
    curso_id      INTEGER NOT NULL,
    FOREIGN KEY (estudiante_id) REFERENCES estudiantes(id),
    FOREIGN KEY (curso_id) REFERENCES cursos(id)
);
```

Foreign keys are declared but not enforced: the bundled SQLite turns
enforcement on by default, so every connection switches it back off.
Deleting a student or course out from under an enrollment is allowed, as is
enrolling ids that don't exist.

Every `Store` method opens its own connection, does its work on Tokio's
blocking pool, and drops the connection before returning.
*/
use std::fmt::Write;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

pub mod courses;
pub mod enrollments;
pub mod students;
pub mod users;

static SCHEMA: &[(&str, &str, &str)] = &[
    (
        "users",
        "CREATE TABLE IF NOT EXISTS users (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            name     TEXT NOT NULL,
            email    TEXT NOT NULL,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        )",
        "DROP TABLE IF EXISTS users",
    ),

    (
        "estudiantes",
        "CREATE TABLE IF NOT EXISTS estudiantes (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre           TEXT NOT NULL,
            apellidos        TEXT NOT NULL,
            fecha_nacimiento TEXT NOT NULL
        )",
        "DROP TABLE IF EXISTS estudiantes",
    ),

    (
        "cursos",
        "CREATE TABLE IF NOT EXISTS cursos (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            descripcion TEXT NOT NULL,
            horas       INTEGER NOT NULL
        )",
        "DROP TABLE IF EXISTS cursos",
    ),

    (
        "inscripciones",
        "CREATE TABLE IF NOT EXISTS inscripciones (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            fecha         TEXT NOT NULL,
            estudiante_id INTEGER NOT NULL,
            curso_id      INTEGER NOT NULL,
            FOREIGN KEY (estudiante_id) REFERENCES estudiantes(id),
            FOREIGN KEY (curso_id) REFERENCES cursos(id)
        )",
        "DROP TABLE IF EXISTS inscripciones",
    ),
];

#[derive(Debug, PartialEq)]
pub struct DbError(String);

impl DbError {
    /// Prepend some contextual `annotation` for the error.
    fn annotate(self, annotation: &str) -> Self {
        let s = format!("{}: {}", annotation, &self.0);
        Self(s)
    }

    pub fn display(&self) -> &str { &self.0 }
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", &self.0)
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> DbError {
        let mut s = format!("Data DB: {}", &e);
        if let rusqlite::Error::SqliteFailure(ffi_err, _) = &e {
            // Writing to a String can't fail.
            let _ = write!(&mut s, "; {:?}", ffi_err.code);
        }
        DbError(s)
    }
}

/// Whether `e` is SQLite refusing a row because of a `UNIQUE` constraint.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(ffi_err, _) => {
            ffi_err.code == rusqlite::ErrorCode::ConstraintViolation
                && ffi_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        },
        _ => false,
    }
}

#[derive(Clone, Debug)]
pub struct Store {
    db_path: PathBuf,
}

impl Store {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        let db_path = db_path.as_ref().to_path_buf();
        log::trace!("Store::new( {} ) called.", db_path.display());

        Self { db_path }
    }

    fn connect(db_path: &Path) -> Result<Connection, DbError> {
        log::trace!("Store::connect( {} ) called.", db_path.display());

        let conn = match Connection::open(db_path) {
            Ok(conn) => conn,
            Err(e) => {
                let dberr = DbError::from(e);
                log::trace!("    ...connection failed: {:?}", &dberr);
                return Err(dberr.annotate("Unable to connect"));
            },
        };
        conn.pragma_update(None, "foreign_keys", false)
            .map_err(|e| DbError::from(e).annotate("Unable to turn off foreign key checks"))?;

        log::trace!("    ...connection successful.");
        Ok(conn)
    }

    /**
    Open a fresh connection and hand it to `f` on the blocking thread pool.

    The connection is dropped (and so closed) as soon as `f` returns, so
    nothing about it outlives a single call.
    */
    pub(crate) async fn interact<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&mut Connection) -> Result<T, DbError> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = Store::connect(&db_path)?;
            f(&mut conn)
        }).await
            .map_err(|e| DbError(format!("Database task failed: {}", &e)))?
    }

    pub async fn ensure_db_schema(&self) -> Result<(), DbError> {
        log::trace!("Store::ensure_db_schema() called.");

        self.interact(|conn| {
            let t = conn.transaction()
                .map_err(|e| DbError::from(e)
                    .annotate("Data DB unable to begin transaction"))?;

            for (table, create_stmt, _) in SCHEMA.iter() {
                log::trace!("Ensuring table {:?} exists.", table);
                t.execute(create_stmt, [])
                    .map_err(|e| DbError::from(e)
                        .annotate(&format!("Error creating table {:?}", table)))?;
            }

            t.commit()
                .map_err(|e| DbError::from(e)
                    .annotate("Error committing transaction"))
        }).await
    }

    /**
    Drop all database tables to fully reset database state.

    This is only meant for cleanup after testing.
    */
    #[cfg(test)]
    pub async fn nuke_database(&self) -> Result<(), DbError> {
        log::trace!("Store::nuke_database() called.");

        self.interact(|conn| {
            for (_, _, drop_stmt) in SCHEMA.iter().rev() {
                if let Err(e) = conn.execute(drop_stmt, []) {
                    let err = DbError::from(e);
                    log::error!("Error dropping: {:?}: {}", &drop_stmt, err.display());
                }
            }
            Ok(())
        }).await?;

        log::trace!("    ....nuking complete.");
        Ok(())
    }

    /// Number of rows in `table`. Only used to check that operations which
    /// shouldn't touch anything really didn't.
    #[cfg(test)]
    pub async fn count_rows(&self, table: &'static str) -> Result<i64, DbError> {
        self.interact(move |conn| {
            let n = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", table),
                [],
                |row| row.get(0)
            )?;
            Ok(n)
        }).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    /*!
    Every test gets its own database file in a temporary directory, so
    nothing needs to be running beforehand.
    */
    use super::*;
    use crate::tests::ensure_logging;

    use tempfile::TempDir;

    /// Create a `Store` backed by a fresh file inside a new temporary
    /// directory. Hang on to the `TempDir`; the file goes when it drops.
    pub async fn fresh_store() -> (TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let db = Store::new(dir.path().join("test.db"));
        db.ensure_db_schema().await.unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn create_store() {
        ensure_logging();

        let (_dir, db) = fresh_store().await;
        // Running it twice must be harmless.
        db.ensure_db_schema().await.unwrap();
        for (table, _, _) in SCHEMA.iter() {
            assert_eq!(db.count_rows(table).await.unwrap(), 0);
        }
        db.nuke_database().await.unwrap();
    }

    #[tokio::test]
    async fn schema_survives_reopen() {
        ensure_logging();

        let (dir, db) = fresh_store().await;
        db.insert_course("Rust", 40).await.unwrap();

        let reopened = Store::new(dir.path().join("test.db"));
        reopened.ensure_db_schema().await.unwrap();
        assert_eq!(reopened.count_rows("cursos").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn foreign_keys_are_not_enforced() {
        ensure_logging();

        let (_dir, db) = fresh_store().await;
        let enforced: i64 = db.interact(|conn| {
            Ok(conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?)
        }).await.unwrap();
        assert_eq!(enforced, 0);

        let ana = db.insert_student("Ana", "Díaz", "2001-05-01").await.unwrap();
        let rust = db.insert_course("Rust", 40).await.unwrap();
        db.insert_enrollment("2024-09-01", ana, rust).await.unwrap();
        assert_eq!(db.delete_course(rust).await.unwrap(), 1);
        assert_eq!(db.delete_student(ana).await.unwrap(), 1);
        assert_eq!(db.count_rows("inscripciones").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unopenable_path_is_an_error() {
        ensure_logging();

        let dir = tempfile::tempdir().unwrap();
        let db = Store::new(dir.path().join("no").join("such").join("dir.db"));
        assert!(db.ensure_db_schema().await.is_err());
    }
}
