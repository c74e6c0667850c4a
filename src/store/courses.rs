/*!
`Store` methods for the `cursos` table.

```sql
CREATE TABLE cursos (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    descripcion TEXT NOT NULL,
    horas       INTEGER NOT NULL
);
```
*/
use rusqlite::{params, OptionalExtension, Row};

use super::{DbError, Store};
use crate::record::{Choice, Course};

fn course_from_row(row: &Row) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get("id")?,
        descripcion: row.get("descripcion")?,
        horas: row.get("horas")?,
    })
}

impl Store {
    pub async fn get_courses(&self) -> Result<Vec<Course>, DbError> {
        log::trace!("Store::get_courses() called.");

        self.interact(|conn| {
            let mut stmt = conn.prepare("SELECT id, descripcion, horas FROM cursos")?;
            let courses = stmt.query_map([], course_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            log::trace!("    ...retrieved {} courses.", courses.len());
            Ok(courses)
        }).await
    }

    pub async fn get_course(&self, id: i64) -> Result<Option<Course>, DbError> {
        log::trace!("Store::get_course( {} ) called.", id);

        self.interact(move |conn| {
            let c = conn.query_row(
                "SELECT id, descripcion, horas FROM cursos WHERE id = ?1",
                params![id],
                course_from_row
            ).optional()?;
            Ok(c)
        }).await
    }

    /// Courses as dropdown entries, labelled by description.
    pub async fn get_course_choices(&self) -> Result<Vec<Choice>, DbError> {
        log::trace!("Store::get_course_choices() called.");

        self.interact(|conn| {
            let mut stmt = conn.prepare("SELECT id, descripcion FROM cursos")?;
            let choices = stmt.query_map([], |row| Ok(Choice {
                id: row.get("id")?,
                label: row.get("descripcion")?,
                selected: false,
            }))?.collect::<Result<Vec<_>, _>>()?;
            Ok(choices)
        }).await
    }

    pub async fn insert_course(
        &self,
        descripcion: &str,
        horas: i64,
    ) -> Result<i64, DbError> {
        log::trace!("Store::insert_course( {:?}, {} ) called.", descripcion, horas);

        let descripcion = descripcion.to_owned();
        self.interact(move |conn| {
            conn.execute(
                "INSERT INTO cursos (descripcion, horas) VALUES (?1, ?2)",
                params![&descripcion, horas]
            )?;
            Ok(conn.last_insert_rowid())
        }).await
    }

    pub async fn update_course(
        &self,
        id: i64,
        descripcion: &str,
        horas: i64,
    ) -> Result<usize, DbError> {
        log::trace!(
            "Store::update_course( {}, {:?}, {} ) called.",
            id, descripcion, horas
        );

        let descripcion = descripcion.to_owned();
        self.interact(move |conn| {
            let n = conn.execute(
                "UPDATE cursos SET descripcion = ?1, horas = ?2 WHERE id = ?3",
                params![&descripcion, horas, id]
            )?;
            Ok(n)
        }).await
    }

    /// Enrollments pointing at the course are left as they are.
    pub async fn delete_course(&self, id: i64) -> Result<usize, DbError> {
        log::trace!("Store::delete_course( {} ) called.", id);

        self.interact(move |conn| {
            let n = conn.execute("DELETE FROM cursos WHERE id = ?1", params![id])?;
            if n == 0 {
                log::trace!("No course with id {} to delete.", id);
            }
            Ok(n)
        }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::fresh_store;
    use crate::tests::ensure_logging;

    static COURSES: &[(&str, i64)] = &[
        ("Programación en Rust", 40),
        ("Bases de datos", 30),
        ("Redes", 25),
    ];

    #[tokio::test]
    async fn course_lifecycle() {
        ensure_logging();
        let (_dir, db) = fresh_store().await;

        let mut ids = Vec::new();
        for (descripcion, horas) in COURSES.iter() {
            ids.push(db.insert_course(descripcion, *horas).await.unwrap());
        }

        let courses = db.get_courses().await.unwrap();
        assert_eq!(courses.len(), COURSES.len());
        for (c, (descripcion, horas)) in courses.iter().zip(COURSES.iter()) {
            assert_eq!((c.descripcion.as_str(), c.horas), (*descripcion, *horas));
        }

        assert_eq!(db.update_course(ids[1], "Bases de datos II", 45).await.unwrap(), 1);
        let c = db.get_course(ids[1]).await.unwrap().unwrap();
        assert_eq!((c.descripcion.as_str(), c.horas), ("Bases de datos II", 45));

        assert_eq!(db.delete_course(ids[0]).await.unwrap(), 1);
        assert_eq!(db.delete_course(ids[0]).await.unwrap(), 0);
        assert_eq!(db.count_rows("cursos").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn updating_missing_course_changes_nothing() {
        ensure_logging();
        let (_dir, db) = fresh_store().await;

        db.insert_course("Redes", 25).await.unwrap();
        assert_eq!(db.update_course(9999, "Fantasma", 1).await.unwrap(), 0);
        let courses = db.get_courses().await.unwrap();
        assert_eq!(courses[0].descripcion, "Redes");
    }
}
