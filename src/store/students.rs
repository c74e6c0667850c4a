/*!
`Store` methods for the `estudiantes` table.

```sql
CREATE TABLE estudiantes (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre           TEXT NOT NULL,
    apellidos        TEXT NOT NULL,
    fecha_nacimiento TEXT NOT NULL
);
```
*/
use rusqlite::{params, OptionalExtension, Row};

use super::{DbError, Store};
use crate::record::{Choice, Student};

fn student_from_row(row: &Row) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get("id")?,
        nombre: row.get("nombre")?,
        apellidos: row.get("apellidos")?,
        fecha_nacimiento: row.get("fecha_nacimiento")?,
    })
}

impl Store {
    /// All students, in whatever order SQLite hands them back.
    pub async fn get_students(&self) -> Result<Vec<Student>, DbError> {
        log::trace!("Store::get_students() called.");

        self.interact(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, nombre, apellidos, fecha_nacimiento FROM estudiantes"
            )?;
            let students = stmt.query_map([], student_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            log::trace!("    ...retrieved {} students.", students.len());
            Ok(students)
        }).await
    }

    pub async fn get_student(&self, id: i64) -> Result<Option<Student>, DbError> {
        log::trace!("Store::get_student( {} ) called.", id);

        self.interact(move |conn| {
            let s = conn.query_row(
                "SELECT id, nombre, apellidos, fecha_nacimiento
                    FROM estudiantes WHERE id = ?1",
                params![id],
                student_from_row
            ).optional()?;
            Ok(s)
        }).await
    }

    /// Students as dropdown entries, labelled by full name.
    pub async fn get_student_choices(&self) -> Result<Vec<Choice>, DbError> {
        log::trace!("Store::get_student_choices() called.");

        self.interact(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, nombre || ' ' || apellidos AS nombre FROM estudiantes"
            )?;
            let choices = stmt.query_map([], |row| Ok(Choice {
                id: row.get("id")?,
                label: row.get("nombre")?,
                selected: false,
            }))?.collect::<Result<Vec<_>, _>>()?;
            Ok(choices)
        }).await
    }

    pub async fn insert_student(
        &self,
        nombre: &str,
        apellidos: &str,
        fecha_nacimiento: &str,
    ) -> Result<i64, DbError> {
        log::trace!(
            "Store::insert_student( {:?}, {:?}, {:?} ) called.",
            nombre, apellidos, fecha_nacimiento
        );

        let (nombre, apellidos, fecha_nacimiento) = (
            nombre.to_owned(), apellidos.to_owned(), fecha_nacimiento.to_owned()
        );

        self.interact(move |conn| {
            conn.execute(
                "INSERT INTO estudiantes (nombre, apellidos, fecha_nacimiento)
                    VALUES (?1, ?2, ?3)",
                params![&nombre, &apellidos, &fecha_nacimiento]
            )?;
            Ok(conn.last_insert_rowid())
        }).await
    }

    /**
    Change a student's name.

    Only `nombre` and `apellidos` are written; the birth date stays whatever
    it was when the student was inserted. Returns the number of rows changed,
    which is zero if there's no such student.
    */
    pub async fn update_student_name(
        &self,
        id: i64,
        nombre: &str,
        apellidos: &str,
    ) -> Result<usize, DbError> {
        log::trace!(
            "Store::update_student_name( {}, {:?}, {:?} ) called.",
            id, nombre, apellidos
        );

        let (nombre, apellidos) = (nombre.to_owned(), apellidos.to_owned());

        self.interact(move |conn| {
            let n = conn.execute(
                "UPDATE estudiantes SET nombre = ?1, apellidos = ?2 WHERE id = ?3",
                params![&nombre, &apellidos, id]
            )?;
            Ok(n)
        }).await
    }

    /// Returns the number of rows deleted; zero is not an error.
    pub async fn delete_student(&self, id: i64) -> Result<usize, DbError> {
        log::trace!("Store::delete_student( {} ) called.", id);

        self.interact(move |conn| {
            let n = conn.execute("DELETE FROM estudiantes WHERE id = ?1", params![id])?;
            if n == 0 {
                log::trace!("No student with id {} to delete.", id);
            }
            Ok(n)
        }).await
    }
}
