/*!
`Store` methods for the `inscripciones` table.

```sql
CREATE TABLE inscripciones (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    fecha         TEXT NOT NULL,
    estudiante_id INTEGER NOT NULL,
    curso_id      INTEGER NOT NULL,
    FOREIGN KEY (estudiante_id) REFERENCES estudiantes(id),
    FOREIGN KEY (curso_id) REFERENCES cursos(id)
);
```

Nothing here checks that `estudiante_id` or `curso_id` point anywhere.
*/
use rusqlite::{params, OptionalExtension, Row};

use super::{DbError, Store};
use crate::record::{Enrollment, EnrollmentListing};

fn enrollment_from_row(row: &Row) -> rusqlite::Result<Enrollment> {
    Ok(Enrollment {
        id: row.get("id")?,
        fecha: row.get("fecha")?,
        estudiante_id: row.get("estudiante_id")?,
        curso_id: row.get("curso_id")?,
    })
}

impl Store {
    /**
    Every enrollment with its student's full name and its course's
    description.

    These are inner joins, so an enrollment whose student or course has been
    deleted drops out of the listing (the row itself stays in the table).
    */
    pub async fn get_enrollment_listings(
        &self
    ) -> Result<Vec<EnrollmentListing>, DbError> {
        log::trace!("Store::get_enrollment_listings() called.");

        self.interact(|conn| {
            let mut stmt = conn.prepare(
                "SELECT i.id,
                        i.fecha,
                        e.nombre || ' ' || e.apellidos AS estudiante,
                        c.descripcion AS curso
                    FROM inscripciones i
                    JOIN estudiantes e ON i.estudiante_id = e.id
                    JOIN cursos c ON i.curso_id = c.id"
            )?;
            let listings = stmt.query_map([], |row| Ok(EnrollmentListing {
                id: row.get("id")?,
                fecha: row.get("fecha")?,
                estudiante: row.get("estudiante")?,
                curso: row.get("curso")?,
            }))?.collect::<Result<Vec<_>, _>>()?;
            log::trace!("    ...retrieved {} enrollments.", listings.len());
            Ok(listings)
        }).await
    }

    pub async fn get_enrollment(&self, id: i64) -> Result<Option<Enrollment>, DbError> {
        log::trace!("Store::get_enrollment( {} ) called.", id);

        self.interact(move |conn| {
            let e = conn.query_row(
                "SELECT id, fecha, estudiante_id, curso_id
                    FROM inscripciones WHERE id = ?1",
                params![id],
                enrollment_from_row
            ).optional()?;
            Ok(e)
        }).await
    }

    pub async fn insert_enrollment(
        &self,
        fecha: &str,
        estudiante_id: i64,
        curso_id: i64,
    ) -> Result<i64, DbError> {
        log::trace!(
            "Store::insert_enrollment( {:?}, {}, {} ) called.",
            fecha, estudiante_id, curso_id
        );

        let fecha = fecha.to_owned();
        self.interact(move |conn| {
            conn.execute(
                "INSERT INTO inscripciones (fecha, estudiante_id, curso_id)
                    VALUES (?1, ?2, ?3)",
                params![&fecha, estudiante_id, curso_id]
            )?;
            Ok(conn.last_insert_rowid())
        }).await
    }

    pub async fn update_enrollment(
        &self,
        id: i64,
        fecha: &str,
        estudiante_id: i64,
        curso_id: i64,
    ) -> Result<usize, DbError> {
        log::trace!(
            "Store::update_enrollment( {}, {:?}, {}, {} ) called.",
            id, fecha, estudiante_id, curso_id
        );

        let fecha = fecha.to_owned();
        self.interact(move |conn| {
            let n = conn.execute(
                "UPDATE inscripciones
                    SET fecha = ?1, estudiante_id = ?2, curso_id = ?3
                    WHERE id = ?4",
                params![&fecha, estudiante_id, curso_id, id]
            )?;
            Ok(n)
        }).await
    }

    pub async fn delete_enrollment(&self, id: i64) -> Result<usize, DbError> {
        log::trace!("Store::delete_enrollment( {} ) called.", id);

        self.interact(move |conn| {
            let n = conn.execute("DELETE FROM inscripciones WHERE id = ?1", params![id])?;
            if n == 0 {
                log::trace!("No enrollment with id {} to delete.", id);
            }
            Ok(n)
        }).await
    }
}
