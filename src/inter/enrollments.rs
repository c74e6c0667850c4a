/*!
Enrollment records pages.

The create and edit forms pick the student and course from dropdowns of
every student and every course; the ids that come back are stored without
checking that they still exist.
*/
use axum::{
    extract::{Extension, Path, State},
    response::Response,
    Form,
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::{config::Glob, record::Choice, user::CurrentUser};
use super::*;

#[derive(Deserialize, Debug)]
pub struct EnrollmentData {
    pub fecha: String,
    pub estudiante_id: i64,
    pub curso_id: i64,
}

pub async fn list(
    State(glob): State<Glob>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
) -> Result<Response, Failure> {
    let inscripciones = glob.store.get_enrollment_listings().await?;
    render_page(
        &session,
        Some(&user),
        "inscripciones",
        json!({ "inscripciones": inscripciones })
    ).await
}

pub async fn new_form(
    State(glob): State<Glob>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
) -> Result<Response, Failure> {
    let estudiantes = glob.store.get_student_choices().await?;
    let cursos = glob.store.get_course_choices().await?;

    let data = json!({
        "action": "/inscripcion/nuevo",
        "estudiantes": estudiantes,
        "cursos": cursos,
    });
    render_page(&session, Some(&user), "form_inscripcion", data).await
}

pub async fn create(
    State(glob): State<Glob>,
    session: Session,
    Form(form): Form<EnrollmentData>,
) -> Result<Response, Failure> {
    let id = glob.store.insert_enrollment(
        &form.fecha,
        form.estudiante_id,
        form.curso_id
    ).await?;
    log::info!(
        "Inserted enrollment {} (student {} in course {}).",
        id, form.estudiante_id, form.curso_id
    );

    redirect_with(
        &session,
        "/inscripciones",
        Category::Success,
        "Inscripción realizada correctamente"
    ).await
}

pub async fn edit_form(
    State(glob): State<Glob>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, Failure> {
    let inscripcion = match glob.store.get_enrollment(id).await? {
        Some(e) => e,
        None => { return Err(Failure::NotFound(format!("enrollment {}", id))); },
    };

    let mut estudiantes = glob.store.get_student_choices().await?;
    let mut cursos = glob.store.get_course_choices().await?;
    Choice::select(&mut estudiantes, inscripcion.estudiante_id);
    Choice::select(&mut cursos, inscripcion.curso_id);

    let data = json!({
        "action": format!("/inscripcion/editar/{}", id),
        "inscripcion": inscripcion,
        "estudiantes": estudiantes,
        "cursos": cursos,
    });
    render_page(&session, Some(&user), "form_inscripcion", data).await
}

pub async fn update(
    State(glob): State<Glob>,
    session: Session,
    Path(id): Path<i64>,
    Form(form): Form<EnrollmentData>,
) -> Result<Response, Failure> {
    let n = glob.store.update_enrollment(
        id,
        &form.fecha,
        form.estudiante_id,
        form.curso_id
    ).await?;
    log::info!("Updated enrollment {} ({} row(s)).", id, n);

    redirect_with(
        &session,
        "/inscripciones",
        Category::Success,
        "Inscripción actualizada correctamente"
    ).await
}

pub async fn delete(
    State(glob): State<Glob>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, Failure> {
    let n = glob.store.delete_enrollment(id).await?;
    log::info!("Deleted enrollment {} ({} row(s)).", id, n);

    redirect_with(&session, "/inscripciones", Category::Danger, "Inscripción eliminada").await
}
