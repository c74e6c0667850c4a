/*!
Student records pages.
*/
use axum::{
    extract::{Extension, Path, State},
    response::Response,
    Form,
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::{config::Glob, user::CurrentUser};
use super::*;

#[derive(Deserialize, Debug)]
pub struct StudentData {
    pub nombre: String,
    pub apellidos: String,
    pub fecha_nacimiento: String,
}

/// What the edit form is allowed to change. A `fecha_nacimiento` in the
/// submitted form is ignored.
#[derive(Deserialize, Debug)]
pub struct StudentNameData {
    pub nombre: String,
    pub apellidos: String,
}

pub async fn list(
    State(glob): State<Glob>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
) -> Result<Response, Failure> {
    let estudiantes = glob.store.get_students().await?;
    render_page(&session, Some(&user), "estudiantes", json!({ "estudiantes": estudiantes })).await
}

pub async fn new_form(
    Extension(user): Extension<CurrentUser>,
    session: Session,
) -> Result<Response, Failure> {
    let data = json!({ "action": "/estudiante/nuevo" });
    render_page(&session, Some(&user), "form_estudiante", data).await
}

pub async fn create(
    State(glob): State<Glob>,
    session: Session,
    Form(form): Form<StudentData>,
) -> Result<Response, Failure> {
    let id = glob.store.insert_student(
        &form.nombre,
        &form.apellidos,
        &form.fecha_nacimiento
    ).await?;
    log::info!("Inserted student {} ({} {}).", id, &form.nombre, &form.apellidos);

    redirect_with(&session, "/estudiantes", Category::Success, "Estudiante registrado correctamente").await
}

pub async fn edit_form(
    State(glob): State<Glob>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, Failure> {
    let estudiante = match glob.store.get_student(id).await? {
        Some(s) => s,
        None => { return Err(Failure::NotFound(format!("student {}", id))); },
    };

    let data = json!({
        "action": format!("/estudiante/editar/{}", id),
        "estudiante": estudiante,
    });
    render_page(&session, Some(&user), "form_estudiante", data).await
}

pub async fn update(
    State(glob): State<Glob>,
    session: Session,
    Path(id): Path<i64>,
    Form(form): Form<StudentNameData>,
) -> Result<Response, Failure> {
    let n = glob.store.update_student_name(id, &form.nombre, &form.apellidos).await?;
    log::info!("Updated student {} ({} row(s)).", id, n);

    redirect_with(&session, "/estudiantes", Category::Success, "Estudiante actualizado").await
}

pub async fn delete(
    State(glob): State<Glob>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, Failure> {
    let n = glob.store.delete_student(id).await?;
    log::info!("Deleted student {} ({} row(s)).", id, n);

    redirect_with(&session, "/estudiantes", Category::Danger, "Estudiante eliminado").await
}
