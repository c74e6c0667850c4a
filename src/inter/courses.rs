/*!
Course records pages.
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
pub struct CourseData {
    pub descripcion: String,
    pub horas: i64,
}

pub async fn list(
    State(glob): State<Glob>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
) -> Result<Response, Failure> {
    let cursos = glob.store.get_courses().await?;
    render_page(&session, Some(&user), "cursos", json!({ "cursos": cursos })).await
}

pub async fn new_form(
    Extension(user): Extension<CurrentUser>,
    session: Session,
) -> Result<Response, Failure> {
    render_page(&session, Some(&user), "form_curso", json!({ "action": "/curso/nuevo" })).await
}

pub async fn create(
    State(glob): State<Glob>,
    session: Session,
    Form(form): Form<CourseData>,
) -> Result<Response, Failure> {
    let id = glob.store.insert_course(&form.descripcion, form.horas).await?;
    log::info!("Inserted course {} ({:?}).", id, &form.descripcion);

    redirect_with(&session, "/cursos", Category::Success, "Curso agregado correctamente").await
}

pub async fn edit_form(
    State(glob): State<Glob>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, Failure> {
    let curso = match glob.store.get_course(id).await? {
        Some(c) => c,
        None => { return Err(Failure::NotFound(format!("course {}", id))); },
    };

    let data = json!({
        "action": format!("/curso/editar/{}", id),
        "curso": curso,
    });
    render_page(&session, Some(&user), "form_curso", data).await
}

pub async fn update(
    State(glob): State<Glob>,
    session: Session,
    Path(id): Path<i64>,
    Form(form): Form<CourseData>,
) -> Result<Response, Failure> {
    let n = glob.store.update_course(id, &form.descripcion, form.horas).await?;
    log::info!("Updated course {} ({} row(s)).", id, n);

    redirect_with(&session, "/cursos", Category::Success, "Curso actualizado").await
}

pub async fn delete(
    State(glob): State<Glob>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, Failure> {
    let n = glob.store.delete_course(id).await?;
    log::info!("Deleted course {} ({} row(s)).", id, n);

    redirect_with(&session, "/cursos", Category::Danger, "Curso eliminado").await
}
