/*!
Registration, logging in and out, and the two landing pages.
*/
use axum::{
    extract::{Extension, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::{
    auth::{self, LoginResult, RegisterResult},
    config::Glob,
    user::CurrentUser,
};
use super::*;

/// Data type to read the form data from a login request.
#[derive(Deserialize, Debug)]
pub struct LoginData {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

pub async fn index() -> Redirect {
    Redirect::to("/login")
}

pub async fn login_form(
    State(glob): State<Glob>,
    session: Session,
) -> Result<Response, Failure> {
    if current_user(&glob.store, &session).await?.is_some() {
        return Ok(Redirect::to("/principal").into_response());
    }

    render_page(&session, None, "login", json!({})).await
}

pub async fn login(
    State(glob): State<Glob>,
    session: Session,
    Form(form): Form<LoginData>,
) -> Result<Response, Failure> {
    log::trace!("login::login( {:?} ) called.", &form.username);

    if current_user(&glob.store, &session).await?.is_some() {
        return Ok(Redirect::to("/principal").into_response());
    }

    match auth::check_password(&glob.store, &form.username, &form.password).await? {
        LoginResult::Ok(u) => {
            log::info!("User {:?} (id {}) logged in.", &u.uname, u.id);
            // New id for the now-privileged session.
            session.cycle_id().await?;
            session.insert(USER_ID_KEY, u.id).await?;
            redirect_with(&session, "/principal", Category::Success, "accediendo a su pagina").await
        },
        LoginResult::BadPassword | LoginResult::NoSuchUser => {
            log::info!("Failed login attempt for {:?}.", &form.username);
            flash(&session, Category::Danger, "contraseña incorrecta").await?;
            render_page(&session, None, "login", json!({ "username": &form.username })).await
        },
    }
}

pub async fn logout(
    Extension(user): Extension<CurrentUser>,
    session: Session,
) -> Result<Response, Failure> {
    log::info!("User {:?} (id {}) logged out.", &user.uname, user.id);

    session.flush().await?;
    redirect_with(&session, "/login", Category::Info, "Has cerrado sesión").await
}

pub async fn register_form(session: Session) -> Result<Response, Failure> {
    render_page(&session, None, "register", json!({})).await
}

pub async fn register(
    State(glob): State<Glob>,
    session: Session,
    Form(form): Form<RegisterData>,
) -> Result<Response, Failure> {
    log::trace!(
        "login::register( {:?}, {:?}, {:?} ) called.",
        &form.name, &form.email, &form.username
    );

    match auth::register(
        &glob.store,
        &form.name,
        &form.email,
        &form.username,
        &form.password,
    ).await? {
        RegisterResult::Registered(_) => redirect_with(
            &session,
            "/login",
            Category::Success,
            "Usuario registrado correctamente. Inicia sesión."
        ).await,
        RegisterResult::UnameTaken => {
            flash(&session, Category::Danger, "El nombre de usuario ya existe.").await?;
            let data = json!({
                "name": &form.name,
                "email": &form.email,
                "username": &form.username,
            });
            render_page(&session, None, "register", data).await
        },
    }
}

pub async fn dashboard(
    Extension(user): Extension<CurrentUser>,
    session: Session,
) -> Result<Response, Failure> {
    let data = json!({
        "username": &user.uname,
        "name": &user.name,
    });
    render_page(&session, Some(&user), "dashboard", data).await
}

pub async fn principal(
    Extension(user): Extension<CurrentUser>,
    session: Session,
) -> Result<Response, Failure> {
    render_page(&session, Some(&user), "principal", json!({})).await
}
