/*!
Interoperation between the client (user) and server.

(Not the application and the database; that's covered by `auth` and `store`.)

Everything is server-rendered HTML. Pages come from the Handlebars templates
loaded by `init()`; every page gets the pending flash messages and the
logged-in user (if any) added to its data before rendering.
*/
use std::fmt::Debug;
use std::path::Path;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use handlebars::Handlebars;
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use tower_sessions::{session, Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::{
    auth::AuthError,
    config::Glob,
    store::{DbError, Store},
    user::CurrentUser,
};

pub mod courses;
pub mod enrollments;
pub mod flash;
pub mod login;
pub mod students;


use flash::{flash, take_flashes, Category};

static TEMPLATES: OnceCell<Handlebars> = OnceCell::new();

/// Session key holding the logged-in user's id.
const USER_ID_KEY: &str = "user_id";

const LOGIN_REQUIRED: &str = "Por favor inicia sesión para acceder a esta página.";

static HTML_500: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Instituto | Error</title>
<link rel="stylesheet" href="/static/instituto.css">
</head>
<body>
<h1>Internal Server Error</h1>
<p>(Error 500)</p>
<p>Something went wrong on our end. No further or more
helpful information is available about the problem.</p>
</body>
</html>"#;

static HTML_404: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Instituto | Not Found</title>
<link rel="stylesheet" href="/static/instituto.css">
</head>
<body>
<h1>Not Found</h1>
<p>(Error 404)</p>
<p>The requested record does not exist.</p>
</body>
</html>"#;

/**
Load every `.html` file under `template_dir` into the page registry, named
by its path minus the extension (`templates/cursos.html` is `"cursos"`).

Until this has run, every page the app serves comes out as the bare 500
page. A second call keeps the first registry and only logs a warning.
*/
pub fn init<P: AsRef<Path>>(template_dir: P) -> Result<(), String> {
    if TEMPLATES.get().is_some() {
        log::warn!("Templates directory already initialized; ignoring.");
        return Ok(())
    }

    let template_dir = template_dir.as_ref();

    let mut h = Handlebars::new();
    #[cfg(debug_assertions)]
    h.set_dev_mode(true);
    h.register_templates_directory(".html", template_dir)
        .map_err(|e| format!(
            "Error registering templates directory {}: {}",
            template_dir.display(), &e
        ))?;

    TEMPLATES.set(h)
        .map_err(|old_h| {
            let mut estr = String::from("Templates directory already registered w/templates:");
            for template_name in old_h.get_templates().keys() {
                estr.push('\n');
                estr.push_str(template_name.as_str());
            }
            estr
        })?;

    Ok(())
}

/// The page for a request that failed in a way the user can't fix by
/// resubmitting: a database error, a template that won't render.
pub fn html_500() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(HTML_500)
    ).into_response()
}

pub fn html_404() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(HTML_404)
    ).into_response()
}

pub fn serve_template<S>(
    code: StatusCode,
    template_name: &str,
    data: &S,
) -> Response
where
    S: Serialize + Debug
{
    log::trace!("serve_template( {}, {:?}, ... ) called.", &code, template_name);

    let templates = match TEMPLATES.get() {
        Some(h) => h,
        None => {
            log::error!("serve_template() called before inter::init().");
            return html_500();
        },
    };

    match templates.render(template_name, data) {
        Ok(response_body) => (
            code,
            Html(response_body)
        ).into_response(),
        Err(e) => {
            log::error!(
                "Error rendering template {:?} with data {:?}:\n{}",
                template_name, data, &e
            );
            html_500()
        },
    }
}

/**
Render a full page: `data` plus the pending flash messages (which are
thereby used up) and the logged-in user, if there is one.

`data` should be a JSON object; anything else is rendered as-is.
*/
pub async fn render_page(
    session: &Session,
    user: Option<&CurrentUser>,
    template_name: &str,
    mut data: Value,
) -> Result<Response, Failure> {
    let flashes = take_flashes(session).await?;
    if let Value::Object(map) = &mut data {
        map.insert("flashes".to_owned(), json!(flashes));
        map.insert("user".to_owned(), json!(user));
    }

    Ok(serve_template(StatusCode::OK, template_name, &data))
}

/// Flash `message` and send the browser to `uri`.
pub async fn redirect_with(
    session: &Session,
    uri: &str,
    category: Category,
    message: &str,
) -> Result<Response, Failure> {
    flash(session, category, message).await?;
    Ok(Redirect::to(uri).into_response())
}

/**
Everything that can go wrong while fielding a request, short of the outcomes
(bad password, taken user name) that get shown to the user as messages.

None of these are recovered from; the user gets a bare error page.
*/
#[derive(Debug)]
pub enum Failure {
    Db(DbError),
    Session(session::Error),
    Auth(AuthError),
    NotFound(String),
}

impl From<DbError> for Failure {
    fn from(e: DbError) -> Failure { Failure::Db(e) }
}

impl From<session::Error> for Failure {
    fn from(e: session::Error) -> Failure { Failure::Session(e) }
}

impl From<AuthError> for Failure {
    fn from(e: AuthError) -> Failure { Failure::Auth(e) }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        match self {
            Failure::NotFound(what) => {
                log::debug!("Not found: {}", &what);
                html_404()
            },
            Failure::Db(e) => {
                log::error!("Database error fielding request: {}", &e);
                html_500()
            },
            Failure::Session(e) => {
                log::error!("Session error fielding request: {}", &e);
                html_500()
            },
            Failure::Auth(e) => {
                log::error!("Authentication error fielding request: {}", &e);
                html_500()
            },
        }
    }
}

/**
Look up who's logged in on `session`, if anyone.

The session only holds a user id; the user is reloaded from the database
every time. A session whose user has vanished counts as logged out.
*/
pub async fn current_user(
    store: &Store,
    session: &Session,
) -> Result<Option<CurrentUser>, Failure> {
    let id: i64 = match session.get(USER_ID_KEY).await? {
        Some(id) => id,
        None => { return Ok(None); },
    };

    match store.get_user_by_id(id).await? {
        Some(u) => Ok(Some(u.into_current())),
        None => {
            log::warn!("Session refers to nonexistent user id {}.", id);
            Ok(None)
        },
    }
}

/// Middleware gating every records route behind a login.
///
/// Requests without a logged-in user get bounced to `/login`; the page they
/// asked for is not remembered.
pub async fn require_login(
    State(glob): State<Glob>,
    session: Session,
    mut req: Request,
    next: Next,
) -> Result<Response, Failure> {
    match current_user(&glob.store, &session).await? {
        Some(u) => {
            log::trace!("{} {} by {:?}", req.method(), req.uri(), &u.uname);
            req.extensions_mut().insert(u);
            Ok(next.run(req).await)
        },
        None => {
            log::trace!("{} {} without login; redirecting.", req.method(), req.uri());
            redirect_with(&session, "/login", Category::Info, LOGIN_REQUIRED).await
        },
    }
}

/// Assemble every route, the login gate, static files and the session layer.
pub fn app(glob: Glob) -> Router {
    let mut session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(glob.session_secure);
    if let Some(n) = glob.session_idle_minutes {
        session_layer = session_layer.with_expiry(
            Expiry::OnInactivity(time::Duration::minutes(n))
        );
    }

    let protected = Router::new()
        .route("/logout", get(login::logout))
        .route("/dashboard", get(login::dashboard))
        .route("/principal", get(login::principal))
        .route("/estudiantes", get(students::list))
        .route("/estudiante/nuevo", get(students::new_form).post(students::create))
        .route("/estudiante/editar/:id", get(students::edit_form).post(students::update))
        .route("/estudiante/eliminar/:id", get(students::delete))
        .route("/cursos", get(courses::list))
        .route("/curso/nuevo", get(courses::new_form).post(courses::create))
        .route("/curso/editar/:id", get(courses::edit_form).post(courses::update))
        .route("/curso/eliminar/:id", get(courses::delete))
        .route("/inscripciones", get(enrollments::list))
        .route("/inscripcion/nuevo", get(enrollments::new_form).post(enrollments::create))
        .route("/inscripcion/editar/:id", get(enrollments::edit_form).post(enrollments::update))
        .route("/inscripcion/eliminar/:id", get(enrollments::delete))
        .route_layer(middleware::from_fn_with_state(glob.clone(), require_login));

    let serve_static = ServeDir::new(&glob.static_dir);

    Router::new()
        .route("/", get(login::index))
        .route("/login", get(login::login_form).post(login::login))
        .route("/register", get(login::register_form).post(login::register))
        .merge(protected)
        .nest_service("/static", serve_static)
        .layer(session_layer)
        .with_state(glob)
}
