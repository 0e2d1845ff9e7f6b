use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use server_api::{documents, workflow, ApiContext, Directory, Session, SessionKeys};
use shared::{
    domain::{
        FacultyRequestId, FacultyRequestView, InternshipId, MentorQuestion, MentorQuestionId,
        ProfileId, Question, QuestionId, QuestionStatus, Role, Student, StudentId,
        StudentRequest, StudentRequestId,
    },
    error::{ApiError, ErrorCode},
    profile::{Internship, StoredInternship, StoredProfile, StudentProfile},
    protocol::{
        AnswerSubmission, AnsweredQuestion, FacultyRequestResolved, HodSupportRequested,
        HodSupportSubmission, LoginRequest, LoginResponse, MentorQuestionSubmission,
        MentorRemarksSubmission, QuestionFilter, RemarkStatusUpdate, RequestStatusUpdate,
        ResolutionFilter, ResolutionRequest, ServerEvent, StudentDashboard, StudentFilter,
    },
};
use storage::{seed, Storage};
use tokio::sync::broadcast;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_database_url};

const MAX_BODY_BYTES: usize = 256 * 1024;
const EVENT_BUFFER: usize = 256;

#[derive(Clone)]
struct AppState {
    api: ApiContext,
    events: broadcast::Sender<ServerEvent>,
}

impl AppState {
    fn publish(&self, event: impl Into<ServerEvent>) {
        // No subscribers is not an error.
        let _ = self.events.send(event.into());
    }
}

type HttpError = (StatusCode, Json<ApiError>);
type HttpResult<T> = Result<Json<T>, HttpError>;

#[derive(Debug, Deserialize)]
struct QuestionQuery {
    student_id: Option<i64>,
    status: Option<QuestionStatus>,
}

#[derive(Debug, Deserialize)]
struct WsQuery {
    token: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    if settings.seed_demo_data {
        if storage.apply_seed(&seed::demo()?).await? {
            info!("loaded demo department data");
        } else {
            debug!("database already populated; skipping demo data");
        }
    }

    let directory = Directory::from_config(&settings.accounts)?;
    info!(accounts = directory.len(), "account directory loaded");
    let sessions = SessionKeys::new(settings.jwt_secret, settings.session_ttl_seconds);
    let api = ApiContext::with_backend(storage, directory, sessions);
    let (events, _) = broadcast::channel(EVENT_BUFFER);

    let app = build_router(Arc::new(AppState { api, events }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/students", get(http_list_students))
        .route("/students/:id", get(http_student_dashboard))
        .route("/students/:id/remark_status", put(http_update_remark_status))
        .route("/students/:id/request_status", put(http_update_request_status))
        .route("/students/:id/hod_support", post(http_request_hod_support))
        .route("/questions", get(http_list_questions))
        .route("/questions/:id/answer", post(http_answer_question))
        .route("/hod/student_requests", get(http_list_student_requests))
        .route(
            "/hod/student_requests/:id/resolve",
            post(http_resolve_student_request),
        )
        .route("/hod/faculty_requests", get(http_list_faculty_requests))
        .route(
            "/hod/faculty_requests/:id/resolve",
            post(http_resolve_faculty_request),
        )
        .route(
            "/mentor_questions",
            get(http_list_mentor_questions).post(http_submit_mentor_question),
        )
        .route(
            "/mentor_questions/:id/remarks",
            put(http_record_mentor_remarks),
        )
        .route("/profiles", post(http_create_profile))
        .route("/profiles/:id", get(http_get_profile))
        .route(
            "/profiles/:id/internships/:internship_id",
            post(http_attach_internship),
        )
        .route("/internships", post(http_create_internship))
        .route("/internships/:id", get(http_get_internship))
        .route("/ws", get(ws_handler))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: ApiError) -> HttpError {
    (status_for(err.code), Json(err))
}

/// Resolves the caller from an optional `Authorization: Bearer` header. A
/// missing header yields an anonymous session; a bad token is rejected.
fn session_from_headers(state: &AppState, headers: &HeaderMap) -> Result<Session, HttpError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(Session::anonymous());
    };
    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            reject(ApiError::new(
                ErrorCode::Unauthorized,
                "expected a bearer token",
            ))
        })?;
    state.api.sessions.verify(token).map_err(reject)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, HttpError> {
    server_api::health(&state.api).await.map_err(reject)?;
    Ok("ok")
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> HttpResult<LoginResponse> {
    let response =
        server_api::login(&state.api.directory, &state.api.sessions, &req).map_err(reject)?;
    Ok(Json(response))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, HttpError> {
    let mut session = session_from_headers(&state, &headers)?;
    if session.authenticated {
        info!(email = session.email.as_deref().unwrap_or_default(), "logout");
    }
    session.logout();
    Ok(StatusCode::NO_CONTENT)
}

async fn http_list_students(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(filter): Query<StudentFilter>,
) -> HttpResult<Vec<Student>> {
    let session = session_from_headers(&state, &headers)?;
    let students = workflow::list_students(&state.api, &session, &filter)
        .await
        .map_err(reject)?;
    Ok(Json(students))
}

async fn http_student_dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> HttpResult<StudentDashboard> {
    let session = session_from_headers(&state, &headers)?;
    let dashboard = workflow::student_dashboard(&state.api, &session, StudentId(id))
        .await
        .map_err(reject)?;
    Ok(Json(dashboard))
}

async fn http_update_remark_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<RemarkStatusUpdate>,
) -> HttpResult<Student> {
    let session = session_from_headers(&state, &headers)?;
    let student = workflow::update_remark_status(&state.api, &session, StudentId(id), req.status)
        .await
        .map_err(reject)?;
    state.publish(ServerEvent::StudentUpdated {
        student: student.clone(),
    });
    Ok(Json(student))
}

async fn http_update_request_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<RequestStatusUpdate>,
) -> HttpResult<Student> {
    let session = session_from_headers(&state, &headers)?;
    let student = workflow::update_request_status(&state.api, &session, StudentId(id), req.status)
        .await
        .map_err(reject)?;
    state.publish(ServerEvent::StudentUpdated {
        student: student.clone(),
    });
    Ok(Json(student))
}

async fn http_request_hod_support(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<HodSupportSubmission>,
) -> HttpResult<HodSupportRequested> {
    let session = session_from_headers(&state, &headers)?;
    let filed = workflow::request_hod_support(&state.api, &session, StudentId(id), &req.reason)
        .await
        .map_err(reject)?;
    state.publish(filed.clone());
    Ok(Json(filed))
}

async fn http_list_questions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<QuestionQuery>,
) -> HttpResult<Vec<Question>> {
    let session = session_from_headers(&state, &headers)?;
    let filter = QuestionFilter {
        student_id: q.student_id.map(StudentId),
        status: q.status,
    };
    let questions = workflow::list_questions(&state.api, &session, &filter)
        .await
        .map_err(reject)?;
    Ok(Json(questions))
}

async fn http_answer_question(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<AnswerSubmission>,
) -> HttpResult<AnsweredQuestion> {
    let session = session_from_headers(&state, &headers)?;
    let answered = workflow::answer_question(&state.api, &session, QuestionId(id), &req.answer)
        .await
        .map_err(reject)?;
    state.publish(answered.clone());
    Ok(Json(answered))
}

async fn http_list_student_requests(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(filter): Query<ResolutionFilter>,
) -> HttpResult<Vec<StudentRequest>> {
    let session = session_from_headers(&state, &headers)?;
    let requests = workflow::list_student_requests(&state.api, &session, filter.status)
        .await
        .map_err(reject)?;
    Ok(Json(requests))
}

async fn http_resolve_student_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<ResolutionRequest>,
) -> HttpResult<StudentRequest> {
    let session = session_from_headers(&state, &headers)?;
    let request =
        workflow::resolve_student_request(&state.api, &session, StudentRequestId(id), req.decision)
            .await
            .map_err(reject)?;
    state.publish(ServerEvent::StudentRequestResolved {
        request: request.clone(),
    });
    Ok(Json(request))
}

async fn http_list_faculty_requests(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(filter): Query<ResolutionFilter>,
) -> HttpResult<Vec<FacultyRequestView>> {
    let session = session_from_headers(&state, &headers)?;
    let requests = workflow::list_faculty_requests(&state.api, &session, filter.status)
        .await
        .map_err(reject)?;
    Ok(Json(requests))
}

async fn http_resolve_faculty_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<ResolutionRequest>,
) -> HttpResult<FacultyRequestResolved> {
    let session = session_from_headers(&state, &headers)?;
    let resolved =
        workflow::resolve_faculty_request(&state.api, &session, FacultyRequestId(id), req.decision)
            .await
            .map_err(reject)?;
    state.publish(resolved.clone());
    Ok(Json(resolved))
}

async fn http_list_mentor_questions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> HttpResult<Vec<MentorQuestion>> {
    let session = session_from_headers(&state, &headers)?;
    let questions = workflow::list_mentor_questions(&state.api, &session)
        .await
        .map_err(reject)?;
    Ok(Json(questions))
}

async fn http_submit_mentor_question(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<MentorQuestionSubmission>,
) -> Result<(StatusCode, Json<MentorQuestion>), HttpError> {
    let session = session_from_headers(&state, &headers)?;
    let question = workflow::submit_mentor_question(&state.api, &session, &req)
        .await
        .map_err(reject)?;
    state.publish(ServerEvent::MentorQuestionSubmitted {
        question: question.clone(),
    });
    Ok((StatusCode::CREATED, Json(question)))
}

async fn http_record_mentor_remarks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<MentorRemarksSubmission>,
) -> HttpResult<MentorQuestion> {
    let session = session_from_headers(&state, &headers)?;
    let question =
        workflow::record_mentor_remarks(&state.api, &session, MentorQuestionId(id), &req.remarks)
            .await
            .map_err(reject)?;
    state.publish(ServerEvent::MentorRemarksRecorded {
        question: question.clone(),
    });
    Ok(Json(question))
}

async fn http_create_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(profile): Json<StudentProfile>,
) -> Result<(StatusCode, Json<StoredProfile>), HttpError> {
    let session = session_from_headers(&state, &headers)?;
    let stored = documents::create_profile(&state.api, &session, &profile)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn http_get_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> HttpResult<StoredProfile> {
    let session = session_from_headers(&state, &headers)?;
    let stored = documents::get_profile(&state.api, &session, ProfileId(id))
        .await
        .map_err(reject)?;
    Ok(Json(stored))
}

async fn http_attach_internship(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, internship_id)): Path<(i64, i64)>,
) -> HttpResult<StoredProfile> {
    let session = session_from_headers(&state, &headers)?;
    let stored = documents::attach_internship(
        &state.api,
        &session,
        ProfileId(id),
        InternshipId(internship_id),
    )
    .await
    .map_err(reject)?;
    Ok(Json(stored))
}

async fn http_create_internship(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(internship): Json<Internship>,
) -> Result<(StatusCode, Json<StoredInternship>), HttpError> {
    let session = session_from_headers(&state, &headers)?;
    let stored = documents::create_internship(&state.api, &session, &internship)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn http_get_internship(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> HttpResult<StoredInternship> {
    let session = session_from_headers(&state, &headers)?;
    let stored = documents::get_internship(&state.api, &session, InternshipId(id))
        .await
        .map_err(reject)?;
    Ok(Json(stored))
}

/// Browsers cannot set headers on a WebSocket handshake, so the bearer token
/// travels as `?token=`.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(q): Query<WsQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let session = state.api.sessions.verify(&q.token).map_err(reject)?;
    Ok(ws.on_upgrade(move |socket| ws_connection(state, socket, session)))
}

/// Whether a subscriber may see an event. Mirrors the read rules of the
/// REST routes: student records go to staff, request resolutions to the HOD,
/// and mentor questions to faculty or to the student who asked.
fn visible_to(session: &Session, event: &ServerEvent) -> bool {
    let Some(role) = session.role.filter(|_| session.authenticated) else {
        return false;
    };
    match event {
        ServerEvent::StudentUpdated { .. }
        | ServerEvent::QuestionAnswered { .. }
        | ServerEvent::HodSupportRequested { .. } => matches!(role, Role::Faculty | Role::Hod),
        ServerEvent::StudentRequestResolved { .. } | ServerEvent::FacultyRequestResolved { .. } => {
            role == Role::Hod
        }
        ServerEvent::MentorQuestionSubmitted { question }
        | ServerEvent::MentorRemarksRecorded { question } => match role {
            Role::Faculty => true,
            Role::Student => session
                .email
                .as_deref()
                .is_some_and(|email| question.student_email.eq_ignore_ascii_case(email)),
            Role::Hod => false,
        },
    }
}

async fn ws_connection(
    state: Arc<AppState>,
    socket: axum::extract::ws::WebSocket,
    session: Session,
) {
    use axum::extract::ws::Message;
    use futures::{SinkExt, StreamExt};

    let (mut sender, mut receiver) = socket.split();
    let mut events_rx = state.events.subscribe();
    let email = session.email.clone().unwrap_or_default();
    info!(%email, role = ?session.role, "event stream opened");

    let send_task = tokio::spawn(async move {
        loop {
            let event = match events_rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if !visible_to(&session, &event) {
                continue;
            }
            let text = match serde_json::to_string(&event) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(_msg)) = receiver.next().await {}

    send_task.abort();
    debug!(%email, "event stream closed");
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
