//! In-process stand-in for the todo backend.
#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use todoman::ApiClient;
use todoman_api::v1::{
    routes, AuthResponse, ErrorBody, FederatedLoginRequest, LoginRequest, NewTask,
    RegisterRequest, Task, TaskPatch, TaskPriority, TaskStatus, User,
};
use tokio::{net::TcpListener, sync::Mutex};

pub const TOKEN: &str = "token-1";
pub const EMAIL: &str = "test@example.com";
pub const PASSWORD: &str = "TestPass123";
pub const CREDENTIAL: &str = "google-credential";

#[derive(Default)]
pub struct Backend {
    pub todos: Mutex<Vec<Task>>,
    pub next_id: AtomicUsize,
    /// Number of PATCH requests received.
    pub patches: AtomicUsize,
    /// Makes every task mutation fail with a 500.
    pub fail: AtomicBool,
}

impl Backend {
    pub async fn seed(&self, task: Task) {
        self.todos.lock().await.push(task);
    }

    pub async fn find(&self, id: &str) -> Option<Task> {
        let todos = self.todos.lock().await;
        todos.iter().find(|task| task.id == id).cloned()
    }

    pub fn patches(&self) -> usize {
        self.patches.load(Ordering::SeqCst)
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

pub struct Server {
    pub url: String,
    pub backend: Arc<Backend>,
}

impl Server {
    pub async fn spawn() -> Self {
        let backend = Arc::new(Backend::default());
        let app = Router::new()
            .nest("/api", router())
            .with_state(backend.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}/api", addr),
            backend,
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.url)
    }

    pub fn signed_in_client(&self) -> ApiClient {
        let mut client = self.client();
        client.authorize(TOKEN).unwrap();
        client
    }
}

pub fn task(
    id: &str,
    status: TaskStatus,
    priority: TaskPriority,
    deadline: Option<DateTime<Utc>>,
) -> Task {
    let now = Utc::now();
    Task {
        id: id.to_owned(),
        title: format!("Task {}", id),
        description: String::new(),
        status,
        priority,
        deadline,
        time_left_seconds: None,
        time_left_human: None,
        is_overdue: false,
        user_id: Some(String::from("u1")),
        created_at: now,
        updated_at: now,
    }
}

fn router() -> Router<Arc<Backend>> {
    Router::new()
        .route(routes::LOGIN, post(login))
        .route(routes::REGISTER, post(register))
        .route(routes::GOOGLE, post(google))
        .route(routes::TODOS, get(list_todos).post(create_todo))
        .route("/todos/:id", patch(update_todo).delete(delete_todo))
}

type Failure = (StatusCode, Json<ErrorBody>);

fn failure(status: StatusCode, detail: &str) -> Failure {
    let detail = detail.to_owned();
    (status, Json(ErrorBody { detail }))
}

// The backend only puts an offset on deadlines; other instants go out naive.
fn naive(instant: DateTime<Utc>) -> Value {
    let text = instant.naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f");
    Value::String(text.to_string())
}

fn wire_task(task: &Task) -> Value {
    let mut value = serde_json::to_value(task).unwrap();
    value["created_at"] = naive(task.created_at);
    value["updated_at"] = naive(task.updated_at);
    value
}

fn wire_auth(response: &AuthResponse) -> Value {
    let mut value = serde_json::to_value(response).unwrap();
    if let Some(created_at) = response.user.created_at {
        value["user"]["created_at"] = naive(created_at);
    }
    value
}

fn auth_response(name: &str) -> AuthResponse {
    AuthResponse {
        access_token: TOKEN.to_owned(),
        token_type: String::from("bearer"),
        user: User {
            id: String::from("u1"),
            email: EMAIL.to_owned(),
            name: name.to_owned(),
            created_at: Some(Utc::now()),
        },
    }
}

async fn login(Json(request): Json<LoginRequest>) -> Result<Json<Value>, Failure> {
    if request.email == EMAIL && request.password == PASSWORD {
        Ok(Json(wire_auth(&auth_response("Test User"))))
    } else {
        Err(failure(StatusCode::UNAUTHORIZED, "Invalid credentials"))
    }
}

async fn register(Json(request): Json<RegisterRequest>) -> Response {
    if request.email == EMAIL {
        return failure(StatusCode::BAD_REQUEST, "User with this email already exists")
            .into_response();
    }
    if request.name == "boom" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response();
    }

    (StatusCode::CREATED, Json(auth_response(&request.name))).into_response()
}

async fn google(
    Json(request): Json<FederatedLoginRequest>,
) -> Result<Json<AuthResponse>, Failure> {
    if request.credential == CREDENTIAL {
        Ok(Json(auth_response("Google User")))
    } else {
        Err(failure(StatusCode::UNAUTHORIZED, "Invalid Google token"))
    }
}

fn authorize(headers: &HeaderMap) -> Result<(), Failure> {
    let expected = format!("Bearer {}", TOKEN);
    match headers.get(header::AUTHORIZATION) {
        Some(value) if value.as_bytes() == expected.as_bytes() => Ok(()),
        _ => Err(failure(StatusCode::UNAUTHORIZED, "Not authenticated")),
    }
}

fn check_failing(backend: &Backend) -> Result<(), Failure> {
    match backend.fail.load(Ordering::SeqCst) {
        true => Err(failure(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable")),
        false => Ok(()),
    }
}

async fn list_todos(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Value>>, Failure> {
    authorize(&headers)?;
    let todos = backend.todos.lock().await;
    Ok(Json(todos.iter().map(wire_task).collect()))
}

async fn create_todo(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(new): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), Failure> {
    authorize(&headers)?;
    check_failing(&backend)?;

    let id = backend.next_id.fetch_add(1, Ordering::SeqCst);
    let mut task = task(
        &format!("new-{}", id),
        TaskStatus::NotStarted,
        new.priority,
        new.deadline,
    );
    task.title = new.title;
    task.description = new.description;

    backend.todos.lock().await.push(task.clone());
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_todo(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    backend.patches.fetch_add(1, Ordering::SeqCst);
    check_failing(&backend)?;

    let mut todos = backend.todos.lock().await;
    let Some(task) = todos.iter_mut().find(|task| task.id == id) else {
        return Err(failure(StatusCode::NOT_FOUND, "Todo not found"));
    };

    if let Some(title) = patch.title {
        task.title = title;
    }
    if let Some(description) = patch.description {
        task.description = description;
    }
    if let Some(status) = patch.status {
        task.status = status;
    }
    if let Some(deadline) = patch.deadline {
        task.deadline = deadline;
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    task.updated_at = Utc::now();

    Ok(Json(wire_task(task)))
}

async fn delete_todo(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, Failure> {
    authorize(&headers)?;
    check_failing(&backend)?;

    let mut todos = backend.todos.lock().await;
    let before = todos.len();
    todos.retain(|task| task.id != id);

    match todos.len() < before {
        true => Ok(StatusCode::OK),
        false => Err(failure(StatusCode::NOT_FOUND, "Todo not found")),
    }
}
