//! Shared harness for the HTTP tests: an in-memory app over a temp blob dir.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use tutorhub_api::{Backend, build_app};
use tutorhub_core::config::AppConfig;
use tutorhub_core::types::{CourseId, GroupId, StudentId, TeacherId, UserId};
use tutorhub_database::memory::{MemoryDirectory, MemoryStore};
use tutorhub_storage::LocalBlobStore;

pub const BLOB_BASE_URL: &str = "http://files.test/blobs";

/// Teacher 1 (user 900) teaches Algebra; teacher 2 (user 901) teaches nothing.
pub const TEACHER: Caller = Caller::Teacher(900, 1);
pub const OTHER_TEACHER: Caller = Caller::Teacher(901, 2);

/// Students 1..=3 belong to users 101..=103.
pub const ADA: Caller = Caller::Student(101);
pub const ALAN: Caller = Caller::Student(102);
pub const GRACE: Caller = Caller::Student(103);

/// Who a request claims to come from.
#[derive(Debug, Clone, Copy)]
pub enum Caller {
    Anonymous,
    Admin(i64),
    Teacher(i64, i64),
    Student(i64),
}

impl Caller {
    fn apply(self, mut builder: axum::http::request::Builder) -> axum::http::request::Builder {
        match self {
            Caller::Anonymous => {}
            Caller::Admin(user) => {
                builder = builder
                    .header("X-User-Id", user.to_string())
                    .header("X-User-Role", "admin");
            }
            Caller::Teacher(user, teacher) => {
                builder = builder
                    .header("X-User-Id", user.to_string())
                    .header("X-User-Role", "teacher")
                    .header("X-Teacher-Id", teacher.to_string());
            }
            Caller::Student(user) => {
                builder = builder
                    .header("X-User-Id", user.to_string())
                    .header("X-User-Role", "student");
            }
        }
        builder
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// `Name` of every material in an array body.
    pub fn names(&self) -> Vec<String> {
        self.body
            .as_array()
            .expect("array body")
            .iter()
            .map(|m| m["Name"].as_str().expect("Name").to_string())
            .collect()
    }

    pub fn id(&self) -> i64 {
        self.body["Id"].as_i64().expect("Id")
    }

    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub blob_dir: TempDir,
}

fn directory() -> MemoryDirectory {
    MemoryDirectory::new()
        .with_course(CourseId::new(10), TeacherId::new(1), "Algebra")
        .with_teacher(TeacherId::new(2))
        .with_group(GroupId::new(100), CourseId::new(10), "Morning")
        .with_student(StudentId::new(1), UserId::new(101), "Ada", "Lovelace")
        .with_student(StudentId::new(2), UserId::new(102), "Alan", "Turing")
        .with_student(StudentId::new(3), UserId::new(103), "Grace", "Hopper")
        .with_member(GroupId::new(100), StudentId::new(1))
        .with_member(GroupId::new(100), StudentId::new(2))
        .with_member(GroupId::new(100), StudentId::new(3))
}

impl TestApp {
    pub async fn new() -> Self {
        let blob_dir = TempDir::new().expect("temp dir");
        let blobs = LocalBlobStore::new(blob_dir.path().to_str().expect("utf-8 path"), BLOB_BASE_URL)
            .await
            .expect("blob store");
        let store = MemoryStore::new();
        let backend = Backend::memory(store.clone(), directory(), Arc::new(blobs));

        Self {
            router: build_app(AppConfig::default(), backend),
            store,
            blob_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        TestResponse { status, body }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        caller: Caller,
        body: Option<Value>,
    ) -> TestResponse {
        let builder = caller.apply(Request::builder().method(method).uri(uri));
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, caller: Caller) -> TestResponse {
        self.request(Method::GET, uri, caller, None).await
    }

    pub async fn put(&self, uri: &str, caller: Caller, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, caller, Some(body)).await
    }

    /// `POST /materials` as multipart with text fields and an optional file.
    pub async fn multipart(
        &self,
        caller: Caller,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> TestResponse {
        const BOUNDARY: &str = "tutorhub-test-boundary";
        let mut body: Vec<u8> = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"File\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = caller
            .apply(Request::builder().method(Method::POST).uri("/materials"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request");
        self.send(request).await
    }

    /// Creates a folder owned by teacher 1 and returns its id.
    pub async fn folder(&self, name: &str, parent: Option<i64>) -> i64 {
        let response = self
            .request(
                Method::POST,
                "/materials",
                TEACHER,
                Some(serde_json::json!({ "Name": name, "Kind": "folder", "ParentId": parent })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.id()
    }

    /// Creates a file with an external locator and returns its id.
    pub async fn file(&self, name: &str, parent: i64) -> i64 {
        let response = self
            .request(
                Method::POST,
                "/materials",
                TEACHER,
                Some(serde_json::json!({
                    "Name": name,
                    "Kind": "file",
                    "ParentId": parent,
                    "StorageLocator": format!("http://elsewhere.test/{name}"),
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.id()
    }

    /// Replaces the explicit student set of a material.
    pub async fn set_access(&self, material: i64, students: Value) -> TestResponse {
        self.put(&format!("/materials/{material}/access"), TEACHER, students)
            .await
    }

    /// Names visible to a student's user account under a parent (or roots).
    pub async fn visible(&self, user_id: i64, parent: Option<i64>) -> Vec<String> {
        let uri = match parent {
            Some(p) => format!("/materials/user/{user_id}?ParentId={p}"),
            None => format!("/materials/user/{user_id}"),
        };
        let response = self.get(&uri, Caller::Anonymous).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.names()
    }

    pub fn blob_path(&self, locator: &str) -> PathBuf {
        let key = locator
            .strip_prefix(BLOB_BASE_URL)
            .expect("local locator")
            .trim_start_matches('/');
        self.blob_dir.path().join(key)
    }
}
