//! Shared helpers for HTTP-level tests. Requests go straight through the
//! router with `tower::ServiceExt::oneshot`, no TCP listener involved.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;

use trivia_api::db::queries::{categories::create_category, questions::create_question};
use trivia_api::db::{self, NewQuestion};

pub const CATEGORIES: [&str; 6] = [
    "Science",
    "Art",
    "Geography",
    "History",
    "Entertainment",
    "Sports",
];

/// (question, answer, category, difficulty); only id 7 mentions "country".
pub const QUESTIONS: [(&str, &str, i64, i64); 12] = [
    ("What is the heaviest organ in the human body?", "The Liver", 1, 4),
    ("Who discovered penicillin?", "Alexander Fleming", 1, 3),
    ("Hematology is a branch of medicine involving the study of what?", "Blood", 1, 4),
    ("Which Dutch graphic artist created prints of impossible constructions?", "Escher", 2, 1),
    ("How many paintings did Van Gogh sell in his lifetime?", "One", 2, 4),
    ("What is the largest lake in Africa?", "Lake Victoria", 3, 2),
    ("Which country hosts the Taj Mahal?", "India", 3, 2),
    ("In which city does Hagia Sophia stand?", "Istanbul", 3, 3),
    ("Whose autobiography is entitled 'I Know Why the Caged Bird Sings'?", "Maya Angelou", 4, 2),
    ("Which dung beetle was worshipped by the ancient Egyptians?", "Scarab", 4, 4),
    ("What movie earned Tom Hanks his third straight Oscar nomination, in 1996?", "Apollo 13", 5, 4),
    ("What actor did author Anne Rice first denounce, then praise in the role of her beloved Lestat?", "Tom Cruise", 5, 4),
];

/// An empty, migrated in-memory database.
pub async fn empty_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

/// A database holding [`CATEGORIES`] (ids 1..=6) and [`QUESTIONS`] (ids 1..=12).
pub async fn seeded_pool() -> SqlitePool {
    let pool = empty_pool().await;
    for kind in CATEGORIES {
        create_category(&pool, kind).await.unwrap();
    }
    for (question, answer, category, difficulty) in QUESTIONS {
        let new_question = NewQuestion {
            question: Some(question.to_owned()),
            answer: Some(answer.to_owned()),
            category: Some(category),
            difficulty: Some(difficulty),
        };
        create_question(&pool, &new_question).await.unwrap();
    }
    pool
}

pub fn build_test_app(pool: SqlitePool) -> Router {
    trivia_api::server::app::build_app(pool)
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Request::delete(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response {
    send(app, Request::post(uri).body(Body::empty()).unwrap()).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
