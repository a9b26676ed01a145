use std::collections::BTreeMap;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_category_map,
            questions::{self, get_all_questions},
        },
        NewQuestion, Question,
    },
    server::{
        app::AppState,
        error::{ApiError, ApiResponse},
        extractors::{IdPath, JsonBody, QueryParams},
        pagination::{paginate, PageQuery},
    },
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(rename = "searchTerm")]
    search_term: Value,
}

impl SearchRequest {
    /// Scalar terms are matched by their text form, so `13` searches for "13".
    fn term(&self) -> Result<String, ApiError> {
        match &self.search_term {
            Value::String(term) => Ok(term.clone()),
            Value::Number(_) | Value::Bool(_) => Ok(self.search_term.to_string()),
            other => Err(ApiError::BadRequest(format!(
                "searchTerm must be a string, got {other}"
            ))),
        }
    }
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    categories: BTreeMap<i64, String>,
    current_category: Option<i64>,
}

// the search result carries no `success` flag, clients rely on that shape
#[derive(Serialize)]
struct SearchResults {
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
struct Created {
    success: bool,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    deleted: i64,
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    QueryParams(query): QueryParams<PageQuery>,
) -> ApiResponse<Json<QuestionsPage>> {
    let selection = get_all_questions(&pool).await?;
    let total_questions = selection.len();
    let questions = paginate(selection, query.page);
    let categories = get_category_map(&pool).await?;

    if questions.is_empty() {
        tracing::debug!(page = query.page, "Requested page holds no questions");
        return Err(ApiError::NotFound);
    }

    Ok(Json(QuestionsPage {
        success: true,
        questions,
        total_questions,
        categories,
        current_category: None,
    }))
}

async fn search(pool: &SqlitePool, term: &str) -> ApiResponse<Json<SearchResults>> {
    let questions = questions::search_questions(pool, term).await?;
    tracing::debug!(term, matches = questions.len(), "Searched questions");
    Ok(Json(SearchResults {
        total_questions: questions.len(),
        questions,
    }))
}

async fn create(pool: &SqlitePool, new_question: &NewQuestion) -> ApiResponse<Json<Created>> {
    let id = questions::create_question(pool, new_question).await?;
    QUESTIONS_CREATED.inc();
    tracing::info!(id, "Created question");
    Ok(Json(Created { success: true }))
}

/// `POST /questions` either searches (body has a non-null `searchTerm`) or
/// creates a question from the body.
async fn create_or_search(
    State(pool): State<SqlitePool>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResponse<Response> {
    if !body.is_object() {
        return Err(ApiError::BadRequest("expected a JSON object".to_owned()));
    }

    let searching = body.get("searchTerm").is_some_and(|term| !term.is_null());
    if searching {
        let request: SearchRequest =
            serde_json::from_value(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        Ok(search(&pool, &request.term()?).await?.into_response())
    } else {
        let new_question: NewQuestion =
            serde_json::from_value(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        Ok(create(&pool, &new_question).await?.into_response())
    }
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    JsonBody(request): JsonBody<SearchRequest>,
) -> ApiResponse<Json<SearchResults>> {
    search(&pool, &request.term()?).await
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    IdPath(id): IdPath<i64>,
) -> ApiResponse<Json<Deleted>> {
    // a missing question lands here too and is reported as unprocessable
    if let Err(err) = questions::delete_question(&pool, id).await {
        tracing::warn!(id, error = %err, "Failed to delete question");
        return Err(ApiError::Unprocessable);
    }
    QUESTIONS_DELETED.inc();
    tracing::info!(id, "Deleted question");

    Ok(Json(Deleted {
        success: true,
        deleted: id,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(create_or_search))
        .route("/questions/search", post(search_questions))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
