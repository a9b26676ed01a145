use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions::random_question, Question},
    server::{
        app::AppState, deserializers::deserialize_quiz_category, error::ApiResponse,
        extractors::JsonBody,
    },
    telemetry::QUIZ_QUESTIONS_SERVED,
};

#[derive(Deserialize)]
struct QuizRequest {
    #[serde(default, deserialize_with = "deserialize_quiz_category")]
    quiz_category: Option<i64>,
    previous_questions: Vec<i64>,
}

#[derive(Serialize)]
struct QuizQuestion {
    success: bool,
    question: Option<Question>,
}

async fn next_question(
    State(pool): State<SqlitePool>,
    JsonBody(request): JsonBody<QuizRequest>,
) -> ApiResponse<Json<QuizQuestion>> {
    let question = random_question(
        &pool,
        request.quiz_category,
        &request.previous_questions,
    )
    .await?;

    let category = request
        .quiz_category
        .map_or_else(|| "all".to_owned(), |c| c.to_string());
    match &question {
        Some(q) => {
            QUIZ_QUESTIONS_SERVED
                .with_label_values(&[category.as_str()])
                .inc();
            tracing::debug!(id = q.id, category = %category, "Serving quiz question");
        }
        None => tracing::debug!(
            category = %category,
            seen = request.previous_questions.len(),
            "No quiz questions left"
        ),
    }

    Ok(Json(QuizQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .with_state(state)
}
