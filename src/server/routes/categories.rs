use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{get_category, get_category_map},
            questions::get_questions_for_category,
        },
        Question,
    },
    server::{
        app::AppState,
        error::{ApiError, ApiResponse},
        extractors::{IdPath, QueryParams},
        pagination::{paginate, PageQuery},
    },
};

#[derive(Serialize)]
struct CategoriesList {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestions {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: i64,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesList>> {
    let categories = get_category_map(&pool).await?;
    // an empty store reads as a missing resource
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(CategoriesList {
        success: true,
        categories,
    }))
}

async fn questions_by_category(
    State(pool): State<SqlitePool>,
    IdPath(id): IdPath<i64>,
    QueryParams(query): QueryParams<PageQuery>,
) -> ApiResponse<Json<CategoryQuestions>> {
    if get_category(&pool, id).await?.is_none() {
        tracing::debug!(category = id, "Unknown category");
        return Err(ApiError::NotFound);
    }

    let selection = get_questions_for_category(&pool, id).await?;
    let total_questions = selection.len();

    Ok(Json(CategoryQuestions {
        success: true,
        questions: paginate(selection, query.page),
        total_questions,
        current_category: id,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(questions_by_category))
        .with_state(state)
}
