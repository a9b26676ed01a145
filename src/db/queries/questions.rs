use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

const QUESTION_COLUMNS: &str = "SELECT id, question, answer, category, difficulty FROM questions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<i64>,
    pub difficulty: Option<i64>,
}

/// Payload of a question to be created. Nothing is required; the frontend
/// submits `category` and `difficulty` as strings taken from form selects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewQuestion {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub difficulty: Option<i64>,
}

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(&format!("{QUESTION_COLUMNS} ORDER BY id"))
        .fetch_all(pool)
        .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category_id: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(&format!(
        "{QUESTION_COLUMNS} WHERE questions.category = ?1 ORDER BY id"
    ))
    .bind(category_id)
    .fetch_all(pool)
    .await
}

/// Case-sensitive substring match against the question text.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(&format!(
        "{QUESTION_COLUMNS} WHERE instr(questions.question, ?1) > 0 ORDER BY id"
    ))
    .bind(term)
    .fetch_all(pool)
    .await
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Question>> {
    sqlx::query_as::<_, Question>(&format!("{QUESTION_COLUMNS} WHERE questions.id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_question(pool: &SqlitePool, question: &NewQuestion) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Fails with [`sqlx::Error::RowNotFound`] when there is no such question.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    let deleted = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if deleted == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

// Exclusions travel as a single JSON array bind so the list length is not
// bounded by SQLite's host parameter limit.
fn push_eligible_filter(
    builder: &mut QueryBuilder<'_, Sqlite>,
    category: Option<i64>,
    excluded: Option<&str>,
) {
    builder.push(" WHERE 1 = 1");
    if let Some(category) = category {
        builder.push(" AND questions.category = ").push_bind(category);
    }
    if let Some(excluded) = excluded {
        builder
            .push(" AND questions.id NOT IN (SELECT value FROM json_each(")
            .push_bind(excluded.to_owned())
            .push("))");
    }
}

fn pick_offset<R: Rng>(rng: &mut R, count: i64) -> Option<i64> {
    (count > 0).then(|| rng.gen_range(0..count))
}

/// Picks a uniformly random question among those in `category` (any category
/// when `None`) whose id is not in `excluded`.
pub async fn random_question(
    pool: &SqlitePool,
    category: Option<i64>,
    excluded: &[i64],
) -> sqlx::Result<Option<Question>> {
    let excluded = if excluded.is_empty() {
        None
    } else {
        Some(serde_json::to_string(excluded).map_err(|e| sqlx::Error::Encode(Box::new(e)))?)
    };

    let mut tx = pool.begin().await?;

    let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM questions");
    push_eligible_filter(&mut count_query, category, excluded.as_deref());
    let count: i64 = count_query
        .build_query_scalar()
        .fetch_one(&mut *tx)
        .await?;

    let offset = pick_offset(&mut rand::thread_rng(), count);
    let Some(offset) = offset else {
        tx.commit().await?;
        return Ok(None);
    };

    let mut pick_query = QueryBuilder::<Sqlite>::new(QUESTION_COLUMNS);
    push_eligible_filter(&mut pick_query, category, excluded.as_deref());
    pick_query
        .push(" ORDER BY questions.id LIMIT 1 OFFSET ")
        .push_bind(offset);
    let question = pick_query
        .build_query_as::<Question>()
        .fetch_optional(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(question)
}

/// Same contract as [`super::categories::import_categories`], for questions.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    let existing_ids: HashSet<i64> = get_all_questions(pool)
        .await?
        .iter()
        .map(|q| q.id)
        .collect();
    let new_ids: HashSet<i64> = questions.iter().map(|q| q.id).collect();

    let mut tx = pool.begin().await?;
    for id in existing_ids.difference(&new_ids) {
        sqlx::query("DELETE FROM questions WHERE questions.id = ?1")
            .bind(*id)
            .execute(&mut *tx)
            .await?;
    }
    for question in questions {
        let statement = if existing_ids.contains(&question.id) {
            "UPDATE questions SET question = ?2, answer = ?3, category = ?4, difficulty = ?5 WHERE questions.id = ?1"
        } else {
            "INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)"
        };
        sqlx::query(statement)
            .bind(question.id)
            .bind(&question.question)
            .bind(&question.answer)
            .bind(question.category)
            .bind(question.difficulty)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    tracing::info!(count = new_ids.len(), "Imported questions");
    Ok(())
}
