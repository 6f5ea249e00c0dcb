//! Postgres connection pool and embedded migrations

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Create a new database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await
}

/// Split a migration script on `;`, keeping `$$`-quoted function bodies
/// whole and dropping chunks that hold only comments.
fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_dollar_quote = false;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        match c {
            '$' if chars.peek() == Some(&'$') => {
                current.extend(chars.next());
                in_dollar_quote = !in_dollar_quote;
            }
            ';' if !in_dollar_quote => {
                push_statement(&mut statements, std::mem::take(&mut current));
            }
            _ => {}
        }
    }
    push_statement(&mut statements, current);

    statements
}

fn push_statement(statements: &mut Vec<String>, chunk: String) {
    let has_sql = chunk.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with("--")
    });
    if has_sql {
        statements.push(chunk);
    }
}

/// Apply the embedded schema. Every statement is idempotent, so this runs
/// on each start.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    let statements = split_sql_statements(include_str!("migrations/001_initial.sql"));

    for statement in &statements {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database migrations completed ({} statements)", statements.len());
    Ok(())
}
