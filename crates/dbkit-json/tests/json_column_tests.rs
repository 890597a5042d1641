//! End-to-end checks for the JSON column type, run through a transaction
//! provider against in-memory `SQLite`.

use dbkit_json::JsonDocument;
use dbkit_tx::TransactionProvider;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Attachment {
    kind: String,
    size: u64,
}

async fn provider_with_schema() -> anyhow::Result<TransactionProvider> {
    let provider = TransactionProvider::in_memory().await?;
    sqlx::query(
        "CREATE TABLE records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            long_value INTEGER,
            payload TEXT
        )",
    )
    .execute(provider.pool())
    .await?;
    Ok(provider)
}

async fn insert_record(
    provider: &TransactionProvider,
    name: &'static str,
    payload: Option<JsonDocument>,
) -> anyhow::Result<i64> {
    let id = provider
        .reduce(move |conn| {
            Box::pin(async move {
                let row: (i64,) = sqlx::query_as(
                    "INSERT INTO records (name, long_value, payload) VALUES (?, ?, ?) RETURNING id",
                )
                .bind(name)
                .bind(500_i64)
                .bind(payload)
                .fetch_one(&mut *conn)
                .await?;
                Ok(row.0)
            })
        })
        .await?;
    Ok(id)
}

async fn fetch_payload(
    provider: &TransactionProvider,
    id: i64,
) -> anyhow::Result<Option<JsonDocument>> {
    let payload = provider
        .reduce(move |conn| {
            Box::pin(async move {
                let row: (Option<JsonDocument>,) =
                    sqlx::query_as("SELECT payload FROM records WHERE id = ?")
                        .bind(id)
                        .fetch_one(&mut *conn)
                        .await?;
                Ok(row.0)
            })
        })
        .await?;
    Ok(payload)
}

#[tokio::test]
async fn persists_plain_columns_alongside_json() -> anyhow::Result<()> {
    let provider = provider_with_schema().await?;
    let id = insert_record(&provider, "plain", None).await?;

    let (name, long_value): (String, i64) = provider
        .reduce(move |conn| {
            Box::pin(async move {
                let row = sqlx::query_as("SELECT name, long_value FROM records WHERE id = ?")
                    .bind(id)
                    .fetch_one(&mut *conn)
                    .await?;
                Ok(row)
            })
        })
        .await?;

    assert_eq!(name, "plain");
    assert_eq!(long_value, 500);
    assert_eq!(fetch_payload(&provider, id).await?, None);
    Ok(())
}

#[tokio::test]
async fn persists_and_updates_json_tree() -> anyhow::Result<()> {
    let provider = provider_with_schema().await?;

    let mut doc = JsonDocument::object();
    doc["parser"] = json!("serde");
    let id = insert_record(&provider, "tree", Some(doc)).await?;

    let fetched = fetch_payload(&provider, id).await?.expect("stored payload");
    assert_eq!(fetched["parser"], json!("serde"));

    // Mutate the tree between transactions and write it back.
    let mut updated = fetched;
    updated["owner"] = json!("dbkit");
    provider
        .with(move |conn| {
            Box::pin(async move {
                sqlx::query("UPDATE records SET payload = ? WHERE id = ?")
                    .bind(updated)
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .await?;

    let reloaded = fetch_payload(&provider, id).await?.expect("stored payload");
    assert_eq!(reloaded["parser"], json!("serde"));
    assert_eq!(reloaded["owner"], json!("dbkit"));
    Ok(())
}

#[tokio::test]
async fn persists_typed_struct_through_json_column() -> anyhow::Result<()> {
    let provider = provider_with_schema().await?;

    let attachment = Attachment {
        kind: "image/png".into(),
        size: 2048,
    };
    let doc = JsonDocument::from_serialize(&attachment)?;
    let id = insert_record(&provider, "typed", Some(doc)).await?;

    let fetched = fetch_payload(&provider, id).await?.expect("stored payload");
    let back: Attachment = fetched.to_typed()?;
    assert_eq!(back, attachment);
    Ok(())
}

#[tokio::test]
async fn stored_text_is_queryable_with_json1() -> anyhow::Result<()> {
    let provider = provider_with_schema().await?;

    let doc = JsonDocument::new(json!({"tags": ["a", "b"], "depth": 3}));
    let id = insert_record(&provider, "queryable", Some(doc)).await?;

    let depth: i64 = provider
        .reduce(move |conn| {
            Box::pin(async move {
                let row: (i64,) = sqlx::query_as(
                    "SELECT json_extract(payload, '$.depth') FROM records WHERE id = ?",
                )
                .bind(id)
                .fetch_one(&mut *conn)
                .await?;
                Ok(row.0)
            })
        })
        .await?;

    assert_eq!(depth, 3);
    Ok(())
}
