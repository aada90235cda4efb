//! Database operations for the conversation ledger
//!
//! Raw queries for persisting groups and messages. The ledger is the only
//! durable component; the schema is created at startup so a fresh database
//! works without a separate migration step.

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::shared::chat::{Group, GroupKind, Message};

/// Create the ledger tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS groups (
            id UUID PRIMARY KEY,
            kind TEXT NOT NULL,
            members UUID[] NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id UUID PRIMARY KEY,
            group_id UUID NOT NULL REFERENCES groups(id),
            sender_id UUID NOT NULL,
            body TEXT NOT NULL,
            seen BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS messages_group_created
        ON messages (group_id, created_at)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Persist a new group.
pub async fn insert_group(pool: &PgPool, group: &Group) -> Result<(), sqlx::Error> {
    let members: Vec<Uuid> = group.members.iter().copied().collect();

    sqlx::query(
        r#"
        INSERT INTO groups (id, kind, members, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(group.id)
    .bind(group.kind.as_str())
    .bind(&members)
    .bind(group.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Persist a new message.
pub async fn insert_message(pool: &PgPool, message: &Message) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO messages (id, group_id, sender_id, body, seen, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(message.id)
    .bind(message.group_id)
    .bind(message.sender_id)
    .bind(&message.body)
    .bind(message.seen)
    .bind(message.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Flip a message's seen flag. The only mutation messages ever see.
pub async fn mark_message_seen(pool: &PgPool, message_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE messages SET seen = TRUE WHERE id = $1
        "#,
    )
    .bind(message_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all groups, for restoring ledger state at startup.
pub async fn load_groups(pool: &PgPool) -> Result<Vec<Group>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, kind, members, created_at FROM groups ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let members: Vec<Uuid> = row.get("members");
            Group {
                id: row.get("id"),
                kind: GroupKind::from_str(row.get::<String, _>("kind").as_str())
                    .unwrap_or(GroupKind::Duo),
                members: members.into_iter().collect(),
                created_at: row.get("created_at"),
            }
        })
        .collect())
}

/// Load all messages in ledger order, for restoring state at startup.
pub async fn load_messages(pool: &PgPool) -> Result<Vec<Message>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, group_id, sender_id, body, seen, created_at
        FROM messages
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Message {
            id: row.get("id"),
            group_id: row.get("group_id"),
            sender_id: row.get("sender_id"),
            body: row.get("body"),
            seen: row.get("seen"),
            created_at: row.get("created_at"),
        })
        .collect())
}
