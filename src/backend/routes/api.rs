//! Query-Side API Handlers
//!
//! JSON handlers over the core components for the gateway-facing
//! operations: profiles, follow/unfollow, edge sets, online network, feed
//! visibility, groups, and conversation reads. Identities arrive already
//! authenticated; these handlers pass ids straight through.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::graph::SocialGraph;
use crate::backend::ledger::ConversationLedger;
use crate::backend::presence::PresenceRegistry;
use crate::backend::server::state::AppState;
use crate::backend::visibility::VisibilityCompiler;
use crate::shared::chat::{Group, GroupKind, Message, OnlinePeers};
use crate::shared::UserId;

fn sorted(ids: impl IntoIterator<Item = UserId>) -> Vec<UserId> {
    let mut ids: Vec<UserId> = ids.into_iter().collect();
    ids.sort();
    ids
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Supplied by the account subsystem; generated when absent.
    pub user_id: Option<UserId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub user_id: UserId,
    pub created: bool,
}

/// Create a profile and an offline presence record for a user.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Json<CreateUserResponse> {
    let user_id = request.user_id.unwrap_or_else(Uuid::new_v4);
    let created = state.graph.create_profile(user_id).await;
    state.presence.ensure(user_id).await;
    Json(CreateUserResponse { user_id, created })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: UserId,
    pub following: Vec<UserId>,
    pub followers: Vec<UserId>,
}

async fn profile_response(
    graph: &SocialGraph,
    user_id: UserId,
) -> Result<ProfileResponse, BackendError> {
    let sets = graph.follow_sets(user_id).await?;
    Ok(ProfileResponse {
        user_id,
        following: sorted(sets.following),
        followers: sorted(sets.followers),
    })
}

/// Add a follow edge (and ensure the pair's Duo group).
pub async fn follow(
    State(graph): State<Arc<SocialGraph>>,
    Path((id, target)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProfileResponse>, BackendError> {
    graph.follow(id, target).await?;
    Ok(Json(profile_response(&graph, id).await?))
}

/// Remove a follow edge.
pub async fn unfollow(
    State(graph): State<Arc<SocialGraph>>,
    Path((id, target)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProfileResponse>, BackendError> {
    graph.unfollow(id, target).await?;
    Ok(Json(profile_response(&graph, id).await?))
}

pub async fn get_following(
    State(graph): State<Arc<SocialGraph>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<UserId>>, BackendError> {
    Ok(Json(sorted(graph.following(id).await?)))
}

pub async fn get_followers(
    State(graph): State<Arc<SocialGraph>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<UserId>>, BackendError> {
    Ok(Json(sorted(graph.followers(id).await?)))
}

/// The online subset of the user's network plus the derived follow sets.
pub async fn online_network(
    State(visibility): State<Arc<VisibilityCompiler>>,
    Path(id): Path<Uuid>,
) -> Result<Json<OnlinePeers>, BackendError> {
    Ok(Json(visibility.online_network(id).await?))
}

/// Users whose posts may appear in the user's feed (mutual set plus self).
pub async fn feed_authors(
    State(visibility): State<Arc<VisibilityCompiler>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<UserId>>, BackendError> {
    Ok(Json(sorted(visibility.feed_authors(id).await?)))
}

pub async fn groups_for_user(
    State(ledger): State<Arc<ConversationLedger>>,
    Path(id): Path<Uuid>,
) -> Json<Vec<Group>> {
    Json(ledger.groups_for_user(id).await)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub kind: GroupKind,
    pub members: Vec<UserId>,
}

pub async fn create_group(
    State(ledger): State<Arc<ConversationLedger>>,
    Json(request): Json<CreateGroupRequest>,
) -> Result<Json<Group>, BackendError> {
    Ok(Json(ledger.create_group(request.kind, request.members).await?))
}

/// A group's messages, ascending by creation time.
pub async fn group_messages(
    State(ledger): State<Arc<ConversationLedger>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, BackendError> {
    Ok(Json(ledger.messages_for_group(id).await?))
}

pub async fn mark_seen(
    State(ledger): State<Arc<ConversationLedger>>,
    Path((id, message_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Message>, BackendError> {
    Ok(Json(ledger.mark_seen(id, message_id).await?))
}

// Presence is queried through the network endpoint; this one exists for
// the gateway's per-user state lookups.
pub async fn presence_record(
    State(presence): State<Arc<PresenceRegistry>>,
    Path(id): Path<Uuid>,
) -> Result<Json<crate::shared::PresenceRecord>, BackendError> {
    presence
        .record(id)
        .await
        .map(Json)
        .ok_or_else(|| BackendError::not_found("presence record", id))
}
