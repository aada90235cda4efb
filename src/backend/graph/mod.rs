//! Social Graph Store
//!
//! Holds directed follow edges, stored as two set-valued fields on a
//! per-user profile. Invariant: an edge `A -> B` exists iff `B` is in
//! `A.following` iff `A` is in `B.followers`. Every follow/unfollow
//! mutates both records under one write guard, so the two sides can never
//! diverge.
//!
//! `follow` additionally ensures exactly one Duo group exists for the pair,
//! delegating to the ledger's atomic ensure.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::backend::error::BackendError;
use crate::backend::ledger::ConversationLedger;
use crate::shared::{FollowSets, UserId};

/// Follow edges for one user. Owned exclusively by the graph store.
#[derive(Debug, Default, Clone)]
struct Profile {
    following: HashSet<UserId>,
    followers: HashSet<UserId>,
}

/// Directed follow graph over user profiles.
#[derive(Debug)]
pub struct SocialGraph {
    profiles: RwLock<HashMap<UserId, Profile>>,
    ledger: Arc<ConversationLedger>,
}

impl SocialGraph {
    pub fn new(ledger: Arc<ConversationLedger>) -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            ledger,
        }
    }

    /// Create an empty profile for a user. Idempotent; returns `true` when
    /// the profile was newly created. The account subsystem calls this at
    /// signup.
    pub async fn create_profile(&self, user_id: UserId) -> bool {
        let mut profiles = self.profiles.write().await;
        let created = !profiles.contains_key(&user_id);
        profiles.entry(user_id).or_default();
        if created {
            tracing::info!("[Graph] created profile for {}", user_id);
        }
        created
    }

    /// Add the edge `follower -> followee`, updating both profile sides.
    ///
    /// Idempotent: re-following is a no-op, not an error. Fails with
    /// `NotFound` when either profile is absent. Side effect: ensures
    /// exactly one Duo group exists for the pair.
    pub async fn follow(&self, follower: UserId, followee: UserId) -> Result<(), BackendError> {
        if follower == followee {
            return Err(BackendError::validation(
                "followingId",
                "a user cannot follow themselves",
            ));
        }

        {
            let mut profiles = self.profiles.write().await;
            if !profiles.contains_key(&follower) {
                return Err(BackendError::not_found("profile", follower));
            }
            if !profiles.contains_key(&followee) {
                return Err(BackendError::not_found("profile", followee));
            }

            // Both sides under the same guard; the edge is atomic.
            let mut added = false;
            if let Some(profile) = profiles.get_mut(&follower) {
                added = profile.following.insert(followee);
            }
            if let Some(profile) = profiles.get_mut(&followee) {
                profile.followers.insert(follower);
            }

            if added {
                tracing::info!("[Graph] {} now follows {}", follower, followee);
            } else {
                tracing::debug!("[Graph] {} already follows {}; no-op", follower, followee);
            }
        }

        // Ensure the conversation container outside the profile guard; the
        // ledger serializes the pair itself.
        self.ledger.ensure_duo(follower, followee).await?;
        Ok(())
    }

    /// Remove the edge `follower -> followee` from both sides. Idempotent.
    /// The Duo group, and any conversation history in it, outlives the edge.
    pub async fn unfollow(&self, follower: UserId, followee: UserId) -> Result<(), BackendError> {
        let mut profiles = self.profiles.write().await;
        if !profiles.contains_key(&follower) {
            return Err(BackendError::not_found("profile", follower));
        }
        if !profiles.contains_key(&followee) {
            return Err(BackendError::not_found("profile", followee));
        }

        let mut removed = false;
        if let Some(profile) = profiles.get_mut(&follower) {
            removed = profile.following.remove(&followee);
        }
        if let Some(profile) = profiles.get_mut(&followee) {
            profile.followers.remove(&follower);
        }

        if removed {
            tracing::info!("[Graph] {} unfollowed {}", follower, followee);
        }
        Ok(())
    }

    /// Users `user_id` follows.
    pub async fn following(&self, user_id: UserId) -> Result<HashSet<UserId>, BackendError> {
        let profiles = self.profiles.read().await;
        profiles
            .get(&user_id)
            .map(|p| p.following.clone())
            .ok_or_else(|| BackendError::not_found("profile", user_id))
    }

    /// Users following `user_id`.
    pub async fn followers(&self, user_id: UserId) -> Result<HashSet<UserId>, BackendError> {
        let profiles = self.profiles.read().await;
        profiles
            .get(&user_id)
            .map(|p| p.followers.clone())
            .ok_or_else(|| BackendError::not_found("profile", user_id))
    }

    /// Both edge sets as one consistent snapshot, for the visibility
    /// compiler.
    pub async fn follow_sets(&self, user_id: UserId) -> Result<FollowSets, BackendError> {
        let profiles = self.profiles.read().await;
        profiles
            .get(&user_id)
            .map(|p| FollowSets {
                following: p.following.clone(),
                followers: p.followers.clone(),
            })
            .ok_or_else(|| BackendError::not_found("profile", user_id))
    }
}
