//! Feed/Visibility Compiler
//!
//! Combines social-graph snapshots into the derived sets used both by
//! "who of my network is online" queries and by feed-visibility gating.
//! The set algebra itself lives on [`FollowSets`](crate::shared::FollowSets)
//! as pure functions; this service binds it to live graph and presence
//! state. Everything is recomputed per query.

use std::collections::HashSet;
use std::sync::Arc;

use crate::backend::error::BackendError;
use crate::backend::graph::SocialGraph;
use crate::backend::presence::PresenceRegistry;
use crate::shared::chat::OnlinePeers;
use crate::shared::UserId;

fn sorted(ids: HashSet<UserId>) -> Vec<UserId> {
    let mut ids: Vec<UserId> = ids.into_iter().collect();
    ids.sort();
    ids
}

/// Derives visibility and reachability sets from graph + presence state.
#[derive(Debug, Clone)]
pub struct VisibilityCompiler {
    graph: Arc<SocialGraph>,
    presence: Arc<PresenceRegistry>,
}

impl VisibilityCompiler {
    pub fn new(graph: Arc<SocialGraph>, presence: Arc<PresenceRegistry>) -> Self {
        Self { graph, presence }
    }

    /// The online subset of the user's network, together with all four
    /// derived follow sets. Id lists are sorted for determinism.
    pub async fn online_network(&self, user_id: UserId) -> Result<OnlinePeers, BackendError> {
        let sets = self.graph.follow_sets(user_id).await?;
        let unique = sets.unique();

        let online_user_ids = self
            .presence
            .snapshot(&unique)
            .await
            .into_iter()
            .filter(|record| record.online)
            .map(|record| record.user_id)
            .collect();

        Ok(OnlinePeers {
            online_user_ids: sorted(online_user_ids),
            one_way_in: sorted(sets.one_way_in()),
            one_way_out: sorted(sets.one_way_out()),
            unique_ids: sorted(unique),
            mutual_ids: sorted(sets.mutual()),
        })
    }

    /// Users whose posts may appear in `user_id`'s feed: the mutual set
    /// plus the user themselves.
    pub async fn feed_authors(&self, user_id: UserId) -> Result<HashSet<UserId>, BackendError> {
        let sets = self.graph.follow_sets(user_id).await?;
        let mut authors = sets.mutual();
        authors.insert(user_id);
        Ok(authors)
    }

    /// Whether a post by `author` is visible in `viewer`'s feed.
    pub async fn may_view_post(
        &self,
        viewer: UserId,
        author: UserId,
    ) -> Result<bool, BackendError> {
        if viewer == author {
            return Ok(true);
        }
        Ok(self.graph.follow_sets(viewer).await?.mutual().contains(&author))
    }
}
