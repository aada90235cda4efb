//! Follow-Set Algebra
//!
//! A snapshot of one user's follow edges and the derived sets computed from
//! it. The derived sets are pure functions of the snapshot and are
//! recomputed per query; there is no cache to invalidate.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::UserId;

/// One user's follow edges, as seen at a single point in time.
///
/// The graph store maintains the invariant that an edge `A -> B` exists iff
/// `B` is in `A.following` iff `A` is in `B.followers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FollowSets {
    /// Users this user follows
    pub following: HashSet<UserId>,
    /// Users following this user
    pub followers: HashSet<UserId>,
}

impl FollowSets {
    /// Mutual follows: `following ∩ followers`. Gates feed visibility:
    /// a post from `p` appears in `u`'s feed iff `p == u` or `p` is mutual.
    pub fn mutual(&self) -> HashSet<UserId> {
        self.following
            .intersection(&self.followers)
            .copied()
            .collect()
    }

    /// The whole network: `following ∪ followers`.
    pub fn unique(&self) -> HashSet<UserId> {
        self.following.union(&self.followers).copied().collect()
    }

    /// Users followed who do not follow back: `following − followers`.
    pub fn one_way_out(&self) -> HashSet<UserId> {
        self.following
            .difference(&self.followers)
            .copied()
            .collect()
    }

    /// Users following who are not followed back: `followers − following`.
    pub fn one_way_in(&self) -> HashSet<UserId> {
        self.followers
            .difference(&self.following)
            .copied()
            .collect()
    }
}
