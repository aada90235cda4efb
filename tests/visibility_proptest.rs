//! Property-based tests for the follow-set algebra.

use std::collections::HashSet;

use proptest::prelude::*;
use ripple::shared::{FollowSets, UserId};
use uuid::Uuid;

const UNIVERSE: usize = 8;

fn user(i: usize) -> UserId {
    Uuid::from_u128(i as u128 + 1)
}

fn set_from_mask(mask: u8) -> HashSet<UserId> {
    (0..UNIVERSE).filter(|i| mask & (1 << i) != 0).map(user).collect()
}

/// Directed edges among a small universe, encoded as an adjacency bitmask.
fn sets_for(edges: u64, u: usize) -> FollowSets {
    let has_edge = |from: usize, to: usize| edges & (1u64 << (from * UNIVERSE + to)) != 0;
    FollowSets {
        following: (0..UNIVERSE).filter(|&v| has_edge(u, v)).map(user).collect(),
        followers: (0..UNIVERSE).filter(|&v| has_edge(v, u)).map(user).collect(),
    }
}

proptest! {
    #[test]
    fn unique_is_partitioned_by_the_three_derived_sets(
        following_mask in any::<u8>(),
        followers_mask in any::<u8>(),
    ) {
        let sets = FollowSets {
            following: set_from_mask(following_mask),
            followers: set_from_mask(followers_mask),
        };

        let mutual = sets.mutual();
        let one_way_in = sets.one_way_in();
        let one_way_out = sets.one_way_out();

        // pairwise disjoint
        prop_assert!(mutual.is_disjoint(&one_way_in));
        prop_assert!(mutual.is_disjoint(&one_way_out));
        prop_assert!(one_way_in.is_disjoint(&one_way_out));

        // and together they cover the whole network
        let mut rebuilt: HashSet<UserId> = HashSet::new();
        rebuilt.extend(&mutual);
        rebuilt.extend(&one_way_in);
        rebuilt.extend(&one_way_out);
        prop_assert_eq!(rebuilt, sets.unique());
    }

    #[test]
    fn mutual_is_symmetric_over_any_edge_set(edges in any::<u64>()) {
        for a in 0..UNIVERSE {
            for b in 0..UNIVERSE {
                let a_sees_b = sets_for(edges, a).mutual().contains(&user(b));
                let b_sees_a = sets_for(edges, b).mutual().contains(&user(a));
                prop_assert_eq!(a_sees_b, b_sees_a);
            }
        }
    }

    #[test]
    fn one_way_sets_mirror_each_other(edges in any::<u64>()) {
        for a in 0..UNIVERSE {
            for b in 0..UNIVERSE {
                // b is one-way-out for a exactly when a is one-way-in for b
                let out = sets_for(edges, a).one_way_out().contains(&user(b));
                let r#in = sets_for(edges, b).one_way_in().contains(&user(a));
                prop_assert_eq!(out, r#in);
            }
        }
    }
}
