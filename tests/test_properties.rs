//! Property-based tests for the coalition value engine.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use clue_shapley::*;

const CLUES: [&str; 12] = [
    "The row is 2",
    "The row is 7",
    "Its column is B",
    "Its column is H",
    "It lies no deeper than the fourth row",
    "Guarded by a prime sentinel",
    "Listen for the odd laugh",
    "Its rank is strictly smaller than its file",
    "East of F lies the hoard",
    "The chronomancer keeps the second beat",
    "I like turtles",
    "",
];

/// Strategy: a clue from the table, or arbitrary text.
fn clue_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0..CLUES.len()).prop_map(|i| CLUES[i].to_string()),
        "[a-zA-Z0-9 ]{0,24}",
    ]
}

/// Strategy: up to six players with weights 1-5.
fn players_strategy() -> impl Strategy<Value = Vec<Player>> {
    prop::collection::vec((clue_strategy(), 1..=5u64), 0..=6).prop_map(|v| {
        v.into_iter()
            .enumerate()
            .map(|(i, (clue, weight))| Player::new(format!("P{i}"), clue, weight))
            .collect()
    })
}

fn agents(players: &[Player], grid_size: usize) -> Vec<Agent> {
    Agent::from_players(players, grid_size, &ClueCompiler::standard())
}

proptest! {
    // 1. Regions are never empty and stay inside the grid
    #[test]
    fn region_non_empty(clue in clue_strategy(), grid_size in 1..=12usize) {
        let region = clue::compile(&clue, grid_size);
        prop_assert!(!region.is_empty());
        prop_assert_eq!(region.grid_size(), grid_size);
        prop_assert!(region.iter().all(|(r, c)| r < grid_size && c < grid_size));
    }

    // 2. Compilation is deterministic
    #[test]
    fn compile_deterministic(clue in clue_strategy(), grid_size in 1..=12usize) {
        prop_assert_eq!(clue::compile(&clue, grid_size), clue::compile(&clue, grid_size));
    }

    // 3. v(∅) = 0 and 0 <= v(S) <= gridSize²
    #[test]
    fn values_bounded(players in players_strategy(), grid_size in 1..=10usize) {
        let v = CoalitionValueBuilder::default().build(&agents(&players, grid_size), grid_size).unwrap();
        prop_assert_eq!(v.get(Coalition::empty()), 0);
        let total = (grid_size * grid_size) as Value;
        prop_assert!(v.iter().all(|(_, x)| x <= total));
    }

    // 4. S ⊆ T implies v(S) <= v(T)
    #[test]
    fn values_monotone(players in players_strategy(), grid_size in 1..=10usize) {
        let v = CoalitionValueBuilder::default().build(&agents(&players, grid_size), grid_size).unwrap();
        for (s, vs) in v.iter() {
            for (t, vt) in v.iter() {
                if s.is_subset_of(t) {
                    prop_assert!(vs <= vt, "v({s})={vs} > v({t})={vt}");
                }
            }
        }
    }

    // 5. Building twice gives the same function
    #[test]
    fn build_idempotent(players in players_strategy(), grid_size in 1..=10usize) {
        let agents = agents(&players, grid_size);
        let builder = CoalitionValueBuilder::default();
        prop_assert_eq!(builder.build(&agents, grid_size).unwrap(), builder.build(&agents, grid_size).unwrap());
        prop_assert_eq!(builder.build(&agents, grid_size).unwrap(), builder.build_parallel(&agents, grid_size).unwrap());
    }

    // 6. One payout per agent, including no agents at all
    #[test]
    fn payout_length(players in players_strategy(), seed in any::<u64>()) {
        let agents = agents(&players, 6);
        let v = CoalitionValueBuilder::default().build(&agents, 6).unwrap();
        let weights = players.iter().map(|p| p.weight).collect::<Vec<_>>();
        let phi = ShapleyEstimator::new(50)
            .estimate(&v, agents.len(), &weights, &mut ChaCha8Rng::seed_from_u64(seed))
            .unwrap();
        prop_assert_eq!(phi.len(), agents.len());
    }

    // 7. With unit weights every sampled order splits exactly v(N)
    #[test]
    fn unit_weights_efficient(players in players_strategy(), seed in any::<u64>()) {
        let agents = agents(&players, 8);
        let v = CoalitionValueBuilder::default().build(&agents, 8).unwrap();
        let phi = ShapleyEstimator::new(100)
            .estimate(&v, agents.len(), &vec![1; agents.len()], &mut ChaCha8Rng::seed_from_u64(seed))
            .unwrap();
        prop_assert!((phi.total() - v.grand_value() as f64).abs() < 1e-6);
        prop_assert!(phi.iter().all(|&x| x >= 0.0));
    }
}
