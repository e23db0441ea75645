//! Characteristic functions and the builder deriving them from clue regions.

use rayon::prelude::*;
use tracing::debug;

use super::*;

/// Anything that assigns a value to a coalition.
///
/// The Shapley estimator only sees this interface, so a function built from
/// clue regions and a ledger of realised coins are interchangeable.
pub trait CoalitionValue {
    fn value(&self, coalition: Coalition) -> Value;

    /// Number of agents the source was built for, if it is sized at all.
    fn covered_agents(&self) -> Option<usize> {
        None
    }
}

impl<T: CoalitionValue + ?Sized> CoalitionValue for &T {
    fn value(&self, coalition: Coalition) -> Value {
        (**self).value(coalition)
    }

    fn covered_agents(&self) -> Option<usize> {
        (**self).covered_agents()
    }
}

/// Values of every coalition of `agent_count` agents, indexed by bitmask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacteristicFunction {
    agent_count: usize,
    values: Vec<Value>,
}

impl CharacteristicFunction {
    /// Builds the function from values listed in bitmask order.
    pub fn from_values(agent_count: usize, values: Vec<Value>) -> Self {
        debug_assert_eq!(
            values.len(),
            1usize << agent_count,
            "There must be one value per coalition."
        );
        CharacteristicFunction { agent_count, values }
    }

    /// Tabulates `v` over every coalition of `agent_count` agents.
    pub fn tabulate<V: CoalitionValue + ?Sized>(agent_count: usize, v: &V) -> Self {
        Self::from_values(agent_count, Coalition::all(agent_count).map(|co| v.value(co)).collect())
    }

    pub fn agent_count(&self) -> usize {
        self.agent_count
    }

    pub fn get(&self, coalition: Coalition) -> Value {
        debug_assert!(
            coalition.is_subset_of(Coalition::grand(self.agent_count)),
            "Coalition contains unknown agents."
        );
        self.values.get(coalition.bits() as usize).copied().unwrap_or(0)
    }

    /// Value of the coalition of all agents.
    pub fn grand_value(&self) -> Value {
        self.get(Coalition::grand(self.agent_count))
    }

    /// Iterator over `(coalition, value)` pairs in bitmask order.
    pub fn iter(&self) -> impl Iterator<Item = (Coalition, Value)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(bits, &v)| (Coalition::from_bits(bits as u64), v))
    }

    /// Returns `true` if adding an agent never lowers the value.
    pub fn is_monotone(&self) -> bool {
        self.iter().all(|(co, v)| {
            (0..self.agent_count)
                .filter(|&ag| !co.contains(ag))
                .all(|ag| self.get(co.with(ag)) >= v)
        })
    }

    /// Coalition labels built from the agents' short names, paired with values, in bitmask order.
    pub fn labeled(&self, agents: &[Agent]) -> Vec<(String, Value)> {
        self.iter()
            .map(|(co, v)| (co.label(|ag| agents[ag].short_name()), v))
            .collect()
    }
}

impl CoalitionValue for CharacteristicFunction {
    fn value(&self, coalition: Coalition) -> Value {
        self.get(coalition)
    }

    fn covered_agents(&self) -> Option<usize> {
        Some(self.agent_count)
    }
}

/// Default bound on the number of agents in a full coalition sweep.
pub const DEFAULT_MAX_AGENTS: usize = 20;

/// Derives the characteristic function of a clue game.
///
/// The value of a non-empty coalition is the number of cells its members'
/// clues jointly rule out: the grid minus the intersection of their regions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CoalitionValueBuilder {
    max_agents: usize,
}

impl CoalitionValueBuilder {
    pub fn new(max_agents: usize) -> Self {
        CoalitionValueBuilder {
            max_agents: max_agents.min(COALITION_CAPACITY),
        }
    }

    pub fn max_agents(&self) -> usize {
        self.max_agents
    }

    fn check(&self, agents: &[Agent], grid_size: usize) -> Result<()> {
        if grid_size == 0 {
            return Err(PayoutError::EmptyGrid);
        }
        if agents.len() > self.max_agents {
            return Err(PayoutError::TooManyAgents {
                count: agents.len(),
                max: self.max_agents,
            });
        }
        debug_assert!(
            agents.iter().enumerate().all(|(i, a)| a.id == i),
            "Agent ids must be their positions."
        );
        Ok(())
    }

    /// Value of a single coalition.
    pub fn coalition_value(agents: &[Agent], coalition: Coalition, grid_size: usize) -> Value {
        if coalition.is_empty() {
            return 0;
        }
        let common = Region::intersection(grid_size, coalition.members().map(|ag| agents[ag].region()));
        (grid_size * grid_size - common.len()) as Value
    }

    /// Sweeps all `2^n` coalitions of `agents`.
    pub fn build(&self, agents: &[Agent], grid_size: usize) -> Result<CharacteristicFunction> {
        self.check(agents, grid_size)?;
        let values = Coalition::all(agents.len())
            .map(|co| Self::coalition_value(agents, co, grid_size))
            .collect::<Vec<_>>();
        debug!(agents = agents.len(), coalitions = values.len(), grid_size, "built characteristic function");
        Ok(CharacteristicFunction::from_values(agents.len(), values))
    }

    /// Same as [`Self::build`], with coalitions spread over the rayon pool.
    pub fn build_parallel(&self, agents: &[Agent], grid_size: usize) -> Result<CharacteristicFunction> {
        self.check(agents, grid_size)?;
        let values = (0..1usize << agents.len())
            .into_par_iter()
            .map(|bits| Self::coalition_value(agents, Coalition::from_bits(bits as u64), grid_size))
            .collect::<Vec<_>>();
        debug!(agents = agents.len(), coalitions = values.len(), grid_size, "built characteristic function in parallel");
        Ok(CharacteristicFunction::from_values(agents.len(), values))
    }
}

impl Default for CoalitionValueBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    /// Two agents on a 2x2 grid: one knows nothing, one knows the exact cell.
    static SCENARIO1: LazyLock<Vec<Agent>> = LazyLock::new(|| {
        vec![
            Agent::with_region(0, "Ann", 1, Region::full(2)),
            Agent::with_region(1, "Bob", 1, Region::from_cells(2, &[(0, 0)])),
        ]
    });

    static CLUE_AGENTS: LazyLock<Vec<Agent>> = LazyLock::new(|| {
        let players = [
            Player::new("Ann", "The row is 2", 1),
            Player::new("Bob", "A prime sentinel", 1),
            Player::new("Cy", "The chronomancer", 2),
        ];
        Agent::from_players(&players, 5, &ClueCompiler::standard())
    });

    #[test]
    fn test_scenario1_values() {
        let v = CoalitionValueBuilder::default().build(&SCENARIO1, 2).unwrap();
        assert_eq!(v.get(Coalition::empty()), 0);
        assert_eq!(v.get(Coalition::singleton(0)), 0);
        assert_eq!(v.get(Coalition::singleton(1)), 3);
        assert_eq!(v.get(Coalition::grand(2)), 3);
        assert_eq!(v.grand_value(), 3);
        assert!(v.is_monotone());
    }

    #[test]
    fn test_clue_values() {
        let v = CoalitionValueBuilder::default().build(&CLUE_AGENTS, 5).unwrap();
        assert_eq!(v.agent_count(), 3);
        assert_eq!(v.covered_agents(), Some(3));
        // row 1: 5 cells; prime columns 2,3: 10 cells; row 2 mod 3: 5 cells.
        assert_eq!(v.get(Coalition::singleton(0)), 20);
        assert_eq!(v.get(Coalition::singleton(1)), 15);
        assert_eq!(v.get(Coalition::singleton(2)), 20);
        assert_eq!(v.get([0, 1].into_iter().collect()), 23);
        assert_eq!(v.get([0, 2].into_iter().collect()), 25);
        assert_eq!(v.grand_value(), 25);
        assert!(v.is_monotone());
        assert!(v.iter().all(|(_, x)| x <= 25));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let builder = CoalitionValueBuilder::default();
        assert_eq!(
            builder.build(&CLUE_AGENTS, 5).unwrap(),
            builder.build_parallel(&CLUE_AGENTS, 5).unwrap()
        );
    }

    #[test]
    fn test_idempotent() {
        let builder = CoalitionValueBuilder::default();
        assert_eq!(builder.build(&CLUE_AGENTS, 5).unwrap(), builder.build(&CLUE_AGENTS, 5).unwrap());
    }

    #[test]
    fn test_no_agents() {
        let v = CoalitionValueBuilder::default().build(&[], 3).unwrap();
        assert_eq!(v.iter().collect::<Vec<_>>(), [(Coalition::empty(), 0)]);
    }

    #[test]
    fn test_limits() {
        let builder = CoalitionValueBuilder::new(1);
        assert!(matches!(
            builder.build(&SCENARIO1, 2),
            Err(PayoutError::TooManyAgents { count: 2, max: 1 })
        ));
        assert!(matches!(
            CoalitionValueBuilder::default().build(&SCENARIO1, 0),
            Err(PayoutError::EmptyGrid)
        ));
        assert_eq!(CoalitionValueBuilder::new(1000).max_agents(), COALITION_CAPACITY);
    }

    #[test]
    fn test_labeled() {
        let v = CoalitionValueBuilder::default().build(&SCENARIO1, 2).unwrap();
        assert_eq!(
            v.labeled(&SCENARIO1),
            [
                ("∅".to_string(), 0),
                ("A".to_string(), 0),
                ("B".to_string(), 3),
                ("A+B".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_tabulate() {
        let v = CoalitionValueBuilder::default().build(&SCENARIO1, 2).unwrap();
        assert_eq!(CharacteristicFunction::tabulate(2, &v), v);

        struct Size;
        impl CoalitionValue for Size {
            fn value(&self, coalition: Coalition) -> Value {
                coalition.len() as Value
            }
        }
        let sizes = CharacteristicFunction::tabulate(3, &Size);
        assert_eq!(sizes.grand_value(), 3);
        assert_eq!(sizes.get(Coalition::singleton(2)), 1);
    }
}
