use std::ops::Index;

use rand::Rng;
use tracing::info;

use super::*;

/// Agents with compiled clues on a square grid.
#[derive(Clone, Debug)]
pub struct ClueGame {
    agents: Vec<Agent>,
    grid_size: usize,
    builder: CoalitionValueBuilder,
}

/// Payouts together with the characteristic function they were computed from.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub payouts: ShapleyVector,
    pub values: CharacteristicFunction,
}

impl ClueGame {
    pub fn new(agents: Vec<Agent>, grid_size: usize, builder: CoalitionValueBuilder) -> Result<Self> {
        if grid_size == 0 {
            return Err(PayoutError::EmptyGrid);
        }
        if agents.len() > builder.max_agents() {
            return Err(PayoutError::TooManyAgents {
                count: agents.len(),
                max: builder.max_agents(),
            });
        }
        Ok(ClueGame {
            agents,
            grid_size,
            builder,
        })
    }

    pub fn from_players(
        players: &[Player],
        grid_size: usize,
        compiler: &ClueCompiler,
        builder: CoalitionValueBuilder,
    ) -> Result<Self> {
        Self::new(Agent::from_players(players, grid_size, compiler), grid_size, builder)
    }

    pub fn from_config(config: &GameConfig) -> Result<Self> {
        config.validate()?;
        Self::from_players(
            &config.players,
            config.grid_size,
            &ClueCompiler::standard(),
            CoalitionValueBuilder::new(config.max_agents),
        )
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn total_cells(&self) -> usize {
        self.grid_size * self.grid_size
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn weights(&self) -> Vec<Weight> {
        self.agents.iter().map(|a| a.weight).collect()
    }

    /// Characteristic function over all coalitions, rebuilt on every call.
    pub fn characteristic_function(&self) -> Result<CharacteristicFunction> {
        self.builder.build(&self.agents, self.grid_size)
    }

    /// Payouts under an arbitrary value source, such as a [`Ledger`].
    pub fn payouts_from<V, R>(&self, v: &V, estimator: &ShapleyEstimator, rng: &mut R) -> Result<ShapleyVector>
    where
        V: CoalitionValue + ?Sized,
        R: Rng + ?Sized,
    {
        estimator.estimate(v, self.agent_count(), &self.weights(), rng)
    }

    /// Builds the characteristic function from the clues and estimates the payouts.
    pub fn resolve<R: Rng + ?Sized>(&self, estimator: &ShapleyEstimator, rng: &mut R) -> Result<Resolution> {
        let values = self.characteristic_function()?;
        let payouts = self.payouts_from(&values, estimator, rng)?;
        info!(
            agents = self.agent_count(),
            grand = values.grand_value(),
            samples = estimator.samples(),
            "resolved payouts"
        );
        Ok(Resolution { payouts, values })
    }

    /// Same as [`Self::resolve`], with the build and the sampling on the rayon pool.
    pub fn resolve_parallel(&self, estimator: &ShapleyEstimator, seed: u64) -> Result<Resolution> {
        let values = self.builder.build_parallel(&self.agents, self.grid_size)?;
        let payouts = estimator.estimate_parallel(&values, self.agent_count(), &self.weights(), seed)?;
        info!(
            agents = self.agent_count(),
            grand = values.grand_value(),
            samples = estimator.samples(),
            seed,
            "resolved payouts"
        );
        Ok(Resolution { payouts, values })
    }
}

impl Index<AgentId> for ClueGame {
    type Output = Agent;

    fn index(&self, index: AgentId) -> &Self::Output {
        &self.agents[index]
    }
}
