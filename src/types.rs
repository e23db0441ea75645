/// Agent identifier, stable index assigned at setup.
pub type AgentId = usize;
/// Agent weight applied to its own marginal contributions.
pub type Weight = u64;
/// Coalition value: number of grid cells a coalition rules out, or coins found.
pub type Value = u64;
/// Grid cell as `(row, col)`, both 0-based.
pub type Cell = (usize, usize);

/// Hard ceiling on the number of agents a coalition bitmask can hold.
pub const COALITION_CAPACITY: usize = 63;
