//! Compilation of free-text clues into grid regions.
//!
//! A [`ClueCompiler`] holds an ordered list of [`ClueRule`]s. Rules are tried
//! top to bottom against the lowercased clue and the first one whose trigger
//! matches and yields at least one cell produces the region; the others are
//! ignored. A rule that matches but finds nothing on this grid (say, a row
//! number past the last row) passes the clue on to the next rule. When the
//! table is exhausted, the clue compiles to the full grid.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::*;

/// Text captured by a trigger, handed to the rule's region generator.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TriggerMatch<'a> {
    pub capture: Option<&'a str>,
}

/// Condition a clue must satisfy for a rule to fire.
#[derive(Clone, Debug)]
pub enum Trigger {
    /// Regex match; its first capture group, if any, is passed on.
    Pattern(Regex),
    /// Any of the phrases occurs as a substring.
    AnyOf(&'static [&'static str]),
    /// All of the regexes match.
    AllOf(Vec<Regex>),
}

impl Trigger {
    /// Tests `text`, which must already be lowercased.
    pub fn matches<'a>(&self, text: &'a str) -> Option<TriggerMatch<'a>> {
        match self {
            Trigger::Pattern(re) => re.captures(text).map(|caps| TriggerMatch {
                capture: caps.get(1).map(|m| m.as_str()),
            }),
            Trigger::AnyOf(phrases) => phrases
                .iter()
                .any(|p| text.contains(p))
                .then(TriggerMatch::default),
            Trigger::AllOf(patterns) => patterns
                .iter()
                .all(|re| re.is_match(text))
                .then(TriggerMatch::default),
        }
    }
}

pub type RegionGenerator = fn(TriggerMatch<'_>, usize) -> Region;

/// One entry of the rule table.
#[derive(Clone, Debug)]
pub struct ClueRule {
    pub name: &'static str,
    pub trigger: Trigger,
    pub generate: RegionGenerator,
}

impl ClueRule {
    pub fn new(name: &'static str, trigger: Trigger, generate: RegionGenerator) -> Self {
        ClueRule { name, trigger, generate }
    }

    pub fn any_of(name: &'static str, phrases: &'static [&'static str], generate: RegionGenerator) -> Self {
        Self::new(name, Trigger::AnyOf(phrases), generate)
    }

    /// Rule triggered by a regex pattern.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex.
    pub fn pattern(name: &'static str, pattern: &str, generate: RegionGenerator) -> Self {
        Self::new(name, Trigger::Pattern(static_regex(pattern)), generate)
    }

    /// Region for `clue` if this rule fires. `clue` must already be lowercased.
    pub fn apply(&self, clue: &str, grid_size: usize) -> Option<Region> {
        self.trigger.matches(clue).map(|m| (self.generate)(m, grid_size))
    }
}

fn static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid clue pattern {pattern:?}: {e}"))
}

fn named_row(m: TriggerMatch<'_>, grid_size: usize) -> Region {
    match m.capture.and_then(|s| s.parse::<usize>().ok()) {
        Some(row) if (1..=grid_size).contains(&row) => Region::row(grid_size, row - 1),
        _ => Region::empty(grid_size),
    }
}

fn named_column(m: TriggerMatch<'_>, grid_size: usize) -> Region {
    let col = m
        .capture
        .and_then(|s| s.bytes().next())
        .filter(u8::is_ascii_lowercase)
        .map(|b| (b - b'a') as usize);
    match col {
        Some(col) if col < grid_size => Region::column(grid_size, col),
        _ => Region::empty(grid_size),
    }
}

fn northern_edge(_: TriggerMatch<'_>, grid_size: usize) -> Region {
    let depth = grid_size.min(4);
    Region::from_fn(grid_size, |r, _| r < depth)
}

const PRIME_COLUMNS: [usize; 4] = [2, 3, 5, 7];

fn prime_columns(_: TriggerMatch<'_>, grid_size: usize) -> Region {
    Region::from_fn(grid_size, |_, c| PRIME_COLUMNS.contains(&c))
}

fn odd_parity(_: TriggerMatch<'_>, grid_size: usize) -> Region {
    Region::from_fn(grid_size, |r, c| (r + c) % 2 == 1)
}

fn above_diagonal(_: TriggerMatch<'_>, grid_size: usize) -> Region {
    Region::from_fn(grid_size, |r, c| r < c)
}

fn east_of_f(_: TriggerMatch<'_>, grid_size: usize) -> Region {
    Region::from_fn(grid_size, |_, c| c >= 6)
}

fn every_third_row(_: TriggerMatch<'_>, grid_size: usize) -> Region {
    Region::from_fn(grid_size, |r, _| r % 3 == 2)
}

/// The standard rule table, in priority order.
pub fn standard_rules() -> Vec<ClueRule> {
    vec![
        ClueRule::pattern("row", r"row\s+is\s+(\d+)", named_row),
        ClueRule::pattern("column", r"column\s+is\s*([a-z])(?:[^a-z]|$)", named_column),
        ClueRule::any_of("northern-edge", &["no deeper", "northern edge"], northern_edge),
        ClueRule::any_of("prime-columns", &["prime sentinel", "prime"], prime_columns),
        ClueRule::any_of("odd-parity", &["odd laugh", "parity"], odd_parity),
        ClueRule::any_of(
            "above-diagonal",
            &["rank is strictly smaller", "bows to the column"],
            above_diagonal,
        ),
        ClueRule::new(
            "east-of-f",
            Trigger::AllOf(vec![static_regex(r"east of"), static_regex(r"\bf\b")]),
            east_of_f,
        ),
        ClueRule::any_of(
            "every-third-row",
            &["second beat", "in threes", "chronomancer"],
            every_third_row,
        ),
    ]
}

static STANDARD: LazyLock<ClueCompiler> = LazyLock::new(ClueCompiler::standard);

/// Compiles `clue` with the standard rule table.
pub fn compile(clue: &str, grid_size: usize) -> Region {
    STANDARD.compile(clue, grid_size)
}

/// Ordered, first-match-wins rule table.
#[derive(Clone, Debug)]
pub struct ClueCompiler {
    rules: Vec<ClueRule>,
}

impl ClueCompiler {
    pub fn new(rules: Vec<ClueRule>) -> Self {
        ClueCompiler { rules }
    }

    pub fn standard() -> Self {
        Self::new(standard_rules())
    }

    pub fn rules(&self) -> &[ClueRule] {
        &self.rules
    }

    /// Inserts a rule at position `index` in the priority order.
    pub fn insert(&mut self, index: usize, rule: ClueRule) {
        self.rules.insert(index, rule);
    }

    /// Removes the rule called `name`, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<ClueRule> {
        let pos = self.rules.iter().position(|r| r.name == name)?;
        Some(self.rules.remove(pos))
    }

    /// The first rule whose trigger matches `clue`, regardless of grid size.
    pub fn matching_rule(&self, clue: &str) -> Option<&ClueRule> {
        let text = clue.to_lowercase();
        self.rules.iter().find(|r| r.trigger.matches(&text).is_some())
    }

    /// Compiles `clue` to the cells it is consistent with. Never fails and,
    /// for a positive `grid_size`, never returns an empty region.
    pub fn compile(&self, clue: &str, grid_size: usize) -> Region {
        let text = clue.to_lowercase();
        let mut skipped = 0;
        for rule in &self.rules {
            let Some(region) = rule.apply(&text, grid_size) else {
                continue;
            };
            if region.is_empty() {
                debug!(rule = rule.name, clue, grid_size, "clue rule matched nothing on this grid");
                skipped += 1;
                continue;
            }
            debug!(rule = rule.name, clue, cells = region.len(), "compiled clue");
            return region;
        }
        if skipped > 0 {
            warn!(clue, grid_size, skipped, "clue only matched rules that select no cell, using full grid");
        } else {
            debug!(clue, "no clue rule matched, using full grid");
        }
        Region::full(grid_size)
    }
}

impl Default for ClueCompiler {
    fn default() -> Self {
        Self::standard()
    }
}
