//! hero_sim - Headless scenario runner for hero_core
//!
//! A scenario names the characters in a fight, the rules in force and the
//! attacks made each round. The runner walks every attack through to-hit,
//! damage and defenses, and reports each result.

pub mod runner;
pub mod scenario;

pub use runner::{run_scenario, ActionReport, Simulation, SimulationReport};
pub use scenario::{AttackSpec, CharacterSpec, Scenario, SimError};
