//! Runs a scenario round by round

use crate::scenario::{AttackSpec, Scenario, SimError};
use hero_core::attack::{resolve_to_hit, AttackRefusal, AttackState, Target};
use hero_core::character::Character;
use hero_core::combat::{resolve_damage, roll_attack_damage, CombatResult, DamageApplication};
use hero_core::dice::DiceRoller;
use hero_core::types::Condition;
use hero_core::{PowerCatalog, RulesConfig};
use serde::Serialize;
use tracing::{info, warn};

/// Seconds in one turn; effects tick and everyone recovers at its end
const TURN_SECONDS: f64 = 12.0;

/// What happened on one attack
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActionReport {
    pub round: u32,
    pub attacker: String,
    pub power: String,
    pub defender: String,
    pub state: Option<AttackState>,
    pub to_hit_roll: Option<i32>,
    /// One entry per hit that landed
    pub results: Vec<CombatResult>,
    /// Why the attack was not made
    pub refusal: Option<String>,
    pub warnings: Vec<String>,
}

impl ActionReport {
    fn new(round: u32, spec: &AttackSpec) -> Self {
        ActionReport {
            round,
            attacker: spec.attacker.clone(),
            power: spec.power.clone(),
            defender: spec.defender.clone(),
            ..Default::default()
        }
    }

    pub fn summary(&self) -> String {
        if let Some(refusal) = &self.refusal {
            return format!("{}: {}", self.attacker, refusal);
        }
        let state = match self.state {
            Some(AttackState::Hit) => "hits",
            Some(AttackState::Miss) => "misses",
            Some(AttackState::Aborted) => "aborts to",
            Some(AttackState::ActivationFailed) => "fails to activate against",
            _ => "declares against",
        };
        let mut line = format!("{} {} {} with {}", self.attacker, state, self.defender, self.power);
        for result in &self.results {
            line.push_str(": ");
            line.push_str(&result.summary());
        }
        line
    }
}

/// Final state of a run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub name: String,
    pub seed: Option<u64>,
    pub actions: Vec<ActionReport>,
    pub characters: Vec<Character>,
}

/// Holds the characters while a scenario runs
pub struct Simulation<'a> {
    scenario: &'a Scenario,
    catalog: &'a PowerCatalog,
    characters: Vec<Character>,
}

impl<'a> Simulation<'a> {
    pub fn new(scenario: &'a Scenario, catalog: &'a PowerCatalog) -> Self {
        Simulation {
            scenario,
            catalog,
            characters: scenario.build_characters(catalog),
        }
    }

    pub fn character(&self, id: &str) -> Result<&Character, SimError> {
        self.characters
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| SimError::UnknownCharacter(id.to_string()))
    }

    fn store(&mut self, character: Character) {
        if let Some(slot) = self.characters.iter_mut().find(|c| c.id == character.id) {
            *slot = character;
        }
    }

    /// Switch on the powers each character starts the fight with
    pub fn activate_powers(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        let scenario = self.scenario;
        for spec in &scenario.characters {
            for power_id in &spec.activate {
                let Some(character) = self.characters.iter_mut().find(|c| c.id == spec.id) else {
                    continue;
                };
                match character.activate_power(power_id, self.catalog, &scenario.rules) {
                    Ok(end) => info!(character = %spec.id, power = %power_id, end, "power activated"),
                    Err(refusal) => {
                        warn!(character = %spec.id, power = %power_id, "{}", refusal);
                        warnings.push(refusal.to_string());
                    }
                }
            }
        }
        warnings
    }

    /// Make one declared attack
    pub fn run_attack(
        &mut self,
        round: u32,
        spec: &AttackSpec,
        dice: &mut impl DiceRoller,
    ) -> Result<ActionReport, SimError> {
        let mut report = ActionReport::new(round, spec);
        let mut attacker = self.character(&spec.attacker)?.clone();

        // A stunned character spends the phase recovering
        if attacker.has_condition(Condition::Stunned) {
            attacker.start_phase();
            report.refusal = Some("recovers from being stunned".to_string());
            self.store(attacker);
            return Ok(report);
        }
        attacker.start_phase();
        self.store(attacker);

        match self.attack(spec, &mut report, dice) {
            Ok(()) => {}
            Err(refusal) => {
                warn!(attacker = %spec.attacker, power = %spec.power, "{}", refusal);
                report.refusal = Some(refusal.to_string());
            }
        }
        info!(round, "{}", report.summary());
        Ok(report)
    }

    fn attack(
        &mut self,
        spec: &AttackSpec,
        report: &mut ActionReport,
        dice: &mut impl DiceRoller,
    ) -> Result<(), AttackRefusal> {
        let catalog = self.catalog;
        let scenario = self.scenario;
        let rules: &RulesConfig = &scenario.rules;
        let (attacker, defender) = match (self.character(&spec.attacker), self.character(&spec.defender)) {
            (Ok(a), Ok(d)) => (a.clone(), d.clone()),
            _ => return Ok(()),
        };

        let (attacker, to_hit) = resolve_to_hit(
            &attacker,
            &spec.power,
            &spec.options,
            &[Target::new(&defender, spec.distance)],
            catalog,
            rules,
            dice,
        )?;
        report.state = Some(to_hit.state);
        report.to_hit_roll = to_hit.roll.as_ref().map(|r| r.total);
        report.warnings.extend(to_hit.warnings.iter().cloned());
        self.store(attacker);

        for _ in 0..to_hit.hits_on(&defender.id) {
            let attacker = self.character(&spec.attacker).map(Clone::clone);
            let defender = self.character(&spec.defender).map(Clone::clone);
            let (Ok(attacker), Ok(defender)) = (attacker, defender) else {
                break;
            };
            let rolled = roll_attack_damage(&attacker, &spec.power, &spec.options, catalog, dice)?;
            let application = DamageApplication::new(&spec.power, &rolled.roll, &spec.options)
                .at_distance(spec.from_center);
            let (attacker, defender, result) =
                resolve_damage(&attacker, &defender, application, catalog, rules, dice)?;
            self.store(attacker);
            self.store(defender);
            report.results.push(result);
        }
        Ok(())
    }

    /// Advance every character to the end of the turn
    pub fn end_turn(&mut self) {
        for character in &mut self.characters {
            for expired in character.tick(TURN_SECONDS) {
                info!(character = %character.id, effect = %expired.label, "effect expired");
            }
            let recovery = character.take_recovery();
            info!(
                character = %character.id,
                stun = recovery.stun_after,
                end = recovery.end_after,
                "post-turn recovery"
            );
        }
    }

    pub fn into_characters(self) -> Vec<Character> {
        self.characters
    }
}

/// Run `rounds` rounds of the scenario's attacks
pub fn run_scenario(
    scenario: &Scenario,
    catalog: &PowerCatalog,
    rounds: u32,
    seed: Option<u64>,
    dice: &mut impl DiceRoller,
) -> Result<SimulationReport, SimError> {
    let mut simulation = Simulation::new(scenario, catalog);
    for warning in simulation.activate_powers() {
        warn!("{}", warning);
    }

    let mut actions = Vec::new();
    for round in 1..=rounds {
        info!(round, "round begins");
        for spec in &scenario.attacks {
            actions.push(simulation.run_attack(round, spec, dice)?);
        }
        simulation.end_turn();
    }

    Ok(SimulationReport {
        name: scenario.name.clone(),
        seed,
        actions,
        characters: simulation.into_characters(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hero_core::dice::ScriptedDice;
    use hero_core::types::Characteristic;

    fn duel() -> Scenario {
        Scenario::parse(
            r#"
            [rules]
            automation = "all"

            [[characters]]
            id = "hero"
            name = "Hero"
            characteristics = { STUN = 30, CON = 10, DCV = 0 }

            [[characters]]
            id = "villain"
            name = "Villain"
            characteristics = { OCV = 10 }

            [[characters.powers]]
            id = "eb"
            xmlid = "ENERGYBLAST"
            levels = 6

            [[attacks]]
            attacker = "villain"
            power = "eb"
            defender = "hero"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_stunned_attacker_loses_phase() {
        let scenario = duel();
        let catalog = PowerCatalog::with_defaults();
        let mut simulation = Simulation::new(&scenario, &catalog);

        let mut villain = simulation.character("villain").unwrap().clone();
        hero_core::effect::insert_effect(
            &mut villain,
            hero_core::effect::TimedEffect::condition("punch", Condition::Stunned).until_next_phase(),
        );
        simulation.store(villain);

        let mut dice = ScriptedDice::default();
        let report = simulation.run_attack(1, &scenario.attacks[0], &mut dice).unwrap();
        assert_eq!(report.refusal.as_deref(), Some("recovers from being stunned"));
        assert!(!simulation
            .character("villain")
            .unwrap()
            .has_condition(Condition::Stunned));
    }

    #[test]
    fn test_hit_lands_damage() {
        let scenario = duel();
        let catalog = PowerCatalog::with_defaults();
        let mut simulation = Simulation::new(&scenario, &catalog);

        // 3d6 to hit, then six damage dice
        let mut dice = ScriptedDice::new([3, 3, 3, 6, 6, 5, 4, 3, 2]);
        let report = simulation.run_attack(1, &scenario.attacks[0], &mut dice).unwrap();

        assert_eq!(report.state, Some(AttackState::Hit));
        assert_eq!(report.results.len(), 1);
        let hero = simulation.character("hero").unwrap();
        assert!(hero.value(Characteristic::Stun) < 30);
        assert!(report.summary().starts_with("villain hits hero with eb"));
    }
}
