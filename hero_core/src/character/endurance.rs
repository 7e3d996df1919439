//! END bookkeeping and toggle activation

use super::Character;
use crate::attack::AttackRefusal;
use crate::catalog::PowerCatalog;
use crate::config::RulesConfig;
use crate::cost::endurance_cost;
use crate::power::PowerInstance;
use crate::types::Characteristic;
use serde::{Deserialize, Serialize};

/// Where a power draws its END from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnduranceSource {
    Character,
    /// An ENDURANCERESERVE power, by id
    Reserve(String),
}

/// END taken for one use of a power
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnduranceSpent {
    pub source: EnduranceSource,
    pub amount: i32,
    /// END the character did not have; paid in STUN by the caller
    pub overdraw: i32,
}

impl Character {
    pub fn endurance_source(&self, power: &PowerInstance) -> EnduranceSource {
        if power.use_end_reserve {
            if let Some(reserve) = self.powers.iter().find(|p| p.xmlid == "ENDURANCERESERVE") {
                return EnduranceSource::Reserve(reserve.id.clone());
            }
            tracing::warn!(power = %power.id, "power draws on an endurance reserve the character does not have");
        }
        EnduranceSource::Character
    }

    pub fn available_endurance(&self, source: &EnduranceSource) -> i32 {
        match source {
            EnduranceSource::Character => self.value(Characteristic::End),
            EnduranceSource::Reserve(id) => self
                .power(id)
                .and_then(|p| p.reserve)
                .map(|r| r.value)
                .unwrap_or(0),
        }
    }

    /// Take END from `source`
    ///
    /// Character END never goes below 0; whatever could not be paid is
    /// reported as overdraw.
    pub(crate) fn draw_endurance(&mut self, source: EnduranceSource, amount: i32) -> EnduranceSpent {
        let mut overdraw = 0;
        match &source {
            EnduranceSource::Character => {
                let remaining = self.value(Characteristic::End) - amount;
                if remaining < 0 {
                    overdraw = -remaining;
                }
                self.set_value(Characteristic::End, remaining.max(0));
            }
            EnduranceSource::Reserve(id) => {
                if let Some(pool) = self.power_mut(id).and_then(|p| p.reserve.as_mut()) {
                    pool.value = (pool.value - amount).max(0);
                }
            }
        }
        EnduranceSpent {
            source,
            amount,
            overdraw,
        }
    }

    /// Switch on a constant or toggled power, paying its END
    ///
    /// Refused without any change when the END is not there. Returns the
    /// END spent.
    pub fn activate_power(
        &mut self,
        power_id: &str,
        catalog: &PowerCatalog,
        config: &RulesConfig,
    ) -> Result<i32, AttackRefusal> {
        let power = self
            .power(power_id)
            .ok_or_else(|| AttackRefusal::UnknownPower {
                power: power_id.to_string(),
                character: self.name.clone(),
            })?;

        let needed = if config.use_endurance {
            let costs = self.costs_for(power, catalog);
            let definition = catalog.lookup(&power.xmlid, self.edition);
            endurance_cost(power, &costs, definition.as_ref())
        } else {
            0
        };
        let source = self.endurance_source(power);
        let available = self.available_endurance(&source);

        if needed > available {
            let name = power.name.clone();
            return Err(match source {
                EnduranceSource::Character => AttackRefusal::InsufficientEndurance {
                    power: name,
                    needed,
                    available,
                },
                EnduranceSource::Reserve(_) => AttackRefusal::ReserveExhausted {
                    power: name,
                    needed,
                    available,
                },
            });
        }

        if needed > 0 {
            self.draw_endurance(source, needed);
        }
        if let Some(power) = self.power_mut(power_id) {
            power.active = true;
        }
        tracing::debug!(character = %self.id, power = power_id, end = needed, "power activated");
        Ok(needed)
    }

    /// Switch a power off; returns false when there is no such power
    pub fn deactivate_power(&mut self, power_id: &str) -> bool {
        match self.power_mut(power_id) {
            Some(power) => {
                power.active = false;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power::Pool;

    fn forcefield_user(end: i32) -> Character {
        let mut field = PowerInstance::new("ff", "FORCEFIELD", 40);
        field.defense.pd = 20;
        field.defense.ed = 20;
        field.active = false;
        Character::new("a", "Shield")
            .with_characteristic(Characteristic::End, end)
            .with_power(field)
    }

    #[test]
    fn test_activate_spends_end() {
        let catalog = PowerCatalog::with_defaults();
        let config = RulesConfig::default();
        let mut c = forcefield_user(20);
        // 40 levels at 1.5 is 60 active points; only fifth edition charges END
        c.edition = crate::types::Edition::Fifth;
        let spent = c.activate_power("ff", &catalog, &config).unwrap();
        assert_eq!(spent, 6);
        assert_eq!(c.value(Characteristic::End), 14);
        assert!(c.power("ff").map(|p| p.active).unwrap_or(false));

        let mut sixth = forcefield_user(20);
        assert_eq!(sixth.activate_power("ff", &catalog, &config).unwrap(), 0);
        assert_eq!(sixth.value(Characteristic::End), 20);
    }

    #[test]
    fn test_activate_refused_without_end() {
        let catalog = PowerCatalog::with_defaults();
        let config = RulesConfig::default();
        let mut c = forcefield_user(0);
        c.edition = crate::types::Edition::Fifth;
        let before = c.clone();
        let err = c.activate_power("ff", &catalog, &config).unwrap_err();
        assert!(matches!(err, AttackRefusal::InsufficientEndurance { available: 0, .. }));
        assert_eq!(c, before);
    }

    #[test]
    fn test_activate_unknown_power() {
        let catalog = PowerCatalog::with_defaults();
        let mut c = forcefield_user(10);
        let err = c
            .activate_power("missing", &catalog, &RulesConfig::default())
            .unwrap_err();
        assert!(matches!(err, AttackRefusal::UnknownPower { .. }));
    }

    #[test]
    fn test_draw_reports_overdraw() {
        let mut c = Character::new("a", "Tired").with_characteristic(Characteristic::End, 3);
        let spent = c.draw_endurance(EnduranceSource::Character, 7);
        assert_eq!(spent.overdraw, 4);
        assert_eq!(c.value(Characteristic::End), 0);
    }

    #[test]
    fn test_reserve_source() {
        let mut reserve = PowerInstance::new("res", "ENDURANCERESERVE", 20);
        reserve.reserve = Some(Pool { value: 5, max: 20 });
        let mut blast = PowerInstance::new("blast", "ENERGYBLAST", 8);
        blast.use_end_reserve = true;
        let mut c = Character::new("a", "Gadgeteer")
            .with_power(reserve)
            .with_power(blast);

        let source = c.endurance_source(c.power("blast").unwrap());
        assert_eq!(source, EnduranceSource::Reserve("res".to_string()));
        assert_eq!(c.available_endurance(&source), 5);
        c.draw_endurance(source.clone(), 4);
        assert_eq!(c.available_endurance(&source), 1);
    }
}
