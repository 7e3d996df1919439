//! Cost engine
//!
//! Derives base points, active points, damage-class active points and
//! real cost from a declared [`PowerInstance`]. The record is never
//! mutated; every call recomputes from the declared data, so running it
//! twice on the same power gives the same numbers.

mod area;
mod endurance;
mod modifier;
mod per_level;

pub use area::{aoe_parameters, AoeShape, AreaOfEffect};
pub use endurance::endurance_cost;
pub use modifier::{adder_base_cost, modifier_base_cost, nested_adder_cost};
pub use per_level::option_cost_per_level;

use crate::catalog::{FrameworkKind, PowerCatalog, PowerCategory, PowerDefinition, PowerFacet};
use crate::power::PowerInstance;
use crate::rounding::{ceil_whole, round_down_i32, round_favor_player_down};
use crate::types::Edition;
use serde::{Deserialize, Serialize};

/// Lowest value a single limitation can have
const MIN_LIMITATION: f64 = 0.25;

/// Everything the cost engine reads besides the power itself
#[derive(Debug, Clone, Copy)]
pub struct CostContext<'a> {
    pub catalog: &'a PowerCatalog,
    pub edition: Edition,
    /// Framework or enhancer the power sits in
    pub parent: Option<&'a PowerInstance>,
    /// Unmodified value of the characteristic, for ADD_MODIFIERS_TO_BASE
    pub characteristic_core: Option<i32>,
    /// The owner knows Riding (discounts riding-animal familiarity)
    pub has_riding: bool,
}

impl<'a> CostContext<'a> {
    pub fn new(catalog: &'a PowerCatalog, edition: Edition) -> Self {
        CostContext {
            catalog,
            edition,
            parent: None,
            characteristic_core: None,
            has_riding: false,
        }
    }

    pub fn with_parent(mut self, parent: Option<&'a PowerInstance>) -> Self {
        self.parent = parent;
        self
    }
}

/// Computed cost of one modifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierCost {
    pub xmlid: String,
    /// Base cost after catalog overrides and formulas
    pub base_cost: f64,
    /// Value counted toward advantages (positive) or limitations (negative)
    pub total: f64,
}

/// Derived cost figures for a power
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PowerCosts {
    pub cost_per_level: f64,
    pub base_points_plus_adders: f64,
    pub advantages: f64,
    /// Advantages that change how the victim takes damage
    pub advantages_dc: f64,
    pub limitations: f64,
    pub active_points: i32,
    /// Active points counting only damage advantages
    pub active_points_dc: i32,
    pub active_points_without_end_mods: f64,
    pub real_cost: i32,
    /// Framework slot marker shown after the real cost
    pub cost_suffix: String,
    /// REDUCEDEND option on the power or its framework
    pub reduced_end: Option<String>,
    pub modifier_costs: Vec<ModifierCost>,
    pub warnings: Vec<String>,
}

impl PowerCosts {
    pub fn modifier_total(&self, xmlid: &str) -> Option<f64> {
        self.modifier_costs
            .iter()
            .find(|m| m.xmlid == xmlid)
            .map(|m| m.total)
    }

    /// Real cost with its framework suffix (`12v`)
    pub fn real_cost_label(&self) -> String {
        format!("{}{}", self.real_cost, self.cost_suffix)
    }
}

/// Compute every cost figure of a power
pub fn compute_costs(power: &PowerInstance, ctx: &CostContext) -> PowerCosts {
    let mut costs = PowerCosts::default();
    let definition = ctx.catalog.lookup(&power.xmlid, ctx.edition);
    if definition.is_none() {
        let message = format!("unknown power {}, using item data only", power.xmlid);
        tracing::warn!(power = %power.id, "{}", message);
        costs.warnings.push(message);
    }

    // Step 1: base points plus adders
    costs.cost_per_level =
        resolve_cost_per_level(power, definition.as_ref(), ctx.edition, &mut costs.warnings);
    costs.base_points_plus_adders =
        base_points_plus_adders(power, costs.cost_per_level, ctx, &mut costs.warnings);

    // Step 2: advantages
    let is_attack = definition.as_ref().map(|d| d.is_attack()).unwrap_or(false);
    let mut end_modifier_cost = 0.0;
    for modifier in &power.modifiers {
        let base = modifier_base_cost(modifier, ctx.catalog, ctx.edition, &mut costs.warnings);
        if base < 0.0 {
            continue;
        }
        if power.xmlid == "NAKEDMODIFIER" && !modifier.private {
            costs.modifier_costs.push(ModifierCost {
                xmlid: modifier.xmlid.clone(),
                base_cost: base,
                total: base,
            });
            continue;
        }

        let mut advantage = match modifier.xmlid.as_str() {
            "AOE" | "EXPLOSION" => base,
            "CUMULATIVE" => base + modifier.levels as f64 * 0.25,
            "REDUCEDEND" => {
                end_modifier_cost = if power.find_modifier("AUTOFIRE").is_some() {
                    2.0 * base
                } else {
                    base
                };
                end_modifier_cost
            }
            _ => base * modifier.levels.max(1) as f64,
        };

        let mut floor = 0.0;
        for adder in &modifier.adders {
            advantage += nested_adder_cost(adder, ctx.catalog, &mut costs.warnings);
            floor = 0.25;
        }

        costs.advantages += advantage.max(floor);
        let counts_for_dc = ctx
            .catalog
            .modifier(&modifier.xmlid)
            .map(|info| info.dc)
            .unwrap_or(false);
        if is_attack && counts_for_dc {
            costs.advantages_dc += advantage.max(0.0);
        }
        costs.modifier_costs.push(ModifierCost {
            xmlid: modifier.xmlid.clone(),
            base_cost: base,
            total: advantage,
        });
    }

    // Step 3: active points
    let bpa = costs.base_points_plus_adders;
    costs.active_points = round_down_i32(bpa * (1.0 + costs.advantages));
    costs.active_points_dc = round_down_i32(bpa * (1.0 + costs.advantages_dc));
    costs.active_points_without_end_mods = bpa * (1.0 + costs.advantages - end_modifier_cost);

    // Step 4: limitations, including those on the framework
    costs.limitations = sum_limitations(power, ctx, &mut costs);

    costs.reduced_end = power
        .find_modifier("REDUCEDEND")
        .or_else(|| ctx.parent.and_then(|p| p.find_modifier("REDUCEDEND")))
        .and_then(|m| m.option_id.clone());

    // Step 5: real cost
    costs.real_cost = real_cost(power, definition.as_ref(), ctx, &mut costs);

    tracing::debug!(
        power = %power.id,
        bpa,
        active_points = costs.active_points,
        real_cost = costs.real_cost,
        "computed costs"
    );
    costs
}

fn resolve_cost_per_level(
    power: &PowerInstance,
    definition: Option<&PowerDefinition>,
    edition: Edition,
    warnings: &mut Vec<String>,
) -> f64 {
    // A catalog cost per level wins even when it is 0 (EXTRALIMBS)
    if let Some(cpl) = definition.and_then(|d| d.cost_per_level) {
        return cpl;
    }
    if power.xmlid == "FLASH" {
        return if power.option_is("SIGHTGROUP") { 5.0 } else { 3.0 };
    }
    let option = option_cost_per_level(power, edition, warnings);
    let skill = definition
        .map(|d| d.has_category(PowerCategory::Skill))
        .unwrap_or(false);
    [
        option,
        power.cost_per_level,
        definition.map(|d| d.cost),
        skill.then_some(2.0),
        Some(power.base_cost),
    ]
    .into_iter()
    .flatten()
    .find(|c| *c != 0.0)
    .unwrap_or(1.0)
}

fn base_points_plus_adders(
    power: &PowerInstance,
    cost_per_level: f64,
    ctx: &CostContext,
    warnings: &mut Vec<String>,
) -> f64 {
    if power.everyman || power.native_tongue {
        return 0.0;
    }

    let mut base = power.base_cost;
    let mut sub_cost = cost_per_level * power.levels as f64;
    if (cost_per_level - 1.5).abs() < f64::EPSILON && sub_cost.fract() != 0.0 {
        sub_cost = sub_cost.ceil() + 1.0;
    }

    match power.xmlid.as_str() {
        "FORCEWALL" => {
            let barrier = &power.barrier;
            base += (barrier.body + barrier.length + barrier.height) as f64;
            base += ceil_whole(barrier.width * 2.0);
        }
        "DUPLICATION" => {
            let per_point = ctx
                .catalog
                .lookup("DUPLICATION", ctx.edition)
                .and_then(|d| d.cost_per_level)
                .unwrap_or(0.0);
            base += power.points as f64 * per_point;
        }
        _ => {}
    }

    let mut cost = base + sub_cost;

    if power.xmlid == "FOLLOWER" {
        let points = ceil_whole(power.base_points.unwrap_or(5) as f64 / 5.0);
        let multiplier = ceil_whole((power.number.max(0) as f64).sqrt()) + 1.0;
        cost = points * multiplier;
    }

    let mut adder_cost = 0.0;
    for adder in &power.adders {
        let mut adder_base = adder_base_cost(adder, ctx.catalog, warnings);
        if adder_base == 0.0 {
            adder_base = adder.lvl_cost.unwrap_or(0.0);
        }

        if adder.selected {
            let per_level = adder.lvl_val.unwrap_or(0).max(1) as f64;
            let levels = ceil_whole(adder.levels.max(1) as f64 / per_level);
            adder_cost += ceil_whole(adder_base * levels);
        }

        let mut sub_adder_cost = 0.0;
        for sub in adder.adders.iter().filter(|a| a.selected) {
            let sub_base = nested_adder_cost(sub, ctx.catalog, warnings);
            sub_adder_cost += ceil_whole(sub_base * sub.levels.max(1) as f64);
        }

        // Picking most of a category costs the same as the whole category
        let cap = if adder_base != 0.0 { adder_base } else { 99.0 };
        if !adder.selected && sub_adder_cost > cap {
            sub_adder_cost = adder_base;
        }

        if power.xmlid == "TRANSPORT_FAMILIARITY"
            && adder.xmlid == "RIDINGANIMALS"
            && ctx.has_riding
            && sub_adder_cost > 0.0
        {
            sub_adder_cost -= 1.0;
        }

        adder_cost += sub_adder_cost;
    }
    cost += adder_cost;

    // A naked advantage costs its base times the advantages it grants
    if power.xmlid == "NAKEDMODIFIER" && !power.modifiers.is_empty() {
        let granted: f64 = power
            .modifiers
            .iter()
            .filter(|m| !m.private)
            .map(|m| modifier_base_cost(m, ctx.catalog, ctx.edition, warnings))
            .sum();
        cost *= granted;
    }

    cost
}

fn sum_limitations(power: &PowerInstance, ctx: &CostContext, costs: &mut PowerCosts) -> f64 {
    let own = power.modifiers.iter().map(|m| (m, true));
    let inherited = ctx
        .parent
        .into_iter()
        .flat_map(|p| p.modifiers.iter())
        .map(|m| (m, false));

    let mut limitations = 0.0;
    for (modifier, is_own) in own.chain(inherited) {
        let base = modifier_base_cost(modifier, ctx.catalog, ctx.edition, &mut costs.warnings);
        if base >= 0.0 {
            continue;
        }

        let mut limitation = -base;
        for adder in &modifier.adders {
            let mut adder_cost = nested_adder_cost(adder, ctx.catalog, &mut costs.warnings);
            if adder.xmlid == "JAMMED" && (limitation - MIN_LIMITATION).abs() < 1e-9 {
                costs
                    .warnings
                    .push(format!("{}: JAMMED adds nothing below -1/4", modifier.xmlid));
                adder_cost = 0.0;
            }
            limitation -= adder_cost;

            let multiplier = adder
                .multiplier
                .or_else(|| ctx.catalog.modifier(&adder.xmlid).and_then(|i| i.multiplier))
                .unwrap_or(0.0)
                .max(1.0);
            limitation *= multiplier;
        }

        if limitation < MIN_LIMITATION {
            let message = format!(
                "limitation {} on {} is below the minimum of -1/4",
                modifier.xmlid, power.name
            );
            tracing::warn!(power = %power.id, "{}", message);
            costs.warnings.push(message);
            limitation = MIN_LIMITATION;
        }

        if is_own {
            costs.modifier_costs.push(ModifierCost {
                xmlid: modifier.xmlid.clone(),
                base_cost: base,
                total: -limitation,
            });
        }
        limitations += limitation;
    }
    limitations
}

fn real_cost(
    power: &PowerInstance,
    definition: Option<&PowerDefinition>,
    ctx: &CostContext,
    costs: &mut PowerCosts,
) -> i32 {
    let mut real = costs.active_points as f64;

    if let Some(parent) = ctx.parent {
        let parent_definition = ctx.catalog.lookup(&parent.xmlid, ctx.edition);
        let facet = parent_definition.as_ref().map(|d| d.facet());
        let enhancer = parent_definition
            .as_ref()
            .map(|d| d.has_category(PowerCategory::Enhancer))
            .unwrap_or(false);

        if enhancer {
            real = (real - 1.0).max(1.0);
        }

        // Framework discounts apply before limitations
        match facet {
            Some(PowerFacet::Framework(FrameworkKind::Multipower)) => {
                if power.ultra_slot {
                    costs.cost_suffix = if ctx.edition.is_fifth() { "u" } else { "f" }.to_string();
                    real /= 10.0;
                } else {
                    costs.cost_suffix = if ctx.edition.is_fifth() { "m" } else { "v" }.to_string();
                    real /= 5.0;
                }
            }
            Some(PowerFacet::Framework(FrameworkKind::ElementalControl)) => {
                real -= parent.base_cost;
            }
            _ => {}
        }
    }

    real /= 1.0 + costs.limitations;

    if power.add_modifiers_to_base {
        if let Some(core) = ctx.characteristic_core {
            let per_point = definition.map(|d| d.cost).filter(|c| *c != 0.0).unwrap_or(1.0);
            let base_cost = core as f64 * per_point;
            let discount =
                base_cost - round_favor_player_down(base_cost / (1.0 + costs.limitations));
            real -= discount;
        }
    }

    let mut real = round_down_i32(real);
    if real == 0 && costs.active_points > 0 {
        real = 1;
    }
    real
}
