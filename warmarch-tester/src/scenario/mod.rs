pub mod catalog;

use crate::logic::SimulationPlan;

/// A named simulation plan with its expectations.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

/// Look a scenario up by its CLI key (case-insensitive).
pub fn get_scenario(key: &str) -> Option<TestScenario> {
    let key = key.trim().to_lowercase();
    catalog::ENTRIES
        .iter()
        .find(|entry| entry.key == key)
        .map(|entry| TestScenario::simulation(entry.title, (entry.plan)()))
}

/// `(key, description)` for every registered scenario.
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog::ENTRIES
        .iter()
        .map(|entry| (entry.key, entry.description))
        .collect()
}

/// Every scenario key, in catalog order.
pub fn all_scenario_keys() -> Vec<String> {
    catalog::ENTRIES
        .iter()
        .map(|entry| entry.key.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, description) in list_scenarios() {
            assert!(!description.is_empty());
            let scenario = get_scenario(key).unwrap_or_else(|| panic!("{key} should resolve"));
            assert!(!scenario.name.is_empty());
        }
        assert!(get_scenario("SMOKE").is_some());
        assert!(get_scenario("no-such-scenario").is_none());
    }
}
