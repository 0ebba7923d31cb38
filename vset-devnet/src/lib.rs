pub mod mock_chain;

use anyhow::Result;
use lazy_static::lazy_static;
use serde::Deserialize;
use std::collections::HashMap;

pub use mock_chain::{native_validators_hash, ChainSpec, MockChain, ScheduledSet};

pub const SCENARIOS_JSON: &str = include_str!("../scenarios.json");

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioSpec {
    pub provider: ChainSpec,
    pub consumer: ChainSpec,
}

lazy_static! {
    pub static ref SCENARIOS: HashMap<String, ScenarioSpec> = {
        serde_json::from_str(SCENARIOS_JSON).expect("Failed to parse static scenarios.json")
    };
}

/// A provider and one consumer, ready to be queried.
pub struct Scenario {
    pub provider: MockChain,
    pub consumer: MockChain,
    pub spec: ScenarioSpec,
}

pub struct Devnet;

impl Devnet {
    pub fn new() -> Self {
        Self
    }

    pub fn scenario_names(&self) -> Vec<String> {
        let mut names: Vec<String> = SCENARIOS.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn scenario_spec(&self, name: &str) -> Result<ScenarioSpec> {
        SCENARIOS
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown devnet scenario {}", name))
    }

    pub fn scenario(&self, name: &str) -> Result<Scenario> {
        let spec = self.scenario_spec(name)?;
        Ok(Scenario {
            provider: MockChain::from_spec(&spec.provider),
            consumer: MockChain::from_spec(&spec.consumer),
            spec,
        })
    }
}

impl Default for Devnet {
    fn default() -> Self {
        Self::new()
    }
}
