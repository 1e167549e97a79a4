//! Request and response shapes of the external `/solve` and `/validate` endpoints.
use std::collections::{BTreeMap, HashMap};
use serde::{Deserialize, Serialize};
use super::mdp::StateType;
use crate::{Error, Result};

/// Solver parameters sent alongside the definition text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub discount_factor: f64,
    pub tolerance: f64,
    pub minimize: bool,
    pub max_iterations: Option<u32>
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            discount_factor: 1.0,
            tolerance: 0.01,
            minimize: false,
            max_iterations: Some(100)
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.discount_factor > 0.0 && self.discount_factor <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "discount factor must be in (0, 1], got {}", self.discount_factor)));
        }
        if !(self.tolerance > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be positive, got {}", self.tolerance)));
        }
        if self.max_iterations == Some(0) {
            return Err(Error::InvalidConfig("max iterations must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    #[serde(alias = "text_input")]
    pub input: String,
    pub discount_factor: f64,
    pub tolerance: f64,
    pub minimize: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u32>
}

impl SolveRequest {
    pub fn new(input: &str, config: &SolverConfig) -> Result<SolveRequest> {
        config.validate()?;
        Ok(SolveRequest {
            input: input.to_string(),
            discount_factor: config.discount_factor,
            tolerance: config.tolerance,
            minimize: config.minimize,
            max_iterations: config.max_iterations
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub value: f64,
    pub reward: f64,
    #[serde(rename = "type")]
    pub state_type: StateType,
    #[serde(default)]
    pub success_rate: Option<f64>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    pub probability: f64
}

/// Both the success and the failure shapes of a solve response. Only `success` is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveResponse {
    pub success: bool,
    #[serde(default)]
    pub policy: HashMap<String, String>,
    #[serde(default)]
    pub values: HashMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<BTreeMap<String, NodeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<EdgeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>
}

impl SolveResponse {
    pub fn into_result(self) -> Result<SolveResponse> {
        if self.success {
            Ok(self)
        } else {
            let msg = self.error
                .or(self.message)
                .unwrap_or_else(|| "solver reported failure".to_string());
            Err(Error::Solver(msg))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_nodes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chance_nodes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_nodes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>
}
