//! State-type inference and local pre-flight validation of a parsed definition.
//!
//! The external validator remains authoritative; this reports the same shape so a caller can
//! show problems without a round trip.
use std::collections::HashSet;
use tracing::debug;
use super::helper_methods::sums_to_one;
use super::mdp::{MdpDefinition, State, StateType};
use super::solver_api::ValidateResponse;

#[derive(Debug, Clone, PartialEq)]
pub struct StateClass {
    pub name: String,
    pub state_type: StateType,
    pub success_rate: Option<f64>
}

fn classify_state(state: &State, probabilities: Option<&[f64]>) -> StateClass {
    let (state_type, success_rate) = if state.edges.is_empty() {
        (StateType::Terminal, None)
    } else {
        match probabilities {
            Some(p) if p.len() == 1 => (StateType::Decision, Some(p[0])),
            Some(_) => (StateType::Chance, None),
            None if state.edges.len() != 1 => (StateType::Decision, Some(1.0)),
            None => (StateType::Chance, None)
        }
    };
    StateClass { name: state.name.to_string(), state_type, success_rate }
}

/// Infers the type of every state in definition order.
///
/// * no edges: terminal
/// * a single probability: decision, that probability being the success rate
/// * several probabilities: chance
/// * edges without probabilities: decision with success rate 1, unless there is exactly one edge
pub fn infer_types(mdp: &MdpDefinition) -> Vec<StateClass> {
    mdp.states()
        .map(|s| classify_state(s, mdp.probabilities(&s.name)))
        .collect()
}

pub fn validate(mdp: &MdpDefinition) -> ValidateResponse {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();
    let classes = infer_types(mdp);

    for (state, class) in mdp.states().zip(classes.iter()) {
        if state.reward.is_nan() {
            errors.push(format!("State '{}' has a non-numeric reward", state.name));
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for succ in state.edges.iter() {
            if !mdp.contains_state(succ) {
                errors.push(format!("State '{}' has an edge to undefined state '{}'", state.name, succ));
            }
            if !seen.insert(succ.as_str()) {
                warnings.push(format!("State '{}' lists successor '{}' more than once", state.name, succ));
            }
        }
        let p = match mdp.probabilities(&state.name) {
            Some(p) => p,
            None => continue
        };
        if p.iter().any(|x| x.is_nan()) {
            errors.push(format!("State '{}' has a non-numeric probability", state.name));
            continue;
        }
        match class.state_type {
            StateType::Terminal => {
                errors.push(format!("Terminal state '{}' must not have probabilities", state.name));
            }
            StateType::Decision => {
                let rate = p[0];
                if !(0.0..=1.0).contains(&rate) {
                    errors.push(format!("State '{}' has success rate {} outside [0, 1]", state.name, rate));
                }
                if state.edges.len() == 1 {
                    errors.push(format!("State '{}' has a success rate but only one edge", state.name));
                }
            }
            StateType::Chance => {
                if p.len() != state.edges.len() {
                    errors.push(format!("State '{}' has {} probabilities for {} edges",
                                        state.name, p.len(), state.edges.len()));
                } else if !sums_to_one(p) {
                    errors.push(format!("The probabilities of state '{}' must add up to 1", state.name));
                }
            }
        }
    }

    for (name, _) in mdp.probability_vectors().filter(|(n, _)| !mdp.contains_state(n)) {
        errors.push(format!("Probabilities given for undefined state '{}'", name));
    }

    let count = |t: StateType| classes.iter().filter(|x| x.state_type == t).count();
    let valid = errors.is_empty();
    let message = if valid {
        "Input is valid".to_string()
    } else {
        format!("Found {} error(s)", errors.len())
    };
    debug!(valid, errors = errors.len(), warnings = warnings.len(), "validated definition");
    ValidateResponse {
        valid,
        nodes: Some(mdp.state_count()),
        decision_nodes: Some(count(StateType::Decision)),
        chance_nodes: Some(count(StateType::Chance)),
        terminal_nodes: Some(count(StateType::Terminal)),
        message: Some(message),
        errors,
        warnings
    }
}
