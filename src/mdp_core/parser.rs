//! Line-oriented MDP definition text.
//!
//! ```text
//! StateName = <float>                 reward
//! StateName : [Succ1, Succ2, ...]     ordered outgoing edges, brackets optional
//! StateName % <float> <float> ...     probability vector aligned to the edge list
//! ```
//!
//! Lines are classified by the first delimiter test that succeeds, in the order `=`, `:`, `%`.
//! Anything else is ignored. Parsing is best effort and never fails: unreadable numbers become
//! NaN and are reported later by validation.
use regex::Regex;
use tracing::{debug, trace};
use super::helper_methods::parse_float_or_nan;
use super::mdp::MdpDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Reward,
    Edge,
    Probability,
    Ignored
}

pub fn classify_line(line: &str) -> LineKind {
    if line.contains('=') {
        LineKind::Reward
    } else if line.contains(':') {
        LineKind::Edge
    } else if line.contains('%') {
        LineKind::Probability
    } else {
        LineKind::Ignored
    }
}

fn whitespace() -> &'static Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

fn split_at_delimiter(line: &str, delimiter: char) -> (&str, &str) {
    match line.split_once(delimiter) {
        Some((name, rest)) => (name.trim(), rest.trim()),
        None => (line.trim(), "")
    }
}

fn parse_reward_line(mdp: &mut MdpDefinition, line: &str) {
    let (name, reward) = split_at_delimiter(line, '=');
    mdp.ensure_state(name).reward = parse_float_or_nan(reward);
}

fn parse_edge_line(mdp: &mut MdpDefinition, line: &str) {
    let (name, edges) = split_at_delimiter(line, ':');
    let edges = edges.strip_prefix('[').unwrap_or(edges);
    let edges = edges.strip_suffix(']').unwrap_or(edges);
    let successors: Vec<String> = edges.split(',').map(|x| x.trim().to_string()).collect();
    mdp.ensure_state(name).edges = successors;
}

/// Probability lines never create a state record.
fn parse_probability_line(mdp: &mut MdpDefinition, line: &str) {
    let (name, probabilities) = split_at_delimiter(line, '%');
    let p: Vec<f64> = whitespace().split(probabilities).map(parse_float_or_nan).collect();
    mdp.set_probabilities(name, p);
}

/// Builds a fresh definition from `text`. Repeated keys are last-write-wins per field.
pub fn parse(text: &str) -> MdpDefinition {
    let mut mdp = MdpDefinition::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let kind = classify_line(line);
        trace!(line = i + 1, kind = ?kind, "classified line");
        match kind {
            LineKind::Reward => parse_reward_line(&mut mdp, line),
            LineKind::Edge => parse_edge_line(&mut mdp, line),
            LineKind::Probability => parse_probability_line(&mut mdp, line),
            LineKind::Ignored => {}
        }
    }
    debug!(states = mdp.state_count(), "parsed definition");
    mdp
}
