use std::collections::HashMap;
use std::fmt;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde::ser::{SerializeMap, SerializeStruct, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateType {
    Decision,
    Chance,
    Terminal
}

impl Default for StateType {
    fn default() -> StateType {
        StateType::Decision
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StateType::Decision => "decision",
            StateType::Chance => "chance",
            StateType::Terminal => "terminal"
        };
        write!(f, "{}", s)
    }
}

/// A named state of the definition. `edges` is ordered; for chance states position `i` lines up
/// with entry `i` of the state's probability vector.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub name: String,
    pub reward: f64,
    pub state_type: StateType,
    pub edges: Vec<String>
}

impl State {
    pub fn new(name: &str) -> State {
        State {
            name: name.to_string(),
            reward: 0.0,
            state_type: StateType::default(),
            edges: vec![]
        }
    }
}

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("State", 3)?;
        st.serialize_field("reward", &self.reward)?;
        st.serialize_field("type", &self.state_type)?;
        st.serialize_field("edges", &self.edges)?;
        st.end()
    }
}

/// States and probability vectors keyed by state name, both kept in definition order.
/// A probability vector may exist for a name with no State record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MdpDefinition {
    states: Vec<State>,
    state_ix: HashMap<String, usize>,
    probabilities: Vec<(String, Vec<f64>)>,
    probability_ix: HashMap<String, usize>
}

impl MdpDefinition {
    pub fn new() -> MdpDefinition {
        MdpDefinition::default()
    }

    /// Returns the state called `name`, inserting a default one at the end if it is absent.
    pub fn ensure_state(&mut self, name: &str) -> &mut State {
        let ix = match self.state_ix.get(name) {
            Some(ix) => *ix,
            None => {
                self.states.push(State::new(name));
                self.state_ix.insert(name.to_string(), self.states.len() - 1);
                self.states.len() - 1
            }
        };
        &mut self.states[ix]
    }

    /// Stores `values` as the probability vector of `name`, replacing any earlier vector.
    pub fn set_probabilities(&mut self, name: &str, values: Vec<f64>) {
        match self.probability_ix.get(name) {
            Some(ix) => self.probabilities[*ix].1 = values,
            None => {
                self.probabilities.push((name.to_string(), values));
                self.probability_ix.insert(name.to_string(), self.probabilities.len() - 1);
            }
        }
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.state_ix.get(name).map(|ix| &self.states[*ix])
    }

    pub fn probabilities(&self, name: &str) -> Option<&[f64]> {
        self.probability_ix.get(name).map(|ix| &self.probabilities[*ix].1[..])
    }

    pub fn contains_state(&self, name: &str) -> bool {
        self.state_ix.contains_key(name)
    }

    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    pub fn probability_vectors(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.probabilities.iter().map(|(name, p)| (name.as_str(), &p[..]))
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.probabilities.is_empty()
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_infinite() {
        if x > 0.0 { write!(f, "Infinity") } else { write!(f, "-Infinity") }
    } else {
        write!(f, "{}", x)
    }
}

/// Renders the definition back into DSL text: reward lines, then edge lines, then probability
/// lines, each group in definition order.
impl fmt::Display for MdpDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for state in self.states.iter() {
            write!(f, "{} = ", state.name)?;
            write_float(f, state.reward)?;
            writeln!(f)?;
        }
        for state in self.states.iter().filter(|x| !x.edges.is_empty()) {
            writeln!(f, "{} : [{}]", state.name, state.edges.iter().join(", "))?;
        }
        for (name, p) in self.probabilities.iter() {
            write!(f, "{} %", name)?;
            for x in p.iter() {
                write!(f, " ")?;
                write_float(f, *x)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Serialize for MdpDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct States<'a>(&'a [State]);
        struct Transitions<'a>(&'a [(String, Vec<f64>)]);

        impl<'a> Serialize for States<'a> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for state in self.0.iter() {
                    map.serialize_entry(&state.name, state)?;
                }
                map.end()
            }
        }

        impl<'a> Serialize for Transitions<'a> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (name, p) in self.0.iter() {
                    map.serialize_entry(name, p)?;
                }
                map.end()
            }
        }

        let mut st = serializer.serialize_struct("MdpDefinition", 2)?;
        st.serialize_field("states", &States(&self.states))?;
        st.serialize_field("transitions", &Transitions(&self.probabilities))?;
        st.end()
    }
}
