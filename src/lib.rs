extern crate serde_json;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

pub mod mdp_core;

pub use mdp_core::classify::{infer_types, validate, StateClass};
pub use mdp_core::graph::{build_graph, Edge, Node, VisualGraph};
pub use mdp_core::mdp::{MdpDefinition, State, StateType};
pub use mdp_core::parser::{classify_line, parse, LineKind};
pub use mdp_core::scheduling::{Debouncer, LatestResponse, RequestTicket};
pub use mdp_core::solver_api::{EdgeRecord, NodeRecord, SolveRequest, SolveResponse, SolverConfig, ValidateResponse};

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("solver error: {0}")]
    Solver(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String)
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn read_mdp_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut text = String::new();
    File::open(path)?.read_to_string(&mut text)?;
    Ok(text)
}

pub fn read_mdp<P: AsRef<Path>>(path: P) -> Result<MdpDefinition> {
    let text = read_mdp_text(path)?;
    Ok(parse(&text))
}

pub fn read_solve_response<P: AsRef<Path>>(path: P) -> Result<SolveResponse> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let u = serde_json::from_reader(reader)?;
    Ok(u)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_io_error() {
        match read_mdp("does/not/exist.txt") {
            Err(Error::Io(_)) => {}
            other => panic!("unexpected: {:?}", other)
        }
    }

    #[test]
    fn reads_demo_definition() {
        let mdp = read_mdp(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/student_mdp.txt")).unwrap();
        let report = validate(&mdp);
        assert!(report.valid, "{:?}", report.errors);
        assert!(mdp.state_count() > 0);
    }

    #[test]
    fn reads_demo_response() {
        let resp = read_solve_response(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/student_response.json"))
            .unwrap()
            .into_result()
            .unwrap();
        let g = build_graph(&resp).unwrap();
        assert_eq!(g.nodes.len(), resp.nodes.as_ref().unwrap().len());
        assert_eq!(g.policy_edges().count(), resp.policy.len());
    }
}
