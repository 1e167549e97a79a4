pub mod mdp;
pub mod helper_methods;
pub mod parser;
pub mod classify;
pub mod solver_api;
pub mod graph;
pub mod scheduling;
