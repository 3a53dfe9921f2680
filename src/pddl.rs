pub mod action;
pub mod atom;
pub mod domain;
pub mod grounding;
pub mod problem;
pub mod utils;

mod parser;
