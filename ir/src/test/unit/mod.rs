pub mod dialect;
pub mod graph;
pub mod printer;
pub mod verifier;
