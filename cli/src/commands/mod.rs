pub mod cli;
pub mod score;
