//! Decision logic and collaborator contracts for the Launchpad frontend:
//! the access gate in front of every page request, and the score
//! normalizer behind every career ranking.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod portfolio;
pub mod roles;
pub mod score;
