//! # Othello RL
//!
//! An Othello (Reversi) environment with rule-based and tabular
//! reinforcement-learning agents.
//!
//! ## Modules
//!
//! - [`game`] — Core game logic: board, player, step-based environment
//! - [`ai`] — Agent trait, random and minimax players, Q-learning with a
//!   compressed state key and a persistent value table
//! - [`training`] — Episode driver, evaluation, metrics, trainer loop
//! - [`checkpoint`] — Versioned persistence of learned tables
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
