//! Lobby coordination and analytics engine for a cybersecurity-awareness
//! training application.
//!
//! The crate exposes async services over an abstract persistent store:
//! code-identified training lobbies with a moderator and participants, a
//! lobby lifecycle state machine, a session recorder for completed attempts,
//! pure aggregation over session records, read-only analytics facades,
//! CSV/JSON export views, and a PIN access guard. Rendering, navigation and
//! transport are left to the embedding application.

pub mod catalog;
pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod services;
pub mod state;
