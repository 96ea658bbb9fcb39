//! Data models for tournament and player entities.
//!
//! - `Tournament` with its structure, season, teams and trophy
//! - `Player` with person and nationality details

pub mod player;
pub mod tournament;

pub use player::{Continent, Nationality, Person, Player, PlayerRole};
pub use tournament::{Season, Team, TeamOwner, Tournament, TournamentStructure, Trophy};
