use serde::{Deserialize, Serialize};

use crate::utils::format_date;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub current_match_day: i32,
    pub logo: Option<String>,
    pub structure: TournamentStructure,
    pub season: Season,
    #[serde(default)]
    pub teams: Vec<Team>,
    pub trophy: Trophy,
    pub created_at: String,
    pub updated_at: String,
}

impl Tournament {
    /// "name - description", matching the tournament list entries
    pub fn display_name(&self) -> String {
        match self.description.as_deref() {
            Some(desc) if !desc.is_empty() => format!("{} - {}", self.name, desc),
            _ => self.name.clone(),
        }
    }

    pub fn date_range(&self) -> String {
        format!(
            "{} → {}",
            format_date(&self.start_date),
            format_date(&self.end_date)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentStructure {
    pub id: i64,
    pub is_cup: bool,
    pub use_groups: bool,
    pub home_and_away: bool,
    pub has_playoff: bool,
    pub has_playout: bool,
    pub relegation_enabled: bool,
    pub relegation_teams: i32,
    pub playoff_teams: i32,
    pub playout_teams: i32,
    pub qualification_spots: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl TournamentStructure {
    pub fn format_display(&self) -> &'static str {
        match (self.is_cup, self.use_groups) {
            (true, true) => "Cup (groups)",
            (true, false) => "Cup",
            (false, _) => "League",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    pub id: i64,
    pub year: i32,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub league: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub owner: Option<TeamOwner>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamOwner {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trophy {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub trophy_img: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub awarded_to: Option<i64>,
}
