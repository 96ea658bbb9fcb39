use serde::{Deserialize, Serialize};

use crate::utils::format_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerRole {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl PlayerRole {
    /// Parse the single-letter role code used by the API
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P" => Some(PlayerRole::Goalkeeper),
            "D" => Some(PlayerRole::Defender),
            "C" => Some(PlayerRole::Midfielder),
            "A" => Some(PlayerRole::Forward),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlayerRole::Goalkeeper => "Portiere",
            PlayerRole::Defender => "Difensore",
            PlayerRole::Midfielder => "Centrocampista",
            PlayerRole::Forward => "Attaccante",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Continent {
    pub id: i64,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nationality {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub continent: Continent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub main_nationality_info: Option<Nationality>,
    #[serde(default)]
    pub other_nationalities_info: Vec<Nationality>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub person: Person,
    pub main_role: Option<String>,
    pub overall: i32,
    pub fanta_value: f64,
    pub value: f64,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.person.name, self.person.surname)
    }

    pub fn role(&self) -> Option<PlayerRole> {
        self.main_role.as_deref().and_then(PlayerRole::from_code)
    }

    /// Role label; unknown codes are shown as-is
    pub fn role_display(&self) -> String {
        match (self.role(), self.main_role.as_deref()) {
            (Some(role), _) => role.label().to_string(),
            (None, Some(code)) => code.to_string(),
            (None, None) => String::new(),
        }
    }

    pub fn birth_date_display(&self) -> String {
        self.person
            .birth_date
            .as_deref()
            .map(format_date)
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn nationality_display(&self) -> &str {
        self.person
            .main_nationality_info
            .as_ref()
            .map(|n| n.name.as_str())
            .unwrap_or("N/A")
    }

    pub fn other_nationalities_display(&self) -> String {
        if self.person.other_nationalities_info.is_empty() {
            "Nessuna".to_string()
        } else {
            self.person
                .other_nationalities_info
                .iter()
                .map(|n| n.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}
