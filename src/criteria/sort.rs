//! Sort keys.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
    /// No explicit direction; the database default applies.
    #[default]
    None,
}

impl Direction {
    /// `asc`/`desc` in any case; everything else is [`Direction::None`].
    pub fn parse(token: &str) -> Direction {
        match token.to_ascii_uppercase().as_str() {
            "ASC" => Direction::Asc,
            "DESC" => Direction::Desc,
            _ => Direction::None,
        }
    }

    pub fn as_sql(self) -> Option<&'static str> {
        match self {
            Direction::Asc => Some("ASC"),
            Direction::Desc => Some("DESC"),
            Direction::None => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: Direction,
}

impl Sort {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Sort {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Sort::new(field, Direction::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Sort::new(field, Direction::Desc)
    }
}
