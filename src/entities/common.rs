//! Value types shared by several entities.
//!
//! Enumerations are stored as their display strings so the rows read the same way
//! the school staff write them ("P3", "Female").

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary school grade, P1 through P7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Grade {
    /// Primary 1
    #[sea_orm(string_value = "P1")]
    P1,
    /// Primary 2
    #[sea_orm(string_value = "P2")]
    P2,
    /// Primary 3
    #[sea_orm(string_value = "P3")]
    P3,
    /// Primary 4
    #[sea_orm(string_value = "P4")]
    P4,
    /// Primary 5
    #[sea_orm(string_value = "P5")]
    P5,
    /// Primary 6
    #[sea_orm(string_value = "P6")]
    P6,
    /// Primary 7
    #[sea_orm(string_value = "P7")]
    P7,
}

impl Grade {
    /// The grade code as it appears in admission numbers.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::P4 => "P4",
            Self::P5 => "P5",
            Self::P6 => "P6",
            Self::P7 => "P7",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[allow(missing_docs)]
pub enum Gender {
    #[sea_orm(string_value = "Male")]
    Male,
    #[sea_orm(string_value = "Female")]
    Female,
}

/// A list of short strings (subjects, class codes) persisted as a JSON array
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StringList(pub Vec<String>);

impl StringList {
    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the list holds nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `value` is one of the entries
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|entry| entry == value)
    }
}

impl From<Vec<String>> for StringList {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl<'a> From<Vec<&'a str>> for StringList {
    fn from(value: Vec<&'a str>) -> Self {
        Self(value.into_iter().map(String::from).collect())
    }
}
