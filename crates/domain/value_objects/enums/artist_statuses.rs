use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArtistStatus {
    #[default]
    Pending,
    Approved,
    Suspended,
}

impl Display for ArtistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ArtistStatus::Pending => "pending",
            ArtistStatus::Approved => "approved",
            ArtistStatus::Suspended => "suspended",
        };
        write!(f, "{}", status)
    }
}

impl ArtistStatus {
    /// Unknown values are treated as `Pending` so they never pass an approval check.
    pub fn from_str(value: &str) -> Self {
        match value {
            "approved" => ArtistStatus::Approved,
            "suspended" => ArtistStatus::Suspended,
            _ => ArtistStatus::Pending,
        }
    }
}
