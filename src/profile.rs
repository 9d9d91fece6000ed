use crate::schema::profiles;
use serde::{Deserialize, Serialize};

#[derive(Identifiable, Queryable, Debug, Serialize)]
#[table_name = "profiles"]
pub struct DBProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

/// What the client receives when they request a profile. `full_name` is
/// derived, never stored.
#[derive(Serialize, Debug)]
pub struct ServerProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

impl ServerProfile {
    pub fn new(profile: DBProfile) -> Self {
        let full_name = format!("{} {}", profile.first_name, profile.last_name)
            .trim()
            .to_string();
        ServerProfile {
            id: profile.id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            full_name,
        }
    }
}

/// What the client sends when they update their profile.
#[derive(Deserialize, Debug)]
pub struct ClientProfile<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_both_parts() {
        let profile = DBProfile {
            id: "user-1".into(),
            first_name: "Ida".into(),
            last_name: "Tarbell".into(),
        };
        assert_eq!(ServerProfile::new(profile).full_name, "Ida Tarbell");
    }

    #[test]
    fn full_name_tolerates_missing_last_name() {
        let profile = DBProfile {
            id: "user-2".into(),
            first_name: "Nellie".into(),
            last_name: "".into(),
        };
        assert_eq!(ServerProfile::new(profile).full_name, "Nellie");
    }
}
