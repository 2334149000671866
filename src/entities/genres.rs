use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ordered genre names, persisted as a JSON array in a single text column.
///
/// JSON quoting keeps names containing commas (or any other separator) intact,
/// so a stored value always splits back into exactly the genres that went in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct Genres(pub Vec<String>);

impl Genres {
    /// Builds the list from submitted form values, dropping blank entries.
    pub fn from_form(values: Vec<String>) -> Self {
        Self(
            values
                .into_iter()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .collect(),
        )
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_form_drops_blank_values() {
        let genres = Genres::from_form(vec![
            "Jazz".to_string(),
            "  ".to_string(),
            " Rock ".to_string(),
        ]);
        assert_eq!(genres.0, ["Jazz", "Rock"]);
    }

    #[test]
    fn genre_containing_comma_survives_serialization() {
        let genres = Genres(vec!["Rock, Roll".to_string(), "Blues".to_string()]);
        let stored = serde_json::to_string(&genres).unwrap();
        let restored: Genres = serde_json::from_str(&stored).unwrap();

        assert_eq!(restored.into_vec(), vec!["Rock, Roll", "Blues"]);
    }
}
