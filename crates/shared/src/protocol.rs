use serde::{Deserialize, Serialize};

use crate::domain::{Movie, MovieId};

/// A movie as it appears in the `movies.json` document. Sources are not
/// required to carry an `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MovieId>,
    pub title: String,
    pub year: i32,
    pub genre: String,
}

impl MovieRecord {
    pub fn into_movie(self, id: MovieId) -> Movie {
        Movie {
            id,
            title: self.title,
            year: self.year,
            genre: self.genre,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieCatalog {
    pub movies: Vec<MovieRecord>,
}
