//! Projection of movies into a displayable list, and the surface it is shown on.

use shared::{
    domain::{Movie, MovieId},
    error::ApiError,
};

/// Shown instead of an empty list.
pub const EMPTY_LIST_PLACEHOLDER: &str = "No movies found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit(MovieId),
    Delete(MovieId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRow {
    pub id: MovieId,
    /// `"<title> (<year>)"`
    pub heading: String,
    pub genre: String,
    pub actions: [RowAction; 2],
}

impl MovieRow {
    pub fn from_movie(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            heading: movie.heading(),
            genre: movie.genre.clone(),
            actions: [RowAction::Edit(movie.id), RowAction::Delete(movie.id)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Placeholder(&'static str),
    Rows(Vec<MovieRow>),
}

impl ListView {
    pub fn rows(&self) -> &[MovieRow] {
        match self {
            Self::Placeholder(_) => &[],
            Self::Rows(rows) => rows,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

pub fn project<'a>(movies: impl IntoIterator<Item = &'a Movie>) -> ListView {
    let rows: Vec<MovieRow> = movies.into_iter().map(MovieRow::from_movie).collect();
    if rows.is_empty() {
        ListView::Placeholder(EMPTY_LIST_PLACEHOLDER)
    } else {
        ListView::Rows(rows)
    }
}

/// Where the controller draws. Every call replaces what was shown before.
pub trait ListSurface {
    fn render(&mut self, view: &ListView);
    fn show_error(&mut self, error: &ApiError);
    fn hide_error(&mut self);
    /// Clears the add-movie form after a successful submission.
    fn reset_form(&mut self);
}

/// Keeps the last frame in memory. Useful for headless hosts.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSurface {
    pub view: Option<ListView>,
    pub error: Option<ApiError>,
    pub renders: usize,
    pub form_resets: usize,
}

impl ListSurface for SnapshotSurface {
    fn render(&mut self, view: &ListView) {
        self.view = Some(view.clone());
        self.renders += 1;
    }

    fn show_error(&mut self, error: &ApiError) {
        self.error = Some(error.clone());
    }

    fn hide_error(&mut self) {
        self.error = None;
    }

    fn reset_form(&mut self) {
        self.form_resets += 1;
    }
}
