//! Movie list controller: owns the session's movie collection and keeps the
//! surface in sync with it.

use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use shared::{
    domain::{Movie, MovieId, UNKNOWN_GENRE},
    protocol::MovieRecord,
};
use tracing::{debug, info, warn};

use crate::{
    dialog::{EditDialog, EditField},
    error::{AddMovieError, MovieSourceError},
    source::MovieSource,
    view::{project, ListSurface},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Loading,
    Ready,
    Error(String),
}

/// Raw contents of the add-movie form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieForm {
    pub title: String,
    pub genre: String,
    pub year: String,
}

impl MovieForm {
    pub fn new(title: impl Into<String>, genre: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            genre: genre.into(),
            year: year.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    NotFound,
    Aborted,
    Updated(Movie),
}

/// Hands out timestamp-derived ids that never repeat within a session.
#[derive(Debug, Default)]
struct IdAllocator {
    last: i64,
}

impl IdAllocator {
    fn observe(&mut self, id: MovieId) {
        self.last = self.last.max(id.0);
    }

    /// `None` once `i64::MAX` has been handed out or observed.
    fn next(&mut self, now_millis: i64) -> Option<MovieId> {
        let id = now_millis.max(self.last.checked_add(1)?);
        self.last = id;
        Some(MovieId(id))
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn parse_year(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

/// Turns source records into movies with unique ids. Records without an id,
/// or repeating one already seen, get `max id + 1` in document order.
fn assign_ids(records: Vec<MovieRecord>) -> Result<Vec<Movie>, MovieSourceError> {
    let mut next = records
        .iter()
        .filter_map(|record| record.id)
        .map(|id| id.0)
        .max()
        .unwrap_or(0)
        .checked_add(1);
    let mut seen = HashSet::with_capacity(records.len());
    let mut movies = Vec::with_capacity(records.len());

    for record in records {
        let id = match record.id {
            Some(id) if seen.insert(id) => id,
            duplicate => {
                if let Some(id) = duplicate {
                    warn!(movie_id = %id, "duplicate movie id in source, reassigning");
                }
                let fresh = next.ok_or(MovieSourceError::IdsExhausted)?;
                next = fresh.checked_add(1);
                let id = MovieId(fresh);
                seen.insert(id);
                id
            }
        };
        movies.push(record.into_movie(id));
    }
    Ok(movies)
}

pub struct MovieListController<S: ListSurface> {
    source: Arc<dyn MovieSource>,
    dialog: Arc<dyn EditDialog>,
    surface: S,
    movies: Vec<Movie>,
    state: ControllerState,
    filter_term: String,
    ids: IdAllocator,
    clock: fn() -> i64,
}

impl<S: ListSurface> MovieListController<S> {
    pub fn new(source: Arc<dyn MovieSource>, dialog: Arc<dyn EditDialog>, surface: S) -> Self {
        Self {
            source,
            dialog,
            surface,
            movies: Vec::new(),
            state: ControllerState::Loading,
            filter_term: String::new(),
            ids: IdAllocator::default(),
            clock: now_millis,
        }
    }

    /// Replaces the millisecond clock used for new ids.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn find(&self, id: MovieId) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.id == id)
    }

    pub fn filter_term(&self) -> &str {
        &self.filter_term
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Fetches the movie document once. On failure the error is shown and the
    /// current collection is kept.
    pub async fn load(&mut self) -> Result<usize, MovieSourceError> {
        info!(source = %self.source.describe(), "loading movies");

        let fetched = self
            .source
            .fetch()
            .await
            .and_then(|catalog| assign_ids(catalog.movies));
        match fetched {
            Ok(movies) => {
                self.movies = movies;
                self.ids = IdAllocator::default();
                for movie in &self.movies {
                    self.ids.observe(movie.id);
                }
                self.state = ControllerState::Ready;
                info!(count = self.movies.len(), "movies loaded");
                self.render_all();
                Ok(self.movies.len())
            }
            Err(err) => {
                let error = err.to_api_error();
                warn!(code = ?error.code, "{}", error.message);
                self.state = ControllerState::Error(error.message.clone());
                self.surface.show_error(&error);
                Err(err)
            }
        }
    }

    pub fn render_all(&mut self) {
        self.render(None);
    }

    fn render(&mut self, needle: Option<&str>) {
        let view = match needle {
            Some(needle) => project(
                self.movies
                    .iter()
                    .filter(|movie| movie.matches_lowercase(needle)),
            ),
            None => project(&self.movies),
        };
        debug!(rows = view.rows().len(), "rendering movie list");
        self.surface.render(&view);
    }

    /// Shows movies whose title or genre contains `term`, ignoring case.
    pub fn filter(&mut self, term: &str) {
        self.filter_term = term.to_string();
        let needle = term.to_lowercase();
        self.render(Some(&needle));
    }

    pub fn add(&mut self, form: &MovieForm) -> Result<MovieId, AddMovieError> {
        let title = form.title.trim();
        let genre = form.genre.trim();

        let validated = if title.is_empty() {
            Err(AddMovieError::EmptyTitle)
        } else {
            parse_year(&form.year).ok_or(AddMovieError::InvalidYear)
        };
        let year = match validated {
            Ok(year) => year,
            Err(err) => {
                debug!("rejected new movie: {err}");
                self.surface.show_error(&err.to_api_error());
                return Err(err);
            }
        };

        let Some(id) = self.ids.next((self.clock)()) else {
            let err = AddMovieError::IdsExhausted;
            warn!("rejected new movie: {err}");
            self.surface.show_error(&err.to_api_error());
            return Err(err);
        };
        self.movies.push(Movie {
            id,
            title: title.to_string(),
            year,
            genre: if genre.is_empty() {
                UNKNOWN_GENRE.to_string()
            } else {
                genre.to_string()
            },
        });
        info!(movie_id = %id, "movie added");

        self.render_all();
        self.surface.reset_form();
        self.surface.hide_error();
        Ok(id)
    }

    /// Asks for a new title, year and genre. A cancelled or invalid answer
    /// aborts the whole edit and leaves the movie untouched.
    pub async fn edit(&mut self, id: MovieId) -> EditOutcome {
        let Some(current) = self.find(id).cloned() else {
            return EditOutcome::NotFound;
        };
        let dialog = Arc::clone(&self.dialog);

        let Some(title) = ask_text(dialog.as_ref(), EditField::Title, &current.title).await else {
            debug!(movie_id = %id, "edit aborted at title");
            return EditOutcome::Aborted;
        };
        let Some(year) = dialog
            .ask(EditField::Year, &current.year.to_string())
            .await
            .as_deref()
            .and_then(parse_year)
        else {
            debug!(movie_id = %id, "edit aborted at year");
            return EditOutcome::Aborted;
        };
        let Some(genre) = ask_text(dialog.as_ref(), EditField::Genre, &current.genre).await else {
            debug!(movie_id = %id, "edit aborted at genre");
            return EditOutcome::Aborted;
        };

        let Some(movie) = self.movies.iter_mut().find(|movie| movie.id == id) else {
            return EditOutcome::NotFound;
        };
        movie.title = title;
        movie.year = year;
        movie.genre = genre;
        let updated = movie.clone();
        info!(movie_id = %id, "movie updated");

        self.render_all();
        EditOutcome::Updated(updated)
    }

    /// Removes the movie if present and re-renders the full list either way.
    pub fn delete(&mut self, id: MovieId) -> bool {
        let before = self.movies.len();
        self.movies.retain(|movie| movie.id != id);
        let removed = self.movies.len() != before;
        if removed {
            info!(movie_id = %id, "movie deleted");
        }
        self.render_all();
        removed
    }
}

async fn ask_text(dialog: &dyn EditDialog, field: EditField, current: &str) -> Option<String> {
    let answer = dialog.ask(field, current).await?;
    let trimmed = answer.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
