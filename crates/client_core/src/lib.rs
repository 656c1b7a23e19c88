//! Client-side movie list: origin resolution, loading, filtering and
//! in-memory editing of a movie collection.

pub mod controller;
pub mod dialog;
pub mod error;
pub mod origin;
pub mod source;
pub mod view;

pub use controller::{ControllerState, EditOutcome, MovieForm, MovieListController};
pub use dialog::{EditDialog, EditField, MissingEditDialog};
pub use error::{AddMovieError, MovieSourceError, PreferenceError, ADD_MOVIE_VALIDATION_MESSAGE};
pub use origin::{
    resolve_api_base, ApiBase, BaseSource, FilePreferenceStore, MemoryPreferenceStore,
    PreferenceStore, API_BASE_KEY, API_OVERRIDE_PARAM,
};
pub use source::{parse_catalog, FileMovieSource, HttpMovieSource, MovieSource, DEFAULT_DATA_PATH};
pub use view::{ListSurface, ListView, MovieRow, RowAction, SnapshotSurface, EMPTY_LIST_PLACEHOLDER};
