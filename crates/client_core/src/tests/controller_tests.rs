use super::*;
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use shared::{error::ErrorCode, protocol::MovieCatalog};

use crate::{
    dialog::MissingEditDialog,
    error::ADD_MOVIE_VALIDATION_MESSAGE,
    source::parse_catalog,
    view::{ListView, SnapshotSurface, EMPTY_LIST_PLACEHOLDER},
};

const DUNE_DOCUMENT: &str =
    r#"{"movies":[{"id":1,"title":"Dune","year":2021,"genre":"Sci-Fi"}]}"#;

const THREE_MOVIES: &str = r#"{"movies":[
    {"id":1,"title":"Dune","year":2021,"genre":"Sci-Fi"},
    {"id":2,"title":"Heat","year":1995,"genre":"Crime"},
    {"id":3,"title":"Arrival","year":2016,"genre":"Drama"}
]}"#;

struct StaticSource {
    body: &'static str,
}

#[async_trait]
impl MovieSource for StaticSource {
    async fn fetch(&self) -> Result<MovieCatalog, MovieSourceError> {
        parse_catalog(self.body)
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

#[derive(Default)]
struct ScriptedDialog {
    answers: Mutex<VecDeque<Option<String>>>,
    asked: Mutex<Vec<(EditField, String)>>,
}

impl ScriptedDialog {
    fn answering(answers: &[Option<&str>]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().map(|a| a.map(str::to_string)).collect()),
            asked: Mutex::new(Vec::new()),
        })
    }

    fn asked(&self) -> Vec<(EditField, String)> {
        self.asked.lock().expect("asked lock").clone()
    }
}

#[async_trait]
impl EditDialog for ScriptedDialog {
    async fn ask(&self, field: EditField, current: &str) -> Option<String> {
        self.asked
            .lock()
            .expect("asked lock")
            .push((field, current.to_string()));
        self.answers
            .lock()
            .expect("answers lock")
            .pop_front()
            .flatten()
    }
}

fn controller_with(
    body: &'static str,
    dialog: Arc<dyn EditDialog>,
) -> MovieListController<SnapshotSurface> {
    MovieListController::new(
        Arc::new(StaticSource { body }),
        dialog,
        SnapshotSurface::default(),
    )
    .with_clock(|| 1_700_000_000_000)
}

async fn loaded(body: &'static str) -> MovieListController<SnapshotSurface> {
    let mut controller = controller_with(body, Arc::new(MissingEditDialog));
    controller.load().await.expect("load");
    controller
}

fn shown(controller: &MovieListController<SnapshotSurface>) -> &ListView {
    controller.surface().view.as_ref().expect("rendered view")
}

fn headings(controller: &MovieListController<SnapshotSurface>) -> Vec<String> {
    shown(controller)
        .rows()
        .iter()
        .map(|row| row.heading.clone())
        .collect()
}

#[tokio::test]
async fn starts_loading_and_renders_nothing_before_fetch() {
    let controller = controller_with(DUNE_DOCUMENT, Arc::new(MissingEditDialog));
    assert_eq!(controller.state(), &ControllerState::Loading);
    assert!(controller.surface().view.is_none());
    assert!(controller.movies().is_empty());
}

#[tokio::test]
async fn load_success_transitions_to_ready_and_renders() {
    let controller = loaded(DUNE_DOCUMENT).await;

    assert_eq!(controller.state(), &ControllerState::Ready);
    let rows = shown(&controller).rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].heading, "Dune (2021)");
    assert_eq!(rows[0].genre, "Sci-Fi");
    assert_eq!(rows[0].id, MovieId(1));
}

#[tokio::test]
async fn load_failure_shows_reason_and_keeps_collection_empty() {
    let mut controller = controller_with("<html>not json</html>", Arc::new(MissingEditDialog));

    let err = controller.load().await.expect_err("malformed body");
    assert!(matches!(err, MovieSourceError::Malformed(_)));

    let ControllerState::Error(message) = controller.state() else {
        panic!("expected error state, got {:?}", controller.state());
    };
    assert!(message.starts_with("Failed to load movies: "));

    let shown_error = controller.surface().error.as_ref().expect("error shown");
    assert_eq!(shown_error.code, ErrorCode::Malformed);
    assert_eq!(&shown_error.message, message);
    assert!(controller.movies().is_empty());
    assert!(controller.surface().view.is_none());
}

#[tokio::test]
async fn missing_movies_field_is_a_load_failure() {
    let mut controller = controller_with(r#"{"films":[]}"#, Arc::new(MissingEditDialog));
    assert!(controller.load().await.is_err());
    assert!(matches!(controller.state(), ControllerState::Error(_)));
}

#[tokio::test]
async fn records_without_ids_get_sequential_ids_after_the_largest() {
    let controller = loaded(
        r#"{"movies":[
            {"title":"Heat","year":1995,"genre":"Crime"},
            {"id":10,"title":"Dune","year":2021,"genre":"Sci-Fi"},
            {"id":10,"title":"Alien","year":1979,"genre":"Horror"},
            {"title":"Arrival","year":2016,"genre":"Drama"}
        ]}"#,
    )
    .await;

    let ids: Vec<i64> = controller.movies().iter().map(|m| m.id.0).collect();
    assert_eq!(ids, vec![11, 10, 12, 13]);
}

#[tokio::test]
async fn empty_collection_renders_placeholder() {
    let controller = loaded(r#"{"movies":[]}"#).await;
    assert_eq!(shown(&controller), &ListView::Placeholder(EMPTY_LIST_PLACEHOLDER));
}

#[tokio::test]
async fn filter_matches_title_or_genre_ignoring_case() {
    let mut controller = loaded(THREE_MOVIES).await;

    controller.filter("HEA");
    assert_eq!(headings(&controller), vec!["Heat (1995)"]);

    controller.filter("sci-fi");
    assert_eq!(headings(&controller), vec!["Dune (2021)"]);

    controller.filter("r");
    assert_eq!(headings(&controller), vec!["Heat (1995)", "Arrival (2016)"]);
    assert_eq!(controller.filter_term(), "r");
}

#[tokio::test]
async fn filter_never_mutates_the_collection() {
    let mut controller = loaded(THREE_MOVIES).await;
    let before = controller.movies().to_vec();

    controller.filter("xyz");
    assert!(shown(&controller).is_placeholder());
    assert_eq!(controller.movies(), before.as_slice());

    controller.filter("");
    assert_eq!(headings(&controller).len(), 3);
}

#[tokio::test]
async fn add_rejects_blank_title_for_any_year() {
    let mut controller = loaded(DUNE_DOCUMENT).await;

    for year in ["2016", "abc", ""] {
        let err = controller
            .add(&MovieForm::new("   ", "Drama", year))
            .expect_err("blank title");
        assert_eq!(err, AddMovieError::EmptyTitle);
    }

    assert_eq!(controller.movies().len(), 1);
    let shown_error = controller.surface().error.as_ref().expect("validation shown");
    assert_eq!(shown_error.message, ADD_MOVIE_VALIDATION_MESSAGE);
    assert_eq!(controller.surface().form_resets, 0);
}

#[tokio::test]
async fn add_rejects_non_numeric_year() {
    let mut controller = loaded(DUNE_DOCUMENT).await;

    for year in ["abc", "", "20x6", "1.5"] {
        let err = controller
            .add(&MovieForm::new("Arrival", "Drama", year))
            .expect_err("bad year");
        assert_eq!(err, AddMovieError::InvalidYear);
    }
    assert_eq!(controller.movies().len(), 1);
}

#[tokio::test]
async fn add_defaults_empty_genre_and_clears_form_and_error() {
    let mut controller = loaded(DUNE_DOCUMENT).await;
    controller
        .add(&MovieForm::new("", "", "1999"))
        .expect_err("blank title");
    assert!(controller.surface().error.is_some());

    let id = controller
        .add(&MovieForm::new("  Arrival ", "  ", " 2016 "))
        .expect("valid movie");

    let added = controller.find(id).expect("added movie");
    assert_eq!(added.title, "Arrival");
    assert_eq!(added.genre, "Unknown");
    assert_eq!(added.year, 2016);
    assert_eq!(id, MovieId(1_700_000_000_000));

    assert!(controller.surface().error.is_none());
    assert_eq!(controller.surface().form_resets, 1);
    assert_eq!(headings(&controller), vec!["Dune (2021)", "Arrival (2016)"]);
}

#[tokio::test]
async fn add_renders_full_list_even_while_filtered() {
    let mut controller = loaded(THREE_MOVIES).await;
    controller.filter("dune");
    assert_eq!(headings(&controller).len(), 1);

    controller
        .add(&MovieForm::new("Alien", "Horror", "1979"))
        .expect("valid movie");
    assert_eq!(headings(&controller).len(), 4);
}

#[tokio::test]
async fn ids_stay_unique_when_adds_share_a_millisecond() {
    let mut controller = loaded(DUNE_DOCUMENT).await;

    let first = controller
        .add(&MovieForm::new("Alien", "Horror", "1979"))
        .expect("first");
    let second = controller
        .add(&MovieForm::new("Aliens", "Action", "1986"))
        .expect("second");

    assert_eq!(first, MovieId(1_700_000_000_000));
    assert_eq!(second, MovieId(1_700_000_000_001));
}

#[tokio::test]
async fn delete_of_unknown_id_leaves_collection_unchanged() {
    let mut controller = loaded(THREE_MOVIES).await;
    let before = controller.movies().to_vec();

    assert!(!controller.delete(MovieId(99)));
    assert_eq!(controller.movies(), before.as_slice());
    assert_eq!(headings(&controller).len(), 3);
}

#[tokio::test]
async fn delete_removes_movie_and_renders_full_list() {
    let mut controller = loaded(THREE_MOVIES).await;
    controller.filter("heat");

    assert!(controller.delete(MovieId(2)));
    assert_eq!(headings(&controller), vec!["Dune (2021)", "Arrival (2016)"]);
    assert!(controller.find(MovieId(2)).is_none());
}

#[tokio::test]
async fn edit_of_unknown_id_asks_nothing() {
    let dialog = ScriptedDialog::answering(&[Some("x"), Some("2000"), Some("y")]);
    let mut controller = controller_with(DUNE_DOCUMENT, dialog.clone());
    controller.load().await.expect("load");
    let renders = controller.surface().renders;

    assert_eq!(controller.edit(MovieId(42)).await, EditOutcome::NotFound);
    assert!(dialog.asked().is_empty());
    assert_eq!(controller.surface().renders, renders);
}

#[tokio::test]
async fn edit_prefills_current_values_and_updates_in_place() {
    let dialog = ScriptedDialog::answering(&[Some("Dune: Part One"), Some("2021"), Some("Sci-Fi")]);
    let mut controller = controller_with(THREE_MOVIES, dialog.clone());
    controller.load().await.expect("load");

    let outcome = controller.edit(MovieId(1)).await;
    let EditOutcome::Updated(movie) = outcome else {
        panic!("expected update, got {outcome:?}");
    };
    assert_eq!(movie.id, MovieId(1));
    assert_eq!(movie.title, "Dune: Part One");

    assert_eq!(
        dialog.asked(),
        vec![
            (EditField::Title, "Dune".to_string()),
            (EditField::Year, "2021".to_string()),
            (EditField::Genre, "Sci-Fi".to_string()),
        ]
    );
    assert_eq!(controller.movies()[0].title, "Dune: Part One");
    assert_eq!(headings(&controller)[0], "Dune: Part One (2021)");
}

#[tokio::test]
async fn edit_aborts_without_changes_on_cancel_or_invalid_input() {
    let cases: [&[Option<&str>]; 5] = [
        &[None],
        &[Some("   ")],
        &[Some("New"), Some("soon")],
        &[Some("New"), None],
        &[Some("New"), Some("2000"), Some("")],
    ];

    for answers in cases {
        let dialog = ScriptedDialog::answering(answers);
        let mut controller = controller_with(DUNE_DOCUMENT, dialog.clone());
        controller.load().await.expect("load");
        let before = controller.movies().to_vec();

        assert_eq!(controller.edit(MovieId(1)).await, EditOutcome::Aborted);
        assert_eq!(controller.movies(), before.as_slice());
        assert_eq!(dialog.asked().len(), answers.len());
    }
}

#[tokio::test]
async fn end_to_end_dune_scenario() {
    let mut controller = loaded(DUNE_DOCUMENT).await;
    assert_eq!(headings(&controller), vec!["Dune (2021)"]);
    assert_eq!(shown(&controller).rows()[0].genre, "Sci-Fi");

    controller.filter("dune");
    assert_eq!(headings(&controller), vec!["Dune (2021)"]);

    controller.filter("xyz");
    assert!(shown(&controller).is_placeholder());
    assert!(shown(&controller).rows().is_empty());

    controller.delete(MovieId(1));
    assert!(shown(&controller).is_placeholder());

    controller
        .add(&MovieForm::new("Arrival", "", "2016"))
        .expect("add arrival");
    let rows = shown(&controller).rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].heading, "Arrival (2016)");
    assert_eq!(rows[0].genre, "Unknown");
}

/// Serves `first` on the initial fetch and `then` afterwards.
struct SequencedSource {
    first: &'static str,
    then: &'static str,
    calls: AtomicUsize,
}

#[async_trait]
impl MovieSource for SequencedSource {
    async fn fetch(&self) -> Result<MovieCatalog, MovieSourceError> {
        let body = if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.first
        } else {
            self.then
        };
        parse_catalog(body)
    }

    fn describe(&self) -> String {
        "sequenced".to_string()
    }
}

#[tokio::test]
async fn failed_reload_keeps_previously_loaded_movies() {
    let mut controller = MovieListController::new(
        Arc::new(SequencedSource {
            first: THREE_MOVIES,
            then: "<html>gateway timeout</html>",
            calls: AtomicUsize::new(0),
        }),
        Arc::new(MissingEditDialog),
        SnapshotSurface::default(),
    );
    assert_eq!(controller.load().await.expect("first load"), 3);
    let before = controller.movies().to_vec();

    assert!(controller.load().await.is_err());
    assert!(matches!(controller.state(), ControllerState::Error(_)));
    assert_eq!(controller.movies(), before.as_slice());
    assert!(controller.surface().error.is_some());
}

#[tokio::test]
async fn max_id_in_source_loads_when_every_record_has_an_id() {
    let mut controller = loaded(
        r#"{"movies":[{"id":9223372036854775807,"title":"Dune","year":2021,"genre":"Sci-Fi"}]}"#,
    )
    .await;
    assert_eq!(controller.movies()[0].id, MovieId(i64::MAX));

    let err = controller
        .add(&MovieForm::new("Arrival", "", "2016"))
        .expect_err("no id left");
    assert_eq!(err, AddMovieError::IdsExhausted);
    assert_eq!(controller.movies().len(), 1);
    assert!(controller.surface().error.is_some());
    assert_eq!(controller.surface().form_resets, 0);
}

#[tokio::test]
async fn record_without_id_after_max_id_fails_the_load() {
    let mut controller = controller_with(
        r#"{"movies":[
            {"id":9223372036854775807,"title":"Dune","year":2021,"genre":"Sci-Fi"},
            {"title":"Heat","year":1995,"genre":"Crime"}
        ]}"#,
        Arc::new(MissingEditDialog),
    );

    let err = controller.load().await.expect_err("ids exhausted");
    assert!(matches!(err, MovieSourceError::IdsExhausted));
    assert!(matches!(controller.state(), ControllerState::Error(_)));
    assert!(controller.movies().is_empty());
}

#[tokio::test]
async fn last_free_id_is_still_assigned() {
    let controller = loaded(
        r#"{"movies":[
            {"id":9223372036854775806,"title":"Dune","year":2021,"genre":"Sci-Fi"},
            {"title":"Heat","year":1995,"genre":"Crime"}
        ]}"#,
    )
    .await;
    assert_eq!(controller.movies()[1].id, MovieId(i64::MAX));
}

#[test]
fn allocator_stops_after_max() {
    let mut ids = IdAllocator::default();
    ids.observe(MovieId(i64::MAX - 1));
    assert_eq!(ids.next(0), Some(MovieId(i64::MAX)));
    assert_eq!(ids.next(0), None);
}
