use moviedb::*;
use reconbit::*;
use std::collections::BTreeSet;
use std::sync::Arc;

const PEOPLE_NAMES: [(&str, &str); 15] = [
    ("Sandra", "Bullock"),
    ("Dennis", "Hopper"),
    ("Jeff", "Daniels"),
    ("Joe", "Morton"),
    ("Alan", "Ruck"),
    ("Glenn", "Plummer"),
    ("Richard", "Lineback"),
    ("Beth", "Grant"),
    ("Hawthorne", "James"),
    ("Carlos", "Carrasco"),
    ("Keanu", "Reeves"),
    ("Laurence", "Fishburne"),
    ("Carrie-Anne", "Moss"),
    ("Hugo", "Weaving"),
    ("Gloria", "Foster"),
];

fn seed_people(db: &MovieDb) -> Vec<Person> {
    PEOPLE_NAMES
        .iter()
        .map(|(first, last)| db.save_person(Person::new(first, last)).expect("Failed to save person"))
        .collect()
}

fn ids(cast: &[MovieCast]) -> Vec<u32> {
    cast.iter().map(|c| c.id.expect("cast row without id").0).collect()
}

/// Speed takes cast ids 1..=10 so The Matrix (movie 2) ends up with cast ids 11, 12 and 13.
fn speed_and_matrix(db: &MovieDb) -> Movie {
    let people = seed_people(db);
    let speed_cast = people[..10].iter().map(|p| MovieCast::new(p.id.unwrap(), "Passenger")).collect();
    let speed = db.save_movie(Movie::new("Speed").with_cast(speed_cast)).expect("Failed to save Speed");
    assert_eq!(speed.id, Some(MasterId(1)));

    let matrix = Movie::new("The Matrix").with_cast(vec![
        MovieCast::new(PersonId(11), "Neo"),
        MovieCast::new(PersonId(12), "Morpheus"),
        MovieCast::new(PersonId(13), "Trinity"),
    ]);
    let matrix = db.save_movie(matrix).expect("Failed to save The Matrix");
    assert_eq!(matrix.id, Some(MasterId(2)));
    assert_eq!(ids(matrix.cast_list.as_ref().unwrap()), vec![11, 12, 13]);
    matrix
}

fn open_db() -> MovieDb {
    MovieDb::open(random_storage()).expect("Failed to open movie db")
}

#[test]
fn update_deletes_creates_and_updates_cast() {
    let db = open_db();
    let matrix = speed_and_matrix(&db);
    let mut cast = matrix.cast_list.clone().unwrap();
    cast.truncate(2);
    cast[1].character = "Morpheus2".to_string();
    cast.push(MovieCast::new(PersonId(14), "Agent Smith"));

    let saved = db.save_movie(Movie { cast_list: Some(cast), ..matrix }).unwrap();
    let saved_cast = saved.cast_list.unwrap();
    assert_eq!(ids(&saved_cast), vec![11, 12, 14]);
    assert!(saved_cast.iter().all(|c| c.movie_id == Some(MasterId(2))));

    let rows = db.cast_rows(MasterId(2)).unwrap();
    assert_eq!(ids(&rows), vec![11, 12, 14]);
    assert_eq!(rows[0].character, "Neo");
    assert_eq!(rows[1].character, "Morpheus2");
    assert_eq!(rows[2].person_id, PersonId(14));
    assert_eq!(rows[2].movie_id, Some(MasterId(2)));
    assert_eq!(db.cast_rows(MasterId(1)).unwrap().len(), 10);
}

#[test]
fn retrieve_joins_person_fullname() {
    let db = open_db();
    speed_and_matrix(&db);

    let matrix = db.get_movie(MasterId(2)).unwrap().expect("The Matrix is gone");
    let names: Vec<_> = matrix.cast_list.unwrap().into_iter().map(|c| c.person_fullname).collect();
    assert_eq!(
        names,
        vec![Some("Keanu Reeves".to_string()), Some("Laurence Fishburne".to_string()), Some("Carrie-Anne Moss".to_string())]
    );
    assert!(db.cast_rows(MasterId(2)).unwrap().iter().all(|c| c.person_fullname.is_none()));
}

#[test]
fn retrieve_follows_renamed_person() {
    let db = open_db();
    speed_and_matrix(&db);
    let mut keanu = db.get_person(PersonId(11)).unwrap().unwrap();
    keanu.firstname = "K.".to_string();
    db.save_person(keanu).unwrap();

    let matrix = db.get_movie(MasterId(2)).unwrap().unwrap();
    assert_eq!(matrix.cast_list.unwrap()[0].person_fullname.as_deref(), Some("K. Reeves"));
}

#[test]
fn round_trip_returns_assigned_ids() {
    let db = open_db();
    let people = seed_people(&db);
    let cast = people[10..13].iter().map(|p| MovieCast::new(p.id.unwrap(), "Role")).collect();
    let saved = db.save_movie(Movie::new("The Matrix Reloaded").with_cast(cast)).unwrap();

    let assigned: BTreeSet<u32> = ids(saved.cast_list.as_ref().unwrap()).into_iter().collect();
    let loaded = db.get_movie(saved.id.unwrap()).unwrap().unwrap();
    let retrieved: BTreeSet<u32> = ids(loaded.cast_list.as_ref().unwrap()).into_iter().collect();
    assert_eq!(assigned, retrieved);
    assert_eq!(loaded.title, "The Matrix Reloaded");
}

#[test]
fn new_movie_with_two_new_rows_links_both() {
    let db = open_db();
    let people = seed_people(&db);
    let movie = Movie::new("John Wick").with_cast(vec![
        MovieCast::new(people[10].id.unwrap(), "John Wick"),
        MovieCast::new(people[13].id.unwrap(), "Viggo"),
    ]);
    let saved = db.save_movie(movie).unwrap();
    let movie_id = saved.id.unwrap();

    let rows = db.cast_rows(movie_id).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|c| c.movie_id == Some(movie_id)));
}

#[test]
fn empty_list_removes_every_row() {
    let db = open_db();
    let matrix = speed_and_matrix(&db);

    let saved = db.save_movie(Movie { cast_list: Some(Vec::new()), ..matrix }).unwrap();
    assert_eq!(saved.cast_list, Some(Vec::new()));
    assert!(db.cast_rows(MasterId(2)).unwrap().is_empty());
    assert_eq!(db.cast_rows(MasterId(1)).unwrap().len(), 10);
}

#[test]
fn absent_list_leaves_cast_alone() {
    let db = open_db();
    let matrix = speed_and_matrix(&db);

    let renamed = Movie { title: "Matrix".to_string(), year: Some(1999), cast_list: None, ..matrix };
    let saved = db.save_movie(renamed).unwrap();
    assert!(saved.cast_list.is_none());
    assert_eq!(ids(&db.cast_rows(MasterId(2)).unwrap()), vec![11, 12, 13]);
    let loaded = db.get_movie(MasterId(2)).unwrap().unwrap();
    assert_eq!(loaded.title, "Matrix");
    assert_eq!(loaded.year, Some(1999));
}

#[test]
fn saving_the_saved_movie_again_changes_nothing() {
    let db = open_db();
    let matrix = speed_and_matrix(&db);

    let again = db.save_movie(matrix.clone()).unwrap();
    assert_eq!(again.cast_list, matrix.cast_list);
    assert_eq!(ids(&db.cast_rows(MasterId(2)).unwrap()), vec![11, 12, 13]);
}

#[test]
fn unknown_or_foreign_ids_become_new_rows() {
    let db = open_db();
    let matrix = speed_and_matrix(&db);
    let mut cast = matrix.cast_list.clone().unwrap();
    cast[0].movie_id = Some(MasterId(1));
    let mut stray = MovieCast::new(PersonId(15), "Oracle");
    stray.id = Some(DetailId(999));
    cast.push(stray);

    let saved = db.save_movie(Movie { cast_list: Some(cast), ..matrix }).unwrap();
    assert_eq!(ids(saved.cast_list.as_ref().unwrap()), vec![11, 12, 13, 14]);
    let rows = db.cast_rows(MasterId(2)).unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|c| c.movie_id == Some(MasterId(2))));
    assert_eq!(db.cast_rows(MasterId(1)).unwrap().len(), 10);
}

#[test]
fn replacing_a_row_frees_its_person_for_a_new_row() {
    let db = open_db();
    let matrix = speed_and_matrix(&db);
    let mut cast = matrix.cast_list.clone().unwrap();
    cast.remove(0);
    cast.push(MovieCast::new(PersonId(11), "Thomas Anderson"));

    let saved = db.save_movie(Movie { cast_list: Some(cast), ..matrix }).unwrap();
    assert_eq!(ids(saved.cast_list.as_ref().unwrap()), vec![12, 13, 14]);
    let rows = db.cast_rows(MasterId(2)).unwrap();
    assert_eq!(rows[2].character, "Thomas Anderson");
}

/// Creates run before updates, so a new row cannot take a person a retained row gives up in the same save.
#[test]
fn new_row_cannot_take_person_released_by_retained_row() {
    let db = open_db();
    let matrix = speed_and_matrix(&db);
    let mut cast = matrix.cast_list.clone().unwrap();
    cast[0].person_id = PersonId(14);
    cast.push(MovieCast::new(PersonId(11), "Thomas Anderson"));

    let err = db.save_movie(Movie { cast_list: Some(cast), ..matrix }).unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation(_)));
    let rows = db.cast_rows(MasterId(2)).unwrap();
    assert_eq!(ids(&rows), vec![11, 12, 13]);
    assert_eq!(rows[0].person_id, PersonId(11));
}

#[test]
fn failing_row_rolls_back_whole_save() {
    let db = open_db();
    let matrix = speed_and_matrix(&db);

    let mut cast = matrix.cast_list.clone().unwrap();
    cast.remove(2);
    cast.push(MovieCast::new(PersonId(12), "Second Morpheus"));
    let clash = db.save_movie(Movie { title: "Clash".to_string(), cast_list: Some(cast), ..matrix.clone() });
    assert!(matches!(clash, Err(AppError::ConstraintViolation(_))));

    let mut cast = matrix.cast_list.clone().unwrap();
    cast[0].character = "N".repeat(CHARACTER_MAX_LEN + 1);
    let too_long = db.save_movie(Movie { cast_list: Some(cast), ..matrix.clone() });
    assert!(matches!(too_long, Err(AppError::Validation(_))));

    let loaded = db.get_movie(MasterId(2)).unwrap().unwrap();
    assert_eq!(loaded.title, "The Matrix");
    assert_eq!(ids(loaded.cast_list.as_ref().unwrap()), vec![11, 12, 13]);
    assert_eq!(loaded.cast_list.unwrap()[0].character, "Neo");
}

#[test]
fn duplicate_ids_are_rejected_without_changes() {
    let db = open_db();
    let matrix = speed_and_matrix(&db);
    let mut cast = matrix.cast_list.clone().unwrap();
    cast[1].id = cast[0].id;

    let err = db.save_movie(Movie { cast_list: Some(cast), ..matrix }).unwrap_err();
    assert!(matches!(err, AppError::DuplicateDetail(DetailId(11))));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(ids(&db.cast_rows(MasterId(2)).unwrap()), vec![11, 12, 13]);
}

#[test]
fn cascade_delete_removes_cast_and_movie() {
    let db = open_db();
    speed_and_matrix(&db);

    db.delete_movie(MasterId(2)).unwrap();
    assert!(db.get_movie(MasterId(2)).unwrap().is_none());
    assert!(db.cast_rows(MasterId(2)).unwrap().is_empty());
    assert_eq!(db.cast_rows(MasterId(1)).unwrap().len(), 10);
    assert_eq!(db.list_movies().unwrap().len(), 1);
    assert!(matches!(db.delete_movie(MasterId(2)), Err(AppError::NotFound(_))));
}

/// Delegates to the cast table but refuses to delete one row.
struct LockedRow {
    table: Arc<DetailTable<MovieCast>>,
    locked: DetailId,
}

impl DetailRowService<MovieCast> for LockedRow {
    fn create(&self, tx: &WriteTransaction, detail: MovieCast) -> Result<MovieCast, AppError> {
        self.table.create(tx, detail)
    }

    fn update(&self, tx: &WriteTransaction, detail: MovieCast) -> Result<MovieCast, AppError> {
        self.table.update(tx, detail)
    }

    fn delete(&self, tx: &WriteTransaction, id: DetailId) -> Result<(), AppError> {
        if id == self.locked {
            return Err(AppError::ConstraintViolation(format!("cast {} is locked", id)));
        }
        self.table.delete(tx, id)
    }
}

#[test]
fn failed_cascade_keeps_movie_and_cast() {
    let cast = Arc::new(DetailTable::new(cast_descriptor(), &MOVIES));
    let locked = Arc::new(LockedRow { table: Arc::clone(&cast), locked: DetailId(12) });
    let relation = DetailRelation::new("MOVIE_CAST", locked, cast.clone(), vec!["person_fullname"], Movie::cast_list_mut);
    let db = MovieDb::open_with(random_storage(), cast, relation).unwrap();
    speed_and_matrix(&db);

    let err = db.delete_movie(MasterId(2)).unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation(_)));
    let matrix = db.get_movie(MasterId(2)).unwrap().expect("delete must not commit");
    assert_eq!(ids(matrix.cast_list.as_ref().unwrap()), vec![11, 12, 13]);
    assert_eq!(matrix.cast_list.unwrap()[0].person_fullname.as_deref(), Some("Keanu Reeves"));
}

#[test]
fn missing_movie_reads_as_none() {
    let db = open_db();
    assert!(db.get_movie(MasterId(7)).unwrap().is_none());
    assert!(db.list_movies().unwrap().is_empty());
}
