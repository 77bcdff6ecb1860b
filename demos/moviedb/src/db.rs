use crate::model::*;
use reconbit::*;
use std::sync::Arc;

/// Movies with their cast, plus the people the cast refers to.
pub struct MovieDb {
    storage: Arc<Storage>,
    movies: MasterPipeline<Movie>,
    cast: Arc<DetailTable<MovieCast>>,
}

impl MovieDb {
    pub fn open(storage: Arc<Storage>) -> Result<Self, AppError> {
        let cast = Arc::new(DetailTable::new(cast_descriptor(), &MOVIES));
        let relation = DetailRelation::from_table(Arc::clone(&cast), Movie::cast_list_mut);
        Self::open_with(storage, cast, relation)
    }

    /// Same tables, but the cast relation is supplied by the caller, e.g. one routed through another service.
    pub fn open_with(
        storage: Arc<Storage>,
        cast: Arc<DetailTable<MovieCast>>,
        relation: DetailRelation<Movie, MovieCast>,
    ) -> Result<Self, AppError> {
        let tx = storage.begin_write()?;
        PEOPLE.ensure(&tx)?;
        MOVIES.ensure(&tx)?;
        cast.ensure(&tx)?;
        tx.commit()?;
        let movies = MasterPipeline::new(Arc::clone(&storage), MOVIES).register(relation);
        info!("Movie db ready with stages {:?}", movies.behavior_names());
        Ok(MovieDb { storage, movies, cast })
    }

    pub fn save_person(&self, person: Person) -> Result<Person, AppError> {
        let tx = self.storage.begin_write()?;
        let saved = if person.id.is_none() { PEOPLE.insert(&tx, person)? } else { PEOPLE.update(&tx, person)? };
        tx.commit()?;
        Ok(saved)
    }

    pub fn get_person(&self, id: PersonId) -> Result<Option<Person>, AppError> {
        let tx = self.storage.begin_read()?;
        PEOPLE.get_in(TxView::Read(&tx), id)
    }

    pub fn save_movie(&self, movie: Movie) -> Result<Movie, AppError> {
        self.movies.save(movie)
    }

    pub fn get_movie(&self, id: MasterId) -> Result<Option<Movie>, AppError> {
        self.movies.retrieve(id)
    }

    pub fn list_movies(&self) -> Result<Vec<Movie>, AppError> {
        self.movies.list()
    }

    pub fn delete_movie(&self, id: MasterId) -> Result<(), AppError> {
        self.movies.delete(id)
    }

    /// Cast rows as stored, without joined fields.
    pub fn cast_rows(&self, movie_id: MasterId) -> Result<Vec<MovieCast>, AppError> {
        let tx = self.storage.begin_read()?;
        self.cast.list_by_master(TxView::Read(&tx), movie_id, &[])
    }
}
