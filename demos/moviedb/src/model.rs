use reconbit::*;

impl_record_id!(PersonId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Person {
    pub id: Option<PersonId>,
    pub firstname: String,
    pub lastname: String,
}

#[derive(Serialize, Deserialize)]
pub struct PersonRow {
    firstname: String,
    lastname: String,
}

impl Person {
    pub fn new(firstname: &str, lastname: &str) -> Self {
        Person { id: None, firstname: firstname.to_string(), lastname: lastname.to_string() }
    }

    pub fn fullname(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

impl Record for Person {
    type Id = PersonId;
    type Row = PersonRow;

    fn id(&self) -> Option<PersonId> {
        self.id
    }
    fn set_id(&mut self, id: Option<PersonId>) {
        self.id = id;
    }
    fn to_row(&self) -> PersonRow {
        PersonRow { firstname: self.firstname.clone(), lastname: self.lastname.clone() }
    }
    fn from_row(id: PersonId, row: PersonRow) -> Self {
        Person { id: Some(id), firstname: row.firstname, lastname: row.lastname }
    }
}

/// Master record. `cast_list` is `None` when the client did not send one, which leaves the cast untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Movie {
    pub id: Option<MasterId>,
    pub title: String,
    pub description: Option<String>,
    pub storyline: Option<String>,
    pub year: Option<u16>,
    pub runtime: Option<u16>,
    pub cast_list: Option<Vec<MovieCast>>,
}

#[derive(Serialize, Deserialize)]
pub struct MovieRow {
    title: String,
    description: Option<String>,
    storyline: Option<String>,
    year: Option<u16>,
    runtime: Option<u16>,
}

impl Movie {
    pub fn new(title: &str) -> Self {
        Movie { id: None, title: title.to_string(), description: None, storyline: None, year: None, runtime: None, cast_list: None }
    }

    pub fn with_cast(mut self, cast: Vec<MovieCast>) -> Self {
        self.cast_list = Some(cast);
        self
    }

    pub fn cast_list_mut(&mut self) -> &mut Option<Vec<MovieCast>> {
        &mut self.cast_list
    }
}

impl Record for Movie {
    type Id = MasterId;
    type Row = MovieRow;

    fn id(&self) -> Option<MasterId> {
        self.id
    }
    fn set_id(&mut self, id: Option<MasterId>) {
        self.id = id;
    }
    fn to_row(&self) -> MovieRow {
        MovieRow {
            title: self.title.clone(),
            description: self.description.clone(),
            storyline: self.storyline.clone(),
            year: self.year,
            runtime: self.runtime,
        }
    }
    fn from_row(id: MasterId, row: MovieRow) -> Self {
        Movie {
            id: Some(id),
            title: row.title,
            description: row.description,
            storyline: row.storyline,
            year: row.year,
            runtime: row.runtime,
            cast_list: None,
        }
    }
}

impl MasterRecord for Movie {}

/// Detail record: one person's role in one movie. `person_fullname` is joined from `PERSON` on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MovieCast {
    pub id: Option<DetailId>,
    pub movie_id: Option<MasterId>,
    pub person_id: PersonId,
    pub character: String,
    #[serde(default)]
    pub person_fullname: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct MovieCastRow {
    movie_id: Option<MasterId>,
    person_id: PersonId,
    character: String,
}

impl MovieCast {
    pub fn new(person_id: PersonId, character: &str) -> Self {
        MovieCast { id: None, movie_id: None, person_id, character: character.to_string(), person_fullname: None }
    }
}

impl Record for MovieCast {
    type Id = DetailId;
    type Row = MovieCastRow;

    fn id(&self) -> Option<DetailId> {
        self.id
    }
    fn set_id(&mut self, id: Option<DetailId>) {
        self.id = id;
    }
    fn to_row(&self) -> MovieCastRow {
        MovieCastRow { movie_id: self.movie_id, person_id: self.person_id, character: self.character.clone() }
    }
    fn from_row(id: DetailId, row: MovieCastRow) -> Self {
        MovieCast { id: Some(id), movie_id: row.movie_id, person_id: row.person_id, character: row.character, person_fullname: None }
    }
}

impl DetailRecord for MovieCast {
    fn master_id(&self) -> Option<MasterId> {
        self.movie_id
    }
    fn set_master_id(&mut self, master_id: MasterId) {
        self.movie_id = Some(master_id);
    }
}

pub const PEOPLE: EntityTable<Person> = EntityTable::new("PERSON");
pub const MOVIES: EntityTable<Movie> = EntityTable::new("MOVIE");

pub const CHARACTER_MAX_LEN: usize = 100;

fn load_person_fullname(tx: &TxView<'_>, cast: &MovieCast) -> Result<LoadResult<MovieCast>, AppError> {
    match PEOPLE.get_in(*tx, cast.person_id)? {
        Some(person) => {
            let fullname = person.fullname();
            Ok(LoadResult::Value(Box::new(move |mut cast: MovieCast| {
                cast.person_fullname = Some(fullname);
                cast
            })))
        }
        None => Ok(LoadResult::Skip),
    }
}

fn validate_cast(cast: &MovieCast) -> Result<(), AppError> {
    if cast.character.trim().is_empty() {
        return Err(AppError::Validation(format!("character of person {} is empty", cast.person_id)));
    }
    if cast.character.chars().count() > CHARACTER_MAX_LEN {
        return Err(AppError::Validation(format!("character longer than {} chars", CHARACTER_MAX_LEN)));
    }
    Ok(())
}

/// One role per person per movie, display name joined from the person table.
pub fn cast_descriptor() -> DetailDescriptor<MovieCast> {
    DetailDescriptor::new("MOVIE_CAST", "movie_id")
        .with_unique("person", |cast: &MovieCast| cast.person_id.to_string())
        .with_join("person_fullname", load_person_fullname)
        .with_validation(validate_cast)
}
