//! Person repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide upsert/read/delete APIs over the `persons` table.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - Write paths call `Person::validate()` before touching SQL.
//! - Upsert replaces by `id`; a replaced row keeps its original list position.
//! - `list_persons` returns rows in first-insertion order.
//! - Read paths reject rows with an unknown `sex` value instead of masking it.

use crate::db::DbError;
use crate::model::person::{Person, PersonId, PersonValidationError, Sex};
use log::info;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PERSON_SELECT_SQL: &str = "SELECT
    id,
    last_name,
    first_name,
    sex,
    birth_date,
    birth_place,
    death_date,
    death_place,
    father_id,
    mother_id,
    notes
FROM persons";

const PERSON_UPSERT_SQL: &str = "INSERT INTO persons (
        id,
        last_name,
        first_name,
        sex,
        birth_date,
        birth_place,
        death_date,
        death_place,
        father_id,
        mother_id,
        notes
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
    ON CONFLICT(id) DO UPDATE SET
        last_name = excluded.last_name,
        first_name = excluded.first_name,
        sex = excluded.sex,
        birth_date = excluded.birth_date,
        birth_place = excluded.birth_place,
        death_date = excluded.death_date,
        death_place = excluded.death_place,
        father_id = excluded.father_id,
        mother_id = excluded.mother_id,
        notes = excluded.notes,
        updated_at = (CAST(strftime('%s', 'now') AS INTEGER) * 1000);";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for person persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(PersonValidationError),
    Db(DbError),
    NotFound(PersonId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "person not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<PersonValidationError> for RepoError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for family members.
pub trait PersonRepository {
    fn upsert_person(&self, person: &Person) -> RepoResult<()>;
    /// Upserts all persons atomically; returns how many were written.
    fn upsert_persons(&self, persons: &[Person]) -> RepoResult<usize>;
    fn get_person(&self, id: &str) -> RepoResult<Option<Person>>;
    fn list_persons(&self) -> RepoResult<Vec<Person>>;
    /// Persons naming `parent_id` as father or mother.
    fn list_children(&self, parent_id: &str) -> RepoResult<Vec<Person>>;
    /// Persons without any parent reference.
    fn list_root_persons(&self) -> RepoResult<Vec<Person>>;
    /// Substring match over `last_name || first_name`.
    fn search_persons(&self, query: &str) -> RepoResult<Vec<Person>>;
    fn count_persons(&self) -> RepoResult<u64>;
    fn delete_person(&self, id: &str) -> RepoResult<()>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_persons(
        &self,
        where_clause: &str,
        bind: impl rusqlite::Params,
    ) -> RepoResult<Vec<Person>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PERSON_SELECT_SQL} {where_clause} ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query(bind)?;
        let mut persons = Vec::new();
        while let Some(row) = rows.next()? {
            persons.push(parse_person_row(row)?);
        }
        Ok(persons)
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn upsert_person(&self, person: &Person) -> RepoResult<()> {
        person.validate()?;
        execute_upsert(self.conn, person)
    }

    fn upsert_persons(&self, persons: &[Person]) -> RepoResult<usize> {
        for person in persons {
            person.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        for person in persons {
            execute_upsert(&tx, person)?;
        }
        tx.commit()?;

        info!(
            "event=person_upsert module=repo status=ok count={}",
            persons.len()
        );
        Ok(persons.len())
    }

    fn get_person(&self, id: &str) -> RepoResult<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }
        Ok(None)
    }

    fn list_persons(&self) -> RepoResult<Vec<Person>> {
        self.query_persons("", [])
    }

    fn list_children(&self, parent_id: &str) -> RepoResult<Vec<Person>> {
        self.query_persons("WHERE father_id = ?1 OR mother_id = ?1", [parent_id])
    }

    fn list_root_persons(&self) -> RepoResult<Vec<Person>> {
        self.query_persons("WHERE father_id IS NULL AND mother_id IS NULL", [])
    }

    fn search_persons(&self, query: &str) -> RepoResult<Vec<Person>> {
        let needle = query.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        self.query_persons(
            "WHERE instr(last_name || first_name, ?1) > 0",
            [needle],
        )
    }

    fn count_persons(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM persons;", [], |row| row.get::<_, i64>(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative person count `{count}`")))
    }

    fn delete_person(&self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM persons WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn execute_upsert(conn: &Connection, person: &Person) -> RepoResult<()> {
    conn.execute(
        PERSON_UPSERT_SQL,
        params![
            person.id.as_str(),
            person.last_name.as_str(),
            person.first_name.as_str(),
            person.sex.as_str(),
            person.birth_date.as_deref(),
            person.birth_place.as_deref(),
            person.death_date.as_deref(),
            person.death_place.as_deref(),
            person.father_id.as_deref(),
            person.mother_id.as_deref(),
            person.notes.as_deref(),
        ],
    )?;
    Ok(())
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let sex_text: String = row.get("sex")?;
    let sex = Sex::parse(&sex_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid sex `{sex_text}` in persons.sex"))
    })?;

    Ok(Person {
        id: row.get("id")?,
        last_name: row.get("last_name")?,
        first_name: row.get("first_name")?,
        sex,
        birth_date: row.get("birth_date")?,
        birth_place: row.get("birth_place")?,
        death_date: row.get("death_date")?,
        death_place: row.get("death_place")?,
        father_id: row.get("father_id")?,
        mother_id: row.get("mother_id")?,
        notes: row.get("notes")?,
    })
}
