//! Animal reads and writes.
//!
//! The animal family is mapped table-per-concrete-type like members and
//! posts, but its tables are shared: no workspace column, no predicate, no
//! stamping, and no active workspace required. The same session primitives
//! drive it, with [`Scoping::Shared`] resolving every tenant question to
//! "none".
//!
//! [`Scoping::Shared`]: crate::tenant::Scoping

use std::str::FromStr;

use rust_decimal::Decimal;
use rusqlite::types::Value as SqlValue;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};

use super::session::Session;
use crate::error::{EntityError, MappingError, StoreResult};
use crate::model::{Animal, AnimalKind, Cat, Dog, FarmAnimal};
use crate::registry::{ANIMAL_FAMILY, TableBinding};

fn parse_value(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn farm_animal_from_row(row: &Row<'_>) -> rusqlite::Result<FarmAnimal> {
    Ok(FarmAnimal {
        id: Some(row.get(0)?),
        species: row.get(1)?,
        value: parse_value(row, 2)?,
    })
}

fn cat_from_row(row: &Row<'_>) -> rusqlite::Result<Cat> {
    Ok(Cat {
        id: Some(row.get(0)?),
        species: row.get(1)?,
        name: row.get(2)?,
        education_level: row.get(3)?,
    })
}

fn dog_from_row(row: &Row<'_>) -> rusqlite::Result<Dog> {
    Ok(Dog {
        id: Some(row.get(0)?),
        species: row.get(1)?,
        name: row.get(2)?,
        favorite_toy: row.get(3)?,
    })
}

#[derive(Debug, Default, Clone)]
struct AnimalFilters {
    species: Option<String>,
}

impl AnimalFilters {
    fn to_sql(&self) -> (String, Vec<SqlValue>) {
        match &self.species {
            Some(species) => (
                " WHERE species = ?".to_string(),
                vec![SqlValue::Text(species.clone())],
            ),
            None => (String::new(), Vec::new()),
        }
    }
}

impl Session<'_> {
    fn animal_binding(&self, kind: AnimalKind) -> StoreResult<TableBinding> {
        Ok(self
            .store()
            .registry()
            .read()
            .binding(ANIMAL_FAMILY, kind.variant_name())?)
    }

    /// Inserts an animal into its concrete table.
    ///
    /// Animal tables are shared, so this works with or without an active
    /// workspace. Monetary values are stored as exact decimal text.
    pub fn insert_animal(&self, animal: &mut Animal) -> StoreResult<()> {
        let binding = self.animal_binding(animal.kind())?;
        let table = binding.table;

        match animal {
            Animal::FarmAnimal(a) => {
                self.conn().execute(
                    &format!("INSERT INTO {table} (species, value) VALUES (?1, ?2)"),
                    params![a.species, a.value.to_string()],
                )?;
            }
            Animal::Cat(c) => {
                self.conn().execute(
                    &format!(
                        "INSERT INTO {table} (species, name, education_level) VALUES (?1, ?2, ?3)"
                    ),
                    params![c.species, c.name, c.education_level],
                )?;
            }
            Animal::Dog(d) => {
                self.conn().execute(
                    &format!(
                        "INSERT INTO {table} (species, name, favorite_toy) VALUES (?1, ?2, ?3)"
                    ),
                    params![d.species, d.name, d.favorite_toy],
                )?;
            }
        }
        animal.set_id(self.conn().last_insert_rowid());
        Ok(())
    }

    /// Fetches one animal by concrete kind and row id.
    ///
    /// Ids are unique per concrete table only: a cat and a dog may share the
    /// same numeric id, so the kind is part of the lookup key.
    pub fn animal(&self, kind: AnimalKind, id: i64) -> StoreResult<Animal> {
        let binding = self.animal_binding(kind)?;
        let table = binding.table;

        let fetched = match kind {
            AnimalKind::FarmAnimal => self
                .conn()
                .query_row(
                    &format!("SELECT id, species, value FROM {table} WHERE id = ?1"),
                    params![id],
                    farm_animal_from_row,
                )
                .optional()?
                .map(Animal::FarmAnimal),
            AnimalKind::Cat => self
                .conn()
                .query_row(
                    &format!("SELECT id, species, name, education_level FROM {table} WHERE id = ?1"),
                    params![id],
                    cat_from_row,
                )
                .optional()?
                .map(Animal::Cat),
            AnimalKind::Dog => self
                .conn()
                .query_row(
                    &format!("SELECT id, species, name, favorite_toy FROM {table} WHERE id = ?1"),
                    params![id],
                    dog_from_row,
                )
                .optional()?
                .map(Animal::Dog),
        };

        fetched.ok_or_else(|| {
            EntityError::NotFound {
                table: table.to_string(),
                id,
            }
            .into()
        })
    }

    /// Fetches all farm animals.
    pub fn farm_animals(&self) -> StoreResult<Vec<FarmAnimal>> {
        let binding = self.animal_binding(AnimalKind::FarmAnimal)?;
        fetch_farm_animals(self, binding.table, &AnimalFilters::default())
    }

    /// Fetches all cats.
    pub fn cats(&self) -> StoreResult<Vec<Cat>> {
        let binding = self.animal_binding(AnimalKind::Cat)?;
        fetch_cats(self, binding.table, &AnimalFilters::default())
    }

    /// Fetches all dogs.
    pub fn dogs(&self) -> StoreResult<Vec<Dog>> {
        let binding = self.animal_binding(AnimalKind::Dog)?;
        fetch_dogs(self, binding.table, &AnimalFilters::default())
    }

    /// Starts a polymorphic query over the whole animal family.
    pub fn animals(&self) -> AnimalQuery<'_, '_> {
        AnimalQuery {
            session: self,
            species: None,
        }
    }
}

fn fetch_farm_animals(
    session: &Session<'_>,
    table: &str,
    filters: &AnimalFilters,
) -> StoreResult<Vec<FarmAnimal>> {
    let (where_sql, values) = filters.to_sql();
    let mut stmt = session
        .conn()
        .prepare(&format!("SELECT id, species, value FROM {table}{where_sql}"))?;
    let rows = stmt.query_map(params_from_iter(values.iter()), farm_animal_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn fetch_cats(
    session: &Session<'_>,
    table: &str,
    filters: &AnimalFilters,
) -> StoreResult<Vec<Cat>> {
    let (where_sql, values) = filters.to_sql();
    let mut stmt = session.conn().prepare(&format!(
        "SELECT id, species, name, education_level FROM {table}{where_sql}"
    ))?;
    let rows = stmt.query_map(params_from_iter(values.iter()), cat_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn fetch_dogs(
    session: &Session<'_>,
    table: &str,
    filters: &AnimalFilters,
) -> StoreResult<Vec<Dog>> {
    let (where_sql, values) = filters.to_sql();
    let mut stmt = session.conn().prepare(&format!(
        "SELECT id, species, name, favorite_toy FROM {table}{where_sql}"
    ))?;
    let rows = stmt.query_map(params_from_iter(values.iter()), dog_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Polymorphic query over the animal family.
///
/// No tenant predicate is ever added; every session sees every row.
#[derive(Debug)]
pub struct AnimalQuery<'q, 's> {
    session: &'q Session<'s>,
    species: Option<String>,
}

impl AnimalQuery<'_, '_> {
    /// Filters on the base-common `species` field.
    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    /// Executes the union, reconstructing each row to its concrete type.
    pub fn fetch(self) -> StoreResult<Vec<Animal>> {
        let bindings: Vec<TableBinding> = self
            .session
            .store()
            .registry()
            .read()
            .family(ANIMAL_FAMILY)?
            .to_vec();

        let filters = AnimalFilters {
            species: self.species.clone(),
        };

        let mut results: Vec<Animal> = Vec::new();
        for binding in bindings {
            match binding.variant {
                "farm_animal" => results.extend(
                    fetch_farm_animals(self.session, binding.table, &filters)?
                        .into_iter()
                        .map(Animal::FarmAnimal),
                ),
                "cat" => results.extend(
                    fetch_cats(self.session, binding.table, &filters)?
                        .into_iter()
                        .map(Animal::Cat),
                ),
                "dog" => results.extend(
                    fetch_dogs(self.session, binding.table, &filters)?
                        .into_iter()
                        .map(Animal::Dog),
                ),
                variant => {
                    return Err(MappingError::UnmappedType {
                        family: ANIMAL_FAMILY,
                        variant,
                    }
                    .into());
                }
            }
        }
        Ok(results)
    }

    /// Counts matching rows across all concrete tables.
    pub fn count(self) -> StoreResult<u64> {
        let bindings: Vec<TableBinding> = self
            .session
            .store()
            .registry()
            .read()
            .family(ANIMAL_FAMILY)?
            .to_vec();

        let filters = AnimalFilters {
            species: self.species.clone(),
        };
        let (where_sql, values) = filters.to_sql();

        let mut total: u64 = 0;
        for binding in bindings {
            let table = binding.table;
            let count: i64 = self.session.conn().query_row(
                &format!("SELECT COUNT(*) FROM {table}{where_sql}"),
                params_from_iter(values.iter()),
                |row| row.get(0),
            )?;
            total += count as u64;
        }
        Ok(total)
    }
}
