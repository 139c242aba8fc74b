//! The animal family: an unscoped TPC hierarchy.
//!
//! `Animal` exercises the same table-per-concrete-type mapping as the member
//! and post families, but with no tenant scoping anywhere. The abstract base
//! contributes `species`; the intermediate `Pet` level contributes `name` to
//! [`Cat`] and [`Dog`]; [`FarmAnimal`] sits directly under the base.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Type tag for the concrete animal tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalKind {
    /// A farm animal with a monetary value.
    FarmAnimal,
    /// A pet cat.
    Cat,
    /// A pet dog.
    Dog,
}

impl AnimalKind {
    /// Returns the registry variant name for this kind.
    pub fn variant_name(&self) -> &'static str {
        match self {
            AnimalKind::FarmAnimal => "farm_animal",
            AnimalKind::Cat => "cat",
            AnimalKind::Dog => "dog",
        }
    }
}

/// A farm animal with a monetary value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmAnimal {
    /// Row id within the `farm_animals` table, assigned on insert.
    pub id: Option<i64>,
    /// Species, common to the whole family.
    pub species: String,
    /// Monetary value of the animal.
    pub value: Decimal,
}

impl FarmAnimal {
    /// Creates a new farm animal.
    pub fn new(species: impl Into<String>, value: Decimal) -> Self {
        Self {
            id: None,
            species: species.into(),
            value,
        }
    }
}

/// A pet cat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cat {
    /// Row id within the `cats` table, assigned on insert.
    pub id: Option<i64>,
    /// Species, common to the whole family.
    pub species: String,
    /// Pet name.
    pub name: String,
    /// Subtype-specific field.
    pub education_level: String,
}

impl Cat {
    /// Creates a new cat.
    pub fn new(
        species: impl Into<String>,
        name: impl Into<String>,
        education_level: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            species: species.into(),
            name: name.into(),
            education_level: education_level.into(),
        }
    }
}

/// A pet dog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    /// Row id within the `dogs` table, assigned on insert.
    pub id: Option<i64>,
    /// Species, common to the whole family.
    pub species: String,
    /// Pet name.
    pub name: String,
    /// Subtype-specific field.
    pub favorite_toy: String,
}

impl Dog {
    /// Creates a new dog.
    pub fn new(
        species: impl Into<String>,
        name: impl Into<String>,
        favorite_toy: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            species: species.into(),
            name: name.into(),
            favorite_toy: favorite_toy.into(),
        }
    }
}

/// Polymorphic view over the animal family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Animal {
    /// A farm animal row.
    FarmAnimal(FarmAnimal),
    /// A cat row.
    Cat(Cat),
    /// A dog row.
    Dog(Dog),
}

impl Animal {
    /// Returns the concrete type tag.
    pub fn kind(&self) -> AnimalKind {
        match self {
            Animal::FarmAnimal(_) => AnimalKind::FarmAnimal,
            Animal::Cat(_) => AnimalKind::Cat,
            Animal::Dog(_) => AnimalKind::Dog,
        }
    }

    /// Returns the row id, if assigned.
    pub fn id(&self) -> Option<i64> {
        match self {
            Animal::FarmAnimal(a) => a.id,
            Animal::Cat(c) => c.id,
            Animal::Dog(d) => d.id,
        }
    }

    /// Returns the species, the base-common attribute.
    pub fn species(&self) -> &str {
        match self {
            Animal::FarmAnimal(a) => &a.species,
            Animal::Cat(c) => &c.species,
            Animal::Dog(d) => &d.species,
        }
    }

    pub(crate) fn set_id(&mut self, id: i64) {
        match self {
            Animal::FarmAnimal(a) => a.id = Some(id),
            Animal::Cat(c) => c.id = Some(id),
            Animal::Dog(d) => d.id = Some(id),
        }
    }
}

impl From<FarmAnimal> for Animal {
    fn from(a: FarmAnimal) -> Self {
        Animal::FarmAnimal(a)
    }
}

impl From<Cat> for Animal {
    fn from(c: Cat) -> Self {
        Animal::Cat(c)
    }
}

impl From<Dog> for Animal {
    fn from(d: Dog) -> Self {
        Animal::Dog(d)
    }
}
