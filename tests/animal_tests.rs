//! Tests for the unscoped animal family.
//!
//! The animal hierarchy exercises table-per-concrete-type mapping without
//! tenant scoping: no workspace column, no predicate, and every session sees
//! every row.

mod common;

use carespace_persistence::error::{EntityError, StoreError};
use carespace_persistence::model::{Animal, AnimalKind, Cat, Dog, FarmAnimal};
use carespace_persistence::store::SqliteStore;
use rust_decimal::Decimal;

use common::seeded_store;

fn store_with_menagerie() -> SqliteStore {
    let store = SqliteStore::in_memory().unwrap();
    store.init_schema().unwrap();

    let session = store.session().unwrap();
    let mut animals: Vec<Animal> = vec![
        FarmAnimal::new("Cow", Decimal::new(150000, 2)).into(),
        Cat::new("Cat", "Whiskers", "PhD").into(),
        Dog::new("Dog", "Rex", "Tennis ball").into(),
    ];
    for animal in &mut animals {
        session.insert_animal(animal).unwrap();
    }
    drop(session);
    store
}

// ============================================================================
// Scoping
// ============================================================================

/// Shared tables need no active workspace, for writes or reads.
#[test]
fn test_animals_work_without_active_workspace() {
    let store = store_with_menagerie();
    let session = store.session().unwrap();

    assert_eq!(session.animals().fetch().unwrap().len(), 3);
    assert_eq!(session.cats().unwrap().len(), 1);
}

/// Setting a workspace changes nothing for shared tables.
#[test]
fn test_animals_visible_from_any_workspace() {
    let seeded = seeded_store();
    let mut session = seeded.store.session().unwrap();

    let mut dog: Animal = Dog::new("Dog", "Buddy", "Frisbee").into();
    session.insert_animal(&mut dog).unwrap();

    session.set_workspace(seeded.workspace1);
    assert_eq!(session.animals().count().unwrap(), 1);

    session.set_workspace(seeded.workspace2);
    assert_eq!(session.animals().count().unwrap(), 1);
}

// ============================================================================
// Polymorphic Queries
// ============================================================================

#[test]
fn test_polymorphic_union_reconstructs_concrete_types() {
    let store = store_with_menagerie();
    let session = store.session().unwrap();

    let animals = session.animals().fetch().unwrap();
    assert_eq!(animals.len(), 3);

    let kinds: Vec<AnimalKind> = animals.iter().map(Animal::kind).collect();
    assert!(kinds.contains(&AnimalKind::FarmAnimal));
    assert!(kinds.contains(&AnimalKind::Cat));
    assert!(kinds.contains(&AnimalKind::Dog));
}

/// The base-common species filter is pushed down to every concrete table.
#[test]
fn test_species_filter() {
    let store = store_with_menagerie();
    let session = store.session().unwrap();

    let mut second_cow: Animal = FarmAnimal::new("Cow", Decimal::new(98000, 2)).into();
    session.insert_animal(&mut second_cow).unwrap();

    let cows = session.animals().with_species("Cow").fetch().unwrap();
    assert_eq!(cows.len(), 2);
    assert_eq!(session.animals().with_species("Dog").count().unwrap(), 1);
}

// ============================================================================
// Per-Table Ids
// ============================================================================

/// Row ids autoincrement per concrete table: the first cat and the first dog
/// both get id 1, and lookups stay unambiguous because the kind is part of
/// the key.
#[test]
fn test_ids_unique_per_table_only() {
    let store = store_with_menagerie();
    let session = store.session().unwrap();

    let cat = session.animal(AnimalKind::Cat, 1).unwrap();
    let dog = session.animal(AnimalKind::Dog, 1).unwrap();
    assert_eq!(cat.species(), "Cat");
    assert_eq!(dog.species(), "Dog");
    assert_eq!(cat.id(), dog.id());
}

#[test]
fn test_animal_not_found() {
    let store = store_with_menagerie();
    let session = store.session().unwrap();

    let result = session.animal(AnimalKind::FarmAnimal, 7);
    assert!(matches!(
        result,
        Err(StoreError::Entity(EntityError::NotFound { .. }))
    ));
}

// ============================================================================
// Values
// ============================================================================

/// Monetary values survive storage exactly.
#[test]
fn test_decimal_value_roundtrip() {
    let store = SqliteStore::in_memory().unwrap();
    store.init_schema().unwrap();
    let session = store.session().unwrap();

    let value = Decimal::new(123456789, 4);
    let mut animal: Animal = FarmAnimal::new("Goat", value).into();
    session.insert_animal(&mut animal).unwrap();

    let fetched = session.animal(AnimalKind::FarmAnimal, animal.id().unwrap()).unwrap();
    let Animal::FarmAnimal(goat) = fetched else {
        panic!("expected a farm animal");
    };
    assert_eq!(goat.value, value);
}

/// Pet-level fields (the intermediate abstract layer) land in each pet table.
#[test]
fn test_pet_level_name_persists() {
    let store = store_with_menagerie();
    let session = store.session().unwrap();

    let Animal::Cat(cat) = session.animal(AnimalKind::Cat, 1).unwrap() else {
        panic!("expected a cat");
    };
    assert_eq!(cat.name, "Whiskers");
    assert_eq!(cat.education_level, "PhD");

    let Animal::Dog(dog) = session.animal(AnimalKind::Dog, 1).unwrap() else {
        panic!("expected a dog");
    };
    assert_eq!(dog.favorite_toy, "Tennis ball");
}
