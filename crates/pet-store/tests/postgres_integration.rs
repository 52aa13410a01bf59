//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p pet-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use pet_store::{
    OwnerId, PageRequest, Pet, PetChanges, PetFilter, PetId, PetQuery, PetStore,
    PostgresPetStore, PostgresUserStore, SortDirection, StoreError, User, UserStore,
};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            for migration in [
                include_str!("../../../migrations/001_create_pets_table.sql"),
                include_str!("../../../migrations/002_create_users_table.sql"),
            ] {
                sqlx::raw_sql(migration).execute(&temp_pool).await.unwrap();
            }

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh pool with cleared tables
async fn get_test_pool() -> PgPool {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE pets, users")
        .execute(&pool)
        .await
        .unwrap();

    pool
}

async fn get_test_store() -> PostgresPetStore {
    PostgresPetStore::new(get_test_pool().await)
}

async fn get_test_user_store() -> PostgresUserStore {
    PostgresUserStore::new(get_test_pool().await)
}

fn create_test_pet(name: &str, kind: &str, breed: &str, age_minutes: i64) -> Pet {
    // Postgres keeps microseconds; truncate so round-tripped records compare equal.
    let created = Utc::now() - Duration::minutes(age_minutes);
    let created = chrono::DateTime::from_timestamp_micros(created.timestamp_micros()).unwrap();
    Pet {
        id: PetId::new(),
        owner_id: OwnerId::new(),
        name: name.to_string(),
        description: format!("{name} went missing"),
        kind: kind.to_string(),
        breed: breed.to_string(),
        last_seen_time: NaiveDate::from_ymd_opt(2024, 7, 9).unwrap(),
        last_seen_place: "Mendoza, Godoy Cruz".to_string(),
        is_found: false,
        picture_url: "memory://pets/IMG-0001.png".to_string(),
        created_at: created,
        updated_at: created,
    }
}

#[tokio::test]
async fn insert_and_get_pet() {
    let store = get_test_store().await;
    let pet = create_test_pet("Luna", "cat", "Siamese", 0);

    store.insert(&pet).await.unwrap();

    let loaded = store.get(pet.id).await.unwrap().unwrap();
    assert_eq!(loaded, pet);
}

#[tokio::test]
async fn get_missing_pet_returns_none() {
    let store = get_test_store().await;
    assert!(store.get(PetId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_insert_fails() {
    let store = get_test_store().await;
    let pet = create_test_pet("Luna", "cat", "Siamese", 0);

    store.insert(&pet).await.unwrap();
    let result = store.insert(&pet).await;
    assert!(matches!(result, Err(StoreError::Database(_))));
}

#[tokio::test]
async fn search_with_filters_and_pagination() {
    let store = get_test_store().await;
    for (i, breed) in ["Golden Retriever", "golden retriever", "Beagle"]
        .iter()
        .enumerate()
    {
        store
            .insert(&create_test_pet(&format!("Dog{i}"), "dog", breed, i as i64))
            .await
            .unwrap();
    }
    store
        .insert(&create_test_pet("Cat", "cat", "Persian", 10))
        .await
        .unwrap();

    let page = store
        .search(&PetQuery::new(
            PetFilter::new().kind("dog").breed("GOLDEN"),
            PageRequest::new(1, 10),
        ))
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.data[0].name, "Dog0");
    assert_eq!(page.data[1].name, "Dog1");

    let page = store
        .search(&PetQuery::new(
            PetFilter::new(),
            PageRequest::new(2, 3).sorted(SortDirection::Asc),
        ))
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].name, "Dog0");
    assert!(page.has_prev);
    assert!(!page.has_next);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let store = get_test_store().await;
    store
        .insert(&create_test_pet("Rex", "dog", "Beagle", 0))
        .await
        .unwrap();

    let page = store
        .search(&PetQuery::new(
            PetFilter::new().breed("%"),
            PageRequest::default(),
        ))
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn update_pet() {
    let store = get_test_store().await;
    let pet = create_test_pet("Luna", "cat", "Siamese", 0);
    store.insert(&pet).await.unwrap();

    let changes = PetChanges {
        name: Some("Lunita".to_string()),
        is_found: Some(true),
        ..Default::default()
    };
    let updated = store.update(pet.id, &changes).await.unwrap();
    assert_eq!(updated.name, "Lunita");
    assert!(updated.is_found);

    let loaded = store.get(pet.id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "Lunita");
    assert!(loaded.is_found);
    assert_eq!(loaded.breed, "Siamese");
}

#[tokio::test]
async fn update_and_delete_missing_pet() {
    let store = get_test_store().await;
    let id = PetId::new();

    let result = store.update(id, &PetChanges::mark_found()).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    let result = store.delete(id).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn mark_found_is_conditional() {
    let store = get_test_store().await;
    let pet = create_test_pet("Luna", "cat", "Siamese", 0);
    store.insert(&pet).await.unwrap();

    let id = pet.id;
    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.mark_found(id).await.unwrap() })
        })
        .collect();
    let mut flipped = 0;
    for task in tasks {
        if let Some(found) = task.await.unwrap() {
            assert!(found.is_found);
            flipped += 1;
        }
    }
    assert_eq!(flipped, 1);

    assert!(store.mark_found(pet.id).await.unwrap().is_none());
    let result = store.mark_found(PetId::new()).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn delete_pet() {
    let store = get_test_store().await;
    let pet = create_test_pet("Luna", "cat", "Siamese", 0);
    store.insert(&pet).await.unwrap();

    store.delete(pet.id).await.unwrap();
    assert!(store.get(pet.id).await.unwrap().is_none());
}

fn create_test_user(email: &str) -> User {
    let now = Utc::now();
    let now = chrono::DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap();
    User {
        id: OwnerId::new(),
        name: "Ana".to_string(),
        last_name: "Pérez".to_string(),
        email: email.to_string(),
        phone: "+54 261 555 0101".to_string(),
        password_hash: "$2b$04$not-a-real-hash".to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn insert_and_find_user() {
    let store = get_test_user_store().await;
    let user = create_test_user("ana@example.com");
    store.insert(&user).await.unwrap();

    assert_eq!(store.get(user.id).await.unwrap(), Some(user.clone()));
    assert_eq!(
        store.find_by_email("ana@example.com").await.unwrap(),
        Some(user)
    );
    assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_user_email() {
    let store = get_test_user_store().await;
    store.insert(&create_test_user("ana@example.com")).await.unwrap();

    let result = store.insert(&create_test_user("ana@example.com")).await;
    assert!(matches!(result, Err(StoreError::DuplicateEmail(_))));
}
