//! SQLite implementation of the stores.
//!
//! String lists are stored as JSON text columns; content documents as JSON
//! blobs keyed by their logical name.

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    AboutContent, AdminCredential, CarouselSlide, ContactInfo, ContentKey, NewTour, Tour,
    UpdateTourRequest, ADMIN_KEY,
};
use crate::store::{CarouselStore, ContentStore, CredentialStore, TourStore};

const TOUR_COLUMNS: &str =
    "id, title, description, price, duration, image, highlights, itinerary, included";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn get_document<T: DeserializeOwned>(&self, key: ContentKey) -> Result<Option<T>, AppError> {
        let row = sqlx::query("SELECT data FROM content WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let data: String = row.get("data");
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => Ok(None),
        }
    }

    async fn put_document<T: Serialize>(&self, key: ContentKey, doc: &T) -> Result<(), AppError> {
        let data = serde_json::to_string(doc)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO content (key, data, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
        )
        .bind(key.as_str())
        .bind(&data)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::debug!(key = key.as_str(), "Content document saved");
        Ok(())
    }
}

// ==================== TOUR OPERATIONS ====================

#[async_trait]
impl TourStore for SqliteRepository {
    async fn list_all(&self) -> Result<Vec<Tour>, AppError> {
        let rows = sqlx::query(&format!("SELECT {TOUR_COLUMNS} FROM tours ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(tour_from_row).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tour>, AppError> {
        let row = sqlx::query(&format!("SELECT {TOUR_COLUMNS} FROM tours WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(tour_from_row).transpose()
    }

    async fn create(&self, tour: NewTour) -> Result<Tour, AppError> {
        // Id assignment and insert in one statement; concurrent creates queue
        // on the write lock.
        let next_id: i64 = sqlx::query(
            r#"
            INSERT INTO tours (id, title, description, price, duration, image, highlights, itinerary, included)
            SELECT COALESCE(MAX(id), 0) + 1, ?, ?, ?, ?, ?, ?, ?, ? FROM tours
            RETURNING id
            "#,
        )
        .bind(&tour.title)
        .bind(&tour.description)
        .bind(tour.price)
        .bind(&tour.duration)
        .bind(&tour.image)
        .bind(serde_json::to_string(&tour.highlights)?)
        .bind(serde_json::to_string(&tour.itinerary)?)
        .bind(serde_json::to_string(&tour.included)?)
        .fetch_one(&self.pool)
        .await?
        .get("id");

        let tour = tour.into_tour(next_id);
        tracing::info!(tour_id = tour.id, "Tour created");
        Ok(tour)
    }

    async fn update(&self, id: i64, changes: &UpdateTourRequest) -> Result<Option<Tour>, AppError> {
        let Some(mut tour) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        tour.apply(changes);

        let result = sqlx::query(
            "UPDATE tours SET title = ?, description = ?, price = ?, duration = ?, image = ?, highlights = ?, itinerary = ?, included = ? WHERE id = ?",
        )
        .bind(&tour.title)
        .bind(&tour.description)
        .bind(tour.price)
        .bind(&tour.duration)
        .bind(&tour.image)
        .bind(serde_json::to_string(&tour.highlights)?)
        .bind(serde_json::to_string(&tour.itinerary)?)
        .bind(serde_json::to_string(&tour.included)?)
        .bind(id)
        .execute(&self.pool)
        .await?;

        // Deleted between the read and the write
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(tour))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tours WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ==================== CAROUSEL OPERATIONS ====================

#[async_trait]
impl CarouselStore for SqliteRepository {
    async fn list(&self) -> Result<Vec<CarouselSlide>, AppError> {
        let rows = sqlx::query("SELECT id, url, title, description FROM carousel ORDER BY id, seq")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| CarouselSlide {
                id: row.get("id"),
                url: row.get("url"),
                title: row.get("title"),
                description: row.get("description"),
            })
            .collect())
    }

    async fn replace_all(&self, slides: Vec<CarouselSlide>) -> Result<Vec<CarouselSlide>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM carousel").execute(&mut *tx).await?;

        for slide in &slides {
            sqlx::query("INSERT INTO carousel (id, url, title, description) VALUES (?, ?, ?, ?)")
                .bind(slide.id)
                .bind(&slide.url)
                .bind(&slide.title)
                .bind(&slide.description)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(count = slides.len(), "Carousel replaced");
        Ok(slides)
    }
}

// ==================== CONTENT OPERATIONS ====================

#[async_trait]
impl ContentStore for SqliteRepository {
    async fn get_about(&self) -> Result<Option<AboutContent>, AppError> {
        self.get_document(ContentKey::About).await
    }

    async fn put_about(&self, about: &AboutContent) -> Result<AboutContent, AppError> {
        self.put_document(ContentKey::About, about).await?;
        Ok(about.clone())
    }

    async fn get_contact(&self) -> Result<Option<ContactInfo>, AppError> {
        self.get_document(ContentKey::Contact).await
    }

    async fn put_contact(&self, contact: &ContactInfo) -> Result<ContactInfo, AppError> {
        self.put_document(ContentKey::Contact, contact).await?;
        Ok(contact.clone())
    }
}

// ==================== CREDENTIAL OPERATIONS ====================

#[async_trait]
impl CredentialStore for SqliteRepository {
    async fn load(&self) -> Result<Option<AdminCredential>, AppError> {
        let row = sqlx::query(
            "SELECT hash, salt, iterations, updated_at FROM admin_credentials WHERE key = ?",
        )
        .bind(ADMIN_KEY)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let iterations: i64 = row.get("iterations");
        let iterations = u32::try_from(iterations).map_err(|_| {
            AppError::Internal(format!("Stored iteration count {} is out of range", iterations))
        })?;

        Ok(Some(AdminCredential {
            hash: row.get("hash"),
            salt: row.get("salt"),
            iterations,
            updated_at: row.get("updated_at"),
        }))
    }

    async fn save(&self, credential: &AdminCredential) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO admin_credentials (key, hash, salt, iterations, updated_at) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET hash = excluded.hash, salt = excluded.salt,
                 iterations = excluded.iterations, updated_at = excluded.updated_at",
        )
        .bind(ADMIN_KEY)
        .bind(&credential.hash)
        .bind(&credential.salt)
        .bind(i64::from(credential.iterations))
        .bind(&credential.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// Helper functions for row conversion

fn tour_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Tour, AppError> {
    let highlights: String = row.get("highlights");
    let itinerary: String = row.get("itinerary");
    let included: String = row.get("included");

    Ok(Tour {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        price: row.get("price"),
        duration: row.get("duration"),
        image: row.get("image"),
        highlights: parse_json_array(&highlights)?,
        itinerary: parse_json_array(&itinerary)?,
        included: parse_json_array(&included)?,
    })
}

/// A list column that is not a JSON string array is corrupt data.
fn parse_json_array(s: &str) -> Result<Vec<String>, AppError> {
    serde_json::from_str(s)
        .map_err(|e| AppError::Internal(format!("Corrupt list column: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn repo() -> (SqliteRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}", temp_dir.path().join("test.sqlite").display());
        let pool = init_database(&url).await.unwrap();
        (SqliteRepository::new(pool), temp_dir)
    }

    fn new_tour(title: &str) -> NewTour {
        NewTour {
            title: title.to_string(),
            description: "A day out".to_string(),
            price: 120.0,
            duration: "1 Day".to_string(),
            image: "http://x/y.jpg".to_string(),
            highlights: vec!["Palace".to_string()],
            itinerary: Vec::new(),
            included: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_tour_ids_follow_max() {
        let (repo, _dir) = repo().await;

        assert_eq!(repo.create(new_tour("A")).await.unwrap().id, 1);
        assert_eq!(repo.create(new_tour("B")).await.unwrap().id, 2);
        assert!(repo.delete(1).await.unwrap());
        assert_eq!(repo.create(new_tour("C")).await.unwrap().id, 3);

        let stored = repo.get_by_id(3).await.unwrap().unwrap();
        assert_eq!(stored.highlights, vec!["Palace".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_ids() {
        let (repo, _dir) = repo().await;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create(new_tour(&format!("T{i}"))).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=8).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_corrupt_list_column_is_an_error() {
        let (repo, _dir) = repo().await;
        repo.create(new_tour("A")).await.unwrap();

        sqlx::query("UPDATE tours SET highlights = 'not json' WHERE id = 1")
            .execute(&repo.pool)
            .await
            .unwrap();

        assert!(matches!(repo.get_by_id(1).await, Err(AppError::Internal(_))));
        assert!(matches!(repo.list_all().await, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_tour_update_and_delete_missing() {
        let (repo, _dir) = repo().await;
        repo.create(new_tour("A")).await.unwrap();

        let changes = UpdateTourRequest {
            price: Some(80.0),
            ..Default::default()
        };
        let updated = repo.update(1, &changes).await.unwrap().unwrap();
        assert_eq!(updated.price, 80.0);
        assert_eq!(updated.title, "A");

        assert!(repo.update(42, &changes).await.unwrap().is_none());
        assert!(!repo.delete(42).await.unwrap());
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_carousel_replace_all() {
        let (repo, _dir) = repo().await;
        let slide = |id: i64| CarouselSlide {
            id,
            url: format!("/img/{id}.jpg"),
            title: "t".into(),
            description: "d".into(),
        };

        repo.replace_all(vec![slide(2), slide(1), slide(3)]).await.unwrap();
        repo.replace_all(vec![slide(2), slide(1)]).await.unwrap();

        let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_content_upsert() {
        let (repo, _dir) = repo().await;
        assert!(repo.get_about().await.unwrap().is_none());

        let mut about = AboutContent {
            hero_title: "Discover Korea".into(),
            hero_subtitle: "Small groups".into(),
            story: String::new(),
            mission: String::new(),
            reasons: vec![],
        };
        repo.put_about(&about).await.unwrap();
        about.story = "Founded in Seoul".into();
        repo.put_about(&about).await.unwrap();

        assert_eq!(repo.get_about().await.unwrap(), Some(about));
        assert!(repo.get_contact().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_credential_replace() {
        let (repo, _dir) = repo().await;
        assert!(repo.load().await.unwrap().is_none());

        let mut credential = AdminCredential {
            hash: "aa".into(),
            salt: "bb".into(),
            iterations: 100_000,
            updated_at: Utc::now().to_rfc3339(),
        };
        repo.save(&credential).await.unwrap();
        credential.hash = "cc".into();
        repo.save(&credential).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), Some(credential));
    }
}
