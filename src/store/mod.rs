//! Persistence abstraction.
//!
//! One trait per entity, each implemented by the SQLite repository and by the
//! flat-file repository. The backend is chosen once, by probing the database,
//! and handlers only ever see the traits.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::db::{Database, SqliteRepository};
use crate::errors::AppError;
use crate::files::FileRepository;
use crate::models::{
    AboutContent, AdminCredential, CarouselSlide, ContactInfo, NewTour, Tour, UpdateTourRequest,
};

/// CRUD over tours. Absence is `None`/`false`, never an error.
#[async_trait]
pub trait TourStore: Send + Sync {
    /// All tours, ordered by id.
    async fn list_all(&self) -> Result<Vec<Tour>, AppError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Tour>, AppError>;

    /// Persist a new tour with id = max existing id + 1 (1 when empty).
    async fn create(&self, tour: NewTour) -> Result<Tour, AppError>;

    /// Merge `changes` onto the tour with this id.
    async fn update(&self, id: i64, changes: &UpdateTourRequest) -> Result<Option<Tour>, AppError>;

    /// Returns whether a tour was removed.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait CarouselStore: Send + Sync {
    async fn list(&self) -> Result<Vec<CarouselSlide>, AppError>;

    /// Replace the entire slide set with `slides`.
    async fn replace_all(&self, slides: Vec<CarouselSlide>) -> Result<Vec<CarouselSlide>, AppError>;
}

/// Upserts of the two singleton page documents.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get_about(&self) -> Result<Option<AboutContent>, AppError>;

    async fn put_about(&self, about: &AboutContent) -> Result<AboutContent, AppError>;

    async fn get_contact(&self) -> Result<Option<ContactInfo>, AppError>;

    async fn put_contact(&self, contact: &ContactInfo) -> Result<ContactInfo, AppError>;
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<AdminCredential>, AppError>;

    /// Store `credential`, replacing any previous one.
    async fn save(&self, credential: &AdminCredential) -> Result<(), AppError>;
}

/// Which persistence backend the stores were bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    File,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::File => "file",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four stores, bound to one backend.
#[derive(Clone)]
pub struct Stores {
    pub backend: Backend,
    pub tours: Arc<dyn TourStore>,
    pub carousel: Arc<dyn CarouselStore>,
    pub content: Arc<dyn ContentStore>,
    pub credentials: Arc<dyn CredentialStore>,
}

impl Stores {
    /// Probe the database and bind every store to it, or to the files under
    /// `data_dir` when it is not configured or not reachable.
    pub async fn select(database: &Database, data_dir: &Path) -> Self {
        match database.pool().await {
            Some(pool) => {
                tracing::info!("Using SQLite persistence");
                Self::from_repository(Backend::Sqlite, Arc::new(SqliteRepository::new(pool.clone())))
            }
            None => {
                tracing::info!(data_dir = %data_dir.display(), "Using flat-file persistence");
                Self::files(data_dir)
            }
        }
    }

    /// Stores bound to the flat files under `data_dir`.
    pub fn files(data_dir: &Path) -> Self {
        Self::from_repository(Backend::File, Arc::new(FileRepository::new(data_dir)))
    }

    fn from_repository<R>(backend: Backend, repo: Arc<R>) -> Self
    where
        R: TourStore + CarouselStore + ContentStore + CredentialStore + 'static,
    {
        Self {
            backend,
            tours: repo.clone(),
            carousel: repo.clone(),
            content: repo.clone(),
            credentials: repo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_select_without_database_uses_files() {
        let temp_dir = TempDir::new().unwrap();
        let stores = Stores::select(&Database::new(None), temp_dir.path()).await;
        assert_eq!(stores.backend, Backend::File);
    }

    #[tokio::test]
    async fn test_select_unreachable_database_uses_files() {
        let temp_dir = TempDir::new().unwrap();
        // A directory cannot be opened as a database file
        let url = format!("sqlite:{}", temp_dir.path().display());
        let data_dir = temp_dir.path().join("data");

        let stores = Stores::select(&Database::new(Some(url)), &data_dir).await;
        assert_eq!(stores.backend, Backend::File);

        // Writes land in the data directory
        stores
            .carousel
            .replace_all(vec![CarouselSlide {
                id: 1,
                url: "/a.jpg".into(),
                title: "Palace".into(),
                description: "Gyeongbokgung".into(),
            }])
            .await
            .unwrap();
        assert!(data_dir.join("carousel.json").exists());
    }

    #[tokio::test]
    async fn test_select_reachable_database_uses_sqlite() {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}", temp_dir.path().join("app.sqlite").display());

        let stores = Stores::select(&Database::new(Some(url)), temp_dir.path()).await;
        assert_eq!(stores.backend, Backend::Sqlite);
    }
}
