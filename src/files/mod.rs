//! Flat-file fallback persistence.
//!
//! Each collection is a pretty-printed JSON document under the data
//! directory. Every mutation reads the whole file and rewrites it.
//! A missing file reads as an empty collection or an absent document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::AppError;
use crate::models::{
    next_tour_id, AboutContent, AdminCredential, CarouselSlide, ContactInfo, ContentKey, NewTour,
    Tour, UpdateTourRequest,
};
use crate::store::{CarouselStore, ContentStore, CredentialStore, TourStore};

const TOURS_FILE: &str = "tours.json";
const CAROUSEL_FILE: &str = "carousel.json";
const ADMIN_FILE: &str = "admin.json";

/// JSON-file repository rooted at one directory.
#[derive(Debug, Clone)]
pub struct FileRepository {
    dir: PathBuf,
}

impl FileRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn content_path(&self, key: ContentKey) -> PathBuf {
        self.path(&format!("{}.json", key.as_str()))
    }

    async fn read_tours(&self) -> Result<Vec<Tour>, AppError> {
        Ok(read_json(&self.path(TOURS_FILE)).await?.unwrap_or_default())
    }

    async fn write_tours(&self, tours: &[Tour]) -> Result<(), AppError> {
        write_json(&self.path(TOURS_FILE), tours).await
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let text = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, text).await?;
    tracing::debug!(path = %path.display(), "Wrote data file");
    Ok(())
}

#[async_trait]
impl TourStore for FileRepository {
    async fn list_all(&self) -> Result<Vec<Tour>, AppError> {
        let mut tours = self.read_tours().await?;
        tours.sort_by_key(|t| t.id);
        Ok(tours)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tour>, AppError> {
        Ok(self.read_tours().await?.into_iter().find(|t| t.id == id))
    }

    // Two concurrent creates can pick the same id; accepted for this backend.
    async fn create(&self, tour: NewTour) -> Result<Tour, AppError> {
        let mut tours = self.read_tours().await?;
        let tour = tour.into_tour(next_tour_id(&tours)?);
        tours.push(tour.clone());
        self.write_tours(&tours).await?;

        tracing::info!(tour_id = tour.id, "Tour created");
        Ok(tour)
    }

    async fn update(&self, id: i64, changes: &UpdateTourRequest) -> Result<Option<Tour>, AppError> {
        let mut tours = self.read_tours().await?;
        let Some(tour) = tours.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        tour.apply(changes);
        let updated = tour.clone();

        self.write_tours(&tours).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tours = self.read_tours().await?;
        let before = tours.len();
        tours.retain(|t| t.id != id);
        if tours.len() == before {
            return Ok(false);
        }

        self.write_tours(&tours).await?;
        Ok(true)
    }
}

#[async_trait]
impl CarouselStore for FileRepository {
    async fn list(&self) -> Result<Vec<CarouselSlide>, AppError> {
        Ok(read_json(&self.path(CAROUSEL_FILE)).await?.unwrap_or_default())
    }

    async fn replace_all(&self, slides: Vec<CarouselSlide>) -> Result<Vec<CarouselSlide>, AppError> {
        write_json(&self.path(CAROUSEL_FILE), &slides).await?;
        tracing::info!(count = slides.len(), "Carousel replaced");
        Ok(slides)
    }
}

#[async_trait]
impl ContentStore for FileRepository {
    async fn get_about(&self) -> Result<Option<AboutContent>, AppError> {
        read_json(&self.content_path(ContentKey::About)).await
    }

    async fn put_about(&self, about: &AboutContent) -> Result<AboutContent, AppError> {
        write_json(&self.content_path(ContentKey::About), about).await?;
        Ok(about.clone())
    }

    async fn get_contact(&self) -> Result<Option<ContactInfo>, AppError> {
        read_json(&self.content_path(ContentKey::Contact)).await
    }

    async fn put_contact(&self, contact: &ContactInfo) -> Result<ContactInfo, AppError> {
        write_json(&self.content_path(ContentKey::Contact), contact).await?;
        Ok(contact.clone())
    }
}

#[async_trait]
impl CredentialStore for FileRepository {
    async fn load(&self) -> Result<Option<AdminCredential>, AppError> {
        read_json(&self.path(ADMIN_FILE)).await
    }

    async fn save(&self, credential: &AdminCredential) -> Result<(), AppError> {
        write_json(&self.path(ADMIN_FILE), credential).await
    }
}
