//! Homepage carousel slides.

use serde::{Deserialize, Serialize};

use super::non_empty;
use crate::errors::AppError;

/// One slide of the homepage carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselSlide {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub description: String,
}

/// A slide as submitted by the admin UI. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarouselSlideInput {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Validate a whole batch. One incomplete slide rejects all of them.
///
/// Slides without an id get their 1-based position.
pub fn sanitize_slides(inputs: Vec<CarouselSlideInput>) -> Result<Vec<CarouselSlide>, AppError> {
    let mut slides = Vec::with_capacity(inputs.len());

    for (idx, input) in inputs.into_iter().enumerate() {
        let (Some(url), Some(title), Some(description)) = (
            non_empty(input.url),
            non_empty(input.title),
            non_empty(input.description),
        ) else {
            return Err(AppError::Validation(format!(
                "Missing fields in carousel item {}",
                idx + 1
            )));
        };

        slides.push(CarouselSlide {
            id: input.id.unwrap_or(idx as i64 + 1),
            url,
            title,
            description,
        });
    }

    Ok(slides)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: Option<i64>, url: &str) -> CarouselSlideInput {
        CarouselSlideInput {
            id,
            url: Some(url.to_string()),
            title: Some("Gyeongbokgung".to_string()),
            description: Some("Main palace".to_string()),
        }
    }

    #[test]
    fn test_missing_ids_use_position() {
        let slides = sanitize_slides(vec![input(None, "/a.jpg"), input(Some(9), "/b.jpg"), input(None, "/c.jpg")])
            .unwrap();
        let ids: Vec<i64> = slides.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 9, 3]);
    }

    #[test]
    fn test_one_bad_slide_rejects_batch() {
        let mut bad = input(None, "/b.jpg");
        bad.description = Some(String::new());
        let result = sanitize_slides(vec![input(None, "/a.jpg"), bad]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_empty_batch_is_valid() {
        assert!(sanitize_slides(Vec::new()).unwrap().is_empty());
    }
}
