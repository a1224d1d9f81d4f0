//! Tour model and the request bodies that create or patch it.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A bookable tour listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub duration: String,
    pub image: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub itinerary: Vec<String>,
    #[serde(default)]
    pub included: Vec<String>,
}

/// Validated tour fields, ready to be assigned an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTour {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub duration: String,
    pub image: String,
    pub highlights: Vec<String>,
    pub itinerary: Vec<String>,
    pub included: Vec<String>,
}

impl NewTour {
    pub fn into_tour(self, id: i64) -> Tour {
        Tour {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            duration: self.duration,
            image: self.image,
            highlights: self.highlights,
            itinerary: self.itinerary,
            included: self.included,
        }
    }
}

/// Request body for creating a new tour.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTourRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub itinerary: Vec<String>,
    #[serde(default)]
    pub included: Vec<String>,
}

impl CreateTourRequest {
    /// Check required fields and produce the fields to persist.
    pub fn validate(self) -> Result<NewTour, AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(AppError::Validation("Description is required".to_string()));
        }
        if self.image.trim().is_empty() {
            return Err(AppError::Validation("Image is required".to_string()));
        }
        let price = self
            .price
            .ok_or_else(|| AppError::Validation("Price is required".to_string()))?;
        validate_price(price)?;

        Ok(NewTour {
            title: self.title,
            description: self.description,
            price,
            duration: self.duration,
            image: self.image,
            highlights: self.highlights,
            itinerary: self.itinerary,
            included: self.included,
        })
    }
}

/// Request body for patching an existing tour.
///
/// Has no `id` field, so an id in the payload is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTourRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub highlights: Option<Vec<String>>,
    #[serde(default)]
    pub itinerary: Option<Vec<String>>,
    #[serde(default)]
    pub included: Option<Vec<String>>,
}

impl UpdateTourRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }
}

impl Tour {
    /// Merge the supplied fields onto this tour. The id is never touched.
    pub fn apply(&mut self, changes: &UpdateTourRequest) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(duration) = &changes.duration {
            self.duration = duration.clone();
        }
        if let Some(image) = &changes.image {
            self.image = image.clone();
        }
        if let Some(highlights) = &changes.highlights {
            self.highlights = highlights.clone();
        }
        if let Some(itinerary) = &changes.itinerary {
            self.itinerary = itinerary.clone();
        }
        if let Some(included) = &changes.included {
            self.included = included.clone();
        }
    }
}

fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation(
            "Price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

/// Next id for a collection: one past the largest, or 1 when empty.
pub fn next_tour_id(tours: &[Tour]) -> Result<i64, AppError> {
    match tours.iter().map(|t| t.id).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| AppError::Internal(format!("Tour id space exhausted at {}", max))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateTourRequest {
        CreateTourRequest {
            title: "Seoul Day Tour".into(),
            description: "Palaces and markets".into(),
            price: Some(100.0),
            duration: "1 Day".into(),
            image: "http://x/y.jpg".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_defaults_lists() {
        let tour = request().validate().unwrap().into_tour(1);
        assert!(tour.highlights.is_empty());
        assert!(tour.itinerary.is_empty());
        assert!(tour.included.is_empty());
    }

    #[test]
    fn test_validate_requires_fields() {
        let mut missing_title = request();
        missing_title.title = "  ".into();
        assert!(matches!(
            missing_title.validate(),
            Err(AppError::Validation(_))
        ));

        let mut missing_price = request();
        missing_price.price = None;
        assert!(missing_price.validate().is_err());

        let mut negative = request();
        negative.price = Some(-1.0);
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_zero_price_is_allowed() {
        let mut free = request();
        free.price = Some(0.0);
        assert_eq!(free.validate().unwrap().price, 0.0);
    }

    #[test]
    fn test_apply_keeps_id() {
        let mut tour = request().validate().unwrap().into_tour(7);
        let changes: UpdateTourRequest =
            serde_json::from_value(serde_json::json!({ "id": 99, "title": "Busan" })).unwrap();
        tour.apply(&changes);
        assert_eq!(tour.id, 7);
        assert_eq!(tour.title, "Busan");
        assert_eq!(tour.price, 100.0);
    }

    #[test]
    fn test_next_tour_id() {
        assert_eq!(next_tour_id(&[]).unwrap(), 1);
        let a = request().validate().unwrap().into_tour(3);
        let b = request().validate().unwrap().into_tour(1);
        assert_eq!(next_tour_id(&[a, b]).unwrap(), 4);
    }

    #[test]
    fn test_next_tour_id_at_max() {
        let last = request().validate().unwrap().into_tour(i64::MAX);
        assert!(matches!(next_tour_id(&[last]), Err(AppError::Internal(_))));
    }
}
