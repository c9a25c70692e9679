use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rentaldesk_core::{DomainError, PropertyId, UserId};

use crate::PropertyPatch;

/// Kind of dwelling being listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Apartment,
    House,
    Studio,
    Commercial,
    Land,
}

impl FromStr for PropertyType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "APARTMENT" => Ok(PropertyType::Apartment),
            "HOUSE" => Ok(PropertyType::House),
            "STUDIO" => Ok(PropertyType::Studio),
            "COMMERCIAL" => Ok(PropertyType::Commercial),
            "LAND" => Ok(PropertyType::Land),
            _ => Err(DomainError::validation(
                "type must be one of: APARTMENT, HOUSE, STUDIO, COMMERCIAL, LAND",
            )),
        }
    }
}

/// Rental lifecycle of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    #[default]
    Available,
    Rented,
    Maintenance,
}

impl FromStr for PropertyStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(PropertyStatus::Available),
            "RENTED" => Ok(PropertyStatus::Rented),
            "MAINTENANCE" => Ok(PropertyStatus::Maintenance),
            _ => Err(DomainError::validation(
                "status must be one of: AVAILABLE, RENTED, MAINTENANCE",
            )),
        }
    }
}

/// A property listing.
///
/// # Invariants
/// - `id` never changes once assigned.
/// - `updated_at >= created_at`.
/// - `monthly_rent` and `area` are finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub id: PropertyId,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub monthly_rent: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area: f64,
    pub parking: u32,
    pub furnished: bool,
    pub pet_allowed: bool,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub owner_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyRecord {
    /// Overwrite the fields present in `patch` and stamp `updated_at`.
    ///
    /// The patch has already been validated, so this cannot fail half-way.
    pub fn apply(&mut self, patch: PropertyPatch, now: DateTime<Utc>) {
        let PropertyPatch {
            title,
            description,
            property_type,
            status,
            address,
            city,
            state,
            zip_code,
            monthly_rent,
            bedrooms,
            bathrooms,
            area,
            parking,
            furnished,
            pet_allowed,
            images,
            amenities,
        } = patch;

        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = property_type {
            self.property_type = v;
        }
        if let Some(v) = status {
            self.status = v;
        }
        if let Some(v) = address {
            self.address = v;
        }
        if let Some(v) = city {
            self.city = v;
        }
        if let Some(v) = state {
            self.state = v;
        }
        if let Some(v) = zip_code {
            self.zip_code = v;
        }
        if let Some(v) = monthly_rent {
            self.monthly_rent = v;
        }
        if let Some(v) = bedrooms {
            self.bedrooms = v;
        }
        if let Some(v) = bathrooms {
            self.bathrooms = v;
        }
        if let Some(v) = area {
            self.area = v;
        }
        if let Some(v) = parking {
            self.parking = v;
        }
        if let Some(v) = furnished {
            self.furnished = v;
        }
        if let Some(v) = pet_allowed {
            self.pet_allowed = v;
        }
        if let Some(v) = images {
            self.images = v;
        }
        if let Some(v) = amenities {
            self.amenities = v;
        }

        self.updated_at = now.max(self.created_at);
    }
}
