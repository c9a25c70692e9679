//! Typed create/update payloads for properties.
//!
//! Request bodies arrive as loosely-typed JSON objects. Every field is checked
//! against a fixed schema and coerced to its semantic type here, and the whole
//! payload is accepted or rejected before anything is written, so a rejected
//! payload never touches stored state.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use rentaldesk_core::{DomainError, DomainResult, PropertyId, UserId};

use crate::{PropertyRecord, PropertyStatus, PropertyType};

type Fields = Map<String, Value>;

/// Fields a create payload must carry (checked in this order).
pub const REQUIRED_FIELDS: [&str; 7] = [
    "title",
    "description",
    "type",
    "address",
    "city",
    "state",
    "monthlyRent",
];

/// Validated payload for creating a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
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
}

impl NewProperty {
    pub fn from_json(fields: &Fields) -> DomainResult<Self> {
        for name in REQUIRED_FIELDS {
            if fields.get(name).is_none_or(is_blank) {
                return Err(DomainError::missing_field(name));
            }
        }

        Ok(Self {
            title: required_text(fields, "title")?,
            description: required_text(fields, "description")?,
            property_type: required_text(fields, "type")?.parse::<PropertyType>()?,
            address: required_text(fields, "address")?,
            city: required_text(fields, "city")?,
            state: required_text(fields, "state")?,
            zip_code: text(fields, "zipCode")?.unwrap_or_default(),
            monthly_rent: decimal(fields, "monthlyRent")?.ok_or_else(|| DomainError::missing_field("monthlyRent"))?,
            bedrooms: count(fields, "bedrooms")?.unwrap_or(0),
            bathrooms: count(fields, "bathrooms")?.unwrap_or(1),
            area: decimal(fields, "area")?.unwrap_or(0.0),
            parking: count(fields, "parking")?.unwrap_or(0),
            furnished: flag(fields, "furnished")?.unwrap_or(false),
            pet_allowed: flag(fields, "petAllowed")?.unwrap_or(false),
            images: strings(fields, "images")?.unwrap_or_default(),
            amenities: strings(fields, "amenities")?.unwrap_or_default(),
        })
    }

    /// Materialize the listing. New listings always start `AVAILABLE`.
    pub fn into_record(self, id: PropertyId, owner_id: UserId, now: DateTime<Utc>) -> PropertyRecord {
        PropertyRecord {
            id,
            title: self.title,
            description: self.description,
            property_type: self.property_type,
            status: PropertyStatus::Available,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            monthly_rent: self.monthly_rent,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            area: self.area,
            parking: self.parking,
            furnished: self.furnished,
            pet_allowed: self.pet_allowed,
            images: self.images,
            amenities: self.amenities,
            owner_id,
            tenant_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update. `None` means "leave as is".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub monthly_rent: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub area: Option<f64>,
    pub parking: Option<u32>,
    pub furnished: Option<bool>,
    pub pet_allowed: Option<bool>,
    pub images: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
}

impl PropertyPatch {
    /// Unrecognized field names are ignored; `null` counts as absent.
    pub fn from_json(fields: &Fields) -> DomainResult<Self> {
        Ok(Self {
            title: non_blank_text(fields, "title")?,
            description: non_blank_text(fields, "description")?,
            property_type: text(fields, "type")?.map(|s| s.parse::<PropertyType>()).transpose()?,
            status: text(fields, "status")?.map(|s| s.parse::<PropertyStatus>()).transpose()?,
            address: non_blank_text(fields, "address")?,
            city: non_blank_text(fields, "city")?,
            state: non_blank_text(fields, "state")?,
            zip_code: text(fields, "zipCode")?,
            monthly_rent: decimal(fields, "monthlyRent")?,
            bedrooms: count(fields, "bedrooms")?,
            bathrooms: count(fields, "bathrooms")?,
            area: decimal(fields, "area")?,
            parking: count(fields, "parking")?,
            furnished: flag(fields, "furnished")?,
            pet_allowed: flag(fields, "petAllowed")?,
            images: strings(fields, "images")?,
            amenities: strings(fields, "amenities")?,
        })
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn present<'a>(fields: &'a Fields, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|v| !v.is_null())
}

fn text(fields: &Fields, name: &str) -> DomainResult<Option<String>> {
    match present(fields, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(DomainError::validation(format!("{name} must be a string"))),
    }
}

fn required_text(fields: &Fields, name: &str) -> DomainResult<String> {
    text(fields, name)?
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DomainError::missing_field(name))
}

fn non_blank_text(fields: &Fields, name: &str) -> DomainResult<Option<String>> {
    match text(fields, name)? {
        Some(s) if s.is_empty() => Err(DomainError::validation(format!("{name} must not be empty"))),
        other => Ok(other),
    }
}

/// Non-negative finite decimal; accepts JSON numbers and numeric strings.
fn decimal(fields: &Fields, name: &str) -> DomainResult<Option<f64>> {
    let Some(value) = present(fields, name) else {
        return Ok(None);
    };

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
        Some(_) => Err(DomainError::validation(format!("{name} must be a non-negative number"))),
        None => Err(DomainError::validation(format!("{name} must be a number"))),
    }
}

/// Non-negative integer; accepts integral JSON numbers and integer strings.
fn count(fields: &Fields, name: &str) -> DomainResult<Option<u32>> {
    let Some(value) = present(fields, name) else {
        return Ok(None);
    };

    let parsed = match value {
        Value::Number(n) => match n.as_u64() {
            Some(u) => u32::try_from(u).ok(),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
                .map(|f| f as u32),
        },
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };

    parsed
        .map(Some)
        .ok_or_else(|| DomainError::validation(format!("{name} must be a non-negative integer")))
}

fn flag(fields: &Fields, name: &str) -> DomainResult<Option<bool>> {
    let Some(value) = present(fields, name) else {
        return Ok(None);
    };

    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };

    parsed
        .map(Some)
        .ok_or_else(|| DomainError::validation(format!("{name} must be a boolean")))
}

fn strings(fields: &Fields, name: &str) -> DomainResult<Option<Vec<String>>> {
    let Some(value) = present(fields, name) else {
        return Ok(None);
    };

    let Value::Array(items) = value else {
        return Err(DomainError::validation(format!("{name} must be a list of strings")));
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            _ => Err(DomainError::validation(format!("{name} must be a list of strings"))),
        })
        .collect::<DomainResult<Vec<_>>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    fn full_payload() -> Value {
        json!({
            "title": "Apartamento 2 quartos",
            "description": "Perto do metro",
            "type": "apartment",
            "address": "Rua das Flores, 123",
            "city": "Sao Paulo",
            "state": "SP",
            "monthlyRent": "2500.50",
            "bedrooms": 2,
            "bathrooms": "1",
            "area": 65.5,
            "furnished": "true",
            "amenities": ["Piscina"]
        })
    }

    #[test]
    fn create_payload_coerces_numeric_and_boolean_fields() {
        let new = NewProperty::from_json(&fields(full_payload())).unwrap();

        assert_eq!(new.property_type, PropertyType::Apartment);
        assert_eq!(new.monthly_rent, 2500.5);
        assert_eq!(new.bedrooms, 2);
        assert_eq!(new.bathrooms, 1);
        assert!(new.furnished);
        assert!(!new.pet_allowed);
        assert_eq!(new.parking, 0);
        assert_eq!(new.zip_code, "");
    }

    #[test]
    fn missing_required_fields_are_reported_in_order() {
        let mut payload = full_payload();
        payload.as_object_mut().unwrap().remove("title");
        payload["city"] = json!("  ");

        let err = NewProperty::from_json(&fields(payload)).unwrap_err();
        assert_eq!(err, DomainError::MissingField("title".to_string()));
    }

    #[test]
    fn empty_rent_is_missing_but_garbage_rent_is_bad_request() {
        let mut payload = full_payload();
        payload["monthlyRent"] = json!("");
        assert_eq!(
            NewProperty::from_json(&fields(payload.clone())).unwrap_err(),
            DomainError::MissingField("monthlyRent".to_string())
        );

        payload["monthlyRent"] = json!("cheap");
        assert!(matches!(
            NewProperty::from_json(&fields(payload)),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn negative_and_fractional_counts_are_rejected() {
        let mut payload = full_payload();
        payload["bedrooms"] = json!(-1);
        assert!(matches!(NewProperty::from_json(&fields(payload.clone())), Err(DomainError::Validation(_))));

        payload["bedrooms"] = json!(2.5);
        assert!(matches!(NewProperty::from_json(&fields(payload)), Err(DomainError::Validation(_))));
    }

    #[test]
    fn unknown_type_is_bad_request() {
        let mut payload = full_payload();
        payload["type"] = json!("castle");
        assert!(matches!(NewProperty::from_json(&fields(payload)), Err(DomainError::Validation(_))));
    }

    #[test]
    fn patch_only_carries_present_fields_and_ignores_unknown_ones() {
        let patch = PropertyPatch::from_json(&fields(json!({
            "monthlyRent": 3000,
            "petAllowed": false,
            "status": "rented",
            "ownerId": "999",
            "id": "42"
        })))
        .unwrap();

        assert_eq!(patch.monthly_rent, Some(3000.0));
        assert_eq!(patch.pet_allowed, Some(false));
        assert_eq!(patch.status, Some(PropertyStatus::Rented));
        assert_eq!(patch.title, None);
        assert_eq!(patch.bedrooms, None);
    }

    #[test]
    fn empty_patch_is_valid() {
        let patch = PropertyPatch::from_json(&Fields::new()).unwrap();
        assert_eq!(patch, PropertyPatch::default());
    }

    #[test]
    fn patch_rejects_blanking_required_text_and_bad_types() {
        assert!(PropertyPatch::from_json(&fields(json!({ "title": "" }))).is_err());
        assert!(PropertyPatch::from_json(&fields(json!({ "furnished": "maybe" }))).is_err());
        assert!(PropertyPatch::from_json(&fields(json!({ "images": ["a", 1] }))).is_err());
        assert!(PropertyPatch::from_json(&fields(json!({ "area": -3 }))).is_err());
    }
}
