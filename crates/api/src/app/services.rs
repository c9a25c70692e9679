//! Process-wide service wiring: token codec plus the two in-memory stores.

use chrono::{DateTime, TimeZone, Utc};

use rentaldesk_auth::{user::hash_password, CredentialError, CredentialStore, Role, TokenCodec, UserRecord};
use rentaldesk_core::{PropertyId, UserId};
use rentaldesk_properties::{PropertyRecord, PropertyRepository, PropertyStatus, PropertyType};

use crate::config::AppConfig;

pub const DEMO_PASSWORD: &str = "123456";
pub const DEMO_OWNER_EMAIL: &str = "admin@rentaldesk.dev";
pub const DEMO_TENANT_EMAIL: &str = "user@rentaldesk.dev";

/// Shared handles passed to every handler through an `Extension`.
#[derive(Debug)]
pub struct AppServices {
    pub codec: TokenCodec,
    pub credentials: CredentialStore,
    pub properties: PropertyRepository,
}

pub fn build_services(config: &AppConfig) -> Result<AppServices, CredentialError> {
    let services = AppServices {
        codec: TokenCodec::new(config.jwt_secret.as_bytes()),
        credentials: CredentialStore::new(config.password_policy),
        properties: PropertyRepository::new(),
    };

    if config.seed_demo_data {
        seed_demo_data(&services)?;
        tracing::info!(
            users = services.credentials.len(),
            properties = services.properties.len(),
            "demo data seeded"
        );
    }

    Ok(services)
}

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn seed_demo_data(services: &AppServices) -> Result<(), CredentialError> {
    let joined = at(2025, 1, 1);
    for (id, email, first_name, last_name, role) in [
        ("1", DEMO_OWNER_EMAIL, "João", "Silva", Role::Owner),
        ("2", DEMO_TENANT_EMAIL, "Maria", "Santos", Role::Tenant),
    ] {
        services.credentials.seed(UserRecord {
            id: UserId::new(id),
            email: email.to_string(),
            password_hash: hash_password(DEMO_PASSWORD)?,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role,
            is_active: true,
            email_verified: true,
            created_at: joined,
        });
    }

    for record in demo_properties() {
        services.properties.seed(record);
    }
    Ok(())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn demo_properties() -> Vec<PropertyRecord> {
    let owner = UserId::new("1");
    vec![
        PropertyRecord {
            id: PropertyId::new("1"),
            title: "Apartamento 2 quartos - Centro".to_string(),
            description: "Apartamento moderno no centro da cidade com vista panorâmica".to_string(),
            property_type: PropertyType::Apartment,
            status: PropertyStatus::Available,
            address: "Rua das Flores, 123".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            zip_code: "01234-567".to_string(),
            monthly_rent: 2500.0,
            bedrooms: 2,
            bathrooms: 1,
            area: 65.5,
            parking: 1,
            furnished: true,
            pet_allowed: false,
            images: strings(&[
                "https://images.unsplash.com/photo-1522708323590-d24dbb6b0267?w=800",
                "https://images.unsplash.com/photo-1484154218962-a197022b5858?w=800",
            ]),
            amenities: strings(&["Piscina", "Academia", "Portaria 24h", "Elevador"]),
            owner_id: owner.clone(),
            tenant_id: None,
            created_at: at(2025, 1, 1),
            updated_at: at(2025, 1, 15),
        },
        PropertyRecord {
            id: PropertyId::new("2"),
            title: "Casa 3 quartos - Jardins".to_string(),
            description: "Casa espaçosa com quintal e área gourmet".to_string(),
            property_type: PropertyType::House,
            status: PropertyStatus::Rented,
            address: "Rua dos Pinheiros, 456".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            zip_code: "01234-890".to_string(),
            monthly_rent: 4500.0,
            bedrooms: 3,
            bathrooms: 2,
            area: 120.0,
            parking: 2,
            furnished: false,
            pet_allowed: true,
            images: strings(&[
                "https://images.unsplash.com/photo-1568605114967-8130f3a36994?w=800",
                "https://images.unsplash.com/photo-1570129477492-45c003edd2be?w=800",
            ]),
            amenities: strings(&["Quintal", "Área Gourmet", "Garagem Coberta"]),
            owner_id: owner.clone(),
            tenant_id: Some(UserId::new("2")),
            created_at: at(2024, 12, 1),
            updated_at: at(2025, 1, 10),
        },
        PropertyRecord {
            id: PropertyId::new("3"),
            title: "Studio - Vila Madalena".to_string(),
            description: "Studio moderno e compacto em localização privilegiada".to_string(),
            property_type: PropertyType::Studio,
            status: PropertyStatus::Maintenance,
            address: "Rua Harmonia, 789".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            zip_code: "05435-000".to_string(),
            monthly_rent: 1800.0,
            bedrooms: 0,
            bathrooms: 1,
            area: 35.0,
            parking: 0,
            furnished: true,
            pet_allowed: false,
            images: strings(&["https://images.unsplash.com/photo-1502672260266-1c1ef2d93688?w=800"]),
            amenities: strings(&["Internet", "Mobiliado"]),
            owner_id: owner,
            tenant_id: None,
            created_at: at(2024, 11, 15),
            updated_at: at(2025, 1, 20),
        },
    ]
}
