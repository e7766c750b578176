//! Serial entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::serial::{Serial, SerialStatus};

/// Database row mapping for the serials table.
#[derive(Debug, Clone, FromRow)]
pub struct SerialEntity {
    pub id: Uuid,
    pub material_id: Uuid,
    pub serial_number: String,
    pub status: String,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub event_id: Option<Uuid>,
    pub event_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SerialEntity {
    /// Convert to domain model.
    pub fn into_domain(self) -> Result<Serial, sqlx::Error> {
        let status = self
            .status
            .parse::<SerialStatus>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(Serial {
            id: self.id,
            material_id: self.material_id,
            serial_number: self.serial_number,
            status,
            location: self.location,
            tags: self.tags,
            event_id: self.event_id,
            event_name: self.event_name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entity() -> SerialEntity {
        SerialEntity {
            id: Uuid::new_v4(),
            material_id: Uuid::new_v4(),
            serial_number: "SN-001".to_string(),
            status: "AVAILABLE".to_string(),
            location: Some("Depósito A".to_string()),
            tags: vec!["par64".to_string()],
            event_id: None,
            event_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_entity_to_domain() {
        let entity = create_test_entity();
        let serial = entity.clone().into_domain().unwrap();

        assert_eq!(serial.id, entity.id);
        assert_eq!(serial.serial_number, "SN-001");
        assert_eq!(serial.status, SerialStatus::Available);
        assert_eq!(serial.tags, vec!["par64".to_string()]);
        assert!(serial.event_id.is_none());
    }

    #[test]
    fn test_entity_in_use_with_event_link() {
        let mut entity = create_test_entity();
        entity.status = "IN_USE".to_string();
        entity.event_id = Some(Uuid::new_v4());
        entity.event_name = Some("Festival de Verão".to_string());

        let serial = entity.into_domain().unwrap();
        assert_eq!(serial.status, SerialStatus::InUse);
        assert!(serial.event_link_consistent());
    }

    #[test]
    fn test_entity_with_invalid_status() {
        let mut entity = create_test_entity();
        entity.status = "BROKEN".to_string();

        let result = entity.into_domain();
        assert!(matches!(result, Err(sqlx::Error::Decode(_))));
    }
}
