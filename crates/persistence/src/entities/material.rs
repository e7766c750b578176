//! Material entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::material::{ControlMode, Material};

/// Database row mapping for the materials table.
#[derive(Debug, Clone, FromRow)]
pub struct MaterialEntity {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub control_mode: String,
    pub total_quantity: i32,
    pub available_quantity: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaterialEntity {
    /// Convert to domain model.
    ///
    /// The control mode column is CHECK-constrained; a value the domain does
    /// not know is a decode failure, not a fallback.
    pub fn into_domain(self) -> Result<Material, sqlx::Error> {
        let control_mode = self
            .control_mode
            .parse::<ControlMode>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(Material {
            id: self.id,
            name: self.name,
            category: self.category,
            control_mode,
            total_quantity: self.total_quantity,
            available_quantity: self.available_quantity,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entity() -> MaterialEntity {
        MaterialEntity {
            id: Uuid::new_v4(),
            name: "Cadeiras".to_string(),
            category: "Mobiliário".to_string(),
            control_mode: "QUANTITY".to_string(),
            total_quantity: 50,
            available_quantity: 50,
            description: Some("Cadeiras plásticas brancas".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_entity_to_domain() {
        let entity = create_test_entity();
        let material = entity.clone().into_domain().unwrap();

        assert_eq!(material.id, entity.id);
        assert_eq!(material.name, "Cadeiras");
        assert_eq!(material.control_mode, ControlMode::Quantity);
        assert_eq!(material.total_quantity, 50);
        assert_eq!(material.available_quantity, 50);
    }

    #[test]
    fn test_entity_with_invalid_control_mode() {
        let mut entity = create_test_entity();
        entity.control_mode = "BROKEN".to_string();

        let result = entity.into_domain();
        assert!(matches!(result, Err(sqlx::Error::Decode(_))));
    }

    #[test]
    fn test_entity_serialized_mode() {
        let mut entity = create_test_entity();
        entity.control_mode = "SERIALIZED".to_string();

        let material = entity.into_domain().unwrap();
        assert_eq!(material.control_mode, ControlMode::Serialized);
    }
}
