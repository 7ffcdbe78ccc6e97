//! Dimension repository for dimension types and values database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{dimension_types, dimension_values};

/// Error types for dimension directory operations.
#[derive(Debug, thiserror::Error)]
pub enum DimensionError {
    /// Dimension type code already exists.
    #[error("Dimension type code '{0}' already exists")]
    DuplicateTypeCode(String),

    /// Dimension value code already exists for this type.
    #[error("Dimension value code '{0}' already exists for this type")]
    DuplicateValueCode(String),

    /// Dimension type not found.
    #[error("Dimension type not found: {0}")]
    TypeNotFound(Uuid),

    /// Dimension value not found.
    #[error("Dimension value not found: {0}")]
    ValueNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a dimension type.
#[derive(Debug, Clone)]
pub struct CreateDimensionTypeInput {
    /// Dimension type code (unique).
    pub code: String,
    /// Dimension type name.
    pub name: String,
    /// Sort order for display.
    pub sort_order: i16,
}

/// Input for creating a dimension value.
#[derive(Debug, Clone)]
pub struct CreateDimensionValueInput {
    /// The dimension type this value belongs to.
    pub dimension_type_id: Uuid,
    /// Dimension value code (unique within the type).
    pub code: String,
    /// Dimension value name.
    pub name: String,
}

/// Dimension repository for directory operations.
#[derive(Debug, Clone)]
pub struct DimensionRepository {
    db: DatabaseConnection,
}

impl DimensionRepository {
    /// Creates a new dimension repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new dimension type.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is already taken.
    pub async fn create_dimension_type(
        &self,
        input: CreateDimensionTypeInput,
    ) -> Result<dimension_types::Model, DimensionError> {
        let existing = dimension_types::Entity::find()
            .filter(dimension_types::Column::Code.eq(&input.code))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(DimensionError::DuplicateTypeCode(input.code));
        }

        let now = chrono::Utc::now().into();
        let dimension_type = dimension_types::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code),
            name: Set(input.name),
            is_active: Set(true),
            sort_order: Set(input.sort_order),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(dimension_type.insert(&self.db).await?)
    }

    /// Creates a new dimension value under an existing type.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown or the code is taken.
    pub async fn create_dimension_value(
        &self,
        input: CreateDimensionValueInput,
    ) -> Result<dimension_values::Model, DimensionError> {
        dimension_types::Entity::find_by_id(input.dimension_type_id)
            .one(&self.db)
            .await?
            .ok_or(DimensionError::TypeNotFound(input.dimension_type_id))?;

        let existing = dimension_values::Entity::find()
            .filter(dimension_values::Column::DimensionTypeId.eq(input.dimension_type_id))
            .filter(dimension_values::Column::Code.eq(&input.code))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(DimensionError::DuplicateValueCode(input.code));
        }

        let now = chrono::Utc::now().into();
        let value = dimension_values::ActiveModel {
            id: Set(Uuid::new_v4()),
            dimension_type_id: Set(input.dimension_type_id),
            code: Set(input.code),
            name: Set(input.name),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(value.insert(&self.db).await?)
    }

    /// Lists all dimension types ordered by sort order, then code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_dimension_types(
        &self,
    ) -> Result<Vec<dimension_types::Model>, DimensionError> {
        Ok(dimension_types::Entity::find()
            .order_by_asc(dimension_types::Column::SortOrder)
            .order_by_asc(dimension_types::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Lists the values of one dimension type ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown.
    pub async fn list_dimension_values(
        &self,
        dimension_type_id: Uuid,
    ) -> Result<Vec<dimension_values::Model>, DimensionError> {
        dimension_types::Entity::find_by_id(dimension_type_id)
            .one(&self.db)
            .await?
            .ok_or(DimensionError::TypeNotFound(dimension_type_id))?;

        Ok(dimension_values::Entity::find()
            .filter(dimension_values::Column::DimensionTypeId.eq(dimension_type_id))
            .order_by_asc(dimension_values::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Deactivates a dimension value. Lines already tagged with it are
    /// untouched; new postings may no longer use it.
    ///
    /// # Errors
    ///
    /// Returns `ValueNotFound` if the value does not exist.
    pub async fn deactivate_dimension_value(
        &self,
        value_id: Uuid,
    ) -> Result<(), DimensionError> {
        let model = dimension_values::Entity::find_by_id(value_id)
            .one(&self.db)
            .await?
            .ok_or(DimensionError::ValueNotFound(value_id))?;

        let mut active: dimension_values::ActiveModel = model.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await?;

        Ok(())
    }
}
