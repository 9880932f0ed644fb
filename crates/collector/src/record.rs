//! Finished form records and the append-only table they live in.

use std::future::Future;

use sea_orm::{ActiveValue, DatabaseConnection, QueryOrder, entity::prelude::*};

use crate::error::StoreError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub age: String,
    pub grade: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A stored record.
pub type Record = Model;

/// A record that has been fully collected but not stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRecord {
    pub name: String,
    pub age: String,
    pub grade: String,
}

impl From<&NewRecord> for ActiveModel {
    fn from(record: &NewRecord) -> Self {
        Self {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(record.name.clone()),
            age: ActiveValue::Set(record.age.clone()),
            grade: ActiveValue::Set(record.grade.clone()),
        }
    }
}

/// Durable, append-only destination of finished records.
pub trait RecordStore: Send + Sync {
    /// Append the record and return its id.
    fn insert(&self, record: &NewRecord) -> impl Future<Output = Result<i32, StoreError>> + Send;
}

/// [`RecordStore`] backed by the `users` table.
#[derive(Clone, Debug)]
pub struct SqliteRecordStore {
    database: DatabaseConnection,
}

impl SqliteRecordStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        Ok(Entity::find().count(&self.database).await?)
    }

    /// All records, oldest first.
    pub async fn list(&self) -> Result<Vec<Record>, StoreError> {
        Ok(Entity::find()
            .order_by_asc(Column::Id)
            .all(&self.database)
            .await?)
    }
}

impl RecordStore for SqliteRecordStore {
    async fn insert(&self, record: &NewRecord) -> Result<i32, StoreError> {
        let model = ActiveModel::from(record).insert(&self.database).await?;
        tracing::debug!("stored record {}", model.id);
        Ok(model.id)
    }
}
