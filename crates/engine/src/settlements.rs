//! Settlement primitives.
//!
//! A `Settlement` is the immutable summary produced by one close-of-books
//! run. It owns, by back-reference, the records it closed; it is never
//! edited or deleted.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Uuid,
    /// The day the settlement was executed, `%Y-%m-%d`.
    pub date: String,
    pub total_amount: i64,
    pub record_count: i64,
    /// Earliest parseable record date in the batch; the settlement date
    /// itself when no record date parses.
    pub period_start: String,
    /// Latest parseable record date in the batch, same fallback.
    pub period_end: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub date: String,
    pub total_amount: i64,
    pub record_count: i64,
    pub period_start: String,
    pub period_end: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::records::Entity")]
    Records,
}

impl Related<super::records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Settlement> for ActiveModel {
    fn from(settlement: &Settlement) -> Self {
        Self {
            id: ActiveValue::Set(settlement.id.to_string()),
            date: ActiveValue::Set(settlement.date.clone()),
            total_amount: ActiveValue::Set(settlement.total_amount),
            record_count: ActiveValue::Set(settlement.record_count),
            period_start: ActiveValue::Set(settlement.period_start.clone()),
            period_end: ActiveValue::Set(settlement.period_end.clone()),
            created_by: ActiveValue::Set(settlement.created_by.clone()),
            created_at: ActiveValue::Set(settlement.created_at),
        }
    }
}

impl TryFrom<Model> for Settlement {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("settlement not exists".to_string()))?,
            date: model.date,
            total_amount: model.total_amount,
            record_count: model.record_count,
            period_start: model.period_start,
            period_end: model.period_end,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
