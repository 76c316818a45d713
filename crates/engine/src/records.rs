//! Expense record primitives.
//!
//! An `ExpenseRecord` is one logged expense against one or more people.
//! Records are append-only: after creation the only permitted mutation is
//! the one-way open → settled transition performed by [`Engine::settle`].
//!
//! [`Engine::settle`]: crate::Engine::settle

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Roster};

/// One expense, open (`is_settled == false`) or closed into a settlement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: Uuid,
    /// User-supplied calendar date, kept verbatim. Not validated: an
    /// unparseable date only drops the record from settlement period
    /// bounds, never from totals.
    pub date: String,
    pub amount: i64,
    /// Non-empty, de-duplicated, in the order the user entered them.
    pub personnel: Vec<String>,
    /// Department labels derived from the roster at creation time. This
    /// is a snapshot: later roster edits do not rewrite it.
    pub departments: Vec<String>,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub is_settled: bool,
    pub settlement_id: Option<Uuid>,
}

impl ExpenseRecord {
    /// Builds a fresh open record, validating amount and personnel and
    /// snapshotting the department labels from the current roster.
    pub fn new(
        date: String,
        amount: i64,
        personnel: Vec<String>,
        description: Option<String>,
        created_by: String,
        roster: &Roster,
    ) -> ResultEngine<Self> {
        if amount < 0 {
            return Err(EngineError::Validation("amount must be >= 0".to_string()));
        }
        let mut deduped: Vec<String> = Vec::with_capacity(personnel.len());
        for person in personnel {
            if !person.is_empty() && !deduped.contains(&person) {
                deduped.push(person);
            }
        }
        if deduped.is_empty() {
            return Err(EngineError::Validation(
                "at least one person is required".to_string(),
            ));
        }
        let departments = roster.departments_for(&deduped);
        Ok(Self {
            id: Uuid::new_v4(),
            date,
            amount,
            personnel: deduped,
            departments,
            description,
            created_by,
            created_at: Utc::now(),
            is_settled: false,
            settlement_id: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub date: String,
    pub amount: i64,
    /// JSON array of names.
    pub personnel: String,
    /// JSON array of department labels.
    pub departments: String,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub is_settled: bool,
    pub settlement_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::settlements::Entity",
        from = "Column::SettlementId",
        to = "super::settlements::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Settlements,
}

impl Related<super::settlements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settlements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExpenseRecord> for ActiveModel {
    fn from(record: &ExpenseRecord) -> Self {
        Self {
            id: ActiveValue::Set(record.id.to_string()),
            date: ActiveValue::Set(record.date.clone()),
            amount: ActiveValue::Set(record.amount),
            personnel: ActiveValue::Set(
                serde_json::to_string(&record.personnel).unwrap_or_else(|_| "[]".to_string()),
            ),
            departments: ActiveValue::Set(
                serde_json::to_string(&record.departments).unwrap_or_else(|_| "[]".to_string()),
            ),
            description: ActiveValue::Set(record.description.clone()),
            created_by: ActiveValue::Set(record.created_by.clone()),
            created_at: ActiveValue::Set(record.created_at),
            is_settled: ActiveValue::Set(record.is_settled),
            settlement_id: ActiveValue::Set(record.settlement_id.map(|id| id.to_string())),
        }
    }
}

impl TryFrom<Model> for ExpenseRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("record not exists".to_string()))?,
            date: model.date,
            amount: model.amount,
            personnel: serde_json::from_str(&model.personnel)
                .map_err(|err| EngineError::Validation(format!("corrupt personnel list: {err}")))?,
            departments: serde_json::from_str(&model.departments).map_err(|err| {
                EngineError::Validation(format!("corrupt departments list: {err}"))
            })?,
            description: model.description,
            created_by: model.created_by,
            created_at: model.created_at,
            is_settled: model.is_settled,
            settlement_id: model.settlement_id.and_then(|id| Uuid::parse_str(&id).ok()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amount_rejected() {
        let err = ExpenseRecord::new(
            "2024-01-05".to_string(),
            -1,
            vec!["A".to_string()],
            None,
            "alice@example.com".to_string(),
            &Roster::default_roster(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn personnel_deduplicated_but_never_empty() {
        let record = ExpenseRecord::new(
            "2024-01-05".to_string(),
            100,
            vec!["A".to_string(), "A".to_string(), "B".to_string()],
            None,
            "alice@example.com".to_string(),
            &Roster::default_roster(),
        )
        .unwrap();
        assert_eq!(record.personnel, vec!["A", "B"]);
        assert!(!record.is_settled);
        assert!(record.settlement_id.is_none());

        let err = ExpenseRecord::new(
            "2024-01-05".to_string(),
            100,
            vec![String::new()],
            None,
            "alice@example.com".to_string(),
            &Roster::default_roster(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn departments_snapshot_derived_from_roster() {
        let record = ExpenseRecord::new(
            "2024-01-05".to_string(),
            100,
            vec!["俊德".to_string(), "清野".to_string()],
            None,
            "alice@example.com".to_string(),
            &Roster::default_roster(),
        )
        .unwrap();
        assert_eq!(record.departments, vec!["品質部", "技術部"]);
    }

    #[test]
    fn model_round_trip_preserves_lists() {
        let record = ExpenseRecord::new(
            "2024-01-05".to_string(),
            250,
            vec!["俊德".to_string(), "清野".to_string()],
            Some("taxi".to_string()),
            "alice@example.com".to_string(),
            &Roster::default_roster(),
        )
        .unwrap();

        let active = ActiveModel::from(&record);
        let model = Model {
            id: active.id.unwrap(),
            date: active.date.unwrap(),
            amount: active.amount.unwrap(),
            personnel: active.personnel.unwrap(),
            departments: active.departments.unwrap(),
            description: active.description.unwrap(),
            created_by: active.created_by.unwrap(),
            created_at: active.created_at.unwrap(),
            is_settled: active.is_settled.unwrap(),
            settlement_id: active.settlement_id.unwrap(),
        };
        assert_eq!(ExpenseRecord::try_from(model).unwrap(), record);
    }
}
