use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use tokio::sync::Mutex;
use uuid::Uuid;

pub use error::EngineError;
pub use export::write_csv;
pub use records::ExpenseRecord;
pub use reporting::{DepartmentGroup, group_by_department, render_groups};
pub use roster::{Department, Roster, UNASSIGNED_DEPARTMENT};
pub use settlements::Settlement;

mod error;
pub mod export;
pub mod records;
pub mod reporting;
pub mod roster;
pub mod settlements;

type ResultEngine<T> = Result<T, EngineError>;

/// Outcome of a [`Engine::settle`] call.
///
/// `NothingToSettle` is a valid, expected result, not a failure: it means
/// the open set was empty when the snapshot was taken. Repeated settles
/// with no new records return it instead of minting empty settlements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettleOutcome {
    Settled(Settlement),
    NothingToSettle,
}

/// The expense ledger and settlement engine.
///
/// All state lives in the database; the engine itself only carries the
/// connection and the lock that serializes close-of-books runs.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    settle_lock: Mutex<()>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Logs a new open expense record.
    ///
    /// Validates amount and personnel, derives the department snapshot
    /// from the current roster (unknown names classify as
    /// [`UNASSIGNED_DEPARTMENT`]) and persists the record as unsettled.
    pub async fn add_record(
        &self,
        date: &str,
        amount: i64,
        personnel: Vec<String>,
        description: Option<String>,
        created_by: &str,
    ) -> ResultEngine<ExpenseRecord> {
        let roster = self.roster().await;
        let record = ExpenseRecord::new(
            date.to_string(),
            amount,
            personnel,
            description,
            created_by.to_string(),
            &roster,
        )?;

        records::ActiveModel::from(&record)
            .insert(&self.database)
            .await?;
        Ok(record)
    }

    /// Lists all open records, newest first.
    ///
    /// Degrades to an empty list when the database is unreachable; the
    /// ordering is load-bearing for clients and exports.
    pub async fn active_records(&self) -> Vec<ExpenseRecord> {
        let result = records::Entity::find()
            .filter(records::Column::IsSettled.eq(false))
            .order_by_desc(records::Column::CreatedAt)
            .all(&self.database)
            .await;

        match result {
            Ok(models) => collect_records(models),
            Err(err) => {
                tracing::warn!("failed to list active records, returning none: {err}");
                Vec::new()
            }
        }
    }

    /// Lists settlement history, newest first. Degrades to empty on
    /// connectivity failure.
    pub async fn settlements(&self) -> Vec<Settlement> {
        let result = settlements::Entity::find()
            .order_by_desc(settlements::Column::CreatedAt)
            .all(&self.database)
            .await;

        match result {
            Ok(models) => models
                .into_iter()
                .filter_map(|model| match Settlement::try_from(model) {
                    Ok(settlement) => Some(settlement),
                    Err(err) => {
                        tracing::warn!("skipping corrupt settlement row: {err}");
                        None
                    }
                })
                .collect(),
            Err(err) => {
                tracing::warn!("failed to list settlements, returning none: {err}");
                Vec::new()
            }
        }
    }

    /// Returns a single settlement by id.
    pub async fn settlement(&self, settlement_id: Uuid) -> ResultEngine<Settlement> {
        let model = settlements::Entity::find_by_id(settlement_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("settlement not exists".to_string()))?;
        Settlement::try_from(model)
    }

    /// Lists the records a settlement closed, newest first. Degrades to
    /// empty on connectivity failure.
    pub async fn settlement_details(&self, settlement_id: Uuid) -> Vec<ExpenseRecord> {
        let result = records::Entity::find()
            .filter(records::Column::SettlementId.eq(settlement_id.to_string()))
            .order_by_desc(records::Column::CreatedAt)
            .all(&self.database)
            .await;

        match result {
            Ok(models) => collect_records(models),
            Err(err) => {
                tracing::warn!("failed to list settlement details, returning none: {err}");
                Vec::new()
            }
        }
    }

    /// Closes the books: snapshots all open records, aggregates them into
    /// one immutable [`Settlement`] and marks them settled, atomically.
    ///
    /// The snapshot is taken inside the database transaction and the
    /// records flipped are exactly the snapshot's ids, so a record added
    /// while a settle is in flight stays open and outside the settlement.
    /// A process-level mutex serializes concurrent settle calls; the
    /// second caller over an emptied open set gets
    /// [`SettleOutcome::NothingToSettle`], never an empty settlement.
    pub async fn settle(&self, created_by: &str) -> ResultEngine<SettleOutcome> {
        let _guard = self.settle_lock.lock().await;

        let db_tx = self.database.begin().await?;

        // The one read that must not degrade: an outage here has to
        // surface, not masquerade as an empty open set.
        let snapshot: Vec<records::Model> = records::Entity::find()
            .filter(records::Column::IsSettled.eq(false))
            .all(&db_tx)
            .await?;

        if snapshot.is_empty() {
            db_tx.rollback().await?;
            return Ok(SettleOutcome::NothingToSettle);
        }

        let now = Utc::now();
        let settlement_date = now.date_naive();
        let total_amount: i64 = snapshot.iter().map(|model| model.amount).sum();
        let record_count = snapshot.len() as i64;

        // Unparseable dates are excluded from the period bounds but still
        // counted in total and count.
        let parsed_dates: Vec<NaiveDate> = snapshot
            .iter()
            .filter_map(|model| NaiveDate::parse_from_str(&model.date, "%Y-%m-%d").ok())
            .collect();
        let period_start = parsed_dates.iter().min().copied().unwrap_or(settlement_date);
        let period_end = parsed_dates.iter().max().copied().unwrap_or(settlement_date);

        let settlement = Settlement {
            id: Uuid::new_v4(),
            date: settlement_date.format("%Y-%m-%d").to_string(),
            total_amount,
            record_count,
            period_start: period_start.format("%Y-%m-%d").to_string(),
            period_end: period_end.format("%Y-%m-%d").to_string(),
            created_by: created_by.to_string(),
            created_at: now,
        };

        // From here on every failure is a commit failure: the transaction
        // rolls back as a whole and the caller retries from a fresh
        // snapshot. Settlement first, then the back-references.
        settlements::ActiveModel::from(&settlement)
            .insert(&db_tx)
            .await
            .map_err(|err| EngineError::SettlementCommit(err.to_string()))?;

        for model in &snapshot {
            let record = records::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                is_settled: ActiveValue::Set(true),
                settlement_id: ActiveValue::Set(Some(settlement.id.to_string())),
                ..Default::default()
            };
            record
                .update(&db_tx)
                .await
                .map_err(|err| EngineError::SettlementCommit(err.to_string()))?;
        }

        db_tx
            .commit()
            .await
            .map_err(|err| EngineError::SettlementCommit(err.to_string()))?;

        Ok(SettleOutcome::Settled(settlement))
    }

    /// Returns the roster, falling back to the baked-in default when the
    /// stored document is missing or unreadable.
    pub async fn roster(&self) -> Roster {
        match roster::Entity::find_by_id(roster::ROSTER_KEY)
            .one(&self.database)
            .await
        {
            Ok(Some(model)) => match serde_json::from_str(&model.value) {
                Ok(roster) => roster,
                Err(err) => {
                    tracing::warn!("corrupt roster document, using default: {err}");
                    Roster::default_roster()
                }
            },
            Ok(None) => Roster::default_roster(),
            Err(err) => {
                tracing::warn!("failed to load roster, using default: {err}");
                Roster::default_roster()
            }
        }
    }

    /// Replaces the roster document wholesale (read-modify-write, no
    /// merge). Concurrent saves are last-write-wins; acceptable at this
    /// edit frequency and documented as a known limitation.
    pub async fn save_roster(&self, roster: &Roster) -> ResultEngine<()> {
        let value = serde_json::to_string(roster)
            .map_err(|err| EngineError::Validation(format!("unserializable roster: {err}")))?;

        let existing = roster::Entity::find_by_id(roster::ROSTER_KEY)
            .one(&self.database)
            .await?;
        match existing {
            Some(model) => {
                let mut active: roster::ActiveModel = model.into();
                active.value = ActiveValue::Set(value);
                active.update(&self.database).await?;
            }
            None => {
                roster::ActiveModel {
                    key: ActiveValue::Set(roster::ROSTER_KEY.to_string()),
                    value: ActiveValue::Set(value),
                }
                .insert(&self.database)
                .await?;
            }
        }
        Ok(())
    }
}

fn collect_records(models: Vec<records::Model>) -> Vec<ExpenseRecord> {
    models
        .into_iter()
        .filter_map(|model| match ExpenseRecord::try_from(model) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!("skipping corrupt record row: {err}");
                None
            }
        })
        .collect()
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`, seeding the default roster document when none
    /// has been saved yet.
    pub async fn build(self) -> ResultEngine<Engine> {
        let existing = roster::Entity::find_by_id(roster::ROSTER_KEY)
            .one(&self.database)
            .await?;
        if existing.is_none() {
            let value = serde_json::to_string(&Roster::default_roster())
                .map_err(|err| EngineError::Validation(format!("unserializable roster: {err}")))?;
            roster::ActiveModel {
                key: ActiveValue::Set(roster::ROSTER_KEY.to_string()),
                value: ActiveValue::Set(value),
            }
            .insert(&self.database)
            .await?;
        }

        Ok(Engine {
            database: self.database,
            settle_lock: Mutex::new(()),
        })
    }
}
