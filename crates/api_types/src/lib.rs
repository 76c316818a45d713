use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod record {
    use super::*;

    /// Request body for logging a new expense record.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordNew {
        pub date: String,
        pub amount: i64,
        pub personnel: Vec<String>,
        pub description: Option<String>,
    }

    /// An expense record as returned by the server.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordView {
        pub id: Uuid,
        pub date: String,
        pub amount: i64,
        pub personnel: Vec<String>,
        /// Department labels snapshotted at creation time.
        pub departments: Vec<String>,
        pub description: Option<String>,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
        pub is_settled: bool,
        pub settlement_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordListResponse {
        pub records: Vec<RecordView>,
    }
}

pub mod settlement {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        pub id: Uuid,
        pub date: String,
        pub total_amount: i64,
        pub record_count: i64,
        pub period_start: String,
        pub period_end: String,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementListResponse {
        pub settlements: Vec<SettlementView>,
    }

    /// Response body for a settle request.
    ///
    /// `settled == false` with no settlement means there were no open
    /// records; a valid outcome, not an error.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettleResponse {
        pub settled: bool,
        pub settlement: Option<SettlementView>,
    }
}

pub mod roster {
    use super::*;

    /// One department with its members, in roster order.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RosterDepartment {
        pub name: String,
        pub members: Vec<String>,
    }

    /// Full roster document. Saves replace the whole document; callers
    /// read-modify-write.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RosterDocument {
        pub departments: Vec<RosterDepartment>,
    }
}
