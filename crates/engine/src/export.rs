//! CSV export of expense records.
//!
//! Produces Excel-compatible bytes: UTF-8 with a BOM so non-ASCII
//! department and personnel names open correctly, one header row, one row
//! per record, one trailing total row. The grouped-personnel column uses
//! the same grouping as [`reporting`], so list views and exports always
//! agree.
//!
//! [`reporting`]: crate::reporting

use csv::Writer;

use crate::records::ExpenseRecord;
use crate::reporting::{group_by_department, render_groups};
use crate::{EngineError, ResultEngine, Roster};

/// Byte-order mark prepended so Excel detects UTF-8.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Serializes records into CSV bytes. The filename is the caller's
/// concern.
pub fn write_csv(records: &[ExpenseRecord], roster: &Roster) -> ResultEngine<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::from(UTF8_BOM));

    writer
        .write_record(["date", "personnel", "amount"])
        .map_err(|err| EngineError::Validation(format!("csv write failed: {err}")))?;

    let mut total: i64 = 0;
    for record in records {
        total += record.amount;
        let grouped = render_groups(&group_by_department(roster, &record.personnel));
        writer
            .write_record([record.date.as_str(), &grouped, &record.amount.to_string()])
            .map_err(|err| EngineError::Validation(format!("csv write failed: {err}")))?;
    }

    writer
        .write_record(["", "total", &total.to_string()])
        .map_err(|err| EngineError::Validation(format!("csv write failed: {err}")))?;

    writer
        .into_inner()
        .map_err(|err| EngineError::Validation(format!("csv write failed: {err}")))
}
