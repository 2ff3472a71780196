use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The response envelope consumed by the grid widget.
///
/// Serializes to exactly `draw`, `recordsTotal`, `recordsFiltered` and `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTablesResponse {
    pub draw: i64,
    pub records_total: u64,
    pub records_filtered: u64,
    pub data: Vec<Vec<Value>>,
}

impl DataTablesResponse {
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "draw": self.draw,
            "recordsTotal": self.records_total,
            "recordsFiltered": self.records_filtered,
            "data": self.data,
        })
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }
}

pub fn assemble(
    draw: i64,
    records_total: u64,
    records_filtered: u64,
    data: Vec<Vec<Value>>,
) -> DataTablesResponse {
    DataTablesResponse {
        draw,
        records_total,
        records_filtered,
        data,
    }
}
