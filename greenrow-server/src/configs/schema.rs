use crate::models::{ControlRequestTable, Table, TelemetryRecordTable, ThresholdRequestTable};

/// Tables are created in declaration order and dropped in reverse
pub struct SchemaManager {
    tables: Vec<Box<dyn Table>>,
}

impl SchemaManager {
    pub fn new(tables: Vec<Box<dyn Table>>) -> Self {
        Self { tables }
    }

    pub fn create_schema(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.create()).collect()
    }

    pub fn dispose_schema(&self) -> Vec<String> {
        self.tables.iter().rev().map(|table| table.dispose()).collect()
    }
}

impl Default for SchemaManager {
    fn default() -> Self {
        SchemaManager::new(vec![
            Box::new(TelemetryRecordTable),
            Box::new(ThresholdRequestTable),
            Box::new(ControlRequestTable),
        ])
    }
}
