//! Catalog table schema for records that fail data-quality checks

use crate::layout::{folder_uri, DQ_FAIL_PREFIX};
use std::collections::BTreeMap;

pub const TEXT_INPUT_FORMAT: &str = "org.apache.hadoop.mapred.TextInputFormat";
pub const TEXT_OUTPUT_FORMAT: &str = "org.apache.hadoop.hive.ql.io.HiveIgnoreKeyTextOutputFormat";
pub const JSON_SERDE: &str = "org.openx.data.jsonserde.JsonSerDe";

/// JSON field names the SerDe maps onto the lower-cased columns
const SERDE_PATHS: &str = "Answer,DataQualityEvaluationResult,DataQualityRulesFail,DataQualityRulesPass,DataQualityRulesSkip,Question,_pid";

const DQ_FAILED_COLUMNS: &[(&str, &str)] = &[
    ("answer", "string"),
    ("dataqualityevaluationresult", "string"),
    ("dataqualityrulesskip", "array<string>"),
    ("dataqualityrulesfail", "array<string>"),
    ("dataqualityrulespass", "array<string>"),
    ("question", "struct<_VALUE:string,_qid:string,_qtype:string>"),
    ("_pid", "int"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
}

/// Table input with a single storage descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub database: String,
    pub name: String,
    pub columns: Vec<Column>,
    pub location: String,
    pub input_format: String,
    pub output_format: String,
    pub compressed: bool,
    pub serialization_library: String,
    pub serde_parameters: BTreeMap<String, String>,
    pub parameters: BTreeMap<String, String>,
    pub stored_as_sub_directories: bool,
}

impl TableDefinition {
    /// JSON table over the DQ job's failed-records output
    pub fn dq_failed_records(database: &str, table: &str, transformed_bucket: &str) -> Self {
        let columns = DQ_FAILED_COLUMNS
            .iter()
            .map(|(name, data_type)| Column {
                name: (*name).to_string(),
                data_type: (*data_type).to_string(),
            })
            .collect();

        let serde_parameters = BTreeMap::from([("paths".to_string(), SERDE_PATHS.to_string())]);
        let parameters = BTreeMap::from([
            ("compressionType".to_string(), "none".to_string()),
            ("classification".to_string(), "json".to_string()),
            ("typeOfData".to_string(), "file".to_string()),
        ]);

        Self {
            database: database.to_string(),
            name: table.to_string(),
            columns,
            location: folder_uri(transformed_bucket, DQ_FAIL_PREFIX),
            input_format: TEXT_INPUT_FORMAT.to_string(),
            output_format: TEXT_OUTPUT_FORMAT.to_string(),
            compressed: false,
            serialization_library: JSON_SERDE.to_string(),
            serde_parameters,
            parameters,
            stored_as_sub_directories: false,
        }
    }
}
