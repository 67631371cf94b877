use lazy_static::lazy_static;
use polars::prelude::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref RAW_SCHEMA: Schema = MedicalRecord::raw_schema();
}

/// One examination row of `medical_examination.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: i64,
    /// Age in days.
    pub age: i64,
    pub gender: i64,
    /// Height in centimeters.
    pub height: i64,
    /// Weight in kilograms.
    pub weight: f64,
    pub ap_hi: i64,
    pub ap_lo: i64,
    pub cholesterol: i64,
    pub gluc: i64,
    pub smoke: i64,
    pub alco: i64,
    pub active: i64,
    pub cardio: i64,
}

impl MedicalRecord {
    pub fn raw_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("id", DataType::Int64),
            Field::new("age", DataType::Int64),
            Field::new("gender", DataType::Int64),
            Field::new("height", DataType::Int64),
            Field::new("weight", DataType::Float64),
            Field::new("ap_hi", DataType::Int64),
            Field::new("ap_lo", DataType::Int64),
            Field::new("cholesterol", DataType::Int64),
            Field::new("gluc", DataType::Int64),
            Field::new("smoke", DataType::Int64),
            Field::new("alco", DataType::Int64),
            Field::new("active", DataType::Int64),
            Field::new("cardio", DataType::Int64),
        ])
    }

    /// Shared copy of [`MedicalRecord::raw_schema`].
    pub fn schema() -> &'static Schema {
        &RAW_SCHEMA
    }
}
