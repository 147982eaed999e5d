// Builds vehicles.json from the brands/models/trims CSV sheets

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Deserialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{
    UsedOnlyAttribute, VehicleBrand, VehicleCondition, VehicleModel, VehicleTrim, VehiclesData,
};

pub const TAXONOMY_VERSION: &str = "2024-06-01";
pub const OUTPUT_FILE: &str = "vehicles.json";

// Disclosure fields only asked of used vehicles
const USED_ONLY_ATTRIBUTES: [(&str, &str); 5] = [
    ("mileage_km", "Mileage (km)"),
    ("owners_count", "Number of owners"),
    ("accident_history", "Accident history"),
    ("warranty_status", "Warranty status"),
    ("service_history", "Service history"),
];

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {file}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
    #[error("Model {brand}/{model} is missing trims in trims.csv")]
    MissingTrims { brand: String, model: String },
    #[error("Model {brand}/{model} has an invalid {column} '{value}'")]
    InvalidYear {
        brand: String,
        model: String,
        column: &'static str,
        value: String,
    },
    #[error("Failed to serialize vehicles.json")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrandRow {
    pub brand: String,
    pub label: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub popular_in_ksa: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelRow {
    pub brand: String,
    pub model: String,
    pub label: String,
    #[serde(default)]
    pub body_type: String,
    #[serde(default)]
    pub year_start: String,
    #[serde(default)]
    pub year_end: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrimRow {
    pub brand: String,
    pub model: String,
    pub trim: String,
    #[serde(default)]
    pub trim_label: String,
    #[serde(default)]
    pub engine: String,
    #[serde(default)]
    pub drivetrain: String,
    #[serde(default)]
    pub transmission: String,
    #[serde(default)]
    pub fuel: String,
    #[serde(default)]
    pub year: String,
}

/// Parses one sheet. Cells are trimmed and short rows read as empty trailing cells.
pub fn parse_rows<T: DeserializeOwned>(file: &str, contents: &str) -> Result<Vec<T>, GenerateError> {
    let csv_error = |source| GenerateError::Csv {
        file: file.to_string(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let mut record = record.map_err(csv_error)?;
        while record.len() < headers.len() {
            record.push_field("");
        }
        rows.push(record.deserialize(Some(&headers)).map_err(csv_error)?);
    }
    Ok(rows)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// (brand, model) -> trims in first-seen order
type TrimGroups = HashMap<(String, String), Vec<VehicleTrim>>;

fn group_trims(rows: &[TrimRow]) -> TrimGroups {
    let mut grouped: TrimGroups = HashMap::new();

    for row in rows {
        let trims = grouped
            .entry((row.brand.clone(), row.model.clone()))
            .or_default();

        let index = match trims.iter().position(|t| t.trim == row.trim) {
            Some(index) => index,
            None => {
                trims.push(VehicleTrim {
                    trim: row.trim.clone(),
                    label: row.trim_label.clone(),
                    engine: non_empty(&row.engine),
                    drivetrain: non_empty(&row.drivetrain),
                    transmission: non_empty(&row.transmission),
                    fuel: non_empty(&row.fuel),
                    years: Vec::new(),
                });
                trims.len() - 1
            }
        };

        match row.year.parse::<i32>() {
            Ok(year) => {
                let years = &mut trims[index].years;
                if !years.contains(&year) {
                    years.push(year);
                    years.sort_unstable();
                }
            }
            Err(_) => tracing::warn!(
                brand = %row.brand,
                model = %row.model,
                trim = %row.trim,
                year = %row.year,
                "Skipping unparsable trim year"
            ),
        }
    }

    grouped
}

fn parse_year(row: &ModelRow, column: &'static str, value: &str) -> Result<i32, GenerateError> {
    value.parse::<i32>().map_err(|_| GenerateError::InvalidYear {
        brand: row.brand.clone(),
        model: row.model.clone(),
        column,
        value: value.to_string(),
    })
}

fn used_condition() -> VehicleCondition {
    VehicleCondition {
        options: vec!["new".to_string(), "used".to_string()],
        used_only_attributes: USED_ONLY_ATTRIBUTES
            .iter()
            .map(|(key, label)| UsedOnlyAttribute {
                key: key.to_string(),
                label: label.to_string(),
            })
            .collect(),
    }
}

/// Assembles the taxonomy. Any model without trims aborts the whole build.
pub fn build_vehicles(
    brand_rows: &[BrandRow],
    model_rows: &[ModelRow],
    trim_rows: &[TrimRow],
    generated_at: DateTime<Utc>,
) -> Result<VehiclesData, GenerateError> {
    let trims_by_model = group_trims(trim_rows);
    let mut brands = Vec::with_capacity(brand_rows.len());

    for brand_row in brand_rows {
        let mut models = Vec::new();
        for model_row in model_rows.iter().filter(|m| m.brand == brand_row.brand) {
            let key = (model_row.brand.clone(), model_row.model.clone());
            let trims = trims_by_model.get(&key).cloned().unwrap_or_default();
            if trims.is_empty() {
                return Err(GenerateError::MissingTrims {
                    brand: model_row.brand.clone(),
                    model: model_row.model.clone(),
                });
            }

            models.push(VehicleModel {
                model: model_row.model.clone(),
                label: model_row.label.clone(),
                body_type: model_row.body_type.clone(),
                year_min: parse_year(model_row, "year_start", &model_row.year_start)?,
                year_max: parse_year(model_row, "year_end", &model_row.year_end)?,
                trims,
                condition: used_condition(),
            });
        }
        models.sort_by_key(|m| m.label.to_lowercase());

        brands.push(VehicleBrand {
            brand: brand_row.brand.clone(),
            label: brand_row.label.clone(),
            origin: brand_row.origin.clone(),
            popular_in_ksa: brand_row.popular_in_ksa.eq_ignore_ascii_case("true"),
            models,
        });
    }

    Ok(VehiclesData {
        version: TAXONOMY_VERSION.to_string(),
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        brands,
    })
}

async fn read_sheet(dir: &Path, file: &str) -> Result<String, GenerateError> {
    let path = dir.join(file);
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| GenerateError::Io { path, source })
}

/// Reads the three sheets from `vehicles_dir`, builds the taxonomy and only then
/// writes `vehicles.json`, so a failed run leaves no partial output.
pub async fn generate(vehicles_dir: &Path) -> Result<VehiclesData, GenerateError> {
    let (brands_csv, models_csv, trims_csv) = futures::try_join!(
        read_sheet(vehicles_dir, "brands.csv"),
        read_sheet(vehicles_dir, "models.csv"),
        read_sheet(vehicles_dir, "trims.csv"),
    )?;

    let brand_rows: Vec<BrandRow> = parse_rows("brands.csv", &brands_csv)?;
    let model_rows: Vec<ModelRow> = parse_rows("models.csv", &models_csv)?;
    let trim_rows: Vec<TrimRow> = parse_rows("trims.csv", &trims_csv)?;
    tracing::debug!(
        brands = brand_rows.len(),
        models = model_rows.len(),
        trims = trim_rows.len(),
        "Parsed vehicle sheets"
    );

    let vehicles = build_vehicles(&brand_rows, &model_rows, &trim_rows, Utc::now())?;

    let output_path = vehicles_dir.join(OUTPUT_FILE);
    let json = serde_json::to_string_pretty(&vehicles)?;
    tokio::fs::write(&output_path, json)
        .await
        .map_err(|source| GenerateError::Io {
            path: output_path.clone(),
            source,
        })?;
    tracing::info!("Wrote {}", output_path.display());

    Ok(vehicles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const BRANDS: &str = "brand,label,origin,popular_in_ksa\ntoyota,Toyota,Japan,TRUE\nkia,Kia,Korea,false\n";
    const MODELS: &str = "brand,model,label,body_type,year_start,year_end\n\
        toyota,land-cruiser,Land Cruiser,SUV,2016,2024\n\
        toyota,camry,Camry,Sedan,2018,2024\n\
        kia,k5,K5,Sedan,2021,2024\n";
    const TRIMS: &str = "brand,model,trim,trim_label,engine,drivetrain,transmission,fuel,year\n\
        toyota,camry,gle,GLE,2.5L I4,FWD,Automatic,Petrol,2022\n\
        toyota,camry,gle,GLE,2.5L I4,FWD,Automatic,Petrol,2020\n\
        toyota,camry,gle,GLE,2.5L I4,FWD,Automatic,Petrol,2022\n\
        toyota,camry,se,SE, , , , ,n/a\n\
        toyota,land-cruiser,gxr,GXR,3.5L V6,4WD,Automatic,Petrol,2023\n\
        kia,k5,gt,GT,1.6T,FWD\n";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap()
    }

    fn build(brands: &str, models: &str, trims: &str) -> Result<VehiclesData, GenerateError> {
        let brand_rows: Vec<BrandRow> = parse_rows("brands.csv", brands)?;
        let model_rows: Vec<ModelRow> = parse_rows("models.csv", models)?;
        let trim_rows: Vec<TrimRow> = parse_rows("trims.csv", trims)?;
        build_vehicles(&brand_rows, &model_rows, &trim_rows, now())
    }

    #[test]
    fn builds_sorted_taxonomy() {
        let vehicles = build(BRANDS, MODELS, TRIMS).unwrap();
        assert_eq!(vehicles.version, TAXONOMY_VERSION);
        assert_eq!(vehicles.generated_at, "2024-06-01T08:30:00.000Z");

        let toyota = &vehicles.brands[0];
        assert!(toyota.popular_in_ksa);
        assert!(!vehicles.brands[1].popular_in_ksa);
        let labels: Vec<&str> = toyota.models.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Camry", "Land Cruiser"]);

        let camry = &toyota.models[0];
        assert_eq!((camry.year_min, camry.year_max), (2018, 2024));
        assert_eq!(camry.trims.len(), 2);
        assert_eq!(camry.trims[0].years, vec![2020, 2022]);
        assert_eq!(camry.trims[0].engine.as_deref(), Some("2.5L I4"));
        // blank cells become absent fields, bad years are skipped
        assert_eq!(camry.trims[1].engine, None);
        assert!(camry.trims[1].years.is_empty());
        assert_eq!(camry.condition.used_only_attributes.len(), 5);

        // short rows read as empty trailing cells
        let k5 = &vehicles.brands[1].models[0];
        assert_eq!(k5.trims[0].transmission, None);
        assert!(k5.trims[0].years.is_empty());
    }

    #[test]
    fn short_rows_pad_with_empty_cells() {
        let rows: Vec<TrimRow> = parse_rows(
            "trims.csv",
            "brand,model,trim,trim_label,engine,drivetrain,transmission,fuel,year\nkia,k5,gt\n",
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].trim, "gt");
        assert_eq!(rows[0].trim_label, "");
        assert_eq!(rows[0].year, "");
    }

    #[test]
    fn model_without_trims_is_fatal() {
        let models = "brand,model,label,body_type,year_start,year_end\ntoyota,camry,Camry,Sedan,2018,2024\n";
        let trims = "brand,model,trim,trim_label,engine,drivetrain,transmission,fuel,year\n";
        let err = build("brand,label,origin,popular_in_ksa\ntoyota,Toyota,Japan,true\n", models, trims).unwrap_err();
        assert!(matches!(err, GenerateError::MissingTrims { ref brand, ref model } if brand == "toyota" && model == "camry"));
        assert_eq!(err.to_string(), "Model toyota/camry is missing trims in trims.csv");
    }

    #[test]
    fn invalid_model_year_is_fatal() {
        let models = "brand,model,label,body_type,year_start,year_end\nkia,k5,K5,Sedan,soon,2024\n";
        let trims = "brand,model,trim,trim_label,engine,drivetrain,transmission,fuel,year\nkia,k5,gt,GT,,,,,2022\n";
        let err = build("brand,label,origin,popular_in_ksa\nkia,Kia,Korea,false\n", models, trims).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidYear { column: "year_start", .. }));
    }

    #[tokio::test]
    async fn generate_writes_nothing_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("brands.csv"), "brand,label,origin,popular_in_ksa\ntoyota,Toyota,Japan,true\n").unwrap();
        std::fs::write(
            dir.path().join("models.csv"),
            "brand,model,label,body_type,year_start,year_end\ntoyota,camry,Camry,Sedan,2018,2024\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("trims.csv"),
            "brand,model,trim,trim_label,engine,drivetrain,transmission,fuel,year\n",
        )
        .unwrap();

        assert!(generate(dir.path()).await.is_err());
        assert!(!dir.path().join(OUTPUT_FILE).exists());
    }

    #[tokio::test]
    async fn generate_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("brands.csv"), BRANDS).unwrap();
        std::fs::write(dir.path().join("models.csv"), MODELS).unwrap();
        std::fs::write(dir.path().join("trims.csv"), TRIMS).unwrap();

        let vehicles = generate(dir.path()).await.unwrap();
        let written = std::fs::read_to_string(dir.path().join(OUTPUT_FILE)).unwrap();
        let reparsed: VehiclesData = serde_json::from_str(&written).unwrap();
        assert_eq!(reparsed, vehicles);
        assert!(written.contains("\n  \"brands\""));
    }

    #[tokio::test]
    async fn missing_sheet_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate(dir.path()).await.unwrap_err();
        assert!(matches!(err, GenerateError::Io { .. }));
        assert!(err.to_string().contains(".csv"));
    }
}
