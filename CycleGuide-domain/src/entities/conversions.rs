use chrono::{DateTime, NaiveDate, Utc};
use cycle_guide_data::models::period as data;

use crate::entities::period::{CreatePeriodRequest, FlowIntensity, PeriodRecord};

// Conversion functions between domain entities and data models
// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Calendar dates are stored as ISO 8601 `YYYY-MM-DD`
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored calendar date
pub fn parse_stored_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| format!("Invalid date format: {}", value))
}

/// Convert from data model to domain entity for a period record
pub fn convert_to_domain_record(data_record: data::PeriodRecord) -> Result<PeriodRecord, String> {
    let start_date = parse_stored_date(&data_record.start_date)?;
    let end_date = parse_stored_date(&data_record.end_date)?;
    let flow = data_record.flow.parse::<FlowIntensity>()?;
    let created_at = DateTime::parse_from_rfc3339(&data_record.created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("Invalid timestamp format: {}", data_record.created_at))?;

    Ok(PeriodRecord {
        id: data_record.id,
        owner_id: data_record.owner_id,
        start_date,
        end_date,
        flow,
        notes: data_record.notes,
        created_at,
    })
}

/// Convert from domain entity to data model for create request
pub fn convert_to_data_create_request(domain_request: &CreatePeriodRequest) -> data::CreatePeriodRequest {
    data::CreatePeriodRequest {
        owner_id: domain_request.owner_id.clone(),
        start_date: domain_request.start_date.format(DATE_FORMAT).to_string(),
        end_date: domain_request.end_date.format(DATE_FORMAT).to_string(),
        flow: domain_request.flow.to_string(),
        notes: domain_request.notes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_record() -> data::PeriodRecord {
        data::PeriodRecord {
            id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            owner_id: "user-1".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-05".to_string(),
            flow: "heavy".to_string(),
            notes: Some("cramps".to_string()),
            created_at: "2024-01-01T08:30:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_convert_to_domain_record() {
        let record = convert_to_domain_record(data_record()).unwrap();
        assert_eq!(record.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(record.end_date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(record.flow, FlowIntensity::Heavy);
        assert_eq!(record.notes.as_deref(), Some("cramps"));
    }

    #[test]
    fn test_convert_rejects_corrupt_dates() {
        let corrupt = data::PeriodRecord {
            start_date: "01/01/2024".to_string(),
            ..data_record()
        };
        let err = convert_to_domain_record(corrupt).unwrap_err();
        assert!(err.contains("Invalid date format"));
    }

    #[test]
    fn test_convert_to_data_create_request() {
        let request = CreatePeriodRequest {
            owner_id: "user-1".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 2, 9).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 2, 13).unwrap(),
            flow: FlowIntensity::Light,
            notes: None,
        };

        let data_request = convert_to_data_create_request(&request);
        assert_eq!(data_request.start_date, "2024-02-09");
        assert_eq!(data_request.end_date, "2024-02-13");
        assert_eq!(data_request.flow, "light");
        assert_eq!(data_request.owner_id, "user-1");
    }
}
