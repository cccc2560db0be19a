use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{debug, info};

use super::dto::RecordInput;
use super::repo;

/// Parses a client `recordDate`; anything but RFC 3339 is rejected.
pub fn parse_capture_instant(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(raw.trim(), &time::format_description::well_known::Rfc3339)
}

pub async fn create(db: &PgPool, user_id: i64, input: &RecordInput) -> anyhow::Result<i64> {
    let record_date = input.record_date;
    let id = repo::insert(
        db,
        user_id,
        record_date,
        input.image_url.as_deref(),
        &input.meal_type,
        &input.counts,
    )
    .await?;
    info!(user_id, record_id = id, %record_date, "food record created");
    Ok(id)
}

/// `None` when the record does not exist; otherwise the image url now stored.
pub async fn update(
    db: &PgPool,
    record_id: i64,
    input: &RecordInput,
) -> anyhow::Result<Option<Option<String>>> {
    let image = repo::update(
        db,
        record_id,
        input.record_date,
        input.image_url.as_deref(),
        &input.meal_type,
        &input.counts,
    )
    .await?;
    debug!(record_id, found = image.is_some(), "food record update");
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn capture_instants_must_be_rfc3339() {
        assert_eq!(
            parse_capture_instant("2025-03-14T20:45:33.120Z").unwrap(),
            datetime!(2025-03-14 20:45:33.120 UTC)
        );
        assert_eq!(
            parse_capture_instant("2025-03-15T06:45:33+10:00").unwrap(),
            datetime!(2025-03-14 20:45:33 UTC)
        );
        assert!(parse_capture_instant("2025-03-14").is_err());
        assert!(parse_capture_instant("yesterday").is_err());
    }
}
