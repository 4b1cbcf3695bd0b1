use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::query_builder::Separated;
use sqlx::Postgres;

use crate::repository::{NewRecord, Record};

/// Owner of a business; only the gender is recorded
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OwnerRow {
    pub id: i64,
    pub business_id: i64,
    pub gender: String,
    pub created_at: DateTime<Utc>,
}

impl Record for OwnerRow {
    const TABLE: &'static str = "msme_business_owners";
    const COLUMNS: &'static str = "id, business_id, gender, created_at";
}

#[derive(Debug, Clone)]
pub struct NewOwner {
    pub business_id: i64,
    pub gender: String,
}

impl NewRecord for NewOwner {
    type Output = OwnerRow;
    const INSERT_COLUMNS: &'static [&'static str] = &["business_id", "gender"];

    fn push_row(self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.business_id).push_bind(self.gender);
    }
}
