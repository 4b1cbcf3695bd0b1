use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::query_builder::Separated;
use sqlx::Postgres;

use crate::repository::{NewRecord, Record};

/// Director of a registered business
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DirectorRow {
    pub id: i64,
    pub business_id: i64,
    pub name: String,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub contact_number: Option<String>,
    pub email_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for DirectorRow {
    const TABLE: &'static str = "msme_directors";
    const COLUMNS: &'static str =
        "id, business_id, name, gender, nationality, contact_number, email_address, created_at";
}

#[derive(Debug, Clone)]
pub struct NewDirector {
    pub business_id: i64,
    pub name: String,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub contact_number: Option<String>,
    pub email_address: Option<String>,
}

impl NewRecord for NewDirector {
    type Output = DirectorRow;
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "business_id",
        "name",
        "gender",
        "nationality",
        "contact_number",
        "email_address",
    ];

    fn push_row(self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.business_id)
            .push_bind(self.name)
            .push_bind(self.gender)
            .push_bind(self.nationality)
            .push_bind(self.contact_number)
            .push_bind(self.email_address);
    }
}
