use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::query_builder::Separated;
use sqlx::Postgres;

use crate::repository::{NewRecord, Record};

/// Directory administrator account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdminRow {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Record for AdminRow {
    const TABLE: &'static str = "admins";
    const COLUMNS: &'static str = "id, email, password_hash, name, created_at";
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

impl NewRecord for NewAdmin {
    type Output = AdminRow;
    const INSERT_COLUMNS: &'static [&'static str] = &["email", "password_hash", "name"];

    fn push_row(self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.email)
            .push_bind(self.password_hash)
            .push_bind(self.name);
    }
}
