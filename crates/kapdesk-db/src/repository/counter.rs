//! Per-day ticket-number sequence allocation.
//!
//! One counter record per local calendar day, keyed by the `YYMMDD`
//! day string. The increment is a single UPSERT statement, so
//! concurrent creations within the same day can never observe the
//! same sequence value.

use chrono::NaiveDate;
use kapdesk_core::error::KapdeskResult;
use kapdesk_core::repository::TicketNumberAllocator;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CounterRow {
    value: u32,
}

/// SurrealDB implementation of the ticket-number allocator.
#[derive(Clone)]
pub struct SurrealTicketNumberAllocator<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTicketNumberAllocator<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TicketNumberAllocator for SurrealTicketNumberAllocator<C> {
    async fn next_sequence(&self, day: NaiveDate) -> KapdeskResult<u32> {
        let day_key = day.format("%y%m%d").to_string();

        let result = self
            .db
            .query(
                "UPSERT type::record('ticket_counter', $day) SET \
                 value = (value ?? 0) + 1 RETURN AFTER",
            )
            .bind(("day", day_key.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;
        let rows: Vec<CounterRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ticket_counter".into(),
            id: day_key,
        })?;

        Ok(row.value)
    }
}
