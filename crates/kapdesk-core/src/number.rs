//! Ticket number formatting.
//!
//! Ticket numbers are `YYMMDD-NNNN`: the local calendar day of
//! creation followed by a 4-digit, zero-padded, 1-based sequence
//! within that day. Sequence allocation is a store concern (see the
//! `TicketNumberAllocator` trait); only the format lives here.

use chrono::NaiveDate;

pub fn format_ticket_number(day: NaiveDate, sequence: u32) -> String {
    format!("{}-{:04}", day.format("%y%m%d"), sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_day_and_padded_sequence() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        assert_eq!(format_ticket_number(day, 1), "260804-0001");
        assert_eq!(format_ticket_number(day, 42), "260804-0042");
        assert_eq!(format_ticket_number(day, 9999), "260804-9999");
    }

    #[test]
    fn sequence_wider_than_four_digits_is_not_truncated() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        assert_eq!(format_ticket_number(day, 12345), "260131-12345");
    }
}
