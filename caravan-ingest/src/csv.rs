use caravan_roster::{Assignment, BusId, Participant, ParticipantId};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Attribution recorded when a sheet row carries a bus id but no
/// assigning-actor column.
const IMPORT_ACTOR: &str = "import";

/// Parses the spreadsheet CSV export into a participant snapshot.
///
/// Column order follows the sheet: ticket id, first name, last name,
/// optional bus id, optional assigned-at timestamp (RFC 3339), optional
/// assigned-by name. The first row is the header. Rows with fewer than
/// three fields are skipped, never fatal; a bus id that does not parse as
/// an integer means unassigned. Ids are positional per row number so a
/// re-ingest of the same sheet yields the same ids.
pub fn parse_export(data: &str, fetched_at: DateTime<Utc>) -> Vec<Participant> {
    let mut participants = Vec::new();
    let mut skipped = 0_usize;

    for (row_number, line) in data.lines().enumerate().skip(1) {
        let fields = split_row(line.trim_end_matches('\r'));
        if fields.len() < 3 {
            if !line.trim().is_empty() {
                skipped += 1;
                debug!(row = row_number, "skipping malformed sheet row");
            }
            continue;
        }

        let ticket_id = non_empty(fields.first())
            .unwrap_or_else(|| format!("T{}", 1000 + row_number));
        let first_name = non_empty(fields.get(1)).unwrap_or_default();
        let last_name = non_empty(fields.get(2)).unwrap_or_default();
        let bus_id = fields
            .get(3)
            .and_then(|field| field.trim().parse::<u32>().ok())
            .map(BusId);

        let assignment = match bus_id {
            None => Assignment::Unassigned,
            Some(bus) => {
                let at = fields
                    .get(4)
                    .and_then(|field| DateTime::parse_from_rfc3339(field.trim()).ok())
                    .map_or(fetched_at, |parsed| parsed.with_timezone(&Utc));
                let by = non_empty(fields.get(5)).unwrap_or_else(|| IMPORT_ACTOR.to_owned());
                Assignment::Assigned { bus, at, by }
            }
        };

        participants.push(Participant {
            id: ParticipantId::new(format!("p{}", 1000 + row_number)),
            first_name,
            last_name,
            ticket_id,
            assignment,
        });
    }

    if skipped > 0 {
        debug!(skipped, kept = participants.len(), "sheet export parsed");
    }
    participants
}

/// Splits one CSV row, honoring commas inside double-quoted fields and
/// stripping the quotes, the way the sheet export writes them.
fn split_row(row: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for character in row.chars() {
        match character {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            other => current.push(other),
        }
    }
    if !current.is_empty() {
        fields.push(current);
    }
    fields
}

fn non_empty(field: Option<&String>) -> Option<String> {
    field
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
