use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::core::ParseError;

/// Number of space separated fields in a daytime line
const FIELD_COUNT: usize = 9;

/// Codec for RFC 867 daytime responses in the NIST layout
///
/// A response looks like `JJJJJ YY-MM-DD HH:MM:SS TT L H msADV UTC(NIST) OTM`.
/// Only the date and time fields are read.
#[derive(Debug, Clone, Copy, Default)]
pub struct DaytimeCodec;

impl DaytimeCodec {
    /// Largest response read from the server
    pub const MAX_RESPONSE: usize = 256;

    /// Any byte triggers a response; the payload is ignored
    pub fn encode_request() -> [u8; 1] {
        [0]
    }

    /// Decodes a response, interpreting it in the local time zone
    pub fn decode_response(buf: &[u8]) -> Result<i64, ParseError> {
        Self::decode_with_zone(buf, &Local)
    }

    /// Decodes a response, interpreting the calendar time in `tz`
    pub fn decode_with_zone<Tz: TimeZone>(buf: &[u8], tz: &Tz) -> Result<i64, ParseError> {
        let naive = Self::parse_calendar(&Self::clean(buf))?;
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.timestamp())
            .ok_or_else(|| ParseError::bad_format(format!("{} does not exist locally", naive)))
    }

    /// Response text with every CR and LF removed
    pub fn clean(buf: &[u8]) -> String {
        String::from_utf8_lossy(buf)
            .chars()
            .filter(|c| *c != '\n' && *c != '\r')
            .collect()
    }

    /// Parses the date and time fields of a cleaned line
    pub fn parse_calendar(line: &str) -> Result<NaiveDateTime, ParseError> {
        let fields: Vec<&str> = line.split(' ').filter(|t| !t.is_empty()).collect();
        if fields.len() != FIELD_COUNT {
            return Err(ParseError::bad_format(format!(
                "bad format in time response ({})",
                fields.len()
            )));
        }

        let date = split_triple(fields[1], '-', "date")?;
        let clock = split_triple(fields[2], ':', "clock")?;

        // Two-digit years land in the 2000s
        let date = i32::try_from(date[0])
            .ok()
            .and_then(|yy| yy.checked_add(2000))
            .and_then(|year| NaiveDate::from_ymd_opt(year, date[1], date[2]))
            .ok_or_else(|| ParseError::bad_format(format!("date out of range ({})", fields[1])))?;
        let time = NaiveTime::from_hms_opt(clock[0], clock[1], clock[2]).ok_or_else(|| {
            ParseError::bad_format(format!("clock out of range ({})", fields[2]))
        })?;

        Ok(NaiveDateTime::new(date, time))
    }
}

/// Splits `field` on `sep` into exactly three numbers
fn split_triple(field: &str, sep: char, what: &str) -> Result<[u32; 3], ParseError> {
    let parts: Vec<&str> = field.split(sep).collect();
    if parts.len() != 3 {
        return Err(ParseError::bad_format(format!(
            "bad format in {} response ({})",
            what,
            parts.len()
        )));
    }

    let mut out = [0u32; 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = part.parse().map_err(|_| {
            ParseError::bad_format(format!("non-numeric {} field `{}`", what, part))
        })?;
    }
    Ok(out)
}
