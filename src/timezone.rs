use time::OffsetDateTime;
use time_tz::{Offset, TimeZone, Tz};

use crate::Error;

/// Look up a timezone by its canonical name, e.g. "Asia/Kolkata".
pub fn get_timezone(canonical_timezone: &str) -> Result<&'static Tz, Error> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))
}

/// Express `date_time` in `timezone`, taking daylight saving into account.
pub fn to_local_time(date_time: OffsetDateTime, timezone: &Tz) -> OffsetDateTime {
    date_time.to_offset(timezone.get_offset_utc(&date_time).to_utc())
}

#[cfg(test)]
mod tests {
    use time::{UtcOffset, macros::datetime};

    use crate::Error;

    use super::{get_timezone, to_local_time};

    #[test]
    fn finds_canonical_timezone() {
        assert!(get_timezone("Asia/Kolkata").is_ok());
    }

    #[test]
    fn rejects_unknown_timezone() {
        assert!(matches!(
            get_timezone("Middle/Earth"),
            Err(Error::InvalidTimezone(name)) if name == "Middle/Earth"
        ));
    }

    #[test]
    fn converts_to_local_offset() {
        let timezone = get_timezone("Asia/Kolkata").unwrap();
        let utc = datetime!(2024-06-01 12:00 UTC);

        let local = to_local_time(utc, timezone);

        assert_eq!(local, utc);
        assert_eq!(local.offset(), UtcOffset::from_hms(5, 30, 0).unwrap());
    }
}
