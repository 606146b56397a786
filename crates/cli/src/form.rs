//! Input checks for the create form, applied before anything is sent.

use anyhow::{anyhow, bail};
use libris_db::{iso_date, Category, RecordId};
use time::Date;

/// Parse the publication date (default: `today`) and keep it within
/// [`iso_date::EARLIEST`, `today`].
pub fn publication_date(text: Option<&str>, today: Date) -> anyhow::Result<Date> {
    let date = match text {
        Some(text) => iso_date::parse(text.trim())
            .map_err(|_| anyhow!("'{text}' is not a date; use YYYY-MM-DD"))?,
        None => today,
    };

    if date > today {
        bail!("publication date {date} cannot be in the future");
    }
    if date < iso_date::EARLIEST {
        bail!("publication date is before {}", iso_date::EARLIEST);
    }
    Ok(date)
}

/// Pick an existing category by id, then by name (case-insensitive).
pub fn pick_category(choice: &str, categories: &[Category]) -> anyhow::Result<RecordId> {
    let choice = choice.trim();
    let by_id = choice
        .parse::<RecordId>()
        .ok()
        .and_then(|id| categories.iter().find(|category| category.id == id));

    by_id
        .or_else(|| {
            categories
                .iter()
                .find(|category| category.name.eq_ignore_ascii_case(choice))
        })
        .map(|category| category.id)
        .ok_or_else(|| anyhow!("no category matches '{choice}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 06 - 01);

    #[test]
    fn date_defaults_to_today() {
        assert_eq!(publication_date(None, TODAY).unwrap(), TODAY);
        assert_eq!(
            publication_date(Some("1965-08-01"), TODAY).unwrap(),
            date!(1965 - 08 - 01)
        );
    }

    #[test]
    fn future_and_malformed_dates_are_refused() {
        assert!(publication_date(Some("2024-06-02"), TODAY).is_err());
        let err = publication_date(Some("June 1965"), TODAY).unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
        assert!(publication_date(Some("0000-12-31"), TODAY).is_err());
    }

    #[test]
    fn categories_are_picked_by_id_or_name() {
        let categories = vec![
            Category { id: 1, name: "Fiction".into() },
            Category { id: 2, name: "Classic".into() },
        ];
        assert_eq!(pick_category("2", &categories).unwrap(), 2);
        assert_eq!(pick_category("fiction", &categories).unwrap(), 1);
        assert!(pick_category("Poetry", &categories).is_err());
    }

    #[test]
    fn numeric_choice_prefers_the_id() {
        let categories = vec![
            Category { id: 1, name: "2".into() },
            Category { id: 2, name: "Classic".into() },
            Category { id: 3, name: "1984".into() },
        ];
        assert_eq!(pick_category("2", &categories).unwrap(), 2);
        assert_eq!(pick_category("1984", &categories).unwrap(), 3);
    }
}
