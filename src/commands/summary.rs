use crate::app::App;
use crate::commands::{plural, Out};
use crate::filter::{FilterOptions, Stats};
use crate::{Config, Result};

/// Returns the years, months and people that can be used to filter the records.
pub async fn options(config: Config) -> Result<Out<FilterOptions>> {
    let app = App::open(&config).await;
    let options = app.options();
    Ok(Out::new(
        format!(
            "The records span {} and {}",
            plural(options.years.len(), "year", "years"),
            plural(options.people.len(), "person", "people"),
        ),
        options,
    ))
}

/// Returns the number of records, distinct people and distinct (year, month) pairs.
pub async fn stats(config: Config) -> Result<Out<Stats>> {
    let app = App::open(&config).await;
    let stats = app.stats();
    Ok(Out::new(
        format!(
            "{}, {}, {}",
            plural(stats.total_entries, "record", "records"),
            plural(stats.unique_people, "person", "people"),
            plural(stats.active_months, "active month", "active months"),
        ),
        stats,
    ))
}
