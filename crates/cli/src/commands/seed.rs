//! Seed an account with demo figures.
//!
//! Fills every day of the window with random sales and a cash figure below
//! them, tagged with the `SEED` source. Re-running overwrites the same days.

use chrono::{Days, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;
use tallybook_core::Email;
use tallybook_server::clock::{Clock, SystemClock};
use tallybook_server::config::database_url_from_env;
use tallybook_server::db::{self, UserRepository};
use tallybook_server::services::{MetricInput, MetricService};
use tracing::info;

const SEED_SOURCE: &str = "SEED";

/// Insert `days` days of demo metrics, ending today, for the account `email`.
///
/// # Errors
///
/// Returns an error if the account does not exist or the database fails.
pub async fn demo_metrics(email: &str, days: u32) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let database_url = database_url_from_env()?;

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let user = UserRepository::new(&pool)
        .get_by_email(&email)
        .await?
        .ok_or_else(|| format!("No account for {email}"))?;

    let figures = demo_figures(SystemClock.today(), days);
    let service = MetricService::new(&pool);

    for (date, sales, cash) in &figures {
        service
            .upsert(
                user.id,
                MetricInput {
                    date: *date,
                    sales: *sales,
                    cash: *cash,
                    source: Some(SEED_SOURCE),
                },
            )
            .await?;
    }

    info!("Seeding complete!");
    info!("  Account: {} ({})", user.name, user.id);
    info!("  Days written: {}", figures.len());
    Ok(())
}

/// Random `(date, sales, cash)` triples for the `days` days ending at `today`, oldest first.
fn demo_figures(today: NaiveDate, days: u32) -> Vec<(NaiveDate, Decimal, Decimal)> {
    let mut rng = rand::rng();

    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .map(|date| {
            let sales_cents: i64 = rng.random_range(40_000..250_000);
            let cash_share: i64 = rng.random_range(20..70);
            let sales = Decimal::new(sales_cents, 2);
            let cash = Decimal::new(sales_cents * cash_share / 100, 2);
            (date, sales, cash)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_figures_cover_window() {
        let today: NaiveDate = "2026-04-15".parse().unwrap();
        let figures = demo_figures(today, 7);

        assert_eq!(figures.len(), 7);
        assert_eq!(figures.first().unwrap().0, "2026-04-09".parse().unwrap());
        assert_eq!(figures.last().unwrap().0, today);
        for (_, sales, cash) in &figures {
            assert!(*sales > Decimal::ZERO);
            assert!(cash < sales);
        }
    }

    #[test]
    fn test_zero_days_is_empty() {
        assert!(demo_figures("2026-04-15".parse().unwrap(), 0).is_empty());
    }
}
