//! `adminhub dashboard`: static analytics, no backend call.

use anyhow::Result;
use console::style;

use adminhub::dashboard::{Dashboard, bar, format_brl};
use adminhub::ui::Table;
use adminhub::ui::icons::{CHART, CLOCK};

const BAR_WIDTH: usize = 30;

pub fn cmd_dashboard() -> Result<()> {
    let dashboard = Dashboard::sample();

    println!();
    println!("{}Dashboard", CHART);
    println!("=========");
    println!();

    for card in &dashboard.stats {
        let change = format!("{:+.1}%", card.change);
        let change = if card.is_up() {
            style(change).green()
        } else {
            style(change).red()
        };
        println!("  {:<14} {:>10}  {}", card.title, card.value, change);
    }
    println!();

    for series in &dashboard.sales {
        println!("{} by month", series.label);
        let max = series.points.iter().copied().max().unwrap_or(0);
        for (month, value) in dashboard.months.iter().zip(&series.points) {
            println!("  {:<4} {:<width$} {}", month, bar(*value, max, BAR_WIDTH), value, width = BAR_WIDTH);
        }
        println!();
    }

    println!("Sales by category");
    for (category, share) in &dashboard.categories {
        println!(
            "  {:<12} {:<width$} {}%",
            category,
            bar(u64::from(*share), 100, BAR_WIDTH),
            share,
            width = BAR_WIDTH
        );
    }
    println!();

    println!("Recent orders");
    let mut orders = Table::new(["Order", "Client", "Date", "Total", "Status"]);
    for order in &dashboard.recent_orders {
        orders.add_row([
            order.id.to_string(),
            order.client.to_string(),
            order.date.to_string(),
            format_brl(order.total),
            order.status.to_string(),
        ]);
    }
    println!("{}", orders.render());
    println!();

    println!("{}Recent activity", CLOCK);
    for activity in &dashboard.recent_activities {
        println!("  {:<12} {}", activity.time, activity.description);
    }
    println!();

    Ok(())
}
