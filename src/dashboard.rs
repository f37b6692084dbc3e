//! Static analytics shown by the `dashboard` command.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: &'static str,
    /// Percent change against the previous period.
    pub change: f64,
}

impl StatCard {
    pub fn is_up(&self) -> bool {
        self.change >= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
    Delivered,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Delivered => "delivered",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: &'static str,
    pub client: &'static str,
    pub date: &'static str,
    /// In cents.
    pub total: u64,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    pub time: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Series {
    pub label: &'static str,
    pub points: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: Vec<StatCard>,
    pub recent_orders: Vec<Order>,
    pub recent_activities: Vec<Activity>,
    pub months: Vec<&'static str>,
    pub sales: Vec<Series>,
    /// Category name and percent share.
    pub categories: Vec<(&'static str, u8)>,
}

impl Dashboard {
    pub fn sample() -> Self {
        Self {
            stats: vec![
                StatCard { title: "Total sales", value: "1,542", change: 12.5 },
                StatCard { title: "Total clients", value: "342", change: 8.2 },
                StatCard { title: "Total orders", value: "856", change: -3.1 },
                StatCard { title: "Total revenue", value: "R$ 45.280", change: 15.3 },
            ],
            recent_orders: vec![
                Order { id: "#ORD-001", client: "João Silva", date: "2024-01-15", total: 125_000, status: OrderStatus::Completed },
                Order { id: "#ORD-002", client: "Maria Santos", date: "2024-01-15", total: 89_050, status: OrderStatus::Processing },
                Order { id: "#ORD-003", client: "Pedro Oliveira", date: "2024-01-14", total: 210_000, status: OrderStatus::Delivered },
                Order { id: "#ORD-004", client: "Ana Costa", date: "2024-01-14", total: 45_000, status: OrderStatus::Pending },
                Order { id: "#ORD-005", client: "Carlos Lima", date: "2024-01-13", total: 180_000, status: OrderStatus::Completed },
            ],
            recent_activities: vec![
                Activity { time: "5 min ago", description: "New order #ORD-001 created" },
                Activity { time: "15 min ago", description: "Client João Silva registered" },
                Activity { time: "1 hour ago", description: "Order #ORD-002 delivered" },
                Activity { time: "2 hours ago", description: "Product \"Notebook\" updated" },
                Activity { time: "3 hours ago", description: "New sale of R$ 1.250,00" },
            ],
            months: vec!["Jul", "Aug", "Sep", "Oct", "Nov", "Dec"],
            sales: vec![
                Series { label: "Revenue", points: vec![28_000, 32_000, 29_000, 35_000, 38_000, 45_000] },
                Series { label: "Orders", points: vec![420, 480, 450, 520, 580, 650] },
            ],
            categories: vec![
                ("Electronics", 35),
                ("Clothing", 25),
                ("Food", 20),
                ("Books", 12),
                ("Toys", 8),
            ],
        }
    }
}

/// `R$ 1.250,00` style currency from cents.
pub fn format_brl(cents: u64) -> String {
    let units = cents / 100;
    let digits = units.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("R$ {},{:02}", grouped, cents % 100)
}

/// Horizontal bar scaled against `max`, `width` cells wide.
pub fn bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = ((value as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(filled.min(width))
}
