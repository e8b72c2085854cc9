//! Phrase templates tried before the language model.
//!
//! Matching runs on the lowercased, trimmed question and the first
//! matching template wins. Captured values are limited to digits or word
//! characters, so they can be spliced into SQL directly.

use regex::{Captures, Regex};
use std::sync::LazyLock;

struct Template {
    pattern: Regex,
    render: fn(&Captures<'_>) -> String,
}

macro_rules! fixed {
    ($sql:expr) => {
        |_: &Captures<'_>| $sql.to_string()
    };
}

const TOTAL_REVENUE: &str = "SELECT SUM(o.quantity * p.price) AS total_revenue FROM orders o JOIN products p ON o.product_id = p.id;";

const TOP_CATEGORY: &str = "SELECT p.category, SUM(o.quantity * p.price) AS revenue
FROM orders o JOIN products p ON o.product_id = p.id
GROUP BY p.category
ORDER BY revenue DESC
LIMIT 1;";

const MOST_ORDERED: &str = "SELECT p.name, SUM(o.quantity) AS total_ordered
FROM orders o JOIN products p ON o.product_id = p.id
GROUP BY p.name
ORDER BY total_ordered DESC
LIMIT 1;";

const REVENUE_OVER_TIME: &str = "SELECT o.order_date, SUM(o.quantity * p.price) AS revenue
FROM orders o JOIN products p ON o.product_id = p.id
GROUP BY o.order_date
ORDER BY o.order_date;";

const ORDERS_OVER_TIME: &str = "SELECT o.order_date, COUNT(*) AS order_count
FROM orders o
GROUP BY o.order_date
ORDER BY o.order_date;";

const REVENUE_BY_CATEGORY: &str = "SELECT p.category, SUM(o.quantity * p.price) AS revenue
FROM orders o JOIN products p ON o.product_id = p.id
GROUP BY p.category
ORDER BY revenue DESC;";

const USERS_BY_ORDERS: &str = "SELECT u.name, COUNT(o.id) AS order_count
FROM users u JOIN orders o ON u.id = o.user_id
GROUP BY u.name
ORDER BY order_count DESC;";

/// Questions the templates answer, shown to users as hints.
pub const EXAMPLE_QUESTIONS: &[&str] = &[
    "How many users are there?",
    "What is the total revenue?",
    "Which category has the highest revenue?",
    "What is the most ordered product?",
    "Show revenue over time",
    "Show orders with quantity > 2",
    "List products in category 'electronics'",
    "Compare users by number of orders",
];

impl Template {
    // Patterns are literals exercised by the tests below.
    #[allow(clippy::expect_used)]
    fn new(pattern: &str, render: fn(&Captures<'_>) -> String) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("built-in template pattern"),
            render,
        }
    }
}

static TEMPLATES: LazyLock<Vec<Template>> = LazyLock::new(|| {
    vec![
        Template::new(
            r"\bhow many users\b",
            fixed!("SELECT COUNT(*) AS user_count FROM users;"),
        ),
        Template::new(
            r"\bhow many orders\b",
            fixed!("SELECT COUNT(*) AS order_count FROM orders;"),
        ),
        Template::new(
            r"\bhow many products\b",
            fixed!("SELECT COUNT(*) AS product_count FROM products;"),
        ),
        Template::new(r"\btotal revenue\b", fixed!(TOTAL_REVENUE)),
        Template::new(
            r"\bwhich category has the highest revenue\b",
            fixed!(TOP_CATEGORY),
        ),
        Template::new(r"\bmost ordered product\b", fixed!(MOST_ORDERED)),
        Template::new(r"\brevenue over time\b", fixed!(REVENUE_OVER_TIME)),
        Template::new(r"\border count over time\b", fixed!(ORDERS_OVER_TIME)),
        Template::new(r"\borders with quantity > (\d+)", |caps| {
            format!("SELECT * FROM orders WHERE quantity > {};", &caps[1])
        }),
        Template::new(r#"\bproducts in category ['"]?(\w+)['"]?"#, |caps| {
            format!("SELECT * FROM products WHERE category = '{}';", &caps[1])
        }),
        Template::new(
            r"\bcompare revenue by category\b",
            fixed!(REVENUE_BY_CATEGORY),
        ),
        Template::new(
            r"\bcompare users by number of orders\b",
            fixed!(USERS_BY_ORDERS),
        ),
    ]
});

/// SQL for `question` if one of the built-in phrases matches.
pub fn match_template(question: &str) -> Option<String> {
    let q = question.trim().to_lowercase();
    TEMPLATES
        .iter()
        .find_map(|t| t.pattern.captures(&q).map(|caps| (t.render)(&caps)))
}
