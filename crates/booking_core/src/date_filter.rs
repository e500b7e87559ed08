use chrono::NaiveDate;
use shared::{dates::format_order_date, domain::Order};

/// Orders whose `order_date` equals `date` rendered as `DD-MM-YYYY`, in
/// their original relative order.
pub fn filter_by_date(orders: &[Order], date: NaiveDate) -> Vec<Order> {
    let wanted = format_order_date(date);
    orders
        .iter()
        .filter(|order| order.order_date == wanted)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use shared::domain::OrderId;

    use super::*;

    fn order(id: &str, order_date: &str) -> Order {
        serde_json::from_value(serde_json::json!({ "_id": id, "order_date": order_date }))
            .expect("order")
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).expect("date")
    }

    fn ids(orders: &[Order]) -> Vec<&str> {
        orders.iter().map(|order| order.id.as_str()).collect()
    }

    #[test]
    fn keeps_only_matching_dates_in_original_order() {
        let orders = vec![
            order("c", "05-06-2024"),
            order("a", "06-06-2024"),
            order("b", "05-06-2024"),
            order("d", "5-6-2024"),
        ];

        assert_eq!(ids(&filter_by_date(&orders, day(5))), vec!["c", "b"]);
        assert_eq!(ids(&filter_by_date(&orders, day(6))), vec!["a"]);
        assert!(filter_by_date(&orders, day(7)).is_empty());
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(filter_by_date(&[], day(5)).is_empty());
    }

    #[test]
    fn repeated_filtering_is_pure() {
        let orders = vec![order("1", "05-06-2024"), order("2", "06-06-2024")];
        let snapshot = orders.clone();

        let first = filter_by_date(&orders, day(5));
        let second = filter_by_date(&orders, day(5));

        assert_eq!(first, second);
        assert_eq!(orders, snapshot);
        assert_eq!(first[0].id, OrderId::from("1"));
    }
}
