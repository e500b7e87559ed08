//! Plain-text rendering of the booking list for a terminal.

use std::fmt::Write as _;

use booking_core::{ListPhase, Notice, NoticeKind, ViewState};
use chrono::{DateTime, Utc};
use shared::{
    dates::{format_order_date, relative_time},
    domain::Order,
};

pub const EMPTY_STATE_TEXT: &str = "No Orders Today";

pub fn render_view(greeting: &str, view: &ViewState, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{greeting}  [{}]", format_order_date(view.selected_date));

    match view.phase() {
        ListPhase::Loading => {
            let _ = writeln!(out, "Loading bookings…");
            return out;
        }
        ListPhase::ReadyEmpty => {
            let _ = writeln!(out, "{EMPTY_STATE_TEXT}");
            return out;
        }
        ListPhase::ReadyWithData => {}
    }

    let summary = view.summary();
    let _ = writeln!(
        out,
        "Orders: {}  Advance: {}  Balance: {}",
        summary.count, summary.total_advance, summary.total_balance
    );
    for order in &view.filtered_orders {
        out.push_str(&render_card(order, now));
    }
    if let Some(err) = &view.last_fetch_error {
        let _ = writeln!(out, "(showing last known bookings: {err})");
    }
    out
}

fn render_card(order: &Order, now: DateTime<Utc>) -> String {
    let mut card = String::new();
    let _ = writeln!(card, "\n{}  (id {})", order.route_title(), order.id);
    if let Some(number) = &order.order_number {
        let _ = writeln!(card, "  Order ID: {number}");
    }
    let _ = writeln!(card, "  Cake Name: {}", order.cake_name);
    let _ = writeln!(card, "  Weight/Quantity: {}", order.weight_display());
    let _ = writeln!(card, "  Delivery Date: {}", order.delivery_date_display());
    let _ = writeln!(card, "  Time: {}", order.time_slot());
    let _ = writeln!(card, "  Status: {}", order.status);
    let _ = writeln!(card, "  Agent Name: {}", order.agent_name);
    let _ = writeln!(
        card,
        "  Advance: {}  Balance: {}",
        order.advance_payment, order.balance_payment
    );
    if let Some(created_at) = order.created_at {
        let _ = writeln!(card, "  {}", relative_time(created_at, now));
    }
    card
}

pub fn render_notice(notice: &Notice) -> String {
    match notice.kind {
        NoticeKind::Success => format!("[ok] {}", notice.message),
        NoticeKind::Failure => format!("[!] {}", notice.message),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn view(orders: Vec<Order>, is_loading: bool, show_empty: bool) -> ViewState {
        ViewState {
            filtered_orders: orders.clone(),
            orders,
            selected_date: NaiveDate::from_ymd_opt(2024, 6, 5).expect("date"),
            is_loading,
            is_refreshing: false,
            show_empty,
            is_create_open: false,
            last_fetch_error: None,
        }
    }

    fn now() -> DateTime<Utc> {
        "2024-06-05T12:00:00Z".parse().expect("timestamp")
    }

    #[test]
    fn loading_hides_list_and_empty_message() {
        let out = render_view("Hi, Meenaagent", &view(Vec::new(), true, true), now());
        assert!(out.contains("Loading"));
        assert!(!out.contains(EMPTY_STATE_TEXT));
    }

    #[test]
    fn empty_state_after_gating() {
        let out = render_view("Hi, Meenaagent", &view(Vec::new(), false, true), now());
        assert!(out.starts_with("Hi, Meenaagent  [05-06-2024]"));
        assert!(out.contains(EMPTY_STATE_TEXT));
    }

    #[test]
    fn cards_show_fallbacks_and_relative_time() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": "1",
            "senderName": "Asha",
            "receiverName": "Ravi",
            "cakeName": "Truffle",
            "order_date": "05-06-2024",
            "advance_payment": 100,
            "createdAt": "2024-06-05T09:00:00Z"
        }))
        .expect("order");

        let out = render_view("Hi", &view(vec![order], false, false), now());
        assert!(out.contains("Asha ➔ Ravi"));
        assert!(out.contains("Time: 6pm to 8pm"));
        assert!(out.contains("Delivery Date: -"));
        assert!(out.contains("3 hours ago"));
        assert!(out.contains("Orders: 1"));
    }

    #[test]
    fn notices_are_tagged_by_kind() {
        assert_eq!(render_notice(&Notice::failure("Order not found")), "[!] Order not found");
        assert_eq!(render_notice(&Notice::success("done")), "[ok] done");
    }
}
