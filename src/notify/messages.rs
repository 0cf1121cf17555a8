//! Rendering of the emails and admin chat lines sent around an order.

use crate::{
    entity::orders::OrderStatus,
    models::{Order, OrderItem},
};

use super::EmailMessage;

/// `₱1,234` style amount.
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}₱{grouped}")
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn item_rows(items: &[OrderItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td align=\"center\">{}</td><td align=\"right\">{}</td></tr>",
                escape_html(&item.name),
                item.quantity,
                format_amount(item.line_total)
            )
        })
        .collect()
}

pub fn order_confirmation_email(store: &str, order: &Order, items: &[OrderItem]) -> EmailMessage {
    let next_step = match order.status {
        OrderStatus::AwaitingPaymentVerification => {
            "We received your GCash payment proof and will verify it shortly."
        }
        _ => "We will let you know as soon as your order ships.",
    };
    let shipping = if order.shipping_cost == 0 {
        "FREE".to_string()
    } else {
        format_amount(order.shipping_cost)
    };

    let html_body = format!(
        "<h2>Thank you for your order, {name}!</h2>\
         <p>Order <strong>#{number}</strong> &middot; {method}</p>\
         <p>{next_step}</p>\
         <table width=\"100%\" cellpadding=\"4\">\
         <tr><th align=\"left\">Item</th><th>Qty</th><th align=\"right\">Amount</th></tr>\
         {rows}\
         <tr><td colspan=\"2\">Subtotal</td><td align=\"right\">{subtotal}</td></tr>\
         <tr><td colspan=\"2\">Shipping</td><td align=\"right\">{shipping}</td></tr>\
         <tr><td colspan=\"2\"><strong>Total</strong></td><td align=\"right\"><strong>{total}</strong></td></tr>\
         </table>\
         <p>Ship to: {address}</p>\
         <p>&mdash; {store}</p>",
        name = escape_html(&order.contact_details.full_name),
        number = order.order_number,
        method = order.payment_method.label(),
        rows = item_rows(items),
        subtotal = format_amount(order.subtotal),
        total = format_amount(order.total),
        address = escape_html(&order.shipping_address.one_line()),
        store = escape_html(store),
    );

    EmailMessage {
        to: order.contact_details.email.clone(),
        subject: format!("{store} order #{} confirmed", order.order_number),
        html_body,
    }
}

pub fn payment_verified_email(store: &str, order: &Order) -> EmailMessage {
    let html_body = format!(
        "<h2>Payment verified</h2>\
         <p>Hi {name}, your GCash payment of <strong>{total}</strong> for order \
         <strong>#{number}</strong> has been verified. We are now preparing your items.</p>\
         <p>&mdash; {store}</p>",
        name = escape_html(&order.contact_details.full_name),
        total = format_amount(order.total),
        number = order.order_number,
        store = escape_html(store),
    );

    EmailMessage {
        to: order.contact_details.email.clone(),
        subject: format!("{store} payment verified for order #{}", order.order_number),
        html_body,
    }
}

pub fn new_order_chat(order: &Order, items: &[OrderItem]) -> String {
    let lines: Vec<String> = items
        .iter()
        .map(|item| format!("- {} x{}", item.name, item.quantity))
        .collect();
    format!(
        "*New order #{number}*\n*Customer:* {name} ({phone})\n*Payment:* {method}\n*Total:* {total}\n{lines}",
        number = order.order_number,
        name = order.contact_details.full_name,
        phone = order.contact_details.phone,
        method = order.payment_method.label(),
        total = format_amount(order.total),
        lines = lines.join("\n"),
    )
}

pub fn status_change_chat(order: &Order, from: OrderStatus, to: OrderStatus) -> String {
    format!(
        "*Order #{number} status updated*\n{from} -> *{to}*\n*Customer:* {name}\n*Total:* {total}",
        number = order.order_number,
        name = order.contact_details.full_name,
        total = format_amount(order.total),
    )
}

pub fn payment_verified_chat(order: &Order) -> String {
    format!(
        "*GCash payment verified* for order #{number}\n*Customer:* {name}\n*Amount:* {total}",
        number = order.order_number,
        name = order.contact_details.full_name,
        total = format_amount(order.total),
    )
}
