//! Notification text
//!
//! Plain-text renderings of an order for SMS and email.

use std::fmt::Write;

use shared::models::Order;

pub(crate) fn first_name(order: &Order) -> &str {
    order
        .customer
        .as_ref()
        .map(|c| c.first_name.as_str())
        .unwrap_or("customer")
}

pub fn confirmation_sms(order: &Order, currency: &str) -> String {
    format!(
        "Hello {}, your order #{} has been received. Total: {:.2} {}",
        first_name(order),
        order.id,
        order.total,
        currency
    )
}

pub fn status_sms(order: &Order) -> String {
    format!(
        "Hello {}, your order #{} status is now: {}",
        first_name(order),
        order.id,
        order.status
    )
}

pub fn confirmation_subject(order: &Order) -> String {
    format!("Order #{} Confirmation", order.id)
}

pub fn admin_subject(order: &Order) -> String {
    format!("New Order #{} Received", order.id)
}

pub fn status_subject(order: &Order) -> String {
    format!("Order #{} Status Update", order.id)
}

/// One line per item: `2 x Mug @ 5.00 = 10.00`
fn item_lines(order: &Order, out: &mut String) {
    for item in &order.items {
        let name = item
            .product
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("Product #{}", item.product_id));
        let line_total = crate::utils::money::order_total([(item.price, item.quantity)]);
        let _ = writeln!(
            out,
            "  {} x {} @ {:.2} = {:.2}",
            item.quantity, name, item.price, line_total
        );
    }
}

pub fn confirmation_body(order: &Order, currency: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Hello {},", first_name(order));
    let _ = writeln!(out);
    let _ = writeln!(out, "Your order #{} has been received.", order.id);
    let _ = writeln!(out);
    item_lines(order, &mut out);
    let _ = writeln!(out);
    let _ = writeln!(out, "Total: {:.2} {}", order.total, currency);
    let _ = writeln!(out, "Status: {}", order.status);
    let _ = writeln!(out);
    let _ = write!(out, "We'll notify you when your order status changes.");
    out
}

pub fn admin_body(order: &Order, currency: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "New order #{} received.", order.id);
    let _ = writeln!(out);
    if let Some(customer) = &order.customer {
        let _ = writeln!(out, "Customer: {}", customer.full_name());
        let _ = writeln!(out, "Email: {}", customer.email);
        if let Some(phone) = &customer.phone {
            let _ = writeln!(out, "Phone: {phone}");
        }
        let _ = writeln!(out);
    }
    item_lines(order, &mut out);
    let _ = writeln!(out);
    let _ = write!(out, "Total: {:.2} {}", order.total, currency);
    out
}

pub fn status_body(order: &Order) -> String {
    format!(
        "Hello {},\n\nThe status of your order #{} is now: {}.",
        first_name(order),
        order.id,
        order.status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Customer, OrderItem, OrderStatus, Product};

    fn order() -> Order {
        Order {
            id: 17,
            customer_id: 1,
            status: OrderStatus::Pending,
            total: 13.0,
            created_at: 0,
            updated_at: 0,
            customer: Some(Customer {
                id: 1,
                first_name: "Amina".into(),
                last_name: "Otieno".into(),
                email: "amina@example.com".into(),
                phone: Some("+254700000000".into()),
                address: None,
                oauth_id: "sub-1".into(),
                created_at: 0,
                updated_at: 0,
            }),
            items: vec![
                OrderItem {
                    id: 1,
                    order_id: 17,
                    product_id: 3,
                    quantity: 2,
                    price: 5.0,
                    product: Some(Product {
                        id: 3,
                        name: "Mug".into(),
                        description: String::new(),
                        price: 5.0,
                        sku: "MUG".into(),
                        category_id: 1,
                        created_at: 0,
                        updated_at: 0,
                    }),
                },
                OrderItem {
                    id: 2,
                    order_id: 17,
                    product_id: 4,
                    quantity: 1,
                    price: 3.0,
                    product: None,
                },
            ],
        }
    }

    #[test]
    fn test_confirmation_sms() {
        assert_eq!(
            confirmation_sms(&order(), "KES"),
            "Hello Amina, your order #17 has been received. Total: 13.00 KES"
        );
    }

    #[test]
    fn test_status_sms() {
        let mut order = order();
        order.status = OrderStatus::Completed;
        assert_eq!(
            status_sms(&order),
            "Hello Amina, your order #17 status is now: completed"
        );
    }

    #[test]
    fn test_subjects() {
        let order = order();
        assert_eq!(confirmation_subject(&order), "Order #17 Confirmation");
        assert_eq!(admin_subject(&order), "New Order #17 Received");
        assert_eq!(status_subject(&order), "Order #17 Status Update");
    }

    #[test]
    fn test_bodies_list_items() {
        let body = confirmation_body(&order(), "KES");
        assert!(body.contains("2 x Mug @ 5.00 = 10.00"));
        assert!(body.contains("1 x Product #4 @ 3.00 = 3.00"));
        assert!(body.contains("Total: 13.00 KES"));

        let admin = admin_body(&order(), "KES");
        assert!(admin.contains("Customer: Amina Otieno"));
        assert!(admin.contains("Phone: +254700000000"));
    }

    #[test]
    fn test_missing_customer() {
        let mut order = order();
        order.customer = None;
        assert!(status_body(&order).starts_with("Hello customer,"));
    }
}
