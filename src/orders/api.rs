use crate::error_handling::types::ProcessError;
use crate::instrument::traced;

use super::data::ORDERS;
use super::types::Order;

/// Looks up an order in the static fixtures. Stands in for a real order API.
pub fn get_order(order_id: &str) -> Result<Order, ProcessError> {
    traced("get_order", order_id, || {
        ORDERS
            .get(order_id)
            .cloned()
            .ok_or_else(|| ProcessError::UnknownOrder(order_id.to_string()))
    })
}
