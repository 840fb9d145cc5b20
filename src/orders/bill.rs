use crate::error_handling::types::ProcessError;

use super::data::MENU;
use super::types::Order;

/// Sums the price of every item on the order.
pub fn total(order: &Order) -> Result<f64, ProcessError> {
    order.iter().try_fold(0.0, |sum, (item, quantity)| {
        let price = MENU
            .get(item.as_str())
            .ok_or_else(|| ProcessError::UnknownItem(item.clone()))?;
        Ok(sum + price * f64::from(*quantity))
    })
}

/// The order total rounded to one decimal place.
pub fn get_bill(order: &Order) -> Result<f64, ProcessError> {
    total(order).map(|sum| (sum * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::data::ORDERS;

    #[test]
    fn totals_price_times_quantity() {
        let order = Order::from([("rice".to_string(), 2), ("cola".to_string(), 1)]);
        let sum = total(&order).unwrap();
        assert!((sum - (2.3 * 2.0 + 1.2)).abs() < 1e-9);
    }

    #[test]
    fn bill_rounds_to_one_decimal() {
        let order = ORDERS.get("A001").unwrap();
        // beef 8.2 + lamb 9.5
        assert_eq!(get_bill(order).unwrap(), 17.7);

        // 1.8 * 3 accumulates a float residue that rounding must clear
        let naan = Order::from([("naan".to_string(), 3)]);
        assert_eq!(get_bill(&naan).unwrap(), 5.4);
    }

    #[test]
    fn empty_order_bills_zero() {
        assert_eq!(get_bill(&Order::new()).unwrap(), 0.0);
    }

    #[test]
    fn unknown_item_is_a_fault() {
        let order = Order::from([("dragonfruit".to_string(), 1)]);
        let err = total(&order).unwrap_err();
        assert!(matches!(err, ProcessError::UnknownItem(item) if item == "dragonfruit"));
    }
}
