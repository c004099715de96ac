//! Stock reservation rules for marketplace orders.

/// Why a reservation was refused.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("insufficient stock: requested {requested}, available {available}")]
    Insufficient { requested: i32, available: i32 },
}

/// Check a reservation of `requested` units against `available` stock.
///
/// Returns the stock left after the reservation. The database applies the
/// same rule atomically with a conditional `UPDATE`, this is the check the
/// handler reports from.
///
/// # Errors
///
/// [`StockError::InvalidQuantity`] for zero or negative requests,
/// [`StockError::Insufficient`] when `requested > available`.
pub const fn reserve(available: i32, requested: i32) -> Result<i32, StockError> {
    if requested < 1 {
        return Err(StockError::InvalidQuantity);
    }
    if requested > available {
        return Err(StockError::Insufficient {
            requested,
            available,
        });
    }
    Ok(available - requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_within_stock() {
        assert_eq!(reserve(10, 3), Ok(7));
        assert_eq!(reserve(4, 4), Ok(0));
    }

    #[test]
    fn test_reserve_rejects_over_request() {
        assert_eq!(
            reserve(2, 3),
            Err(StockError::Insufficient {
                requested: 3,
                available: 2
            })
        );
        assert!(reserve(0, 1).is_err());
    }

    #[test]
    fn test_reserve_rejects_non_positive_quantity() {
        assert_eq!(reserve(10, 0), Err(StockError::InvalidQuantity));
        assert_eq!(reserve(10, -2), Err(StockError::InvalidQuantity));
    }
}
