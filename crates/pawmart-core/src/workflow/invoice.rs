//! # Invoice Workflow
//!
//! ```text
//! unpaid ──► paid        (stamps paidAt)
//!    └─────► cancelled
//! ```
//! `paid` and `cancelled` are terminal.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{Invoice, InvoiceStatus};

pub fn next_state(current: InvoiceStatus, requested: InvoiceStatus) -> CoreResult<InvoiceStatus> {
    match (current, requested) {
        (InvoiceStatus::Unpaid, InvoiceStatus::Paid | InvoiceStatus::Cancelled) => Ok(requested),
        _ => Err(CoreError::invalid_transition("invoice", current, requested)),
    }
}

pub fn apply(invoice: &mut Invoice, requested: InvoiceStatus, now: DateTime<Utc>) -> CoreResult<()> {
    let to = next_state(invoice.status, requested)?;
    if to == InvoiceStatus::Paid {
        invoice.paid_at = Some(now);
    }
    invoice.status = to;
    invoice.updated_at = now;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::TaxRate;
    use crate::types::InvoiceCustomer;

    fn invoice() -> Invoice {
        Invoice::new(
            "INV-20260101-0001".into(),
            "shop",
            "owner",
            InvoiceCustomer {
                name: "Jo".into(),
                email: None,
                phone: None,
            },
            vec![],
            TaxRate::zero(),
            None,
        )
    }

    #[test]
    fn test_pay_stamps_paid_at() {
        let mut inv = invoice();
        apply(&mut inv, InvoiceStatus::Paid, Utc::now()).unwrap();
        assert!(inv.paid_at.is_some());
        assert!(apply(&mut inv, InvoiceStatus::Cancelled, Utc::now()).is_err());
    }

    #[test]
    fn test_cancelled_is_terminal() {
        let mut inv = invoice();
        apply(&mut inv, InvoiceStatus::Cancelled, Utc::now()).unwrap();
        assert!(inv.paid_at.is_none());
        assert!(next_state(inv.status, InvoiceStatus::Paid).is_err());
        assert!(next_state(InvoiceStatus::Unpaid, InvoiceStatus::Unpaid).is_err());
    }
}
