use crate::payments::{PaymentMethod, PaymentProcessor};
use crate::payments::processors::{CashPayment, CreditCardPayment, PayPalPayment};

pub fn create_payment_processor(method: PaymentMethod) -> Box<dyn PaymentProcessor> {
    match method {
        PaymentMethod::CreditCard(card_number) => {
            Box::new(CreditCardPayment::new(card_number.as_str()))
        }
        PaymentMethod::PayPal => {
            Box::new(PayPalPayment)
        }
        PaymentMethod::Cash => {
            Box::new(CashPayment)
        }
    }
}
