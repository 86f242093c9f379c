pub mod factory;
pub mod processors;

// PaymentProcessor is the capability to settle an amount with one payment method.
// Failure is reported as false; there is no error or retry.
pub trait PaymentProcessor: Sync + Send {
    fn name(&self) -> &'static str;
    fn process_payment(&self, amount: f64) -> bool;
}

#[derive(Debug, PartialEq, Clone)]
pub enum PaymentMethod {
    CreditCard(String),
    PayPal,
    Cash,
}
