use crate::payments::PaymentProcessor;

#[derive(Debug, Clone)]
pub struct CreditCardPayment {
    card_number: String,
}

impl CreditCardPayment {
    pub fn new(card_number: &str) -> Self {
        Self {
            card_number: card_number.to_string(),
        }
    }

    pub(crate) fn confirmation(&self, amount: f64) -> String {
        let last_four: String = self.card_number.chars().rev().take(4)
            .collect::<Vec<_>>().into_iter().rev().collect();
        if last_four.is_empty() {
            format!("💳 Processing credit card payment of ${:.2}", amount)
        } else {
            format!("💳 Processing credit card payment of ${:.2} using card ending with {}", amount, last_four)
        }
    }
}

impl PaymentProcessor for CreditCardPayment {
    fn name(&self) -> &'static str {
        "credit_card"
    }

    fn process_payment(&self, amount: f64) -> bool {
        println!("{}", self.confirmation(amount));
        amount > 0.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct PayPalPayment;

impl PayPalPayment {
    pub(crate) fn confirmation(&self, amount: f64) -> String {
        format!("🅿️ Processing PayPal payment of ${:.2}", amount)
    }
}

impl PaymentProcessor for PayPalPayment {
    fn name(&self) -> &'static str {
        "paypal"
    }

    fn process_payment(&self, amount: f64) -> bool {
        println!("{}", self.confirmation(amount));
        amount > 0.0
    }
}

// Cash settles zero amounts too.
#[derive(Debug, Clone, Default)]
pub struct CashPayment;

impl CashPayment {
    pub(crate) fn confirmation(&self, amount: f64) -> String {
        format!("💵 Processing cash payment of ${:.2}", amount)
    }
}

impl PaymentProcessor for CashPayment {
    fn name(&self) -> &'static str {
        "cash"
    }

    fn process_payment(&self, amount: f64) -> bool {
        println!("{}", self.confirmation(amount));
        amount >= 0.0
    }
}
