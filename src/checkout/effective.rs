use serde::Serialize;

use crate::models::{CheckoutConfig, PaymentMethod, PixConfig};

pub const DEFAULT_BACKGROUND_COLOR: &str = "#f5f5f5";
pub const DEFAULT_BUTTON_COLOR: &str = "#10b981";
pub const DEFAULT_BUTTON_TEXT_COLOR: &str = "#ffffff";
pub const DEFAULT_BUTTON_TEXT: &str = "Finalizar compra";
pub const DEFAULT_VISITOR_COUNT_MIN: i32 = 15;
pub const DEFAULT_VISITOR_COUNT_MAX: i32 = 60;
pub const DEFAULT_TIMER_MINUTES: i32 = 15;
pub const DEFAULT_TIMER_TEXT: &str = "Oferta expira em";
pub const DEFAULT_PIX_EXPIRATION_MINUTES: i32 = 30;
pub const DEFAULT_PIX_PAGE_TITLE: &str = "Pagamento via PIX";
pub const DEFAULT_PIX_INSTRUCTIONS: &str = "Copie o código abaixo e pague no app do seu banco";
pub const DEFAULT_PIX_SUCCESS_MESSAGE: &str = "Pagamento confirmado!";

/// Fully resolved checkout configuration. Every field has a concrete value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveCheckoutConfig {
    pub background_color: String,
    pub button_color: String,
    pub button_text_color: String,
    pub button_text: String,
    pub show_visitor_counter: bool,
    pub visitor_count_min: i32,
    pub visitor_count_max: i32,
    pub show_timer: bool,
    pub timer_minutes: i32,
    pub timer_text: String,
    pub discount_enabled: bool,
    pub discount_amount_cents: i64,
    pub discount_badge_text: String,
    pub banner_url: String,
    pub header_text: String,
    pub footer_text: String,
    pub payment_methods: Vec<PaymentMethod>,
    pub pix_key: String,
    pub pix_qr_code_url: String,
    pub pix_beneficiary: String,
    pub pix_expiration_minutes: i32,
    pub pix_page_title: String,
    pub pix_instructions: String,
    pub pix_success_message: String,
}

impl Default for EffectiveCheckoutConfig {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            button_color: DEFAULT_BUTTON_COLOR.to_string(),
            button_text_color: DEFAULT_BUTTON_TEXT_COLOR.to_string(),
            button_text: DEFAULT_BUTTON_TEXT.to_string(),
            show_visitor_counter: true,
            visitor_count_min: DEFAULT_VISITOR_COUNT_MIN,
            visitor_count_max: DEFAULT_VISITOR_COUNT_MAX,
            show_timer: true,
            timer_minutes: DEFAULT_TIMER_MINUTES,
            timer_text: DEFAULT_TIMER_TEXT.to_string(),
            discount_enabled: false,
            discount_amount_cents: 0,
            discount_badge_text: String::new(),
            banner_url: String::new(),
            header_text: String::new(),
            footer_text: String::new(),
            payment_methods: vec![PaymentMethod::Pix, PaymentMethod::Cartao],
            pix_key: String::new(),
            pix_qr_code_url: String::new(),
            pix_beneficiary: String::new(),
            pix_expiration_minutes: DEFAULT_PIX_EXPIRATION_MINUTES,
            pix_page_title: DEFAULT_PIX_PAGE_TITLE.to_string(),
            pix_instructions: DEFAULT_PIX_INSTRUCTIONS.to_string(),
            pix_success_message: DEFAULT_PIX_SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Overwrite `slot` when the stored layer has a value.
fn take<T: Clone>(slot: &mut T, stored: &Option<T>) {
    if let Some(v) = stored {
        *slot = v.clone();
    }
}

impl EffectiveCheckoutConfig {
    /// Layer the stored checkout config over `self`.
    pub fn overlay_checkout(mut self, stored: &CheckoutConfig) -> Self {
        take(&mut self.background_color, &stored.background_color);
        take(&mut self.button_color, &stored.button_color);
        take(&mut self.button_text_color, &stored.button_text_color);
        take(&mut self.button_text, &stored.button_text);
        take(&mut self.show_visitor_counter, &stored.show_visitor_counter);
        take(&mut self.visitor_count_min, &stored.visitor_count_min);
        take(&mut self.visitor_count_max, &stored.visitor_count_max);
        take(&mut self.show_timer, &stored.show_timer);
        take(&mut self.timer_minutes, &stored.timer_minutes);
        take(&mut self.timer_text, &stored.timer_text);
        take(&mut self.discount_enabled, &stored.discount_enabled);
        take(&mut self.discount_amount_cents, &stored.discount_amount_cents);
        take(&mut self.discount_badge_text, &stored.discount_badge_text);
        take(&mut self.banner_url, &stored.banner_url);
        take(&mut self.header_text, &stored.header_text);
        take(&mut self.footer_text, &stored.footer_text);
        take(&mut self.pix_key, &stored.pix_key);
        // An empty list would leave the page with no way to pay
        if let Some(methods) = stored.payment_methods.as_ref().filter(|m| !m.is_empty()) {
            self.payment_methods = dedup_methods(methods);
        }
        self
    }

    /// Layer the stored PIX page config over `self`, remapping its fields
    /// onto the checkout names (copy-paste code becomes `pix_key`).
    pub fn overlay_pix(mut self, stored: &PixConfig) -> Self {
        take(&mut self.pix_key, &stored.copy_paste_code);
        take(&mut self.pix_qr_code_url, &stored.qr_code_url);
        take(&mut self.pix_beneficiary, &stored.beneficiary_name);
        take(&mut self.pix_expiration_minutes, &stored.expiration_minutes);
        take(&mut self.pix_page_title, &stored.page_title);
        take(&mut self.pix_instructions, &stored.instructions);
        take(&mut self.pix_success_message, &stored.success_message);
        self
    }

    pub fn accepts(&self, method: PaymentMethod) -> bool {
        self.payment_methods.contains(&method)
    }
}

fn dedup_methods(methods: &[PaymentMethod]) -> Vec<PaymentMethod> {
    let mut out = Vec::with_capacity(methods.len());
    for m in methods {
        if !out.contains(m) {
            out.push(*m);
        }
    }
    out
}

/// Defaults, then the stored checkout config, then the stored PIX config.
pub fn merge(checkout: Option<&CheckoutConfig>, pix: Option<&PixConfig>) -> EffectiveCheckoutConfig {
    let mut effective = EffectiveCheckoutConfig::default();
    if let Some(c) = checkout {
        effective = effective.overlay_checkout(c);
    }
    if let Some(p) = pix {
        effective = effective.overlay_pix(p);
    }
    effective
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_sources_yields_defaults() {
        assert_eq!(merge(None, None), EffectiveCheckoutConfig::default());
    }

    #[test]
    fn test_stored_value_beats_default() {
        let stored = CheckoutConfig {
            button_text: Some("Comprar agora".into()),
            discount_enabled: Some(true),
            discount_amount_cents: Some(2000),
            ..Default::default()
        };
        let effective = merge(Some(&stored), None);

        assert_eq!(effective.button_text, "Comprar agora");
        assert!(effective.discount_enabled);
        assert_eq!(effective.discount_amount_cents, 2000);
        // Untouched fields keep their defaults unchanged
        assert_eq!(effective.button_color, DEFAULT_BUTTON_COLOR);
        assert_eq!(effective.timer_minutes, DEFAULT_TIMER_MINUTES);
    }

    #[test]
    fn test_pix_layer_beats_checkout_layer() {
        let checkout = CheckoutConfig {
            pix_key: Some("chave-do-checkout".into()),
            ..Default::default()
        };
        let pix = PixConfig {
            copy_paste_code: Some("00020126580014BR.GOV.BCB.PIX".into()),
            expiration_minutes: Some(10),
            ..Default::default()
        };
        let effective = merge(Some(&checkout), Some(&pix));

        assert_eq!(effective.pix_key, "00020126580014BR.GOV.BCB.PIX");
        assert_eq!(effective.pix_expiration_minutes, 10);
        assert_eq!(effective.pix_page_title, DEFAULT_PIX_PAGE_TITLE);
    }

    #[test]
    fn test_pix_layer_without_code_keeps_checkout_key() {
        let checkout = CheckoutConfig {
            pix_key: Some("chave-do-checkout".into()),
            ..Default::default()
        };
        let pix = PixConfig {
            beneficiary_name: Some("Loja Exemplo".into()),
            ..Default::default()
        };
        let effective = merge(Some(&checkout), Some(&pix));

        assert_eq!(effective.pix_key, "chave-do-checkout");
        assert_eq!(effective.pix_beneficiary, "Loja Exemplo");
    }

    #[test]
    fn test_empty_payment_methods_fall_back() {
        let stored = CheckoutConfig {
            payment_methods: Some(vec![]),
            ..Default::default()
        };
        let effective = merge(Some(&stored), None);
        assert_eq!(effective.payment_methods, vec![PaymentMethod::Pix, PaymentMethod::Cartao]);

        let stored = CheckoutConfig {
            payment_methods: Some(vec![PaymentMethod::Boleto, PaymentMethod::Boleto]),
            ..Default::default()
        };
        let effective = merge(Some(&stored), None);
        assert_eq!(effective.payment_methods, vec![PaymentMethod::Boleto]);
        assert!(!effective.accepts(PaymentMethod::Pix));
    }
}
