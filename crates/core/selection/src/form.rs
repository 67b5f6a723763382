use basemint_storage_registry::TokenRegistry;
use basemint_types_entities::{CreatedToken, LpToken};

use crate::custom::CustomToken;

/// One entry in the token picker.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenChoice {
    /// The chain's native currency.
    Native,
    Created(CreatedToken),
    LpPosition(LpToken),
    Custom(CustomToken),
}

impl TokenChoice {
    pub fn symbol(&self) -> &str {
        match self {
            TokenChoice::Native => "ETH",
            TokenChoice::Created(token) => &token.symbol,
            TokenChoice::LpPosition(lp) => &lp.symbol,
            TokenChoice::Custom(token) => &token.symbol,
        }
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            TokenChoice::Native => None,
            TokenChoice::Created(token) => Some(&token.address),
            TokenChoice::LpPosition(lp) => Some(&lp.address),
            TokenChoice::Custom(token) => Some(&token.address),
        }
    }
}

/// Positive decimal string with at most `decimals` fractional digits.
pub fn is_valid_amount(amount: &str, decimals: u8) -> bool {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return false;
    }
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return false;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if fraction.len() > decimals as usize {
        return false;
    }
    // all-zero input is not a spendable amount
    whole.chars().chain(fraction.chars()).any(|c| c != '0')
}

/// Everything pickable for the active user and chain: native currency first,
/// then their created tokens, then their LP positions.
pub fn token_choices(registry: &TokenRegistry, owner: &str, chain_id: u64) -> Vec<TokenChoice> {
    let mut choices = vec![TokenChoice::Native];
    choices.extend(registry.load_tokens(owner, chain_id).into_iter().map(TokenChoice::Created));
    choices.extend(registry.load_lp_tokens(owner, chain_id).into_iter().map(TokenChoice::LpPosition));
    choices
}

/// Form state for a two-sided token form: which token sits on each side,
/// what amounts were typed, and the custom tokens added this session. No
/// persistence and no transaction logic.
#[derive(Debug, Default)]
pub struct SelectionState {
    input: Option<TokenChoice>,
    output: Option<TokenChoice>,
    input_amount: String,
    output_amount: String,
    custom_tokens: Vec<CustomToken>,
}

impl SelectionState {
    pub fn input(&self) -> Option<&TokenChoice> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&TokenChoice> {
        self.output.as_ref()
    }

    pub fn input_amount(&self) -> &str {
        &self.input_amount
    }

    pub fn output_amount(&self) -> &str {
        &self.output_amount
    }

    /// Picking the token already on the other side swaps the two sides.
    pub fn select_input(&mut self, choice: TokenChoice) {
        if self.output.as_ref() == Some(&choice) {
            self.output = self.input.take();
        }
        self.input = Some(choice);
    }

    pub fn select_output(&mut self, choice: TokenChoice) {
        if self.input.as_ref() == Some(&choice) {
            self.input = self.output.take();
        }
        self.output = Some(choice);
    }

    pub fn set_input_amount(&mut self, amount: impl Into<String>) {
        self.input_amount = amount.into();
    }

    pub fn set_output_amount(&mut self, amount: impl Into<String>) {
        self.output_amount = amount.into();
    }

    /// One entry per address; re-adding an existing token is a no-op.
    pub fn add_custom_token(&mut self, token: CustomToken) {
        if !self.custom_tokens.iter().any(|t| t.matches_address(&token.address)) {
            self.custom_tokens.push(token);
        }
    }

    pub fn custom_tokens(&self) -> &[CustomToken] {
        &self.custom_tokens
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use basemint_storage_registry::MemoryStore;
    use basemint_types_entities::{CreatedToken, PLACEHOLDER_NAME};

    fn custom(address: &str, symbol: &str) -> CustomToken {
        CustomToken { address: address.to_string(), name: symbol.to_string(), symbol: symbol.to_string(), decimals: 18 }
    }

    #[test]
    fn test_amount_validation() {
        assert!(is_valid_amount("1000", 18));
        assert!(is_valid_amount("0.5", 18));
        assert!(is_valid_amount(" 1.25 ", 18));
        assert!(is_valid_amount(".5", 18));

        assert!(!is_valid_amount("", 18));
        assert!(!is_valid_amount("0", 18));
        assert!(!is_valid_amount("0.000", 18));
        assert!(!is_valid_amount("-1", 18));
        assert!(!is_valid_amount("1,5", 18));
        assert!(!is_valid_amount("abc", 18));
        assert!(!is_valid_amount(".", 18));
        // more fractional digits than the token supports
        assert!(!is_valid_amount("0.1234567", 6));
        assert!(is_valid_amount("0.123456", 6));
    }

    #[test]
    fn test_selecting_other_side_swaps() {
        let mut state = SelectionState::default();
        let a = TokenChoice::Custom(custom("0xaa", "AAA"));
        let b = TokenChoice::Custom(custom("0xbb", "BBB"));

        state.select_input(a.clone());
        state.select_output(b.clone());
        state.select_input(b.clone());

        assert_eq!(state.input(), Some(&b));
        assert_eq!(state.output(), Some(&a));
    }

    #[test]
    fn test_custom_tokens_deduplicate_by_address() {
        let mut state = SelectionState::default();
        state.add_custom_token(custom("0xAAAA", "AAA"));
        state.add_custom_token(custom("0xaaaa", "AAA"));
        state.add_custom_token(custom("0xbbbb", "BBB"));
        assert_eq!(state.custom_tokens().len(), 2);
    }

    #[test]
    fn test_token_choices_lists_registry_entries() {
        let registry = TokenRegistry::new(Arc::new(MemoryStore::new()));
        registry.append_token(CreatedToken {
            address: "0x1111111111111111111111111111111111111111".to_string(),
            name: PLACEHOLDER_NAME.to_string(),
            symbol: "TST".to_string(),
            decimals: 18,
            total_supply: "1000".to_string(),
            creator: "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_string(),
            created_at: 1,
            tx_hash: "0x00".to_string(),
            chain_id: Some(8453),
            image_url: None,
        });

        let choices = token_choices(&registry, "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", 8453);
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0], TokenChoice::Native);
        assert_eq!(choices[1].symbol(), "TST");

        // nothing for another chain
        assert_eq!(token_choices(&registry, "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", 84532).len(), 1);
    }
}
