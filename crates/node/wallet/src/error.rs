use thiserror::Error;

/// Structured taxonomy for everything that can go wrong at the wallet/chain
/// boundary. Raw provider errors are duck-typed strings; they are converted
/// into this enum exactly once, in [`WalletErrorKind::from_raw`], and matched
/// exhaustively everywhere above it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WalletErrorKind {
    /// The user declined the signature request. Expected, handled silently.
    Rejected,
    InsufficientFunds,
    GasLimit,
    Nonce,
    Allowance,
    Slippage,
    DeadlineExpired,
    InsufficientLiquidity,
    ContractRevert,
    Network,
    Timeout,
    UnsupportedChain,
    Other,
}

impl WalletErrorKind {
    /// Boundary adapter: substring matching over the raw error text lives
    /// here and nowhere else.
    pub fn from_raw(message: &str) -> Self {
        let msg = message.to_lowercase();

        if msg.contains("user rejected") || msg.contains("user denied") || msg.contains("action_rejected") {
            return Self::Rejected;
        }
        if msg.contains("insufficient funds") || msg.contains("insufficient balance") {
            return Self::InsufficientFunds;
        }
        if msg.contains("out of gas") || msg.contains("gas required exceeds") || msg.contains("intrinsic gas") {
            return Self::GasLimit;
        }
        if msg.contains("nonce too low") || msg.contains("replacement transaction underpriced") || msg.contains("already known") {
            return Self::Nonce;
        }
        if msg.contains("insufficient_allowance") || msg.contains("transfer_from_failed") || msg.contains("allowance") {
            return Self::Allowance;
        }
        if msg.contains("insufficient_a_amount")
            || msg.contains("insufficient_b_amount")
            || msg.contains("insufficient_output_amount")
            || msg.contains("slippage")
        {
            return Self::Slippage;
        }
        if msg.contains("insufficient_liquidity") || msg.contains("insufficient liquidity") {
            return Self::InsufficientLiquidity;
        }
        if msg.contains("expired") || msg.contains("deadline") {
            return Self::DeadlineExpired;
        }
        if msg.contains("execution reverted") || msg.contains("revert") {
            return Self::ContractRevert;
        }
        if msg.contains("connection") || msg.contains("network") || msg.contains("rate limit") || msg.contains("503") {
            return Self::Network;
        }
        if msg.contains("timeout") || msg.contains("timed out") {
            return Self::Timeout;
        }
        Self::Other
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("{kind:?}: {message}")]
pub struct WalletError {
    pub kind: WalletErrorKind,
    pub message: String,
}

impl WalletError {
    pub fn new(kind: WalletErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    /// Classify an untyped provider/wallet error string.
    pub fn from_raw(message: impl Into<String>) -> Self {
        let message = message.into();
        Self { kind: WalletErrorKind::from_raw(&message), message }
    }

    pub fn rejected() -> Self {
        Self::new(WalletErrorKind::Rejected, "user rejected the request")
    }

    pub fn is_rejection(&self) -> bool {
        self.kind == WalletErrorKind::Rejected
    }
}

/// Rewrite a boundary error into the short string shown to the user.
///
/// `None` means nothing is shown: wallet rejections are an expected outcome
/// and reset silently.
pub fn classify_for_display(error: &WalletError) -> Option<String> {
    let text = match error.kind {
        WalletErrorKind::Rejected => return None,
        WalletErrorKind::InsufficientFunds => "Insufficient funds to cover the amount and gas.".to_string(),
        WalletErrorKind::GasLimit => "Transaction ran out of gas. Try again with a higher gas limit.".to_string(),
        WalletErrorKind::Nonce => "Transaction nonce conflict. Wait for pending transactions to settle and retry.".to_string(),
        WalletErrorKind::Allowance => "Token allowance is too low. Approve the token again and retry.".to_string(),
        WalletErrorKind::Slippage => "Price moved beyond the slippage tolerance. Try again.".to_string(),
        WalletErrorKind::DeadlineExpired => "Transaction deadline expired before confirmation. Try again.".to_string(),
        WalletErrorKind::InsufficientLiquidity => "The pool does not have enough liquidity for this amount.".to_string(),
        WalletErrorKind::ContractRevert => "Smart contract interaction failed.".to_string(),
        WalletErrorKind::Network => "Network error talking to the RPC endpoint. Check your connection and retry.".to_string(),
        WalletErrorKind::Timeout => "Timed out waiting for confirmation. The transaction may still confirm.".to_string(),
        WalletErrorKind::UnsupportedChain => "This network is not supported.".to_string(),
        WalletErrorKind::Other => format!("Something went wrong: {}", error.message),
    };
    Some(text)
}
