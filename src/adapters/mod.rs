// Adapters layer: chat transports relaying router replies.

#[cfg(feature = "telegram")]
pub mod telegram;
