//! Temporary session tokens from a long-lived key pair and a one-time code

mod exchanger;
mod transport;
mod types;

pub use exchanger::{merge_into_store, SessionExchanger};
pub use transport::{AwsCliTransport, ExchangeRequest, StsTransport};
pub use types::{SessionToken, ACCESS_KEY_ID, SECRET_ACCESS_KEY, SESSION_EXPIRATION, SESSION_TOKEN};
