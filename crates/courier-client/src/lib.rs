mod sign;
pub use sign::{Envelope, SignError, Signer};

mod http;
pub use http::{HEADER_SIGNATURE, HEADER_TIMESTAMP, OrchestratorClient};
