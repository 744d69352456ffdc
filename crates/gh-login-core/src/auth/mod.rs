mod authenticator;
mod error;
mod transport;

pub use authenticator::{AuthOutcome, GithubAuthenticator, GithubEndpoints, UserProfile};
pub use error::AuthError;
pub use transport::{HttpTransport, Transport, TransportRequest, TransportResponse};
