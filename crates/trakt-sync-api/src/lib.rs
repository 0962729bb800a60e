pub mod error;
pub mod traits;
pub mod trakt;

pub use error::ApiError;
pub use traits::TraktApi;
pub use trakt::{TraktClient, DEFAULT_API_URL};
