pub mod de;
pub mod format;
pub mod response;
pub mod validation;

pub use format::money;
pub use response::{FlashView, Notification};
pub use validation::{first_error, parse_date, validate_username};
