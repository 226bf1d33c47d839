pub mod bill;
pub mod complaint;
pub mod delivery;
pub mod forms;
pub mod manager;
pub mod plan;
pub mod request;
pub mod session;
pub mod subscription;

pub use bill::*;
pub use complaint::*;
pub use delivery::*;
pub use forms::*;
pub use manager::*;
pub use plan::*;
pub use request::*;
pub use session::*;
pub use subscription::*;
