pub mod request_id;
pub mod write_guard;

pub use request_id::{RequestId, RequestIdMiddleware};
pub use write_guard::WriteGuard;
