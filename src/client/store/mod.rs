pub mod activity_store;
pub mod common_store;
pub mod pending;
pub mod profile_store;
pub mod user_store;

pub use activity_store::ActivityStore;
pub use common_store::CommonStore;
pub use pending::{OpId, OpKind, PendingLog, PendingOp};
pub use profile_store::ProfileStore;
pub use user_store::UserStore;
