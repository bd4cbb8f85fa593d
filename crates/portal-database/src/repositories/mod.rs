//! PostgreSQL implementations of the store traits.

pub mod access_code;
pub mod account;
pub mod attempt;
pub mod file;
pub mod quota;
pub mod share;
pub mod user;

pub use access_code::AccessCodeRepository;
pub use account::PgAccountStore;
pub use attempt::LoginAttemptRepository;
pub use file::FileRepository;
pub use quota::QuotaRepository;
pub use share::ShareRepository;
pub use user::UserRepository;
