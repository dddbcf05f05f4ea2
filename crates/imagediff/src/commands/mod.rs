mod compare;
mod init;
mod serve;

pub use self::compare::compare;
pub use self::init::init;
pub use self::serve::serve;
