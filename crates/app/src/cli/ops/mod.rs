pub mod decrypt;
pub mod encrypt;
pub mod io;
pub mod print;
pub mod recall;
pub mod sign;
pub mod verify;

pub use decrypt::Decrypt;
pub use encrypt::Encrypt;
pub use print::PrintIdentity;
pub use recall::Recall;
pub use sign::Sign;
pub use verify::Verify;
