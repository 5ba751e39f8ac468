mod login;
mod logout;
mod status;

pub use login::handle as login;
pub use logout::handle as logout;
pub use status::handle as status;
