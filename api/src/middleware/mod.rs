mod session;

pub use session::{session_middleware, AnyAccount, GroupAccount, MusicianAccount};
