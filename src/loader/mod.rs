//! Asset loading: file formats and the asynchronous loading machinery.

pub use self::cubemap::{decode_cubemap, CubemapImages, CUBEMAP_FACES};
pub use self::fetch::load_async;
pub use self::obj::parse_obj;
pub use self::pending::{loading_channel, Loading, LoadingManager, PendingAsset, Resolver};

mod cubemap;
mod fetch;
mod obj;
mod pending;
