//! Media module - stored binary resources such as generated portraits and tokens.

mod media_model;
mod media_traits;

pub use media_model::{MediaResource, NewMediaResource, ResourceRole};
pub use media_traits::MediaStoreTrait;
