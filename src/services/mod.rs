pub mod encoding;
pub mod history;
pub mod render;
pub mod response;
pub mod selection;
pub mod translate;
pub mod upload;
pub mod validate;
pub mod webhook;
