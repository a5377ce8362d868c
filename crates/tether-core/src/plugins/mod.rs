//! Plugins shipped with tether.

mod dev_server;
mod react_refresh;

pub use dev_server::{DevServerPlugin, PUBLIC_PORT_DEFINE};
pub use react_refresh::{ReactRefreshPlugin, REFRESH_ENTRY_MODULE};
