mod basket;
mod config_cmd;
mod resolve;
mod watch;

pub use basket::BasketCommand;
pub use config_cmd::ConfigCommand;
pub use resolve::ResolveCommand;
pub use watch::WatchCommand;
