pub mod connection;
pub mod dispatcher;
pub mod relay;

pub use dispatcher::Dispatcher;
pub use relay::{Counterpart, MessageRelay, ScriptedCounterpart, ScriptedReply};
