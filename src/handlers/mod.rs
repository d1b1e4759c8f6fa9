// Handlers module

pub mod callback;
pub mod health;
pub mod push;
pub mod send_to_agent;

pub use callback::callback_handler;
pub use health::health_handler;
pub use push::push_channel_handler;
pub use send_to_agent::send_to_agent_handler;
