pub mod callback_handlers;
pub mod mpesa_handlers;
