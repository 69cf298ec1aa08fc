pub mod callback_service;
pub mod mpesa_service;
