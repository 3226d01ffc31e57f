pub mod api_handler;
pub mod catalog_source;
pub mod form_session;
pub mod health_handler;

#[cfg(test)]
mod form_session_test;
