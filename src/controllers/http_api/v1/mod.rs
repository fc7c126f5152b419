pub(crate) mod commitments_http_api_controller;
mod dto;
pub(crate) mod health_http_api_controller;
pub(crate) mod leaves_http_api_controller;
pub(crate) mod unspents_http_api_controller;
