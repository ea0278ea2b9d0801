pub mod routing_api;
