pub mod checksum;
pub mod http_client;
pub mod validating_http_body;
