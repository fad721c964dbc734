pub mod html_document;
pub mod ndjson_output_adapter;
