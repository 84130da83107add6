mod api_doc;
mod postgres_store;
