mod admin;
mod clients;
mod health_check;
mod postgres_store;
mod subscriptions;
