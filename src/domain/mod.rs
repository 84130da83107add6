pub mod service_name;
pub mod subscription;
pub mod subscription_command;
pub mod subscription_filter;
