pub mod server_metric;

pub use server_metric::Entity as ServerMetric;
