pub mod seller_client;

pub use seller_client::SellerServiceClient;
