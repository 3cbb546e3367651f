mod client;

pub use client::ReqwestHttpClient;
