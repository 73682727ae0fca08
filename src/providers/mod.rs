pub mod exchangerate_host;
pub mod util;

pub use exchangerate_host::ExchangeRateHostProvider;
