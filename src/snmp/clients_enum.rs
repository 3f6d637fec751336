use super::v2c::SnmpClientV2c;
#[cfg(feature = "v3")]
use super::v3::SnmpClientV3;

pub enum SnmpClient {
    V2c(SnmpClientV2c),
    #[cfg(feature = "v3")]
    V3(SnmpClientV3),
}
