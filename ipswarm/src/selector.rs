//! Address selection for the `/rest/v1/{ip}` endpoint.
//!
//! Three policies, all stateless and infallible:
//! - [`fixed_ips`]: the same three addresses, always in the same order.
//! - [`random_fixed_ip`]: one address drawn uniformly from [`FIXED_POOL`].
//! - [`random_ip`]: a freshly generated IPv4 address.
//!
//! The `*_with` variants take the random source explicitly so runs can be seeded.
use fake::faker::internet::raw::IPv4;
use fake::locales::EN;
use fake::Fake;
use rand::Rng;

/// Addresses requested, in order, by the fixed-ip task.
pub static FIXED_TRIPLET: [&str; 3] = ["1.2.3.4", "4.5.6.7", "7.8.9.0"];

/// Pool the random-fixed-ips task draws from.
pub static FIXED_POOL: [&str; 10] = [
    "178.167.175.30",
    "114.24.132.31",
    "91.205.163.212",
    "179.6.254.234",
    "216.196.189.137",
    "217.44.226.187",
    "155.211.125.64",
    "191.194.46.98",
    "63.127.26.70",
    "154.100.243.131",
];

pub fn fixed_ips() -> [&'static str; 3] {
    FIXED_TRIPLET
}

pub fn random_fixed_ip() -> &'static str {
    random_fixed_ip_with(&mut rand::thread_rng())
}

pub fn random_fixed_ip_with<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    let index = rng.gen_range(0..FIXED_POOL.len() as u32) as usize;
    FIXED_POOL[index]
}

pub fn random_ip() -> String {
    random_ip_with(&mut rand::thread_rng())
}

pub fn random_ip_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    IPv4(EN).fake_with_rng(rng)
}
