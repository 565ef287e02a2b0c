use crate::task::Policy;
use crate::{transaction, Error};
use ipswarm_core::REST_PREFIX;
use rand::Rng;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, trace};

/// A simulated client of the `/rest/v1/{ip}` endpoint.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct RestUser {
    client: Client,
    base: Url,
}

impl RestUser {
    /// `host` must be an absolute `http` or `https` URL, e.g. `http://127.0.0.1:3002`.
    pub fn new(client: Client, host: &str) -> Result<Self, Error> {
        let invalid = |reason: &str| Error::InvalidHost {
            host: host.to_string(),
            reason: reason.to_string(),
        };

        let base = Url::parse(host).map_err(|err| invalid(&err.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid("expected an http or https URL"));
        }
        if base.cannot_be_a_base() || base.host_str().is_none() {
            return Err(invalid("missing host"));
        }

        Ok(Self { client, base })
    }

    pub fn url_for(&self, address: &str) -> String {
        format!(
            "{}{REST_PREFIX}/{address}",
            self.base.as_str().trim_end_matches('/')
        )
    }

    /// Runs one iteration of `policy`, returning how many of its requests failed.
    pub async fn run_policy<R: Rng + ?Sized>(&self, policy: Policy, rng: &mut R) -> usize {
        let targets = policy.targets(rng);
        self.request_all(&targets).await
    }

    /// Requests every address in order. A failed request does not stop the remaining ones.
    pub async fn request_all(&self, addresses: &[String]) -> usize {
        let mut failed = 0;
        for address in addresses {
            match self.get_address(address).await {
                Ok(status) => trace!("{address} -> {status}"),
                Err(err) => {
                    debug!("{err}");
                    failed += 1;
                }
            }
        }
        failed
    }

    #[transaction]
    pub async fn get_address(&self, address: &str) -> Result<StatusCode, Error> {
        let url = self.url_for(address);
        let res = self.client.get(&url).send().await?;
        let status = res.status();

        if status.is_client_error() || status.is_server_error() {
            Err(Error::Status { url, status })
        } else {
            Ok(status)
        }
    }
}
